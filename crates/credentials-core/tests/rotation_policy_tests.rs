//! Refresh-token reuse under both rotation policies

use std::sync::Arc;

use credentials_core::{
    init, AuthenticationService, CredentialsConfig, Error, LoginRequest, MemoryUserStore,
    PasswordConfig, RotationPolicy, SignupRequest, UserStore,
};

fn setup(policy: RotationPolicy) -> (AuthenticationService, MemoryUserStore) {
    let mut config = CredentialsConfig::with_secrets("policy-access", "policy-refresh");
    config.password = PasswordConfig {
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    config.rotation_policy = policy;

    let store = MemoryUserStore::new();
    let service = init(config, Arc::new(store.clone())).unwrap();
    (service, store)
}

fn signup_request() -> SignupRequest {
    SignupRequest {
        email: "policy@example.com".to_string(),
        password: "pw1".to_string(),
        name: "Policy".to_string(),
    }
}

#[tokio::test]
async fn test_lenient_allows_rotated_away_token() {
    let (service, _store) = setup(RotationPolicy::Lenient);
    assert_eq!(service.rotation_policy(), RotationPolicy::Lenient);

    let t1 = service.signup(signup_request()).await.unwrap();
    let t2 = service.refresh(&t1.refresh_token).await.unwrap();

    // t1's refresh token is no longer the stored one but still mints pairs
    // until it expires.
    let t3 = service.refresh(&t1.refresh_token).await.unwrap();
    assert_ne!(t3.refresh_token, t2.refresh_token);
}

#[tokio::test]
async fn test_lenient_allows_refresh_after_logout() {
    let (service, store) = setup(RotationPolicy::Lenient);
    let tokens = service.signup(signup_request()).await.unwrap();
    let user = store.find_by_email("policy@example.com").await.unwrap().unwrap();

    service.logout(user.id).await.unwrap();
    assert!(service.refresh(&tokens.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_strict_rejects_rotated_away_token() {
    let (service, _store) = setup(RotationPolicy::Strict);

    let t1 = service.signup(signup_request()).await.unwrap();
    let t2 = service.refresh(&t1.refresh_token).await.unwrap();

    let reuse = service.refresh(&t1.refresh_token).await;
    assert!(matches!(reuse, Err(Error::InvalidToken)));

    // The current token still works, and rotates in turn.
    let t3 = service.refresh(&t2.refresh_token).await.unwrap();
    assert!(matches!(
        service.refresh(&t2.refresh_token).await,
        Err(Error::InvalidToken)
    ));
    assert!(service.refresh(&t3.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_strict_rejects_after_signin_elsewhere() {
    let (service, _store) = setup(RotationPolicy::Strict);
    let first = service.signup(signup_request()).await.unwrap();

    service
        .signin(LoginRequest {
            email: "policy@example.com".to_string(),
            password: "pw1".to_string(),
        })
        .await
        .unwrap();

    assert!(matches!(
        service.refresh(&first.refresh_token).await,
        Err(Error::InvalidToken)
    ));
}

#[tokio::test]
async fn test_strict_rejects_after_logout() {
    let (service, store) = setup(RotationPolicy::Strict);
    let tokens = service.signup(signup_request()).await.unwrap();
    let user = store.find_by_email("policy@example.com").await.unwrap().unwrap();

    service.logout(user.id).await.unwrap();
    assert!(matches!(
        service.refresh(&tokens.refresh_token).await,
        Err(Error::InvalidToken)
    ));

    // Logout does not touch access tokens under either policy.
    assert!(service.validate(&tokens.access_token).is_ok());
}
