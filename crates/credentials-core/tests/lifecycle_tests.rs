//! Tests for the credential lifecycle: signup, signin, refresh, logout, validate, me

use std::sync::Arc;

use async_trait::async_trait;
use credentials_core::{
    init, AuthenticationService, CredentialsConfig, Error, LoginRequest, MemoryUserStore, NewUser,
    PasswordConfig, SignupRequest, TokenKind, User, UserId, UserStore, UserUpdate,
};
use futures::future::join_all;
use pretty_assertions::assert_eq;

fn test_config() -> CredentialsConfig {
    let mut config = CredentialsConfig::with_secrets("test-access-secret", "test-refresh-secret");
    config.password = PasswordConfig {
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    config
}

fn setup() -> (AuthenticationService, MemoryUserStore) {
    let store = MemoryUserStore::new();
    let service = init(test_config(), Arc::new(store.clone())).unwrap();
    (service, store)
}

fn signup_request(email: &str, password: &str, name: &str) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: name.to_string(),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_signup_issues_tokens_for_new_user() {
    let (service, store) = setup();

    let tokens = service
        .signup(signup_request("alice@example.com", "pw1", "Alice"))
        .await
        .unwrap();

    let user = store.find_by_email("alice@example.com").await.unwrap().unwrap();
    let claims = service
        .validator()
        .validate(&tokens.refresh_token, TokenKind::Refresh)
        .unwrap();
    assert_eq!(claims.subject, user.id);
    assert_eq!(claims.email, "alice@example.com");

    // One-way storage of the password and of the refresh token
    assert_ne!(user.password_hash, "pw1");
    assert!(service.hasher().verify(&user.password_hash, "pw1").await);
    let refresh_hash = user.refresh_token_hash.expect("session stored");
    assert_ne!(refresh_hash, tokens.refresh_token);
    assert!(service.hasher().verify(&refresh_hash, &tokens.refresh_token).await);
}

#[tokio::test]
async fn test_signup_existing_email_fails_without_mutation() {
    let (service, store) = setup();
    service
        .signup(signup_request("bob@example.com", "pw1", "Bob"))
        .await
        .unwrap();
    let before = store.find_by_email("bob@example.com").await.unwrap().unwrap();

    let result = service
        .signup(signup_request("bob@example.com", "other", "Impostor"))
        .await;
    assert!(matches!(result, Err(Error::UserExists)));

    let after = store.find_by_email("bob@example.com").await.unwrap().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(after.name, "Bob");
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.refresh_token_hash, before.refresh_token_hash);
}

#[tokio::test]
async fn test_signup_rejects_invalid_input_before_store() {
    let (service, store) = setup();

    let result = service.signup(signup_request("not-an-email", "pw1", "A")).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    let result = service.signup(signup_request("a@x.com", "", "A")).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_signin_with_correct_password() {
    let (service, store) = setup();
    service
        .signup(signup_request("carol@example.com", "pw1", "Carol"))
        .await
        .unwrap();
    let user = store.find_by_email("carol@example.com").await.unwrap().unwrap();

    let tokens = service
        .signin(login_request("carol@example.com", "pw1"))
        .await
        .unwrap();
    let claims = service.validate(&tokens.access_token).unwrap();
    assert_eq!(claims.subject, user.id);
    assert_eq!(claims.email, "carol@example.com");
}

#[tokio::test]
async fn test_signin_wrong_password_issues_nothing() {
    let (service, store) = setup();
    service
        .signup(signup_request("dave@example.com", "pw1", "Dave"))
        .await
        .unwrap();
    let before = store.find_by_email("dave@example.com").await.unwrap().unwrap();

    let result = service.signin(login_request("dave@example.com", "pw2")).await;
    assert!(matches!(result, Err(Error::InvalidCredentials)));

    let after = store.find_by_email("dave@example.com").await.unwrap().unwrap();
    assert_eq!(after.refresh_token_hash, before.refresh_token_hash);
}

#[tokio::test]
async fn test_signin_unknown_user() {
    let (service, _store) = setup();
    let result = service.signin(login_request("ghost@example.com", "pw1")).await;
    assert!(matches!(result, Err(Error::UserNotFound)));
}

#[tokio::test]
async fn test_signup_signin_refresh_scenario() {
    let (service, _store) = setup();

    let t1 = service
        .signup(signup_request("a@x.com", "pw1", "A"))
        .await
        .unwrap();
    let t2 = service.signin(login_request("a@x.com", "pw1")).await.unwrap();
    assert_ne!(t2.refresh_token, t1.refresh_token);

    let t3 = service.refresh(&t2.refresh_token).await.unwrap();

    let subject_1 = service.validate(&t1.access_token).unwrap().subject;
    let subject_3 = service
        .validator()
        .validate(&t3.refresh_token, TokenKind::Refresh)
        .unwrap()
        .subject;
    assert_eq!(subject_1, subject_3);
    assert_eq!(service.validate(&t3.access_token).unwrap().subject, subject_1);
}

#[tokio::test]
async fn test_refresh_rotates_stored_hash() {
    let (service, store) = setup();
    let t1 = service
        .signup(signup_request("rot@example.com", "pw1", "Rot"))
        .await
        .unwrap();
    let t2 = service.refresh(&t1.refresh_token).await.unwrap();

    let user = store.find_by_email("rot@example.com").await.unwrap().unwrap();
    let stored = user.refresh_token_hash.unwrap();
    assert!(service.hasher().verify(&stored, &t2.refresh_token).await);
    assert!(!service.hasher().verify(&stored, &t1.refresh_token).await);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (service, _store) = setup();
    let tokens = service
        .signup(signup_request("kind@example.com", "pw1", "Kind"))
        .await
        .unwrap();

    let result = service.refresh(&tokens.access_token).await;
    assert!(matches!(result, Err(Error::InvalidToken)));
    assert!(matches!(service.refresh("garbage").await, Err(Error::InvalidToken)));
}

#[tokio::test]
async fn test_refresh_for_vanished_user() {
    // Same secrets, different (empty) store: the subject does not exist there.
    let (issuing, _) = setup();
    let tokens = issuing
        .signup(signup_request("gone@example.com", "pw1", "Gone"))
        .await
        .unwrap();

    let (service, _) = setup();
    let result = service.refresh(&tokens.refresh_token).await;
    assert!(matches!(result, Err(Error::UserNotFound)));
}

#[tokio::test]
async fn test_logout_clears_session_but_not_access_tokens() {
    let (service, store) = setup();
    let tokens = service
        .signup(signup_request("eve@example.com", "pw1", "Eve"))
        .await
        .unwrap();
    let user = store.find_by_email("eve@example.com").await.unwrap().unwrap();

    let public = service.logout(user.id).await.unwrap();
    assert_eq!(public.id, user.id);
    assert_eq!(public.email, "eve@example.com");
    assert_eq!(public.name, "Eve");

    let stored = store.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.refresh_token_hash.is_none());

    // Access tokens are not revoked by logout; they live until expiry.
    let session = service.me(&tokens.access_token).await.unwrap();
    assert_eq!(session.user.id, user.id);
    assert!(store.find_by_id(user.id).await.unwrap().unwrap().refresh_token_hash.is_some());
}

#[tokio::test]
async fn test_logout_unknown_user() {
    let (service, _store) = setup();
    let result = service.logout(999).await;
    assert!(matches!(result, Err(Error::NotFound(999))));
}

#[tokio::test]
async fn test_me_returns_user_and_rotates() {
    let (service, store) = setup();
    let tokens = service
        .signup(signup_request("me@example.com", "pw1", "Me"))
        .await
        .unwrap();

    let session = service.me(&tokens.access_token).await.unwrap();
    assert_eq!(session.user.email, "me@example.com");
    assert_ne!(session.tokens.refresh_token, tokens.refresh_token);

    let stored = store
        .find_by_email("me@example.com")
        .await
        .unwrap()
        .unwrap()
        .refresh_token_hash
        .unwrap();
    assert!(service.hasher().verify(&stored, &session.tokens.refresh_token).await);

    let json = serde_json::to_value(&session).unwrap();
    assert!(json["user"].get("passwordHash").is_none());
    assert!(json["user"].get("refreshTokenHash").is_none());

    assert!(matches!(
        service.me(&tokens.refresh_token).await,
        Err(Error::InvalidToken)
    ));
}

#[tokio::test]
async fn test_validate_is_idempotent() {
    let (service, _store) = setup();
    let tokens = service
        .signup(signup_request("idem@example.com", "pw1", "Idem"))
        .await
        .unwrap();

    let first = service.validate(&tokens.access_token).unwrap();
    let second = service.validate(&tokens.access_token).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_refresh_last_writer_wins() {
    let (service, store) = setup();
    let service = Arc::new(service);
    let tokens = service
        .signup(signup_request("race@example.com", "pw1", "Race"))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        service.refresh(&tokens.refresh_token),
        service.refresh(&tokens.refresh_token)
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let stored = store
        .find_by_email("race@example.com")
        .await
        .unwrap()
        .unwrap()
        .refresh_token_hash
        .unwrap();
    let matches_a = service.hasher().verify(&stored, &a.refresh_token).await;
    let matches_b = service.hasher().verify(&stored, &b.refresh_token).await;
    assert!(matches_a ^ matches_b);
}

#[tokio::test]
async fn test_concurrent_signup_same_email_creates_one_user() {
    let (service, store) = setup();

    let attempts = (0..8).map(|i| {
        service.signup(signup_request("dup@example.com", &format!("pw{}", i), "Dup"))
    });
    let results = join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, Error::UserExists)));
    assert_eq!(store.len(), 1);
}

/// Store whose updates always fail, to check issuance is tied to persistence
struct ReadOnlyStore {
    inner: MemoryUserStore,
}

#[async_trait]
impl UserStore for ReadOnlyStore {
    async fn find_by_email(&self, email: &str) -> credentials_core::Result<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> credentials_core::Result<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn create(&self, user: NewUser) -> credentials_core::Result<User> {
        self.inner.create(user).await
    }

    async fn update(&self, _id: UserId, _update: UserUpdate) -> credentials_core::Result<User> {
        Err(Error::Store("read-only replica".to_string()))
    }
}

#[tokio::test]
async fn test_no_tokens_without_persisted_session() {
    let store = Arc::new(ReadOnlyStore {
        inner: MemoryUserStore::new(),
    });
    let service = init(test_config(), store).unwrap();

    let result = service.signup(signup_request("ro@example.com", "pw1", "RO")).await;
    match result {
        Err(Error::Store(msg)) => assert_eq!(msg, "read-only replica"),
        other => panic!("Expected store error, got {:?}", other),
    }

    let result = service.logout(1).await;
    assert!(matches!(result, Err(Error::Store(_))));
}

#[test]
fn test_init_requires_secrets() {
    let store = Arc::new(MemoryUserStore::new());
    let result = init(CredentialsConfig::default(), store);
    assert!(matches!(result, Err(Error::Config(_))));
}
