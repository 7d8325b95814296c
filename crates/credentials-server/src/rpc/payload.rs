//! Payload shapes accepted on the wire

use credentials_core::UserId;
use serde::Deserialize;

/// A user id that may arrive as a number or as a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Number(UserId),
    Text(String),
}

impl IdValue {
    fn parse(&self) -> Option<UserId> {
        match self {
            IdValue::Number(id) => Some(*id),
            IdValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectHeaders {
    pub sub: IdValue,
}

/// `logout` accepts the header form, an explicit `userId`, or a bare id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LogoutPayload {
    Headers { headers: SubjectHeaders },
    Direct {
        #[serde(rename = "userId")]
        user_id: IdValue,
    },
    Bare(IdValue),
}

impl LogoutPayload {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            LogoutPayload::Headers { headers } => headers.sub.parse(),
            LogoutPayload::Direct { user_id } => user_id.parse(),
            LogoutPayload::Bare(id) => id.parse(),
        }
    }
}

/// A token as a bare string or wrapped in an object
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum TokenPayload {
    Bare(String),
    Wrapped {
        #[serde(alias = "refreshToken", alias = "accessToken")]
        token: String,
    },
}

impl TokenPayload {
    pub fn token(&self) -> &str {
        match self {
            TokenPayload::Bare(token) => token,
            TokenPayload::Wrapped { token } => token,
        }
    }
}
