//! Session record shared by the credential and social login flows. A session
//! is either absent or complete: all five keys are written together and a
//! partial record reads back as no session. Token values are secrets and must
//! never be logged.

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::StorageSessionStore;

use crate::suppleit::errors::AppError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_MEMBER_ID: &str = "memberId";
pub const KEY_EMAIL: &str = "email";
pub const KEY_ROLE: &str = "role";

/// Every key a session occupies in storage.
pub const SESSION_KEYS: [&str; 5] = [
    KEY_ACCESS_TOKEN,
    KEY_REFRESH_TOKEN,
    KEY_MEMBER_ID,
    KEY_EMAIL,
    KEY_ROLE,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Reads a `memberRole` value. Missing, null, empty and unknown roles fall back to `USER`.
    #[must_use]
    pub fn from_member_role(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str).map(str::trim) {
            None | Some("") => Role::User,
            Some(raw) => raw.parse().unwrap_or_else(|()| {
                warn!("unrecognized member role {raw:?}, defaulting to USER");
                Role::User
            }),
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("ADMIN") {
            Ok(Role::Admin)
        } else if value.eq_ignore_ascii_case("USER") {
            Ok(Role::User)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The five-field record identifying the signed-in member.
#[derive(Clone, Debug)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub member_id: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        member_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            member_id: member_id.into(),
            email: email.into(),
            role,
        }
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.access_token.expose_secret() == other.access_token.expose_secret()
            && self.refresh_token.expose_secret() == other.refresh_token.expose_secret()
            && self.member_id == other.member_id
            && self.email == other.email
            && self.role == other.role
    }
}

impl Eq for Session {}

/// Where the flows commit a session. Injected so flows run without a real storage backend.
pub trait SessionStore: Send + Sync {
    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be read.
    fn get(&self) -> Result<Option<Session>, AppError>;

    /// Replaces any existing session wholesale.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be written.
    fn set(&self, session: &Session) -> Result<(), AppError>;

    /// # Errors
    /// Returns `AppError::Storage` when the backend cannot be written.
    fn clear(&self) -> Result<(), AppError>;
}

/// Renders a JSON scalar as text; member ids arrive as strings or numbers.
pub(crate) fn scalar_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
