use std::fmt;

/// Transport and storage failures raised below the login flows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppError {
    Config(String),
    Network(String),
    Timeout(String),
    /// Non-success HTTP status; `message` is the backend's `message` field when it sent one.
    Http {
        status: u16,
        message: Option<String>,
    },
    Parse(String),
    Serialization(String),
    Storage(String),
}

impl AppError {
    /// Message supplied by the backend, if the failure carried one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AppError::Http {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(message) => write!(formatter, "Config error: {message}"),
            AppError::Network(message) => write!(formatter, "Network error: {message}"),
            AppError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AppError::Http { status, message } => write!(
                formatter,
                "Request failed ({status}): {}",
                message.as_deref().unwrap_or("Request failed.")
            ),
            AppError::Parse(message) => write!(formatter, "Response error: {message}"),
            AppError::Serialization(message) => write!(formatter, "Request error: {message}"),
            AppError::Storage(message) => write!(formatter, "Storage error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

/// User-visible failures of the login flows. `Display` is the text shown to the member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Detected locally before any request was sent.
    Validation(String),
    /// The primary request failed; already resolved to the backend or generic message.
    Request(String),
    /// The backend answered but the payload carried no usable token.
    Protocol(String),
    /// Tokens were issued but the member profile could not be fetched.
    Profile(String),
    /// Another submission is still in flight.
    Busy,
    /// The OAuth `state` round-trip did not match.
    State(String),
    /// The provider redirected back with an error instead of a code.
    Provider(String),
    Storage(String),
}

impl AuthError {
    /// Resolves a request failure to the backend message, falling back to `fallback`.
    pub(crate) fn from_request(err: &AppError, fallback: &str) -> Self {
        AuthError::Request(err.backend_message().unwrap_or(fallback).to_string())
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(message)
            | AuthError::Request(message)
            | AuthError::Protocol(message)
            | AuthError::Profile(message)
            | AuthError::State(message)
            | AuthError::Provider(message)
            | AuthError::Storage(message) => formatter.write_str(message),
            AuthError::Busy => formatter.write_str("A login request is already in progress."),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Storage(message) => AuthError::Storage(message),
            other => AuthError::Request(other.to_string()),
        }
    }
}
