//! HTTP client for the Suppleit API endpoints the login flows depend on. All
//! calls share one timeout policy and one error mapping. Request bodies carry
//! passwords and authorization codes and responses carry tokens; none of them
//! may be logged.

use crate::suppleit::{config::AppConfig, errors::AppError, providers::Provider};
use crate::APP_USER_AGENT;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{info_span, Instrument};

/// Maximum number of error body characters surfaced to the member.
const MAX_ERROR_CHARS: usize = 200;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const MEMBER_INFO_PATH: &str = "/api/member/info";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Tokens issued by `/api/auth/login`; either may be missing on a malformed reply.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for LoginTokens {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginTokens")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Member profile returned by `/api/member/info`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub email: Option<String>,
    /// String or number depending on the backend version.
    pub member_id: Option<Value>,
    pub member_role: Option<Value>,
}

/// Body of `/api/social/login/{provider}`.
#[derive(Clone, Debug, Serialize)]
pub struct SocialLoginRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Submits credentials to the login endpoint.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-success statuses and undecodable bodies.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginTokens, AppError> {
        let url = build_url(&self.base_url, LOGIN_PATH);
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let span = info_span!("api.login", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    /// Fetches the profile of the member owning `access_token`.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-success statuses and undecodable bodies.
    pub async fn member_info(&self, access_token: &SecretString) -> Result<MemberProfile, AppError> {
        let url = build_url(&self.base_url, MEMBER_INFO_PATH);

        let span = info_span!("api.member_info", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    /// Exchanges an authorization code through the backend. The reply shape
    /// varies, so it is returned as raw JSON for the callback to normalize.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-success statuses and undecodable bodies.
    pub async fn social_login(
        &self,
        provider: Provider,
        request: &SocialLoginRequest,
    ) -> Result<Value, AppError> {
        let url = build_url(&self.base_url, &provider.exchange_path());

        let span = info_span!(
            "api.social_login",
            http.method = "POST",
            url = %url,
            provider = provider.as_str()
        );
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }
}

/// Builds a URL from a base URL and the provided path.
pub(crate) fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with the backend message.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status: status.as_u16(),
            message: backend_message(&body),
        })
    }
}

/// Extracts the `message` field of a JSON error body, trimmed and truncated.
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message").and_then(Value::as_str)?.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.chars().take(MAX_ERROR_CHARS).collect())
    }
}
