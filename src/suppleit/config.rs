//! Client configuration for the Suppleit API and the OAuth providers. Built-in
//! defaults match the local development deployment; callers (the CLI) layer
//! optional overrides on top. Configuration values are public; do not store
//! secrets here.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_GOOGLE_CLIENT_ID: &str =
    "286893397263-o0opr0c1et57me60o8sq5ccdf836js75.apps.googleusercontent.com";
const DEFAULT_GOOGLE_REDIRECT_URI: &str = "http://localhost:3000/callback/google";
const DEFAULT_GOOGLE_SCOPE: &str = "email profile";
const DEFAULT_NAVER_CLIENT_ID: &str = "M_qS71BqoG7oESo3_thQ";
const DEFAULT_NAVER_REDIRECT_URI: &str = "http://localhost:3000/callback/naver";

/// Delay before a failed social login sends the member back to the login route.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(3);
/// Default request timeout applied to every API call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth client registration for one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub redirect_delay: Duration,
    /// Directory holding the persistent session file.
    pub state_dir: PathBuf,
    pub google: ProviderConfig,
    pub naver: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            state_dir: default_state_dir(),
            google: ProviderConfig {
                client_id: DEFAULT_GOOGLE_CLIENT_ID.to_string(),
                redirect_uri: DEFAULT_GOOGLE_REDIRECT_URI.to_string(),
                scope: Some(DEFAULT_GOOGLE_SCOPE.to_string()),
            },
            naver: ProviderConfig {
                client_id: DEFAULT_NAVER_CLIENT_ID.to_string(),
                redirect_uri: DEFAULT_NAVER_REDIRECT_URI.to_string(),
                scope: None,
            },
        }
    }
}

impl AppConfig {
    /// Defaults with the given overrides applied.
    #[must_use]
    pub fn load(overrides: ConfigOverrides) -> Self {
        let mut config = Self::default();
        apply_overrides(&mut config, overrides);
        config
    }
}

/// Optional values supplied at runtime; empty strings are ignored.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub state_dir: Option<String>,
    pub google_client_id: Option<String>,
    pub google_redirect_uri: Option<String>,
    pub naver_client_id: Option<String>,
    pub naver_redirect_uri: Option<String>,
    pub redirect_delay_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

fn apply_overrides(config: &mut AppConfig, overrides: ConfigOverrides) {
    if let Some(value) = overrides.api_base_url.as_deref().and_then(normalize_value) {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.state_dir.as_deref().and_then(normalize_value) {
        config.state_dir = PathBuf::from(value);
    }
    if let Some(value) = overrides
        .google_client_id
        .as_deref()
        .and_then(normalize_value)
    {
        config.google.client_id = value;
    }
    if let Some(value) = overrides
        .google_redirect_uri
        .as_deref()
        .and_then(normalize_value)
    {
        config.google.redirect_uri = value;
    }
    if let Some(value) = overrides
        .naver_client_id
        .as_deref()
        .and_then(normalize_value)
    {
        config.naver.client_id = value;
    }
    if let Some(value) = overrides
        .naver_redirect_uri
        .as_deref()
        .and_then(normalize_value)
    {
        config.naver.redirect_uri = value;
    }
    if let Some(ms) = overrides.redirect_delay_ms {
        config.redirect_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = overrides.request_timeout_ms.filter(|ms| *ms > 0) {
        config.request_timeout = Duration::from_millis(ms);
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("suppleit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.suppleit.dev "),
            Some("https://api.suppleit.dev".to_string())
        );
    }

    #[test]
    fn defaults_match_local_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.redirect_delay, Duration::from_secs(3));
        assert_eq!(
            config.google.redirect_uri,
            "http://localhost:3000/callback/google"
        );
        assert_eq!(config.google.scope.as_deref(), Some("email profile"));
        assert_eq!(config.naver.scope, None);
        assert!(config.state_dir.ends_with("suppleit"));
    }

    #[test]
    fn overrides_ignore_empty_values() {
        let config = AppConfig::load(ConfigOverrides {
            api_base_url: Some("  ".to_string()),
            google_client_id: Some(String::new()),
            request_timeout_ms: Some(0),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.google.client_id, DEFAULT_GOOGLE_CLIENT_ID);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn overrides_overwrite_when_present() {
        let config = AppConfig::load(ConfigOverrides {
            api_base_url: Some("https://api.override".to_string()),
            state_dir: Some("/tmp/suppleit-state".to_string()),
            naver_client_id: Some("naver-client".to_string()),
            naver_redirect_uri: Some("http://127.0.0.1:4000/cb".to_string()),
            redirect_delay_ms: Some(0),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/suppleit-state"));
        assert_eq!(config.naver.client_id, "naver-client");
        assert_eq!(config.naver.redirect_uri, "http://127.0.0.1:4000/cb");
        assert_eq!(config.redirect_delay, Duration::ZERO);
    }
}
