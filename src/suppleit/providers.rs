//! Social login initiators. Each one builds the provider authorization URL and
//! hands it to the navigator; the member leaves the application until the
//! provider redirects back to the callback route.

use crate::suppleit::{
    config::{AppConfig, ProviderConfig},
    errors::AuthError,
    navigation::{Navigator, Route},
    session::Storage,
};
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const NAVER_AUTHORIZE_URL: &str = "https://nid.naver.com/oauth2.0/authorize";

/// Session-scoped storage key holding the pending Naver CSRF state.
pub const NAVER_STATE_KEY: &str = "naverState";
pub const STATE_LENGTH: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Naver,
}

impl Provider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Naver => "naver",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Naver => "Naver",
        }
    }

    /// Backend endpoint that trades the authorization code for a session.
    #[must_use]
    pub fn exchange_path(self) -> String {
        format!("/api/social/login/{}", self.as_str())
    }

    /// Whether the provider round-trips a CSRF `state` that must be verified.
    #[must_use]
    pub const fn uses_state(self) -> bool {
        matches!(self, Provider::Naver)
    }

    #[must_use]
    pub fn config(self, config: &AppConfig) -> &ProviderConfig {
        match self {
            Provider::Google => &config.google,
            Provider::Naver => &config.naver,
        }
    }

    const fn authorize_endpoint(self) -> &'static str {
        match self {
            Provider::Google => GOOGLE_AUTHORIZE_URL,
            Provider::Naver => NAVER_AUTHORIZE_URL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "naver" => Ok(Provider::Naver),
            other => Err(format!("unsupported provider: {other}")),
        }
    }
}

/// Random opaque state token drawn from `[0-9a-z]`.
#[must_use]
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_LENGTH)
        .map(|_| char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
        .collect()
}

/// Builds the provider authorization URL requesting an authorization code.
///
/// # Errors
/// Returns an error if the provider endpoint cannot be parsed.
pub fn authorization_url(
    provider: Provider,
    config: &ProviderConfig,
    state: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(provider.authorize_endpoint())?;
    {
        let mut query = url.query_pairs_mut();
        match provider {
            Provider::Google => {
                query.append_pair("client_id", &config.client_id);
                query.append_pair("redirect_uri", &config.redirect_uri);
                if let Some(scope) = &config.scope {
                    query.append_pair("scope", scope);
                }
                query.append_pair("response_type", "code");
            }
            Provider::Naver => {
                query.append_pair("response_type", "code");
                query.append_pair("client_id", &config.client_id);
                query.append_pair("redirect_uri", &config.redirect_uri);
                if let Some(scope) = &config.scope {
                    query.append_pair("scope", scope);
                }
            }
        }
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }
    Ok(url)
}

/// Starts a social login by redirecting the member to the provider.
pub struct SocialLogin {
    config: AppConfig,
    session_storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
}

impl SocialLogin {
    pub fn new(
        config: AppConfig,
        session_storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            session_storage,
            navigator,
        }
    }

    /// Builds the authorization URL, records the CSRF state when the provider
    /// uses one, and navigates to the provider.
    ///
    /// # Errors
    /// Returns a generic `AuthError` when the URL cannot be built or the state
    /// cannot be stored; nothing is navigated in that case.
    pub fn start(&self, provider: Provider) -> Result<Url, AuthError> {
        let generic = || {
            format!(
                "An error occurred while processing {} login.",
                provider.display_name()
            )
        };

        let state = provider.uses_state().then(generate_state);
        let url = authorization_url(provider, provider.config(&self.config), state.as_deref())
            .map_err(|err| {
                error!(%provider, "failed to build authorization URL: {err}");
                AuthError::Validation(generic())
            })?;

        if let Some(state) = &state {
            self.session_storage
                .set_item(NAVER_STATE_KEY, state)
                .map_err(|err| {
                    error!(%provider, "failed to store login state: {err}");
                    AuthError::Storage(generic())
                })?;
            debug!(%provider, "login state stored");
        }

        info!(%provider, "redirecting to provider authorization");
        self.navigator.navigate(Route::External(url.clone()));

        Ok(url)
    }
}
