//! Email/password login. Authentication and the profile lookup form one unit:
//! the session is committed only after both calls succeed, so a failed profile
//! fetch never leaves fresh tokens next to a previous member's role or email.

use crate::suppleit::{
    api::ApiClient,
    context::AuthContext,
    errors::AuthError,
    navigation::Route,
    session::{scalar_to_string, Role, Session},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};

pub const MSG_MISSING_FIELDS: &str = "Please enter your email and password.";
pub const MSG_LOGIN_FAILED: &str = "An error occurred while signing in.";
pub const MSG_NO_TOKEN: &str = "Login failed: the response did not include a token.";
pub const MSG_PROFILE_FAILED: &str = "Could not fetch user info.";

pub struct CredentialLogin {
    api: ApiClient,
    context: AuthContext,
    loading: AtomicBool,
}

/// Holds the loading flag for the lifetime of one submission.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CredentialLogin {
    pub fn new(api: ApiClient, context: AuthContext) -> Self {
        Self {
            api,
            context,
            loading: AtomicBool::new(false),
        }
    }

    /// True while a submission is in flight; UIs disable the submit control on it.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Signs the member in and commits the session.
    ///
    /// # Errors
    /// Returns `AuthError::Validation` for empty fields (no request is sent),
    /// `AuthError::Busy` while another submission is in flight,
    /// `AuthError::Request`/`Protocol` when authentication fails and
    /// `AuthError::Profile` when the profile lookup fails. Nothing is stored on error.
    #[instrument(skip_all)]
    pub async fn submit(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::Validation(MSG_MISSING_FIELDS.to_string()));
        }

        let _loading = LoadingGuard::acquire(&self.loading).ok_or(AuthError::Busy)?;

        let tokens = self.api.login(email, password).await.map_err(|err| {
            warn!("login request failed: {err}");
            AuthError::from_request(&err, MSG_LOGIN_FAILED)
        })?;

        let Some(access_token) = tokens.access_token.filter(|token| !token.is_empty()) else {
            warn!("login response carried no access token");
            return Err(AuthError::Protocol(MSG_NO_TOKEN.to_string()));
        };
        let access_token = SecretString::from(access_token);

        let profile = self.api.member_info(&access_token).await.map_err(|err| {
            warn!("member info request failed: {err}");
            AuthError::Profile(MSG_PROFILE_FAILED.to_string())
        })?;

        let session = Session {
            access_token,
            refresh_token: SecretString::from(tokens.refresh_token.unwrap_or_default()),
            member_id: scalar_to_string(profile.member_id.as_ref()).unwrap_or_default(),
            email: profile
                .email
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| email.to_string()),
            role: Role::from_member_role(profile.member_role.as_ref()),
        };

        self.context.set_session(&session)?;
        info!(member_id = %session.member_id, "credential login succeeded");
        self.context.navigate(Route::Home);

        Ok(session)
    }
}
