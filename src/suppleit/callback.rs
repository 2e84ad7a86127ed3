//! OAuth redirect callback. Reads the authorization code from the redirect
//! query, exchanges it exactly once through the backend and commits the
//! resulting session. The backend answers in one of two shapes: the payload
//! nested under `data`, or flat at the top level. Nested wins when both carry
//! a token.
//!
//! On failure the error text is kept for display and a redirect to the login
//! route is scheduled after a fixed delay. The handler owns that timer; when
//! the handler is dropped the pending redirect is dropped with it.

use crate::suppleit::{
    api::{ApiClient, SocialLoginRequest},
    context::AuthContext,
    errors::AuthError,
    navigation::{RedirectTimer, Route},
    providers::{Provider, NAVER_STATE_KEY},
    session::{scalar_to_string, Role, Session, Storage},
};
use serde_json::Value;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub const MSG_CODE_MISSING: &str = "Authorization code not found.";
pub const MSG_NO_TOKEN: &str = "The server did not return a token.";
pub const MSG_STATE_MISMATCH: &str = "Login state did not match. Please try again.";
pub const MSG_INTERRUPTED: &str = "The login was interrupted before it finished.";

const NOT_STARTED: u8 = 0;
const IN_PROGRESS: u8 = 1;
const DONE: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackState {
    NotStarted,
    InProgress,
    Done,
}

#[derive(Debug)]
pub enum CallbackOutcome {
    SignedIn(Session),
    Failed(AuthError),
    /// The exchange already ran (or is running) for this callback.
    Duplicate,
}

/// Query parameters a provider appends to the redirect URI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string; a leading `?` is accepted and empty values count as absent.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.to_string());
        }
        params
    }
}

pub struct OAuthCallback {
    provider: Provider,
    api: ApiClient,
    context: AuthContext,
    session_storage: Arc<dyn Storage>,
    redirect_delay: Duration,
    state: AtomicU8,
    error_message: Mutex<Option<String>>,
    redirect: Mutex<Option<RedirectTimer>>,
}

impl OAuthCallback {
    pub fn new(
        provider: Provider,
        api: ApiClient,
        context: AuthContext,
        session_storage: Arc<dyn Storage>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            provider,
            api,
            context,
            session_storage,
            redirect_delay,
            state: AtomicU8::new(NOT_STARTED),
            error_message: Mutex::new(None),
            redirect: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    #[must_use]
    pub fn state(&self) -> CallbackState {
        match self.state.load(Ordering::Acquire) {
            NOT_STARTED => CallbackState::NotStarted,
            IN_PROGRESS => CallbackState::InProgress,
            _ => CallbackState::Done,
        }
    }

    /// Text of the error panel after a failed exchange.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error_message
            .lock()
            .ok()
            .and_then(|message| message.clone())
    }

    /// Whether a redirect to the login route is still pending.
    #[must_use]
    pub fn redirect_pending(&self) -> bool {
        self.redirect
            .lock()
            .is_ok_and(|slot| matches!(&*slot, Some(timer) if !timer.is_finished()))
    }

    /// Waits for the scheduled redirect to the login route, if there is one.
    pub async fn wait_for_redirect(&self) {
        let timer = self.redirect.lock().ok().and_then(|mut timer| timer.take());
        if let Some(timer) = timer {
            timer.wait().await;
        }
    }

    /// Handles the redirect described by `url`.
    pub async fn handle_url(&self, url: &Url) -> CallbackOutcome {
        self.handle(url.query().unwrap_or_default()).await
    }

    /// Runs the exchange for the redirect `query`. Only the first call does any
    /// work; later calls return `CallbackOutcome::Duplicate` immediately.
    ///
    /// If the returned future is dropped before the exchange completes, the
    /// callback still ends `Done` and takes the failure path.
    #[instrument(skip_all, fields(provider = %self.provider))]
    pub async fn handle(&self, query: &str) -> CallbackOutcome {
        if self
            .state
            .compare_exchange(NOT_STARTED, IN_PROGRESS, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("callback already handled, ignoring");
            return CallbackOutcome::Duplicate;
        }

        let mut pending = PendingExchange {
            callback: self,
            armed: true,
        };
        let result = self.exchange(query).await;
        pending.armed = false;
        self.state.store(DONE, Ordering::Release);

        match result {
            Ok(session) => {
                info!(member_id = %session.member_id, "social login succeeded");
                self.context.navigate(Route::Home);
                CallbackOutcome::SignedIn(session)
            }
            Err(err) => {
                self.fail(&err);
                CallbackOutcome::Failed(err)
            }
        }
    }

    async fn exchange(&self, query: &str) -> Result<Session, AuthError> {
        let params = CallbackParams::parse(query);

        // The pending state is single-use, whatever the redirect carries.
        let expected_state = if self.provider.uses_state() {
            self.take_pending_state()?
        } else {
            None
        };

        if let Some(provider_error) = params.error {
            let detail = params.error_description.unwrap_or(provider_error);
            return Err(AuthError::Provider(format!(
                "{} returned an error: {detail}",
                self.provider.display_name()
            )));
        }

        let Some(code) = params.code else {
            return Err(AuthError::Validation(MSG_CODE_MISSING.to_string()));
        };

        let state = if self.provider.uses_state() {
            Some(verify_state(expected_state, params.state)?)
        } else {
            None
        };

        let request = SocialLoginRequest { code, state };
        let body = self
            .api
            .social_login(self.provider, &request)
            .await
            .map_err(|err| AuthError::from_request(&err, &err.to_string()))?;

        let session = normalize_login_response(&body)?;
        self.context.set_session(&session)?;

        Ok(session)
    }

    fn take_pending_state(&self) -> Result<Option<String>, AuthError> {
        let expected = self.session_storage.get_item(NAVER_STATE_KEY)?;
        self.session_storage.remove_item(NAVER_STATE_KEY)?;
        Ok(expected)
    }

    fn fail(&self, err: &AuthError) {
        let message = format!(
            "An error occurred while processing {} login: {err}",
            self.provider.display_name()
        );
        error!("{message}");

        if let Ok(mut slot) = self.error_message.lock() {
            *slot = Some(message);
        }

        if tokio::runtime::Handle::try_current().is_err() {
            warn!("no runtime to schedule the login redirect on");
            return;
        }
        let timer = RedirectTimer::schedule(
            self.redirect_delay,
            self.context.navigator(),
            Route::Login,
        );
        if let Ok(mut slot) = self.redirect.lock() {
            *slot = Some(timer);
        }
    }
}

/// Completes the gate when `handle` is dropped mid-exchange.
struct PendingExchange<'a> {
    callback: &'a OAuthCallback,
    armed: bool,
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(provider = %self.callback.provider, "callback exchange was interrupted");
        self.callback.state.store(DONE, Ordering::Release);
        self.callback
            .fail(&AuthError::Request(MSG_INTERRUPTED.to_string()));
    }
}

fn verify_state(expected: Option<String>, returned: Option<String>) -> Result<String, AuthError> {
    match (expected, returned) {
        (Some(expected), Some(returned)) if expected == returned => Ok(returned),
        (None, _) => {
            warn!("no pending login state found");
            Err(AuthError::State(MSG_STATE_MISMATCH.to_string()))
        }
        _ => {
            warn!("returned login state does not match");
            Err(AuthError::State(MSG_STATE_MISMATCH.to_string()))
        }
    }
}

fn access_token(payload: &Value) -> Option<&str> {
    payload
        .get("accessToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

/// Builds a session from a social login reply, accepting the nested
/// (`{data: {...}}`) shape before the flat one. Missing member identity fields
/// become empty strings so no value from an earlier session survives.
///
/// # Errors
/// Returns `AuthError::Protocol` when neither shape carries an access token.
pub fn normalize_login_response(body: &Value) -> Result<Session, AuthError> {
    let payload = match body.get("data").filter(|data| access_token(data).is_some()) {
        Some(nested) => {
            debug!("token found in nested response data");
            nested
        }
        None if access_token(body).is_some() => {
            debug!("token found at the response top level");
            body
        }
        None => {
            warn!("social login response carried no access token");
            return Err(AuthError::Protocol(MSG_NO_TOKEN.to_string()));
        }
    };

    let member = payload.get("member");
    let field = |name: &str| scalar_to_string(member.and_then(|member| member.get(name)));

    let member_id = field("memberId").unwrap_or_default();
    let email = field("email").unwrap_or_default();
    if member_id.is_empty() || email.is_empty() {
        warn!("social login response carried no member identity");
    }

    Ok(Session::new(
        access_token(payload).unwrap_or_default(),
        payload
            .get("refreshToken")
            .and_then(Value::as_str)
            .unwrap_or_default(),
        member_id,
        email,
        Role::from_member_role(member.and_then(|member| member.get("memberRole"))),
    ))
}
