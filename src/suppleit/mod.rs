//! Login flows and the session they bootstrap.
//!
//! Both flows converge on `AuthContext`: the session is stored as one batch,
//! then `SessionEvent::Changed` is broadcast, then the navigator is sent home.

pub mod api;
pub mod callback;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod listener;
pub mod login;
pub mod navigation;
pub mod providers;
pub mod session;

pub use self::api::ApiClient;
pub use self::callback::{CallbackOutcome, CallbackState, OAuthCallback};
pub use self::config::{AppConfig, ConfigOverrides};
pub use self::context::AuthContext;
pub use self::errors::{AppError, AuthError};
pub use self::events::{SessionEvent, SessionEvents};
pub use self::login::CredentialLogin;
pub use self::navigation::{Navigator, RecordingNavigator, RedirectTimer, Route};
pub use self::providers::{Provider, SocialLogin};
pub use self::session::{Role, Session, SessionStore};
