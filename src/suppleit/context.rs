//! Shared sink of both login flows: the session store, the change
//! notifications and the navigator. Committing through here keeps the
//! store-then-notify order identical for every flow.

use crate::suppleit::{
    errors::AppError,
    events::{SessionEvent, SessionEvents},
    navigation::{Navigator, Route},
    session::{Session, SessionStore},
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AuthContext {
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
    navigator: Arc<dyn Navigator>,
}

impl AuthContext {
    pub fn new(
        store: Arc<dyn SessionStore>,
        events: SessionEvents,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            events,
            navigator,
        }
    }

    /// # Errors
    /// Returns `AppError::Storage` when the store cannot be read.
    pub fn session(&self) -> Result<Option<Session>, AppError> {
        self.store.get()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.store.get(), Ok(Some(_)))
    }

    /// Replaces the stored session and notifies subscribers.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the store rejects the write; no event is sent then.
    pub fn set_session(&self, session: &Session) -> Result<(), AppError> {
        self.store.set(session)?;
        info!(member_id = %session.member_id, role = %session.role, "session committed");
        self.events.notify(SessionEvent::Changed);
        Ok(())
    }

    /// Removes the stored session and notifies subscribers.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the store cannot be written.
    pub fn clear_session(&self) -> Result<(), AppError> {
        self.store.clear()?;
        info!("session cleared");
        self.events.notify(SessionEvent::Cleared);
        Ok(())
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }

    #[must_use]
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::clone(&self.navigator)
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }
}
