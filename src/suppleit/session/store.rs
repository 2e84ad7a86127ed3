use super::{
    Role, Session, SessionStore, Storage, KEY_ACCESS_TOKEN, KEY_EMAIL, KEY_MEMBER_ID,
    KEY_REFRESH_TOKEN, KEY_ROLE, SESSION_KEYS,
};
use crate::suppleit::errors::AppError;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

/// `SessionStore` over any key/value `Storage`, one key per session field.
#[derive(Debug)]
pub struct StorageSessionStore<S> {
    storage: S,
}

impl<S: Storage> StorageSessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> SessionStore for StorageSessionStore<S> {
    fn get(&self) -> Result<Option<Session>, AppError> {
        let mut values = Vec::with_capacity(SESSION_KEYS.len());
        for key in SESSION_KEYS {
            match self.storage.get_item(key)? {
                Some(value) => values.push(value),
                None => {
                    if !values.is_empty() {
                        warn!(missing = key, "incomplete session in storage, ignoring it");
                    }
                    return Ok(None);
                }
            }
        }

        let [access_token, refresh_token, member_id, email, role]: [String; 5] = values
            .try_into()
            .map_err(|_| AppError::Storage("unexpected session layout".to_string()))?;

        Ok(Some(Session::new(
            access_token,
            refresh_token,
            member_id,
            email,
            role.parse().unwrap_or(Role::User),
        )))
    }

    fn set(&self, session: &Session) -> Result<(), AppError> {
        self.storage.set_items(&[
            (KEY_ACCESS_TOKEN, session.access_token.expose_secret()),
            (KEY_REFRESH_TOKEN, session.refresh_token.expose_secret()),
            (KEY_MEMBER_ID, session.member_id.as_str()),
            (KEY_EMAIL, session.email.as_str()),
            (KEY_ROLE, session.role.as_str()),
        ])?;
        debug!(member_id = %session.member_id, role = %session.role, "session stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.storage.remove_items(&SESSION_KEYS)?;
        debug!("session cleared");
        Ok(())
    }
}
