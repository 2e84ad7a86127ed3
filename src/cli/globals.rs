use crate::suppleit::{
    config::AppConfig,
    context::AuthContext,
    events::SessionEvents,
    navigation::Navigator,
    session::{FileStorage, StorageSessionStore},
};
use std::{path::PathBuf, sync::Arc};

/// File under the state directory holding the persistent session keys.
pub const SESSION_FILE: &str = "storage.json";

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.config.state_dir.join(SESSION_FILE)
    }

    /// Session context backed by the persistent storage file.
    #[must_use]
    pub fn context(&self, navigator: Arc<dyn Navigator>) -> AuthContext {
        AuthContext::new(
            Arc::new(StorageSessionStore::new(FileStorage::new(
                self.session_file(),
            ))),
            SessionEvents::new(),
            navigator,
        )
    }
}
