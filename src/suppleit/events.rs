//! Session change notifications. Flows publish after every commit; interested
//! consumers subscribe and refresh whatever they render from the session.

use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new session was committed.
    Changed,
    /// The session was removed.
    Cleared,
}

#[derive(Clone, Debug)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publishes `event`; having no subscribers is not an error.
    pub fn notify(&self, event: SessionEvent) {
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(?event, receivers, "session event published");
    }
}
