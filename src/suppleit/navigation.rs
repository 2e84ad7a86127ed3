//! Where the flows send the member next. Navigation is a seam: the CLI prints
//! and opens routes, tests record them.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Application root, reached after a successful login.
    Home,
    Login,
    /// Full-page redirect away from the application, e.g. to a provider.
    External(Url),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::External(url) => url.as_str(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Keeps every route it was asked to visit, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

/// A navigation that fires once after a fixed delay.
///
/// The deadline is fixed when the timer is scheduled. Dropping the timer
/// aborts the pending navigation so nothing fires after its owner is gone.
#[derive(Debug)]
pub struct RedirectTimer {
    route: Route,
    handle: Option<JoinHandle<()>>,
}

impl RedirectTimer {
    /// Must be called from within a tokio runtime.
    pub fn schedule(delay: Duration, navigator: Arc<dyn Navigator>, route: Route) -> Self {
        let deadline = Instant::now() + delay;
        let target = route.clone();
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            debug!(route = %target, "redirect timer fired");
            navigator.navigate(target);
        });

        Self {
            route,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits until the navigation has fired.
    pub async fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            // A cancelled or panicked task has nothing left to navigate.
            let _ = handle.await;
        }
    }

    /// Drops the pending navigation without firing it.
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!(route = %self.route, "redirect timer cancelled");
            }
            handle.abort();
        }
    }
}

impl Drop for RedirectTimer {
    fn drop(&mut self) {
        self.abort();
    }
}
