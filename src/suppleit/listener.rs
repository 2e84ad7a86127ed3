//! Localhost receiver for provider redirects. The redirect URI registered with
//! the provider points here; the first request carrying the callback query
//! drives `OAuthCallback::handle` and ends the listener.

use crate::suppleit::{
    callback::{CallbackOutcome, OAuthCallback},
    errors::AppError,
};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use url::Url;

#[derive(Clone)]
struct ListenerState {
    callback: Arc<OAuthCallback>,
    outcomes: mpsc::Sender<CallbackOutcome>,
}

/// Router serving `GET <path>` for the callback; every first-time outcome is sent on `outcomes`.
pub fn callback_router(
    callback: Arc<OAuthCallback>,
    path: &str,
    outcomes: mpsc::Sender<CallbackOutcome>,
) -> Router {
    let path = if path.is_empty() { "/" } else { path };
    Router::new()
        .route(path, get(receive))
        .layer(TraceLayer::new_for_http())
        .with_state(ListenerState { callback, outcomes })
}

async fn receive(
    State(state): State<ListenerState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    let ListenerState { callback, outcomes } = state;

    // Detached from the request so a client disconnect cannot cancel the exchange.
    let exchange = tokio::spawn(async move {
        let outcome = callback
            .handle(query.as_deref().unwrap_or_default())
            .await;
        let response = respond(&callback, &outcome);

        if !matches!(outcome, CallbackOutcome::Duplicate)
            && outcomes.try_send(outcome).is_err()
        {
            debug!("callback outcome receiver is gone");
        }

        response
    });

    exchange.await.unwrap_or_else(|err| {
        error!("callback task failed: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "The login callback failed.".to_string(),
        )
    })
}

fn respond(callback: &OAuthCallback, outcome: &CallbackOutcome) -> (StatusCode, String) {
    match outcome {
        CallbackOutcome::SignedIn(session) => (
            StatusCode::OK,
            format!(
                "Signed in as {}. You can close this window.",
                session.email
            ),
        ),
        CallbackOutcome::Failed(_) => (
            StatusCode::BAD_REQUEST,
            format!(
                "{}\nReturning to the login page shortly...",
                callback.error_message().unwrap_or_default()
            ),
        ),
        CallbackOutcome::Duplicate => (
            StatusCode::CONFLICT,
            "This login callback was already handled.".to_string(),
        ),
    }
}

/// Binds the redirect URI's host and port, serves the callback route until
/// the first outcome arrives, then shuts the listener down.
///
/// # Errors
/// Returns `AppError::Config` for a redirect URI without host or port and
/// `AppError::Network` when the address cannot be bound or the server fails.
pub async fn serve_callback(
    callback: Arc<OAuthCallback>,
    redirect_uri: &Url,
) -> Result<CallbackOutcome, AppError> {
    let host = redirect_uri
        .host_str()
        .ok_or_else(|| AppError::Config(format!("redirect URI has no host: {redirect_uri}")))?
        .to_string();
    let port = redirect_uri
        .port_or_known_default()
        .ok_or_else(|| AppError::Config(format!("redirect URI has no port: {redirect_uri}")))?;

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|err| AppError::Network(format!("Failed to bind {host}:{port}: {err}")))?;
    info!(
        "waiting for {} callback on {redirect_uri}",
        callback.provider().display_name()
    );

    let (outcome_tx, mut outcome_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let router = callback_router(callback, redirect_uri.path(), outcome_tx);

    let server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let outcome = outcome_rx.recv().await;
    let _ = shutdown_tx.send(());

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(AppError::Network(format!("Callback listener failed: {err}"))),
        Err(err) => return Err(AppError::Network(format!("Callback listener stopped: {err}"))),
    }

    outcome.ok_or_else(|| AppError::Network("Callback listener closed without a result".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suppleit::{
        api::ApiClient,
        config::AppConfig,
        context::AuthContext,
        errors::AuthError,
        events::SessionEvents,
        navigation::RecordingNavigator,
        providers::Provider,
        session::{MemoryStorage, StorageSessionStore},
    };
    use anyhow::Result;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    fn callback() -> Result<Arc<OAuthCallback>> {
        let config = AppConfig::default();
        let context = AuthContext::new(
            Arc::new(StorageSessionStore::new(MemoryStorage::new())),
            SessionEvents::new(),
            Arc::new(RecordingNavigator::new()),
        );
        Ok(Arc::new(OAuthCallback::new(
            Provider::Google,
            ApiClient::new(&config)?,
            context,
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(3),
        )))
    }

    #[tokio::test]
    async fn provider_error_is_reported_and_forwarded() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(1);
        let app = callback_router(callback()?, "/callback/google", tx);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/callback/google?error=access_denied")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.contains("An error occurred while processing Google login"));
        assert!(text.contains("access_denied"));

        assert!(matches!(
            rx.try_recv(),
            Ok(CallbackOutcome::Failed(AuthError::Provider(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn second_hit_is_rejected_without_forwarding() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(1);
        let app = callback_router(callback()?, "/callback/google", tx);

        let first = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/callback/google")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);

        let second = app
            .oneshot(
                Request::builder()
                    .uri("/callback/google?code=abc")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        assert!(matches!(
            rx.try_recv(),
            Ok(CallbackOutcome::Failed(AuthError::Validation(_)))
        ));
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() -> Result<()> {
        let (tx, _rx) = mpsc::channel(1);
        let app = callback_router(callback()?, "/callback/google", tx);

        let response = app
            .oneshot(Request::builder().uri("/favicon.ico").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
