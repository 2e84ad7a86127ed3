use crate::cli::{
    actions::{describe, Action, TerminalNavigator},
    globals::GlobalArgs,
};
use crate::suppleit::{
    api::ApiClient,
    callback::{CallbackOutcome, OAuthCallback},
    listener::serve_callback,
    navigation::Navigator,
    providers::SocialLogin,
    session::{MemoryStorage, Storage},
};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

/// Handle the social login action
///
/// The pending CSRF state lives in process memory, so the redirect must come
/// back to this same process: either through the local listener on the
/// redirect URI or pasted on stdin.
///
/// # Errors
/// Returns an error if the provider redirect cannot be started, the callback
/// cannot be received, or the code exchange fails.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Social { provider, paste } = action else {
        return Err(anyhow!("unexpected action for social login"));
    };

    let navigator: Arc<dyn Navigator> = Arc::new(TerminalNavigator);
    let session_storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    SocialLogin::new(
        globals.config.clone(),
        Arc::clone(&session_storage),
        Arc::clone(&navigator),
    )
    .start(provider)?;

    let callback = Arc::new(OAuthCallback::new(
        provider,
        ApiClient::new(&globals.config)?,
        globals.context(navigator),
        session_storage,
        globals.config.redirect_delay,
    ));

    let outcome = if paste {
        let url = read_redirect_url().await?;
        callback.handle_url(&url).await
    } else {
        let redirect_uri = Url::parse(&provider.config(&globals.config).redirect_uri)
            .context("invalid redirect URI")?;
        serve_callback(Arc::clone(&callback), &redirect_uri).await?
    };

    match outcome {
        CallbackOutcome::SignedIn(session) => {
            println!("{}", describe(&session));
            Ok(())
        }
        CallbackOutcome::Failed(err) => {
            if let Some(message) = callback.error_message() {
                eprintln!("{message}");
            }
            callback.wait_for_redirect().await;
            Err(err.into())
        }
        CallbackOutcome::Duplicate => Err(anyhow!("the login callback was already handled")),
    }
}

async fn read_redirect_url() -> Result<Url> {
    println!("Paste the URL the provider redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read the redirect URL")?;

    Url::parse(line.trim()).context("invalid redirect URL")
}
