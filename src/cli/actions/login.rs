use crate::cli::{
    actions::{describe, Action, TerminalNavigator},
    globals::GlobalArgs,
};
use crate::suppleit::{api::ApiClient, login::CredentialLogin};
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Handle the login action
///
/// # Errors
/// Returns an error if the credentials are rejected or the session cannot be stored.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Login { email, password } = action else {
        return Err(anyhow!("unexpected action for login"));
    };

    let context = globals.context(Arc::new(TerminalNavigator));
    let login = CredentialLogin::new(ApiClient::new(&globals.config)?, context);

    let session = login.submit(&email, &password).await?;
    println!("{}", describe(&session));

    Ok(())
}
