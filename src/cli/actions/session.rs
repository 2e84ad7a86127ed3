use crate::cli::{
    actions::{describe, Action, TerminalNavigator},
    globals::GlobalArgs,
};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::debug;

/// Handle the session and logout actions
///
/// # Errors
/// Returns an error if the session file cannot be read or written.
pub fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let context = globals.context(Arc::new(TerminalNavigator));
    debug!(path = %globals.session_file().display(), "using session file");

    match action {
        Action::Session => match context.session()? {
            Some(session) => println!("{}", describe(&session)),
            None => println!("Not signed in."),
        },
        Action::Logout => {
            context.clear_session()?;
            println!("Signed out.");
        }
        other => return Err(anyhow!("unexpected action for session: {other:?}")),
    }

    Ok(())
}
