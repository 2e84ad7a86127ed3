use anyhow::Result;
use suppleit::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Login { .. } => actions::login::handle(action, &globals).await?,
        Action::Social { .. } => actions::social::handle(action, &globals).await?,
        Action::Session | Action::Logout => actions::session::handle(action, &globals)?,
    }

    Ok(())
}
