//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an action plus the runtime configuration the
//! action runs with.

use crate::cli::{
    actions::Action,
    commands::{self, auth},
    globals::GlobalArgs,
};
use crate::suppleit::{
    config::{AppConfig, ConfigOverrides},
    providers::Provider,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the subcommand is unknown or its arguments are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs::new(AppConfig::load(overrides(matches)));

    let action = match matches.subcommand() {
        Some((auth::CMD_LOGIN, sub)) => Action::Login {
            email: sub
                .get_one::<String>(auth::ARG_EMAIL)
                .cloned()
                .unwrap_or_default(),
            password: SecretString::from(
                sub.get_one::<String>(auth::ARG_PASSWORD)
                    .cloned()
                    .unwrap_or_default(),
            ),
        },
        Some((auth::CMD_SOCIAL, sub)) => {
            let provider = sub
                .get_one::<String>(auth::ARG_PROVIDER)
                .context("missing required argument: <provider>")?
                .parse::<Provider>()
                .map_err(|e| anyhow!(e))?;
            Action::Social {
                provider,
                paste: sub.get_flag(auth::ARG_PASTE),
            }
        }
        Some((auth::CMD_SESSION, _)) => Action::Session,
        Some((auth::CMD_LOGOUT, _)) => Action::Logout,
        Some((other, _)) => return Err(anyhow!("unknown command: {other}")),
        None => return Err(anyhow!("missing command")),
    };

    Ok((action, globals))
}

fn overrides(matches: &clap::ArgMatches) -> ConfigOverrides {
    let string = |id: &str| matches.get_one::<String>(id).cloned();
    ConfigOverrides {
        api_base_url: string(commands::ARG_API_URL),
        state_dir: string(commands::ARG_STATE_DIR),
        google_client_id: string(commands::ARG_GOOGLE_CLIENT_ID),
        google_redirect_uri: string(commands::ARG_GOOGLE_REDIRECT_URI),
        naver_client_id: string(commands::ARG_NAVER_CLIENT_ID),
        naver_redirect_uri: string(commands::ARG_NAVER_REDIRECT_URI),
        redirect_delay_ms: matches
            .get_one::<u64>(commands::ARG_REDIRECT_DELAY_MS)
            .copied(),
        request_timeout_ms: matches.get_one::<u64>(commands::ARG_TIMEOUT_MS).copied(),
    }
}
