use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;

/// Parses the command line, sets up logging and returns the action to run.
///
/// # Errors
///
/// Returns an error if the subscriber cannot be installed or the arguments
/// do not resolve to an action.
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    let count = matches
        .get_one::<u8>(logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or_default();
    telemetry::init(logging::level_for_count(count))?;

    dispatch::handler(&matches)
}
