use clap::{builder::ValueParser, Arg, ArgAction, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Names accepted by `SUPPLEIT_LOG_LEVEL`; the position is the verbosity count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Levels enabled by one or more `-v`. Zero keeps the telemetry default.
const LEVELS_BY_COUNT: [Level; 4] = [Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE];

/// Highest numeric value `SUPPLEIT_LOG_LEVEL` accepts.
const MAX_NUMERIC_LEVEL: u8 = 5;

fn parse_level(value: &str) -> Result<u8, String> {
    let value = value.trim();
    if let Ok(count) = value.parse::<u8>() {
        return if count <= MAX_NUMERIC_LEVEL {
            Ok(count)
        } else {
            Err(format!("log level must be 0..={MAX_NUMERIC_LEVEL}"))
        };
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("unknown log level {value:?}, expected one of {LEVEL_NAMES:?}"))
}

#[must_use]
pub fn level_parser() -> ValueParser {
    ValueParser::from(parse_level)
}

/// Tracing level for a verbosity count; counts past the table stay at `TRACE`.
#[must_use]
pub fn level_for_count(count: u8) -> Option<Level> {
    let index = usize::from(count.checked_sub(1)?);
    Some(LEVELS_BY_COUNT[index.min(LEVELS_BY_COUNT.len() - 1)])
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (errors are always shown)")
            .env("SUPPLEIT_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(level_parser()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_their_position() {
        assert_eq!(parse_level("error"), Ok(0));
        assert_eq!(parse_level("WARN"), Ok(1));
        assert_eq!(parse_level(" Debug "), Ok(3));
        assert_eq!(parse_level("trace"), Ok(4));
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn numbers_are_bounded() {
        assert_eq!(parse_level("5"), Ok(5));
        assert!(parse_level("6").is_err());
    }

    #[test]
    fn counts_select_levels() {
        assert_eq!(level_for_count(0), None);
        assert_eq!(level_for_count(1), Some(Level::WARN));
        assert_eq!(level_for_count(2), Some(Level::INFO));
        assert_eq!(level_for_count(3), Some(Level::DEBUG));
        assert_eq!(level_for_count(4), Some(Level::TRACE));
        assert_eq!(level_for_count(u8::MAX), Some(Level::TRACE));
    }
}
