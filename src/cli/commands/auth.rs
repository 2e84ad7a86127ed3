use clap::{Arg, ArgAction, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_SOCIAL: &str = "social";
pub const CMD_SESSION: &str = "session";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_PROVIDER: &str = "provider";
pub const ARG_PASTE: &str = "paste";

pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(login())
        .subcommand(social())
        .subcommand(Command::new(CMD_SESSION).about("Show the stored session"))
        .subcommand(Command::new(CMD_LOGOUT).about("Remove the stored session"))
}

fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in with email and password")
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Member email")
                .env("SUPPLEIT_EMAIL"),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long("password")
                .help("Member password")
                .env("SUPPLEIT_PASSWORD")
                .hide_env_values(true),
        )
}

fn social() -> Command {
    Command::new(CMD_SOCIAL)
        .about("Sign in through an OAuth provider")
        .arg(
            Arg::new(ARG_PROVIDER)
                .help("OAuth provider")
                .required(true)
                .value_parser(["google", "naver"]),
        )
        .arg(
            Arg::new(ARG_PASTE)
                .long("paste")
                .help("Read the redirect URL from stdin instead of listening on the redirect URI")
                .action(ArgAction::SetTrue),
        )
}
