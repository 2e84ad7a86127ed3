pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_DIR: &str = "state-dir";
pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_REDIRECT_URI: &str = "google-redirect-uri";
pub const ARG_NAVER_CLIENT_ID: &str = "naver-client-id";
pub const ARG_NAVER_REDIRECT_URI: &str = "naver-redirect-uri";
pub const ARG_REDIRECT_DELAY_MS: &str = "redirect-delay-ms";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("suppleit")
        .about("Suppleit login client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Suppleit API base URL")
                .env("SUPPLEIT_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long("state-dir")
                .help("Directory holding the persistent session")
                .env("SUPPLEIT_STATE_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long("google-client-id")
                .help("Google OAuth client id")
                .env("SUPPLEIT_GOOGLE_CLIENT_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_GOOGLE_REDIRECT_URI)
                .long("google-redirect-uri")
                .help("Redirect URI registered for the Google client")
                .env("SUPPLEIT_GOOGLE_REDIRECT_URI")
                .global(true),
        )
        .arg(
            Arg::new(ARG_NAVER_CLIENT_ID)
                .long("naver-client-id")
                .help("Naver OAuth client id")
                .env("SUPPLEIT_NAVER_CLIENT_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_NAVER_REDIRECT_URI)
                .long("naver-redirect-uri")
                .help("Redirect URI registered for the Naver client")
                .env("SUPPLEIT_NAVER_REDIRECT_URI")
                .global(true),
        )
        .arg(
            Arg::new(ARG_REDIRECT_DELAY_MS)
                .long("redirect-delay-ms")
                .help("Delay before a failed social login returns to the login page")
                .env("SUPPLEIT_REDIRECT_DELAY_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long("timeout-ms")
                .help("API request timeout in milliseconds")
                .env("SUPPLEIT_TIMEOUT_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        );

    let command = auth::with_subcommands(command);
    logging::with_args(command)
}
