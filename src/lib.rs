//! # Suppleit (login client and session bootstrap)
//!
//! `suppleit` signs a member in against the Suppleit API and keeps the
//! resulting session in local storage so other tools can reuse it.
//!
//! ## Credential Login
//!
//! 1. **Authenticate:** POST `{email, password}` to `/api/auth/login` and read
//!    `accessToken` / `refreshToken` from the response.
//! 2. **Enrich:** GET `/api/member/info` with the new bearer token to learn the
//!    member id, email and role.
//! 3. **Commit:** only after both calls succeed, the five session keys are
//!    written in one batch and a `SessionEvent::Changed` is broadcast.
//!
//! ## Social Login (Google / Naver)
//!
//! The client builds the provider authorization URL, hands it to the
//! navigator and waits on the redirect URI for the authorization `code`. The
//! code is exchanged exactly once through `/api/social/login/{provider}`; the
//! backend may answer with the payload nested under `data` or flat at the top
//! level, and both shapes are accepted (nested first).
//!
//! On failure the callback keeps the error text and schedules a redirect to
//! the login route after a fixed delay.
//!
//! Tokens are carried as `SecretString` and must never be logged.

pub mod cli;
pub mod suppleit;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
