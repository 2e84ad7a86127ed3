pub mod login;
pub mod session;
pub mod social;

use crate::suppleit::{
    navigation::{Navigator, Route},
    providers::Provider,
    session::Session,
};
use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: SecretString,
    },
    Social {
        provider: Provider,
        paste: bool,
    },
    Session,
    Logout,
}

/// Navigator for a terminal: routes become instructions for the member.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::External(url) => {
                println!("Open the following URL in your browser to continue:\n\n  {url}\n");
            }
            Route::Home => println!("Signed in."),
            Route::Login => {
                println!("Back to login. Run `suppleit login` or `suppleit social <provider>` to retry.");
            }
        }
    }
}

fn describe(session: &Session) -> String {
    format!(
        "email:     {}\nmember id: {}\nrole:      {}",
        session.email, session.member_id, session.role
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suppleit::session::Role;

    #[test]
    fn describe_omits_tokens() {
        let text = describe(&Session::new(
            "access-secret",
            "refresh-secret",
            "u1",
            "a@b.com",
            Role::Admin,
        ));

        assert!(text.contains("a@b.com"));
        assert!(text.contains("u1"));
        assert!(text.contains("ADMIN"));
        assert!(!text.contains("secret"));
    }
}
