//! Login form. Stays open on failure so the user can retry.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::fmt;

use super::Route;
use crate::state::auth::{SessionState, SessionStore};

pub const MSG_MISSING_CREDENTIALS: &str = "Username and password are required.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginView {
    Form(LoginForm),
    Redirect(Route),
}

impl LoginView {
    /// Already-authenticated users skip the form.
    #[must_use]
    pub fn open(state: &SessionState) -> Self {
        if state.is_authenticated() {
            return Self::Redirect(Route::Dashboard);
        }
        Self::Form(LoginForm::default())
    }

    /// Submit credentials through the store.
    pub async fn submit(store: &SessionStore, username: &str, password: &str) -> Self {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Self::Form(LoginForm { username: username.to_owned(), error: Some(MSG_MISSING_CREDENTIALS.to_owned()) });
        }

        match store.login(username, password).await {
            Ok(_) => Self::Redirect(Route::Dashboard),
            Err(_) => Self::Form(LoginForm { username: username.to_owned(), error: store.state().error }),
        }
    }
}

impl fmt::Display for LoginView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirect(route) => write!(f, "Redirecting to {route}"),
            Self::Form(form) => {
                writeln!(f, "Login")?;
                if let Some(error) = &form.error {
                    writeln!(f, "Error: {error}")?;
                }
                if form.username.is_empty() {
                    write!(f, "Usage: login <username> <password>")
                } else {
                    write!(f, "Usage: login {} <password>", form.username)
                }
            }
        }
    }
}
