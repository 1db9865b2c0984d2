//! Home page: greets the user or points at the login form.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use std::fmt;

use super::{LOADING_TEXT, Route};
use crate::net::types::User;
use crate::state::auth::SessionState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HomeView {
    Loading,
    Welcome(User),
    Anonymous { error: Option<String> },
}

impl HomeView {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        if state.is_loading {
            return Self::Loading;
        }
        match &state.user {
            Some(user) => Self::Welcome(user.clone()),
            None => Self::Anonymous { error: state.error.clone() },
        }
    }
}

impl fmt::Display for HomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str(LOADING_TEXT),
            Self::Welcome(user) => {
                writeln!(f, "Welcome, {}!", user.username)?;
                if !user.roles.is_empty() {
                    writeln!(f, "Roles: {}", user.roles_label())?;
                }
                write!(f, "Open {} to see your items, or `logout` to sign out.", Route::Dashboard)
            }
            Self::Anonymous { error } => {
                writeln!(f, "Welcome to the BFF demo.")?;
                if let Some(error) = error {
                    writeln!(f, "Error: {error}")?;
                }
                write!(f, "You are not logged in. Go to {} to sign in.", Route::Login)
            }
        }
    }
}
