//! Dashboard page listing the user's items.
//! Redirects to `/login` if the user is not authenticated.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::fmt;

use super::LOADING_TEXT;
use crate::net::api::ItemsApi;
use crate::net::types::User;
use crate::notify::Notifier;
use crate::state::auth::SessionState;
use crate::state::items::ItemsState;
use crate::util::auth::{LOGIN_ROUTE, should_redirect_unauth};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardView {
    Loading,
    Redirect(&'static str),
    Ready { user: User, items: ItemsState },
}

impl DashboardView {
    /// Gate on the session, then fetch items. The fetch only happens once
    /// a user is confirmed.
    pub async fn open(session: &SessionState, api: &dyn ItemsApi, notifier: &dyn Notifier) -> Self {
        if session.is_loading {
            return Self::Loading;
        }
        if should_redirect_unauth(session) {
            return Self::Redirect(LOGIN_ROUTE);
        }
        let Some(user) = session.user.clone() else {
            return Self::Redirect(LOGIN_ROUTE);
        };

        let mut items = ItemsState::default();
        items.load(api, notifier).await;
        Self::Ready { user, items }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str(LOADING_TEXT),
            Self::Redirect(to) => write!(f, "Redirecting to {to}"),
            Self::Ready { user, items } => {
                writeln!(f, "Dashboard")?;
                write!(f, "Logged in as {} ({})", user.username, user.user_id)?;
                if let Some(error) = &items.error {
                    return write!(f, "\nError: {error}");
                }
                if items.items.is_empty() {
                    return write!(f, "\nNo items.");
                }
                for item in &items.items {
                    write!(f, "\n  #{} {}", item.id, item.name)?;
                    if let Some(description) = &item.description {
                        write!(f, " - {description}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
