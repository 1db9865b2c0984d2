//! Views rendered to the terminal.
//!
//! Every view is a plain value computed from state and rendered through
//! `Display`, so gating decisions are testable without a terminal.

pub mod dashboard;
pub mod home;
pub mod login;


use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Dashboard,
    Login,
}

impl Route {
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        match path.trim().trim_end_matches('/') {
            "" => Some(Self::Home),
            "/dashboard" => Some(Self::Dashboard),
            "/login" => Some(Self::Login),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Dashboard => "/dashboard",
            Self::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

const LOADING_TEXT: &str = "Loading...";
