//! # portal
//!
//! Terminal front end for a Backend-For-Frontend deployment. Tracks the
//! authenticated session behind the BFF's cookie, classifies API failures
//! into user-facing notifications, and renders gated home, dashboard, and
//! login views.

pub mod app;
pub mod config;
pub mod net;
pub mod notify;
pub mod pages;
pub mod state;
pub mod util;
