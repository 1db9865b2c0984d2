//! Shared helpers for the views.

pub mod auth;
