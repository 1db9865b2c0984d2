//! Client-side state.
//!
//! DESIGN
//! ======
//! `auth` holds the process-wide session; `items` is view-local state owned
//! by the dashboard and never touches the session.

pub mod auth;
pub mod items;

// =============================================================================
// TEST HELPERS
// =============================================================================
