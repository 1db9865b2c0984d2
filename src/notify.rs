//! User-facing notifications ("toasts") for classified API failures.
//!
//! DESIGN
//! ======
//! The HTTP client only classifies. Whoever decides a failure is worth
//! showing calls [`report`] once, which maps the error to a localized toast
//! and hands it to the installed [`Notifier`]. The terminal front end prints
//! toasts to stderr; tests record them.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::{Mutex, PoisonError};

use crate::net::error::{ApiError, ErrorCode, ErrorKind};

pub const MSG_TRANSPORT: &str = "Unable to reach the server. Check your connection and try again.";
pub const MSG_BACKEND_CONNECTION: &str = "The backend service is unreachable right now. Please try again shortly.";
pub const MSG_BACKEND_TIMEOUT: &str = "The backend service took too long to respond. Please try again.";
pub const MSG_CIRCUIT_OPEN: &str = "The service is temporarily unavailable. Please try again later.";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Presentation-side sink for toasts.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Map a classified failure to the text the user sees.
#[must_use]
pub fn toast_for(err: &ApiError) -> Toast {
    let message = match (&err.error_code, err.kind()) {
        (_, ErrorKind::Transport) => MSG_TRANSPORT.to_owned(),
        (Some(ErrorCode::BackendConnectionError), _) => MSG_BACKEND_CONNECTION.to_owned(),
        (Some(ErrorCode::BackendTimeout), _) => MSG_BACKEND_TIMEOUT.to_owned(),
        (Some(ErrorCode::CircuitOpen), _) => MSG_CIRCUIT_OPEN.to_owned(),
        (Some(ErrorCode::Http401), _) => MSG_SESSION_EXPIRED.to_owned(),
        _ => err.message.clone(),
    };
    let level = match err.kind() {
        ErrorKind::Transport | ErrorKind::UpstreamUnavailable => ToastLevel::Warning,
        ErrorKind::AuthenticationRejected | ErrorKind::Server => ToastLevel::Error,
    };
    Toast { level, message }
}

/// Surface `err` as exactly one toast.
pub fn report(notifier: &dyn Notifier, err: &ApiError) {
    notifier.notify(toast_for(err));
}

// =============================================================================
// NOTIFIERS
// =============================================================================

/// Prints toasts to stderr so stdout carries only rendered views.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, toast: Toast) {
        let tag = match toast.level {
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", toast.message);
    }
}

/// Keeps every toast in memory, oldest first.
#[derive(Debug, Default)]
pub struct ToastLog {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastLog {
    #[must_use]
    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastLog {
    fn notify(&self, toast: Toast) {
        // A panic elsewhere while holding the lock must not lose later toasts.
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner).push(toast);
    }
}
