//! Session state store: who the current user is.
//!
//! DESIGN
//! ======
//! State lives in a `watch` channel. Each operation publishes at most two
//! snapshots: one when it starts (`is_loading = true`) and one when it
//! settles, written in a single `send_modify` so observers never see a
//! half-applied transition.
//!
//! Operations on one store are serialized through an async mutex. A second
//! `login` issued while the first is in flight waits, then runs; the final
//! state is the last operation's.
//!
//! ERROR HANDLING
//! ==============
//! The API returns `Result`; this module decides what to surface.
//! `initialize` treats an authentication rejection as "not logged in" and
//! swallows everything else into `error`. `login` records and re-raises.
//! `logout` always clears the user and never raises.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::net::api::AuthApi;
use crate::net::error::ApiError;
use crate::net::types::User;
use crate::notify::{self, Notifier};

pub const MSG_SESSION_CHECK_FAILED: &str = "Could not verify your session.";
pub const MSG_LOGIN_FAILED: &str = "Login failed. Please check your credentials and try again.";
pub const MSG_LOGOUT_FAILED: &str = "Logout could not be confirmed by the server.";

/// Snapshot of the authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// True while an auth operation is in flight.
    pub is_loading: bool,
    /// Last human-readable failure, if any.
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionState {
    /// Startup state: nothing known yet, first check pending.
    fn default() -> Self {
        Self { user: None, is_loading: true, error: None }
    }
}

pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SessionState>,
    ops: Mutex<()>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier, state: watch::Sender::new(SessionState::default()), ops: Mutex::new(()) }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Check the existing session with `GET /auth/me`. Never fails.
    pub async fn initialize(&self) {
        let _op = self.ops.lock().await;
        self.begin(false);

        let (user, error) = match self.api.current_user().await {
            Ok(user) => {
                tracing::info!(user_id = %user.user_id, username = %user.username, "session restored");
                (Some(user), None)
            }
            Err(err) if err.is_unauthenticated() => {
                tracing::debug!(status = err.status, "no active session");
                (None, None)
            }
            Err(err) => {
                tracing::warn!(status = err.status, error = %err, "session check failed");
                notify::report(self.notifier.as_ref(), &err);
                (None, Some(MSG_SESSION_CHECK_FAILED.to_owned()))
            }
        };

        self.state.send_modify(|s| {
            s.user = user;
            s.error = error;
            s.is_loading = false;
        });
    }

    /// Log in and adopt the returned identity.
    ///
    /// # Errors
    ///
    /// Returns the classified failure so a login form can stay open. The
    /// store has already recorded a generic message and reported a toast.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let _op = self.ops.lock().await;
        self.begin(true);

        match self.api.login(username, password).await {
            Ok(user) => {
                tracing::info!(user_id = %user.user_id, username = %user.username, "logged in");
                let adopted = user.clone();
                self.state.send_modify(|s| {
                    s.user = Some(adopted);
                    s.error = None;
                    s.is_loading = false;
                });
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(%username, status = err.status, error = %err, "login failed");
                notify::report(self.notifier.as_ref(), &err);
                self.state.send_modify(|s| {
                    s.error = Some(MSG_LOGIN_FAILED.to_owned());
                    s.is_loading = false;
                });
                Err(err)
            }
        }
    }

    /// End the session. Local state is cleared even if the server call fails.
    pub async fn logout(&self) {
        let _op = self.ops.lock().await;
        self.begin(false);

        let outcome = self.api.logout().await;
        if let Err(err) = &outcome {
            tracing::warn!(status = err.status, error = %err, "logout failed; clearing local session anyway");
            notify::report(self.notifier.as_ref(), err);
        } else {
            tracing::info!("logged out");
        }

        self.state.send_modify(|s| {
            s.user = None;
            if outcome.is_err() {
                s.error = Some(MSG_LOGOUT_FAILED.to_owned());
            }
            s.is_loading = false;
        });
    }

    fn begin(&self, clear_error: bool) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            if clear_error {
                s.error = None;
            }
        });
    }
}
