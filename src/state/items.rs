#[cfg(test)]
#[path = "items_test.rs"]
mod items_test;

use crate::net::api::ItemsApi;
use crate::net::types::Item;
use crate::notify::{self, Notifier};

/// Dashboard-local item list. Failures here never touch the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemsState {
    pub items: Vec<Item>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ItemsState {
    /// Fetch the list, replacing previous items on success.
    pub async fn load(&mut self, api: &dyn ItemsApi, notifier: &dyn Notifier) {
        self.loading = true;
        self.error = None;
        match api.items().await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "items loaded");
                self.items = items;
            }
            Err(err) => {
                tracing::warn!(status = err.status, error = %err, "items fetch failed");
                notify::report(notifier, &err);
                self.error = Some(load_failed_message(&err.message));
            }
        }
        self.loading = false;
    }
}

fn load_failed_message(detail: &str) -> String {
    format!("Failed to load items: {detail}")
}
