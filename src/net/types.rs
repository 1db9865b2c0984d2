//! Wire DTOs exchanged with the BFF.
//!
//! DESIGN
//! ======
//! Field names match the BFF's JSON exactly so no renames are needed. Error
//! bodies are not modelled here; `net::error` reads them from raw JSON so an
//! unexpected shape never hides the status code.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identity asserted by the authentication service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user identifier.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Role names. A set, so the order the BFF lists them in is irrelevant.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl User {
    /// Roles in sorted order, comma separated.
    #[must_use]
    pub fn roles_label(&self) -> String {
        self.roles.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// `POST /auth/login` success body.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub user: User,
}

/// An item served by the backend through `/api/items`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST /api/items`. The backend stores the item as given.
pub type NewItem = Item;

/// `GET /` status body.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}
