//! Network layer: wire types, the BFF client, and failure classification.

pub mod api;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod fake_bff;
