//! Catalog entries: shared, read-only templates for new wishes.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A "base wish" anyone can adopt.
///
/// Maintained outside the core; wishes only ever copy from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    pub title: String,
    pub detail: String,
    pub duration: String,
    pub cost: u64,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}
