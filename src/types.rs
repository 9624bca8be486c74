//! Core types for the job board API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder emitted for any projected field missing from the source document
pub const SENTINEL: &str = "N/A";

/// A raw document as delivered by the store.
///
/// Documents are schema-less, so they stay a plain JSON object until they are
/// projected into a [`ProjectedRecord`].
pub type StoredRecord = Map<String, Value>;

// ============================================================================
// Projected Records
// ============================================================================

/// Fixed-shape job posting returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectedRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub summary: String,
}

impl ProjectedRecord {
    /// Whether the record carries a usable job title
    pub fn has_title(&self) -> bool {
        self.title != SENTINEL
    }
}

impl Default for ProjectedRecord {
    fn default() -> Self {
        Self {
            title: SENTINEL.to_string(),
            company: SENTINEL.to_string(),
            location: SENTINEL.to_string(),
            summary: SENTINEL.to_string(),
        }
    }
}

// ============================================================================
// Response Payloads
// ============================================================================

/// Product listing payload shared by list, search, filter and sort
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<ProjectedRecord>,
}

impl From<Vec<ProjectedRecord>> for ProductsResponse {
    fn from(products: Vec<ProjectedRecord>) -> Self {
        Self { products }
    }
}

/// Statistics payload carrying the base64 encoded PNG chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart: String,
}
