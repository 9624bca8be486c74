//! Query specifications
//!
//! Store-agnostic descriptions of what to fetch. Backends translate a
//! [`QuerySpec`] into their native query language.

mod builder;

pub use builder::*;

use serde::{Deserialize, Serialize};

/// Field holding the job title
pub const TITLE_FIELD: &str = "title";
/// Field holding the posting category
pub const CATEGORY_FIELD: &str = "category";
/// Field holding the posting price
pub const PRICE_FIELD: &str = "price";

/// A single filter predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Case-insensitive regular expression match on a string field
    Matches { field: String, pattern: String },
    /// Exact string equality
    Equals { field: String, value: String },
    /// Inclusive numeric range; documents without a numeric value never match
    Between { field: String, min: f64, max: f64 },
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Interpret an order token. Only `"asc"` is ascending.
    pub fn from_token(token: &str) -> Self {
        if token == "asc" {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    /// Numeric form used by document stores (1 / -1)
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Sort instruction on a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Filter predicates (all must hold) plus an optional sort
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub predicates: Vec<Predicate>,
    pub sort: Option<SortSpec>,
}

impl QuerySpec {
    /// Query matching every document in store order
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }
}
