//! Query builders for the search, filter and sort endpoints
//!
//! Builders never fail. Parameter validation happens at the HTTP boundary.

use super::{Predicate, QuerySpec, SortDirection, CATEGORY_FIELD, PRICE_FIELD, TITLE_FIELD};

/// Default lower price bound for the filter endpoint
pub const DEFAULT_MIN_PRICE: f64 = 0.0;
/// Default upper price bound for the filter endpoint
pub const DEFAULT_MAX_PRICE: f64 = f64::INFINITY;
/// Default order token for the sort endpoint
pub const DEFAULT_SORT_ORDER: &str = "asc";
/// Default sort field for the sort endpoint
pub const DEFAULT_SORT_FIELD: &str = "price";

/// Case-insensitive regex match of `name` against the title.
///
/// An empty name matches every document.
pub fn search_query(name: &str) -> QuerySpec {
    QuerySpec::all().with_predicate(Predicate::Matches {
        field: TITLE_FIELD.to_string(),
        pattern: name.to_string(),
    })
}

/// Price range plus optional category equality.
///
/// A missing or empty category adds no category predicate.
pub fn filter_query(category: Option<&str>, min_price: Option<f64>, max_price: Option<f64>) -> QuerySpec {
    let mut spec = QuerySpec::all().with_predicate(Predicate::Between {
        field: PRICE_FIELD.to_string(),
        min: min_price.unwrap_or(DEFAULT_MIN_PRICE),
        max: max_price.unwrap_or(DEFAULT_MAX_PRICE),
    });

    if let Some(category) = category.filter(|c| !c.is_empty()) {
        spec = spec.with_predicate(Predicate::Equals {
            field: CATEGORY_FIELD.to_string(),
            value: category.to_string(),
        });
    }

    spec
}

/// Unfiltered query sorted on `sort_by`.
///
/// Any order token other than exactly `"asc"` sorts descending.
pub fn sort_query(order: Option<&str>, sort_by: Option<&str>) -> QuerySpec {
    let order = order.unwrap_or(DEFAULT_SORT_ORDER);
    let field = sort_by.unwrap_or(DEFAULT_SORT_FIELD);
    QuerySpec::all().with_sort(field, SortDirection::from_token(order))
}
