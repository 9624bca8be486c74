//! Posting statistics
//!
//! Frequency aggregation over projected records and chart rendering.

mod render;

pub use render::{
    blank_png, encode_chart, ChartRenderer, PlottersRenderer, RenderError, RenderResult,
};

use serde::Serialize;
use std::collections::HashMap;

use crate::types::ProjectedRecord;

/// Occurrence counts per distinct value, most frequent first.
///
/// Values with equal counts keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for value in values {
            let value = value.as_ref();
            match positions.get(value) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    positions.insert(value.to_string(), entries.len());
                    entries.push((value.to_string(), 1));
                }
            }
        }

        // Stable sort keeps first-seen order among ties
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Count for a value, if it occurred
    pub fn get(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == value)
            .map(|(_, count)| *count)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest count, 0 when empty
    pub fn max_count(&self) -> usize {
        self.entries.first().map(|(_, c)| *c).unwrap_or(0)
    }
}

/// Title and company distributions over records with a usable title
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub titles: FrequencyTable,
    pub companies: FrequencyTable,
    /// Records that survived the title filter
    pub rows: usize,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Aggregate projected records.
///
/// Records whose title is the "N/A" sentinel carry no usable data and are
/// dropped before counting. Companies are counted as projected, so a missing
/// company is counted under "N/A".
pub fn aggregate(records: &[ProjectedRecord]) -> Aggregation {
    let usable: Vec<&ProjectedRecord> = records.iter().filter(|r| r.has_title()).collect();

    Aggregation {
        titles: FrequencyTable::from_values(usable.iter().map(|r| r.title.as_str())),
        companies: FrequencyTable::from_values(usable.iter().map(|r| r.company.as_str())),
        rows: usable.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, company: &str) -> ProjectedRecord {
        ProjectedRecord {
            title: title.to_string(),
            company: company.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn counts_are_ordered_by_frequency() {
        let table = FrequencyTable::from_values(["A", "A", "B"]);
        assert_eq!(table.entries(), &[("A".to_string(), 2), ("B".to_string(), 1)]);
        assert_eq!(table.get("A"), Some(2));
        assert_eq!(table.get("C"), None);
        assert_eq!(table.max_count(), 2);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let table = FrequencyTable::from_values(["x", "y", "z", "y", "x", "w"]);
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = FrequencyTable::from_values(Vec::<String>::new());
        assert!(table.is_empty());
        assert_eq!(table.max_count(), 0);
    }

    #[test]
    fn aggregate_drops_records_without_title() {
        let records = vec![
            record("A", "Acme"),
            record("N/A", "Ghost"),
            record("A", "Globex"),
            record("B", "Acme"),
        ];
        let agg = aggregate(&records);
        assert_eq!(agg.rows, 3);
        assert_eq!(agg.titles.entries(), &[("A".to_string(), 2), ("B".to_string(), 1)]);
        assert_eq!(agg.companies.get("Acme"), Some(2));
        assert_eq!(agg.companies.get("Ghost"), None);
    }

    #[test]
    fn aggregate_counts_missing_company_as_sentinel() {
        let agg = aggregate(&[record("A", "N/A"), record("B", "N/A")]);
        assert_eq!(agg.companies.get("N/A"), Some(2));
    }

    #[test]
    fn all_sentinel_titles_aggregate_to_nothing() {
        let agg = aggregate(&[ProjectedRecord::default(), ProjectedRecord::default()]);
        assert!(agg.is_empty());
        assert!(agg.titles.is_empty());
        assert!(agg.companies.is_empty());
    }
}
