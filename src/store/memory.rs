//! In-process document store
//!
//! Evaluates query specifications in Rust over documents kept in insertion
//! order. Backs the test suite and local runs without a database.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tracing::{debug, info};

use super::{DocumentStore, RecordStream, StoreError, StoreResult};
use crate::query::{Predicate, QuerySpec, SortDirection};
use crate::types::StoredRecord;

/// Documents held in memory, in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<StoredRecord>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from JSON values; every value must be an object.
    pub fn from_values<I>(values: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let store = Self::new();
        for (i, value) in values.into_iter().enumerate() {
            match value {
                Value::Object(doc) => store.insert(doc),
                other => {
                    return Err(StoreError::Seed(format!(
                        "document {} is not a JSON object: {}",
                        i, other
                    )))
                }
            }
        }
        Ok(store)
    }

    /// Load a JSON array or a JSON-lines file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;

        let values: Vec<Value> = if content.trim_start().starts_with('[') {
            serde_json::from_str(&content)
                .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?
        } else {
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(n, line)| {
                    serde_json::from_str(line).map_err(|e| {
                        StoreError::Seed(format!("{} line {}: {}", path.display(), n + 1, e))
                    })
                })
                .collect::<StoreResult<_>>()?
        };

        let store = Self::from_values(values)?;
        info!("Loaded {} documents from {}", store.len(), path.display());
        Ok(store)
    }

    /// Append a document, assigning an `_id` when it has none
    pub fn insert(&self, mut doc: StoredRecord) {
        let seq = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        doc.entry("_id")
            .or_insert_with(|| json!({ "$oid": format!("{:024x}", seq) }));
        self.documents.write().push(doc);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Evaluate a query synchronously
    pub fn query(&self, spec: &QuerySpec) -> StoreResult<Vec<StoredRecord>> {
        let matchers = spec
            .predicates
            .iter()
            .map(Matcher::compile)
            .collect::<StoreResult<Vec<_>>>()?;

        let mut results: Vec<StoredRecord> = self
            .documents
            .read()
            .iter()
            .filter(|doc| matchers.iter().all(|m| m.matches(doc)))
            .cloned()
            .collect();

        // sort_by is stable, so equal keys keep insertion order in both directions
        if let Some(sort) = &spec.sort {
            let field = sort.field.as_str();
            match sort.direction {
                SortDirection::Ascending => {
                    results.sort_by(|a, b| compare_values(a.get(field), b.get(field)))
                }
                SortDirection::Descending => {
                    results.sort_by(|a, b| compare_values(b.get(field), a.get(field)))
                }
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, query: &QuerySpec) -> StoreResult<RecordStream> {
        let results = self.query(query)?;
        debug!("Memory store matched {} documents", results.len());
        Ok(futures::stream::iter(results.into_iter().map(Ok)).boxed())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Predicate compiled for repeated evaluation
enum Matcher<'a> {
    Regex { field: &'a str, regex: Regex },
    Equals { field: &'a str, value: &'a str },
    Between { field: &'a str, min: f64, max: f64 },
}

impl<'a> Matcher<'a> {
    fn compile(predicate: &'a Predicate) -> StoreResult<Self> {
        Ok(match predicate {
            Predicate::Matches { field, pattern } => Matcher::Regex {
                field,
                regex: RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        StoreError::InvalidQuery(format!("invalid regular expression: {}", e))
                    })?,
            },
            Predicate::Equals { field, value } => Matcher::Equals { field, value },
            Predicate::Between { field, min, max } => Matcher::Between {
                field,
                min: *min,
                max: *max,
            },
        })
    }

    fn matches(&self, doc: &StoredRecord) -> bool {
        match self {
            Matcher::Regex { field, regex } => doc
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|s| regex.is_match(s)),
            Matcher::Equals { field, value } => {
                doc.get(*field).and_then(Value::as_str) == Some(*value)
            }
            Matcher::Between { field, min, max } => doc
                .get(*field)
                .and_then(Value::as_f64)
                .is_some_and(|v| *min <= v && v <= *max),
        }
    }
}

/// Cross-type ordering: missing/null < numbers < strings < objects < arrays < booleans
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{filter_query, search_query, sort_query};
    use futures::TryStreamExt;

    fn store(values: Vec<Value>) -> MemoryStore {
        MemoryStore::from_values(values).unwrap()
    }

    fn titles(docs: &[StoredRecord]) -> Vec<&str> {
        docs.iter()
            .map(|d| d.get("title").and_then(Value::as_str).unwrap_or("-"))
            .collect()
    }

    #[test]
    fn insert_assigns_ids_and_keeps_existing() {
        let s = store(vec![json!({"title": "a"}), json!({"_id": 7, "title": "b"})]);
        let docs = s.query(&QuerySpec::all()).unwrap();
        assert!(docs[0]["_id"]["$oid"].is_string());
        assert_eq!(docs[1]["_id"], json!(7));
    }

    #[test]
    fn from_values_rejects_non_objects() {
        let err = MemoryStore::from_values(vec![json!({}), json!(3)]).unwrap_err();
        assert!(err.to_string().contains("document 1 is not a JSON object"));
    }

    #[test]
    fn regex_search_is_case_insensitive_substring() {
        let s = store(vec![
            json!({"title": "Senior Engineer"}),
            json!({"title": "Manager"}),
            json!({"title": "engineering lead"}),
            json!({"company": "No title"}),
        ]);
        let docs = s.query(&search_query("Engineer")).unwrap();
        assert_eq!(titles(&docs), vec!["Senior Engineer", "engineering lead"]);

        let all = s.query(&search_query("")).unwrap();
        assert_eq!(all.len(), 3, "empty pattern matches every string title");
    }

    #[test]
    fn invalid_regex_is_reported() {
        let s = store(vec![json!({"title": "x"})]);
        let err = s.query(&search_query("(")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }

    #[test]
    fn price_range_is_inclusive_and_numeric_only() {
        let s = store(vec![
            json!({"title": "a", "price": 9.99}),
            json!({"title": "b", "price": 10}),
            json!({"title": "c", "price": 20.0}),
            json!({"title": "d", "price": 20.01}),
            json!({"title": "e", "price": "15"}),
            json!({"title": "f"}),
        ]);
        let docs = s.query(&filter_query(None, Some(10.0), Some(20.0))).unwrap();
        assert_eq!(titles(&docs), vec!["b", "c"]);
    }

    #[test]
    fn category_equality_is_exact() {
        let s = store(vec![
            json!({"title": "a", "price": 1, "category": "Eng"}),
            json!({"title": "b", "price": 1, "category": "eng"}),
            json!({"title": "c", "price": 1}),
        ]);
        let docs = s.query(&filter_query(Some("Eng"), None, None)).unwrap();
        assert_eq!(titles(&docs), vec!["a"]);
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let s = store(vec![
            json!({"title": "first", "price": 5}),
            json!({"title": "cheap", "price": 1}),
            json!({"title": "second", "price": 5}),
            json!({"title": "none"}),
        ]);

        let asc = s.query(&sort_query(Some("asc"), Some("price"))).unwrap();
        assert_eq!(titles(&asc), vec!["none", "cheap", "first", "second"]);

        let desc = s.query(&sort_query(Some("desc"), Some("price"))).unwrap();
        assert_eq!(titles(&desc), vec!["first", "second", "cheap", "none"]);
    }

    #[test]
    fn mixed_types_follow_rank_order() {
        assert_eq!(compare_values(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(100)), Some(&json!("1"))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(true)), Some(&json!([1]))), Ordering::Greater);
    }

    #[test]
    fn load_reads_array_and_json_lines() {
        let dir = tempfile::tempdir().unwrap();

        let array = dir.path().join("seed.json");
        std::fs::write(&array, r#"[{"title": "a"}, {"title": "b"}]"#).unwrap();
        assert_eq!(MemoryStore::load(&array).unwrap().len(), 2);

        let lines = dir.path().join("seed.jsonl");
        std::fs::write(&lines, "{\"title\": \"a\"}\n\n{\"title\": \"b\"}\n{\"title\": \"c\"}\n").unwrap();
        assert_eq!(MemoryStore::load(&lines).unwrap().len(), 3);

        let broken = dir.path().join("broken.jsonl");
        std::fs::write(&broken, "{\"title\": \"a\"}\nnot json\n").unwrap();
        let err = MemoryStore::load(&broken).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn find_streams_documents_in_order() {
        let s = store(vec![json!({"title": "x"}), json!({"title": "y"})]);
        let docs: Vec<StoredRecord> = s.find(&QuerySpec::all()).await.unwrap().try_collect().await.unwrap();
        assert_eq!(titles(&docs), vec!["x", "y"]);
        assert!(s.ping().await.is_ok());
        assert_eq!(s.name(), "memory");
    }
}
