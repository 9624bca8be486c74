//! MongoDB document store
//!
//! Translates query specifications into MongoDB filter and sort documents.
//! The driver pools connections internally, so one `MongoStore` is shared
//! by every request.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{DocumentStore, RecordStream, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::query::{Predicate, QuerySpec};
use crate::types::StoredRecord;

/// Server error codes for a `$regex` the server cannot compile
const INVALID_REGEX_CODES: &[i32] = &[51091, 51108];

/// Job posting collection in MongoDB
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Create a client for the configured deployment.
    ///
    /// The driver connects lazily; use [`DocumentStore::ping`] to verify
    /// reachability.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(Duration::from_secs(config.query_timeout_secs));

        let client = Client::with_options(options)?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        info!(
            "MongoDB store configured: database={}, collection={}",
            config.database, config.collection
        );

        Ok(Self {
            client,
            database: config.database.clone(),
            collection,
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, query: &QuerySpec) -> StoreResult<RecordStream> {
        let filter = filter_document(query);
        let mut options = FindOptions::default();
        options.sort = sort_document(query);

        debug!("MongoDB find: filter={}, sort={:?}", filter, options.sort);

        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(classify_error)?;
        Ok(cursor.map_ok(into_record).map_err(classify_error).boxed())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "mongodb"
    }
}

/// Build the MongoDB filter document for a query
pub fn filter_document(query: &QuerySpec) -> Document {
    let mut filter = Document::new();
    for predicate in &query.predicates {
        match predicate {
            Predicate::Matches { field, pattern } => {
                filter.insert(field.clone(), doc! { "$regex": pattern.clone(), "$options": "i" });
            }
            Predicate::Equals { field, value } => {
                filter.insert(field.clone(), value.clone());
            }
            Predicate::Between { field, min, max } => {
                filter.insert(field.clone(), doc! { "$gte": *min, "$lte": *max });
            }
        }
    }
    filter
}

/// Build the sort document, with `_id` as tiebreak so equal keys keep
/// insertion order
pub fn sort_document(query: &QuerySpec) -> Option<Document> {
    query.sort.as_ref().map(|sort| {
        let mut document = Document::new();
        document.insert(sort.field.clone(), sort.direction.as_i32());
        if sort.field != "_id" {
            document.insert("_id", 1);
        }
        document
    })
}

/// Separate query errors caused by the request from store failures.
///
/// A search pattern the server's regex engine rejects is the caller's fault;
/// everything else stays a driver error.
fn classify_error(error: mongodb::error::Error) -> StoreError {
    if let ErrorKind::Command(command) = error.kind.as_ref() {
        if is_invalid_pattern(command.code, &command.message) {
            return StoreError::InvalidQuery(format!(
                "invalid regular expression: {}",
                command.message
            ));
        }
    }
    StoreError::Mongo(error)
}

fn is_invalid_pattern(code: i32, message: &str) -> bool {
    // Servers before 4.4 report bad patterns as a generic BadValue (2)
    INVALID_REGEX_CODES.contains(&code)
        || (code == 2 && message.contains("Regular expression is invalid"))
}

/// Convert a BSON document to relaxed extended JSON
fn into_record(document: Document) -> StoredRecord {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => StoredRecord::new(),
    }
}
