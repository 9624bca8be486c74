//! Data access gateway
//!
//! A [`DocumentStore`] executes a [`QuerySpec`] and yields raw documents as a
//! lazy stream. Backends are chosen from configuration by [`create_store`].

mod factory;
mod memory;
mod mongo;

pub use factory::create_store;
pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;
use std::time::Duration;

use crate::query::QuerySpec;
use crate::types::StoredRecord;

/// Errors raised by document store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed to execute a query
    #[error("Store query failed: {0}")]
    Query(String),

    /// The query could not be expressed for this backend
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The store did not answer in time
    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),

    /// Seed data for the memory backend could not be loaded
    #[error("Failed to load seed data: {0}")]
    Seed(String),

    /// MongoDB driver error
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Lazily produced, finite sequence of raw documents
pub type RecordStream = BoxStream<'static, StoreResult<StoredRecord>>;

/// Read-only access to the job posting collection.
///
/// Implementations must be safe to share across concurrent requests and must
/// keep insertion order for documents that compare equal under a sort.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Execute a query and stream the matching documents
    async fn find(&self, query: &QuerySpec) -> StoreResult<RecordStream>;

    /// Check that the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name (e.g., "mongodb", "memory")
    fn name(&self) -> &str;
}
