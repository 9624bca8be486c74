//! Store factory for creating document stores from configuration

use std::sync::Arc;
use tracing::{info, warn};

use super::{DocumentStore, MemoryStore, MongoStore, StoreResult};
use crate::config::{StoreBackend, StoreConfig};

/// Create a document store from configuration
///
/// Returns an `Arc<dyn DocumentStore>` shared by every request.
pub async fn create_store(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Mongodb => {
            info!("Creating MongoDB store");
            let store = MongoStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let store = match &config.seed_path {
                Some(path) => MemoryStore::load(path)?,
                None => MemoryStore::new(),
            };
            if store.is_empty() {
                warn!("Memory store has no documents; every listing will be empty");
            } else {
                info!("Creating memory store with {} documents", store.len());
            }
            Ok(Arc::new(store))
        }
    }
}
