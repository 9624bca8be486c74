//! Product operations
//!
//! [`ProductService`] composes query building, store access, projection and
//! chart rendering for the five product endpoints. One instance is created at
//! startup and shared by every request.

mod error;

pub use error::{ApiError, ApiResult, NOT_FOUND_MESSAGE};

use futures::TryStreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::projection::project;
use crate::query::{filter_query, search_query, sort_query, QuerySpec};
use crate::stats::{aggregate, encode_chart, Aggregation, ChartRenderer, RenderError};
use crate::store::{DocumentStore, StoreError, StoreResult};
use crate::types::ProjectedRecord;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Store reachability as reported by the health endpoint
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub healthy: bool,
    pub store: String,
}

/// Read-only operations over the job posting collection
#[derive(Debug)]
pub struct ProductService {
    store: Arc<dyn DocumentStore>,
    renderer: Arc<dyn ChartRenderer>,
    query_timeout: Duration,
    render_timeout: Duration,
}

impl ProductService {
    pub fn new(store: Arc<dyn DocumentStore>, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            store,
            renderer,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Create a service using the timeouts from configuration
    pub fn from_config(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self::new(store, renderer).with_timeouts(
            Duration::from_secs(config.store.query_timeout_secs),
            Duration::from_secs(config.chart.render_timeout_secs),
        )
    }

    pub fn with_timeouts(mut self, query_timeout: Duration, render_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self.render_timeout = render_timeout;
        self
    }

    /// Every posting, in store order
    pub async fn list(&self) -> ApiResult<Vec<ProjectedRecord>> {
        self.fetch(&QuerySpec::all()).await
    }

    /// Postings whose title matches `name` as a case-insensitive regex.
    ///
    /// The pattern is interpreted by the store, so its regex dialect applies
    /// and a pattern the store cannot compile is an invalid parameter. Unlike
    /// filter and sort, an empty result is an error.
    pub async fn search(&self, name: &str) -> ApiResult<Vec<ProjectedRecord>> {
        let products = self.fetch(&search_query(name)).await?;
        if products.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(products)
    }

    /// Postings priced within `[min_price, max_price]`, optionally in one category
    pub async fn filter(
        &self,
        category: Option<&str>,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> ApiResult<Vec<ProjectedRecord>> {
        check_price("min_price", min_price)?;
        check_price("max_price", max_price)?;
        self.fetch(&filter_query(category, min_price, max_price)).await
    }

    /// Every posting sorted on `sort_by`; any order other than "asc" is descending
    pub async fn sort(
        &self,
        order: Option<&str>,
        sort_by: Option<&str>,
    ) -> ApiResult<Vec<ProjectedRecord>> {
        if sort_by.is_some_and(|field| field.is_empty()) {
            return Err(ApiError::InvalidParameter(
                "sort_by must not be empty".to_string(),
            ));
        }
        self.fetch(&sort_query(order, sort_by)).await
    }

    /// Title and company distributions over every posting
    pub async fn aggregate(&self) -> ApiResult<Aggregation> {
        let products = self.list().await?;
        Ok(aggregate(&products))
    }

    /// Render the statistics chart as PNG bytes.
    ///
    /// With no usable rows the renderer's placeholder image is returned.
    pub async fn stats_png(&self) -> ApiResult<Vec<u8>> {
        let aggregation = self.aggregate().await?;
        if aggregation.is_empty() {
            info!("No postings with a usable title; returning placeholder chart");
        }

        let renderer = self.renderer.clone();
        let task = tokio::task::spawn_blocking(move || {
            if aggregation.is_empty() {
                renderer.placeholder()
            } else {
                renderer.render(&aggregation)
            }
        });

        let started = Instant::now();
        let joined = tokio::time::timeout(self.render_timeout, task)
            .await
            .map_err(|_| RenderError::Timeout)?;
        let png = joined.map_err(|e| RenderError::Task(e.to_string()))??;

        debug!(
            "Chart rendered by {} in {}ms",
            self.renderer.name(),
            started.elapsed().as_millis()
        );
        Ok(png)
    }

    /// Render the statistics chart as base64 encoded PNG
    pub async fn stats(&self) -> ApiResult<String> {
        Ok(encode_chart(&self.stats_png().await?))
    }

    /// Ping the store
    pub async fn health(&self) -> HealthReport {
        let healthy = match tokio::time::timeout(self.query_timeout, self.store.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Store ping failed: {}", e);
                false
            }
            Err(_) => {
                warn!("Store ping timed out after {:?}", self.query_timeout);
                false
            }
        };
        HealthReport {
            healthy,
            store: self.store.name().to_string(),
        }
    }

    /// Run a query and project every document, bounded by the query timeout
    async fn fetch(&self, spec: &QuerySpec) -> ApiResult<Vec<ProjectedRecord>> {
        let started = Instant::now();
        let products = tokio::time::timeout(self.query_timeout, self.collect(spec))
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))??;

        debug!(
            "Fetched {} postings from {} in {}ms",
            products.len(),
            self.store.name(),
            started.elapsed().as_millis()
        );
        Ok(products)
    }

    async fn collect(&self, spec: &QuerySpec) -> StoreResult<Vec<ProjectedRecord>> {
        self.store
            .find(spec)
            .await?
            .map_ok(|doc| project(&doc))
            .try_collect()
            .await
    }
}

fn check_price(name: &str, value: Option<f64>) -> ApiResult<()> {
    match value {
        Some(v) if v.is_nan() => Err(ApiError::InvalidParameter(format!(
            "{} must be a number",
            name
        ))),
        _ => Ok(()),
    }
}
