//! HTTP API Request Handlers
//!
//! Handlers that map HTTP requests to ProductService operations.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::api::{ApiError, ProductService};
use crate::types::{ChartResponse, ProductsResponse};

use super::types::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProductService>,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.service.health().await;
    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            healthy: report.healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: report.store,
        }),
    )
}

/// List every posting
pub async fn list_products(State(state): State<AppState>) -> Result<Json<ProductsResponse>, ApiError> {
    let products = state.service.list().await?;
    Ok(Json(products.into()))
}

/// Title and company distribution chart
pub async fn product_stats(State(state): State<AppState>) -> Result<Json<ChartResponse>, ApiError> {
    let chart = state.service.stats().await?;
    Ok(Json(ChartResponse { chart }))
}

/// Case-insensitive title search
pub async fn search_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProductsResponse>, ApiError> {
    debug!("HTTP search request: name={}", name);
    let products = state.service.search(&name).await?;
    Ok(Json(products.into()))
}

/// Price range and category filter
pub async fn filter_products(
    State(state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidParameter(e.body_text()))?;
    debug!(
        "HTTP filter request: category={:?}, min_price={:?}, max_price={:?}",
        params.category, params.min_price, params.max_price
    );

    let products = state
        .service
        .filter(params.category.as_deref(), params.min_price, params.max_price)
        .await?;
    Ok(Json(products.into()))
}

/// Sorted listing
pub async fn sort_products(
    State(state): State<AppState>,
    params: Result<Query<SortParams>, QueryRejection>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidParameter(e.body_text()))?;
    debug!(
        "HTTP sort request: order={:?}, sort_by={:?}",
        params.order, params.sort_by
    );

    let products = state
        .service
        .sort(params.order.as_deref(), params.sort_by.as_deref())
        .await?;
    Ok(Json(products.into()))
}
