//! HTTP API Request/Response Types
//!
//! Query-string parameters and JSON bodies not shared with the library core.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::api::ApiError;

/// Query parameters for `GET /products/filter`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterParams {
    /// Exact category to match; empty or missing matches any
    pub category: Option<String>,
    /// Inclusive lower price bound (default 0)
    pub min_price: Option<f64>,
    /// Inclusive upper price bound (default +infinity)
    pub max_price: Option<f64>,
}

/// Query parameters for `GET /products/sort`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortParams {
    /// "asc" for ascending, anything else descending (default "asc")
    pub order: Option<String>,
    /// Field to sort on (default "price")
    pub sort_by: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the store answered a ping
    pub healthy: bool,
    /// Service version
    pub version: String,
    /// Store backend name
    pub store: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RenderFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::NotFound => debug!("{}: {}", self.code(), self),
            ApiError::InvalidParameter(_) => warn!("{}: {}", self.code(), self),
            _ => error!("{}: {}", self.code(), self),
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
