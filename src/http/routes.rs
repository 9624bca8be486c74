//! HTTP API Route Definitions

use anyhow::{Context, Result};
use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use crate::api::ProductService;
use crate::config::{CorsConfig, HttpConfig};

/// Create the API router with all routes
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/products", get(handlers::list_products))
        .route("/products/stats", get(handlers::product_stats))
        .route("/products/search/:name", get(handlers::search_products))
        .route("/products/filter", get(handlers::filter_products))
        .route("/products/sort", get(handlers::sort_products))
        .with_state(app_state)
}

/// Router with CORS and request tracing applied
pub fn build_app(service: Arc<ProductService>, config: &HttpConfig) -> Result<Router> {
    let mut app = create_router(AppState { service });

    if config.cors.enabled {
        app = app.layer(cors_layer(&config.cors)?);
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}

/// Build the CORS layer.
///
/// A `"*"` origin together with credentials echoes the request origin, since
/// browsers reject a literal wildcard on credentialed requests.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origin = if config.allows_any_origin() {
        if config.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(Any)
        }
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials))
}
