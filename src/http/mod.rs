//! HTTP API Server Module
//!
//! Exposes the product operations as a read-only REST API.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::{build_app, create_router};
pub use server::HttpServer;
