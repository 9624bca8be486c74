//! Jobboard: read-only HTTP API over a job posting document store
//!
//! - Listing, case-insensitive title search, price/category filtering and
//!   sorting, delegated to the document store
//! - Uniform projection of schema-less documents onto a fixed record shape
//! - Title and company distribution statistics rendered as a PNG bar chart
//! - MongoDB and in-memory store backends behind one trait

pub mod api;
pub mod config;
pub mod http;
pub mod projection;
pub mod query;
pub mod stats;
pub mod store;
pub mod types;
pub mod util;

pub use api::{ApiError, ProductService};
pub use config::Config;
pub use types::*;
