//! API error taxonomy

use crate::stats::RenderError;
use crate::store::StoreError;

/// Message returned when a search matches nothing
pub const NOT_FOUND_MESSAGE: &str = "No products found";

/// Errors surfaced by the product operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Search matched no postings
    #[error("No products found")]
    NotFound,

    /// A request parameter could not be used
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The document store failed or did not answer
    #[error("Document store unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The chart could not be produced
    #[error("Chart rendering failed: {0}")]
    RenderFailure(String),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Stable machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::RenderFailure(_) => "RENDER_FAILURE",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidQuery(msg) => Self::InvalidParameter(msg),
            other => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        Self::RenderFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn not_found_message_is_fixed() {
        assert_eq!(ApiError::NotFound.to_string(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn store_errors_map_to_upstream_unavailable() {
        let err: ApiError = StoreError::Timeout(Duration::from_secs(3)).into();
        assert!(matches!(err, ApiError::UpstreamUnavailable(_)));
        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");

        let err: ApiError = StoreError::Connection("refused".into()).into();
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn invalid_query_maps_to_invalid_parameter() {
        let err: ApiError = StoreError::InvalidQuery("bad regex".into()).into();
        assert!(matches!(err, ApiError::InvalidParameter(_)));
    }

    #[test]
    fn render_errors_map_to_render_failure() {
        let err: ApiError = RenderError::Timeout.into();
        assert_eq!(err.code(), "RENDER_FAILURE");
    }
}
