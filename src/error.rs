//! Error types for the conditional cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::ResourceIdentity;
use crate::models::ErrorResponse;

// == Generation Error ==
/// Failure to compute a validator token for a resource.
///
/// Never leaves the token store modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The resource has no current representation
    #[error("Resource unavailable: {0}")]
    Unavailable(ResourceIdentity),

    /// The representation could not be read
    #[error("Failed to read {identity}: {reason}")]
    Read {
        identity: ResourceIdentity,
        reason: String,
    },

    /// Generation exceeded the caller's deadline
    #[error("Token generation for {identity} timed out after {after_ms}ms")]
    TimedOut {
        identity: ResourceIdentity,
        after_ms: u64,
    },

    /// The generation task was cancelled before finishing
    #[error("Token generation for {0} was cancelled")]
    Cancelled(ResourceIdentity),

    /// The resource was invalidated while its representation was being served
    #[error("Resource {0} was invalidated during token generation")]
    Superseded(ResourceIdentity),
}

// == API Error Enum ==
/// Error type for the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
