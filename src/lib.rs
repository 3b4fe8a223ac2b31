//! Conditional Cache - ETag validation for HTTP services
//!
//! Answers conditional GETs with 304 Not Modified while the client's validator
//! is current, and invalidates validators when mutating requests succeed.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;

pub use api::AppState;
pub use cache::{ConditionalCache, Decision, ResourceIdentity, ValidatorToken};
pub use config::Config;
pub use error::{ApiError, GenerationError};
