//! Request and Response models for the conditional cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;
pub mod widget;

// Re-export commonly used types
pub use requests::WidgetRequest;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
pub use widget::Widget;
