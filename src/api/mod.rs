//! API Module
//!
//! HTTP handlers, routing and caching middleware for the widget service.
//!
//! # Endpoints
//! - `GET /widgets`, `POST /widgets` - Widget collection
//! - `GET /widgets/:id`, `PUT /widgets/:id`, `DELETE /widgets/:id` - Single widget
//! - `GET /stats` - Conditional cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod routes;

pub use handlers::*;
pub use registry::{
    path_key, uri_key, IdentityExtractor, KeyExtractor, MutationBinding, MutationRegistry,
};
pub use routes::{create_router, create_router_with_cors, widget_mutations};
