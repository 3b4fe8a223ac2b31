//! Cache Module
//!
//! Validator-token store, conditional request gate and invalidation trigger.

mod gate;
mod generator;
mod identity;
mod invalidation;
mod service;
mod stats;
mod store;
mod token;


// Re-export public types
pub use gate::{ConditionalRequestGate, Decision};
pub use generator::{hash_token, ContentHashGenerator, RepresentationSource, TokenGenerator};
pub use identity::ResourceIdentity;
pub use invalidation::InvalidationTrigger;
pub use service::ConditionalCache;
pub use stats::{CacheStats, StatsCounters};
pub use store::TokenStore;
pub use token::ValidatorToken;
