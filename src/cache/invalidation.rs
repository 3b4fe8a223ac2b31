//! Invalidation Trigger Module
//!
//! Clears validator tokens after resource-mutating operations complete.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::{ResourceIdentity, StatsCounters, TokenStore};

// == Invalidation Trigger ==
/// Wraps mutating operations and invalidates the affected resource's token.
///
/// Invalidation is lazy: the token is cleared, not regenerated, since the new
/// content may not be visible until the mutation has fully committed.
#[derive(Debug, Clone)]
pub struct InvalidationTrigger {
    store: Arc<TokenStore>,
    stats: Arc<StatsCounters>,
}

impl InvalidationTrigger {
    pub fn new(store: Arc<TokenStore>, stats: Arc<StatsCounters>) -> Self {
        Self { store, stats }
    }

    // == Before Invoke ==
    /// Reserved for pre-mutation bookkeeping. Does not touch the store.
    pub fn before_invoke(&self, id: &ResourceIdentity) {
        trace!("Mutation starting on {}", id);
    }

    // == After Invoke ==
    /// Clears the token if the mutation committed; otherwise leaves it intact.
    ///
    /// Tokens cached for query variants of the same path are cleared too, since
    /// they are views over the mutated resource.
    pub fn after_invoke(&self, id: &ResourceIdentity, success: bool) {
        if success {
            self.store.clear_path(id);
            self.stats.record_invalidation();
            debug!("Invalidated validator token for {}", id);
        } else {
            self.stats.record_skipped_invalidation();
            debug!("Mutation on {} failed, keeping validator token", id);
        }
    }
}
