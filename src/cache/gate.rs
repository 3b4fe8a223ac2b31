//! Conditional Request Gate Module
//!
//! Decides whether a request can be answered with 304 Not Modified.

use std::sync::Arc;

use crate::cache::{ResourceIdentity, StatsCounters, TokenStore};

// == Decision ==
/// Outcome of a conditional check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Client copy is current: answer 304 without running the handler
    ShortCircuit,
    /// Forward to normal resource handling
    PassThrough,
}

// == Conditional Request Gate ==
/// Compares client validators against the stored token.
///
/// Missing information on either side always passes through, so absence is
/// never read as "unchanged".
#[derive(Debug, Clone)]
pub struct ConditionalRequestGate {
    store: Arc<TokenStore>,
    stats: Arc<StatsCounters>,
}

impl ConditionalRequestGate {
    pub fn new(store: Arc<TokenStore>, stats: Arc<StatsCounters>) -> Self {
        Self { store, stats }
    }

    // == Evaluate ==
    /// Decides short-circuit vs. pass-through for one request.
    pub fn evaluate(&self, id: &ResourceIdentity, client_token: Option<&str>) -> Decision {
        let current = self.store.get(id);

        let decision = match (client_token, current) {
            (Some(client), Some(current)) if current == *client => Decision::ShortCircuit,
            _ => Decision::PassThrough,
        };

        match decision {
            Decision::ShortCircuit => self.stats.record_short_circuit(),
            Decision::PassThrough => self.stats.record_pass_through(),
        }

        decision
    }
}
