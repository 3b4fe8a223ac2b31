//! Conditional Cache Service
//!
//! Owns the token store, generator, gate and trigger for one server instance.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{
    hash_token, CacheStats, ConditionalRequestGate, Decision, InvalidationTrigger,
    ResourceIdentity, StatsCounters, TokenGenerator, TokenStore, ValidatorToken,
};
use crate::error::GenerationError;

// == Conditional Cache ==
/// Caching decision engine with an explicit lifecycle.
///
/// Created once at startup and shared behind an `Arc`; dropping it discards
/// every stored token.
pub struct ConditionalCache {
    store: Arc<TokenStore>,
    stats: Arc<StatsCounters>,
    gate: ConditionalRequestGate,
    trigger: InvalidationTrigger,
    generator: Arc<dyn TokenGenerator>,
}

impl ConditionalCache {
    // == Constructor ==
    /// Creates an empty cache using the given token policy.
    pub fn new(generator: Arc<dyn TokenGenerator>) -> Self {
        let store = Arc::new(TokenStore::new());
        let stats = Arc::new(StatsCounters::new());
        Self {
            gate: ConditionalRequestGate::new(store.clone(), stats.clone()),
            trigger: InvalidationTrigger::new(store.clone(), stats.clone()),
            store,
            stats,
            generator,
        }
    }

    // == Accessors ==
    /// Returns the token store shared by the gate and trigger.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Returns the gate that decides 304 versus pass-through.
    pub fn gate(&self) -> &ConditionalRequestGate {
        &self.gate
    }

    /// Returns the trigger to run around mutating operations.
    pub fn trigger(&self) -> &InvalidationTrigger {
        &self.trigger
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.store.len())
    }

    // == Evaluate ==
    /// Runs the conditional check for a request.
    pub fn evaluate(&self, id: &ResourceIdentity, client_token: Option<&str>) -> Decision {
        self.gate.evaluate(id, client_token)
    }

    // == Begin Read ==
    /// Marks the start of a read whose response may carry a validator.
    ///
    /// Call before producing the representation and pass the result to
    /// [`ConditionalCache::tag_body`] or [`ConditionalCache::validator_for`].
    pub fn begin_read(&self, id: &ResourceIdentity) -> u64 {
        self.store.epoch(id)
    }

    // == Tag Body ==
    /// Derives the token for a response body read at `observed_epoch` and
    /// installs it as the current token.
    ///
    /// The token is always the content hash of `body` itself, so a client
    /// holding it holds exactly these bytes. Fails with `Superseded`, storing
    /// nothing, if the resource was invalidated after `observed_epoch`.
    pub fn tag_body(
        &self,
        id: &ResourceIdentity,
        observed_epoch: u64,
        body: &[u8],
    ) -> Result<ValidatorToken, GenerationError> {
        let token = hash_token(body);
        if self.store.set_if_epoch(id.clone(), token.clone(), observed_epoch) {
            self.stats.record_generation();
            Ok(token)
        } else {
            debug!("Discarding validator token for {}, invalidated meanwhile", id);
            Err(GenerationError::Superseded(id.clone()))
        }
    }

    /// Returns the stored token if no invalidation happened since
    /// `observed_epoch`. Never generates.
    pub fn stored_validator(
        &self,
        id: &ResourceIdentity,
        observed_epoch: u64,
    ) -> Option<ValidatorToken> {
        match self.store.snapshot(id) {
            (token, epoch) if epoch == observed_epoch => token,
            _ => None,
        }
    }

    // == Validator For ==
    /// Returns the current token for a resource, as seen at `observed_epoch`.
    ///
    /// Uses the stored token when present, otherwise asks the generator on the
    /// blocking pool under `timeout` and installs the result. Fails with
    /// `Superseded` if the resource was invalidated after `observed_epoch`.
    /// Responses that carry a body are tagged with [`ConditionalCache::tag_body`]
    /// instead, since the generator reads the source again and may see newer
    /// content than the body.
    pub async fn validator_for(
        &self,
        id: &ResourceIdentity,
        observed_epoch: u64,
        timeout: Duration,
    ) -> Result<ValidatorToken, GenerationError> {
        let (current, epoch) = self.store.snapshot(id);
        if epoch != observed_epoch {
            return Err(GenerationError::Superseded(id.clone()));
        }
        if let Some(token) = current {
            return Ok(token);
        }

        let token = match self.generate_with_timeout(id, timeout).await {
            Ok(token) => token,
            Err(err) => {
                self.stats.record_generation_failure();
                warn!("Validator generation failed: {}", err);
                return Err(err);
            }
        };
        self.stats.record_generation();

        if self.store.set_if_epoch(id.clone(), token.clone(), observed_epoch) {
            debug!("Stored validator token for {}", id);
            Ok(token)
        } else {
            debug!("Discarding validator token for {}, invalidated meanwhile", id);
            Err(GenerationError::Superseded(id.clone()))
        }
    }

    /// Returns the current token, generating one if absent.
    pub async fn current_or_generate(
        &self,
        id: &ResourceIdentity,
        timeout: Duration,
    ) -> Result<ValidatorToken, GenerationError> {
        let epoch = self.begin_read(id);
        self.validator_for(id, epoch, timeout).await
    }

    async fn generate_with_timeout(
        &self,
        id: &ResourceIdentity,
        timeout: Duration,
    ) -> Result<ValidatorToken, GenerationError> {
        let generator = self.generator.clone();
        let target = id.clone();
        let task = tokio::task::spawn_blocking(move || generator.generate(&target));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(GenerationError::Cancelled(id.clone())),
            Err(_) => Err(GenerationError::TimedOut {
                identity: id.clone(),
                after_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

impl fmt::Debug for ConditionalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalCache")
            .field("store", &self.store)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
