//! Token Store Module
//!
//! Concurrent map from resource identity to its current validator token.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::cache::{ResourceIdentity, ValidatorToken};

/// Number of epoch counters shared by all paths
const EPOCH_STRIPES: usize = 64;

// == Path Slot ==
/// Tokens stored under one path, keyed by query string ("" = no query).
///
/// A slot exists only while it holds at least one token.
#[derive(Debug, Default)]
struct PathSlot {
    tokens: HashMap<String, ValidatorToken>,
}

// == Token Store ==
/// Holds the current validator token per resource identity.
///
/// Access is locked per shard of the underlying map, never globally, and every
/// operation is total: absence is a value, not an error.
///
/// Invalidations are counted in a fixed set of epoch stripes selected by path,
/// so tracking them costs no memory per identity. Two paths sharing a stripe
/// only cause an extra `set_if_epoch` rejection, never a stale install.
#[derive(Debug)]
pub struct TokenStore {
    slots: DashMap<String, PathSlot>,
    epochs: Vec<AtomicU64>,
    stripe_hasher: RandomState,
    token_count: AtomicUsize,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            epochs: (0..EPOCH_STRIPES).map(|_| AtomicU64::new(0)).collect(),
            stripe_hasher: RandomState::new(),
            token_count: AtomicUsize::new(0),
        }
    }

    // == Get ==
    /// Returns the current token, or None if never set or since cleared.
    pub fn get(&self, id: &ResourceIdentity) -> Option<ValidatorToken> {
        self.slots
            .get(id.path())
            .and_then(|slot| slot.tokens.get(query_key(id)).cloned())
    }

    // == Set ==
    /// Replaces the stored token unconditionally (last write wins).
    pub fn set(&self, id: ResourceIdentity, token: ValidatorToken) {
        let mut slot = self.slots.entry(id.path().to_string()).or_default();
        self.insert(&mut slot, &id, token);
    }

    // == Clear ==
    /// Makes the entry absent, forcing regeneration on next access.
    ///
    /// Bumps the path's epoch before removing, so in-flight generations
    /// started before the clear cannot install their token afterwards.
    /// Clearing an absent identity allocates nothing.
    pub fn clear(&self, id: &ResourceIdentity) {
        self.bump_epoch(id);
        if let Some(mut slot) = self.slots.get_mut(id.path()) {
            if slot.tokens.remove(query_key(id)).is_some() {
                self.token_count.fetch_sub(1, Ordering::SeqCst);
            }
        }
        self.slots.remove_if(id.path(), |_, slot| slot.tokens.is_empty());
    }

    // == Clear Path ==
    /// Clears every identity sharing `id`'s path, whatever its query.
    pub fn clear_path(&self, id: &ResourceIdentity) {
        self.bump_epoch(id);
        if let Some((_, slot)) = self.slots.remove(id.path()) {
            self.token_count.fetch_sub(slot.tokens.len(), Ordering::SeqCst);
        }
    }

    // == Epoch ==
    /// Returns the invalidation counter covering the identity's path.
    pub fn epoch(&self, id: &ResourceIdentity) -> u64 {
        self.stripe(id).load(Ordering::SeqCst)
    }

    // == Snapshot ==
    /// Reads the token and epoch together under one entry lock.
    pub fn snapshot(&self, id: &ResourceIdentity) -> (Option<ValidatorToken>, u64) {
        match self.slots.get(id.path()) {
            Some(slot) => (slot.tokens.get(query_key(id)).cloned(), self.epoch(id)),
            None => (None, self.epoch(id)),
        }
    }

    // == Conditional Set ==
    /// Stores the token only if no clear happened since `epoch` was observed.
    ///
    /// Returns true if the token was stored.
    pub fn set_if_epoch(&self, id: ResourceIdentity, token: ValidatorToken, epoch: u64) -> bool {
        // Clears bump before they take the entry lock, so checking under the
        // lock sees every clear that could remove this token
        if self.epoch(&id) != epoch {
            return false;
        }
        let mut slot = self.slots.entry(id.path().to_string()).or_default();
        if self.epoch(&id) != epoch {
            let empty = slot.tokens.is_empty();
            drop(slot);
            if empty {
                self.slots.remove_if(id.path(), |_, slot| slot.tokens.is_empty());
            }
            return false;
        }
        self.insert(&mut slot, &id, token);
        true
    }

    // == Length ==
    /// Returns the number of identities currently holding a token.
    pub fn len(&self) -> usize {
        self.token_count.load(Ordering::SeqCst)
    }

    // == Is Empty ==
    /// Returns true if no identity holds a token.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of paths with at least one stored token.
    pub fn path_count(&self) -> usize {
        self.slots.len()
    }

    fn insert(&self, slot: &mut PathSlot, id: &ResourceIdentity, token: ValidatorToken) {
        if slot
            .tokens
            .insert(query_key(id).to_string(), token)
            .is_none()
        {
            self.token_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bump_epoch(&self, id: &ResourceIdentity) {
        self.stripe(id).fetch_add(1, Ordering::SeqCst);
    }

    fn stripe(&self, id: &ResourceIdentity) -> &AtomicU64 {
        let index = self.stripe_hasher.hash_one(id.path()) as usize % EPOCH_STRIPES;
        &self.epochs[index]
    }
}

fn query_key(id: &ResourceIdentity) -> &str {
    id.query().unwrap_or("")
}
