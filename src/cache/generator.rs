//! Token Generator Module
//!
//! Pluggable policies for computing validator tokens from resource state.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::cache::{ResourceIdentity, ValidatorToken};
use crate::error::GenerationError;

// == Token Generator ==
/// Computes a validator token for a resource's current representation.
///
/// Two calls against unchanged content must yield identical tokens; a call
/// after a content change must yield a different one. Implementations may
/// block on I/O and are run off the async executor.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, id: &ResourceIdentity) -> Result<ValidatorToken, GenerationError>;
}

impl<F> TokenGenerator for F
where
    F: Fn(&ResourceIdentity) -> Result<ValidatorToken, GenerationError> + Send + Sync,
{
    fn generate(&self, id: &ResourceIdentity) -> Result<ValidatorToken, GenerationError> {
        self(id)
    }
}

// == Representation Source ==
/// Supplies the current serialized representation of a resource.
pub trait RepresentationSource: Send + Sync {
    fn representation(&self, id: &ResourceIdentity) -> Result<Vec<u8>, GenerationError>;
}

impl<S: RepresentationSource + ?Sized> RepresentationSource for Arc<S> {
    fn representation(&self, id: &ResourceIdentity) -> Result<Vec<u8>, GenerationError> {
        (**self).representation(id)
    }
}

// == Content Hash Generator ==
/// Hashes the representation bytes with SHA-256 into a lowercase hex token.
#[derive(Debug, Clone)]
pub struct ContentHashGenerator<S> {
    source: S,
}

impl<S: RepresentationSource> ContentHashGenerator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the underlying representation source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: RepresentationSource> TokenGenerator for ContentHashGenerator<S> {
    fn generate(&self, id: &ResourceIdentity) -> Result<ValidatorToken, GenerationError> {
        let bytes = self.source.representation(id)?;
        Ok(hash_token(&bytes))
    }
}

/// Token for a byte representation under the content-hash policy.
pub fn hash_token(bytes: &[u8]) -> ValidatorToken {
    ValidatorToken::new(hex::encode(Sha256::digest(bytes)))
}
