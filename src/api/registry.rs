//! Mutation Registry
//!
//! Declarative table of which routes mutate which resources, plus the key
//! policy reads are cached under.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::{Method, Uri};

use crate::cache::ResourceIdentity;

/// Maps a request URI to the identities a mutation on it affects.
pub type IdentityExtractor = Arc<dyn Fn(&Uri) -> Vec<ResourceIdentity> + Send + Sync>;

/// Maps a read request URI to the identity its token is stored under.
pub type KeyExtractor = Arc<dyn Fn(&Uri) -> ResourceIdentity + Send + Sync>;

/// Keys reads on normalized path plus query string.
pub fn uri_key() -> KeyExtractor {
    Arc::new(ResourceIdentity::from_uri)
}

/// Keys reads on normalized path only, for resources that ignore the query.
///
/// Stops arbitrary query strings from each claiming a token.
pub fn path_key() -> KeyExtractor {
    Arc::new(|uri: &Uri| ResourceIdentity::new(uri.path()))
}

// == Mutation Binding ==
/// Marks an operation as resource-mutating and names what it invalidates.
#[derive(Clone)]
pub struct MutationBinding {
    extractor: IdentityExtractor,
}

impl MutationBinding {
    /// Invalidates only the resource the request URI addresses.
    pub fn resource() -> Self {
        Self::custom(|uri| vec![ResourceIdentity::from_uri(uri)])
    }

    /// Invalidates the addressed resource and its enclosing collection.
    pub fn resource_and_parent() -> Self {
        Self::custom(|uri| {
            let id = ResourceIdentity::from_uri(uri);
            let parent = id.parent();
            std::iter::once(id).chain(parent).collect()
        })
    }

    /// Uses a caller-supplied extraction function.
    pub fn custom<F>(extractor: F) -> Self
    where
        F: Fn(&Uri) -> Vec<ResourceIdentity> + Send + Sync + 'static,
    {
        Self {
            extractor: Arc::new(extractor),
        }
    }

    /// Identities affected by a mutation on `uri`.
    pub fn affected(&self, uri: &Uri) -> Vec<ResourceIdentity> {
        (self.extractor)(uri)
    }
}

impl fmt::Debug for MutationBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationBinding").finish_non_exhaustive()
    }
}

// == Mutation Registry ==
/// Operations keyed by method and route pattern (e.g. `PUT /widgets/:id`).
///
/// Routes absent from the registry are treated as non-mutating.
#[derive(Debug, Clone, Default)]
pub struct MutationRegistry {
    bindings: HashMap<(Method, String), MutationBinding>,
}

impl MutationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mutating operation, replacing any earlier binding.
    pub fn bind(mut self, method: Method, route: impl Into<String>, binding: MutationBinding) -> Self {
        self.bindings.insert((method, route.into()), binding);
        self
    }

    /// Returns the binding for an operation, if it mutates.
    pub fn lookup(&self, method: &Method, route: &str) -> Option<&MutationBinding> {
        self.bindings.get(&(method.clone(), route.to_string()))
    }

    /// Returns true if the operation is registered as mutating.
    pub fn is_mutating(&self, method: &Method, route: &str) -> bool {
        self.lookup(method, route).is_some()
    }

    /// Returns the number of registered operations.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no operation is registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(raw: &str) -> Uri {
        raw.parse().unwrap()
    }

    #[test]
    fn test_registry_lookup() {
        let registry = MutationRegistry::new()
            .bind(Method::PUT, "/widgets/:id", MutationBinding::resource())
            .bind(Method::DELETE, "/widgets/:id", MutationBinding::resource());

        assert!(registry.is_mutating(&Method::PUT, "/widgets/:id"));
        assert!(registry.is_mutating(&Method::DELETE, "/widgets/:id"));
        assert!(!registry.is_mutating(&Method::GET, "/widgets/:id"));
        assert!(!registry.is_mutating(&Method::PUT, "/gadgets/:id"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_empty_registry() {
        let registry = MutationRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(&Method::POST, "/widgets").is_none());
    }

    #[test]
    fn test_resource_binding() {
        let affected = MutationBinding::resource().affected(&uri("/widgets/1"));
        assert_eq!(affected, vec![ResourceIdentity::new("/widgets/1")]);
    }

    #[test]
    fn test_resource_and_parent_binding() {
        let binding = MutationBinding::resource_and_parent();

        assert_eq!(
            binding.affected(&uri("/widgets/1")),
            vec![
                ResourceIdentity::new("/widgets/1"),
                ResourceIdentity::new("/widgets")
            ]
        );
        assert_eq!(
            binding.affected(&uri("/widgets")),
            vec![ResourceIdentity::new("/widgets")]
        );
    }

    #[test]
    fn test_key_extractors() {
        let request = uri("/widgets/1/?verbose=true");

        assert_eq!(
            uri_key()(&request),
            ResourceIdentity::new("/widgets/1?verbose=true")
        );
        assert_eq!(path_key()(&request), ResourceIdentity::new("/widgets/1"));
        assert_eq!(
            path_key()(&uri("/widgets/%31")),
            ResourceIdentity::new("/widgets/1")
        );
    }

    #[test]
    fn test_custom_binding() {
        let binding = MutationBinding::custom(|_| vec![ResourceIdentity::new("/catalog")]);
        assert_eq!(
            binding.affected(&uri("/widgets/3")),
            vec![ResourceIdentity::new("/catalog")]
        );
    }
}
