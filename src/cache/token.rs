//! Validator Token Module
//!
//! Opaque strong validators (ETags) and their header framing.

use std::fmt;

// == Validator Token ==
/// Opaque string identifying a resource's content state.
///
/// Comparison is exact string equality (strong validator semantics).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatorToken(String);

impl ValidatorToken {
    /// Wraps an opaque token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the unframed token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // == Header Framing ==
    /// Renders the token as a quoted entity-tag for the `ETag` header.
    pub fn to_header_value(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Extracts the client validator from a raw `If-None-Match` value.
    ///
    /// A single quoted strong tag is unquoted. Anything else (weak tags, lists,
    /// `*`, bare values) is returned trimmed but otherwise verbatim, so it can
    /// only match a stored token by exact string equality.
    pub fn client_validator(header: &str) -> &str {
        let trimmed = header.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            let inner = &trimmed[1..trimmed.len() - 1];
            if !inner.contains('"') {
                return inner;
            }
        }
        trimmed
    }
}

impl fmt::Display for ValidatorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ValidatorToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ValidatorToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for ValidatorToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
