//! Resource Identity Module
//!
//! Canonical keys for cacheable resources, derived from request URIs.

use std::fmt;

use axum::http::Uri;

// == Resource Identity ==
/// Canonical key identifying a cacheable resource.
///
/// Built from a request path plus its verbatim query string. Repeated slashes
/// collapse and a trailing slash is dropped, so `/widgets/1/` and `/widgets//1`
/// name the same resource as `/widgets/1`. Percent-encoded unreserved
/// characters are decoded (`/widgets/%31` is `/widgets/1`) and remaining
/// escapes are uppercased, matching how routers decode path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity(String);

impl ResourceIdentity {
    // == Constructors ==
    /// Normalizes a path (optionally carrying `?query`) into an identity.
    pub fn new(path_and_query: impl AsRef<str>) -> Self {
        let raw = path_and_query.as_ref();
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };

        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(normalize_segment)
            .collect();
        let mut key = String::with_capacity(raw.len() + 1);
        key.push('/');
        key.push_str(&segments.join("/"));

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            key.push('?');
            key.push_str(query);
        }

        Self(key)
    }

    /// Derives the identity of the resource a request URI addresses.
    ///
    /// Scheme and authority are ignored.
    pub fn from_uri(uri: &Uri) -> Self {
        match uri.path_and_query() {
            Some(pq) => Self::new(pq.as_str()),
            None => Self::new(uri.path()),
        }
    }

    // == Accessors ==
    /// Returns the canonical key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path portion, without any query string.
    pub fn path(&self) -> &str {
        match self.0.split_once('?') {
            Some((path, _)) => path,
            None => &self.0,
        }
    }

    /// Returns the query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.0.split_once('?').map(|(_, query)| query)
    }

    /// Returns the identity of the enclosing collection, if any.
    ///
    /// `/widgets/1` has parent `/widgets`. Top-level paths and the root have
    /// no parent.
    pub fn parent(&self) -> Option<Self> {
        let path = self.path();
        if path == "/" {
            return None;
        }
        match path.rsplit_once('/') {
            Some(("", _)) | None => None,
            Some((parent, _)) => Some(Self(parent.to_string())),
        }
    }
}

/// Decodes `%XX` escapes of unreserved characters and uppercases the rest.
fn normalize_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match (bytes[i], bytes.get(i + 1), bytes.get(i + 2)) {
            (b'%', Some(&hi), Some(&lo)) => hex_value(hi).zip(hex_value(lo)),
            _ => None,
        };
        match escaped {
            Some((hi, lo)) => {
                let decoded = hi << 4 | lo;
                if is_unreserved(decoded) {
                    out.push(decoded);
                } else {
                    out.push(b'%');
                    out.extend(bytes[i + 1..i + 3].iter().map(u8::to_ascii_uppercase));
                }
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    // Only ASCII sequences are rewritten, so the output stays valid UTF-8
    String::from_utf8(out).unwrap_or_else(|_| segment.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&Uri> for ResourceIdentity {
    fn from(uri: &Uri) -> Self {
        Self::from_uri(uri)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_plain_path() {
        assert_eq!(ResourceIdentity::new("/widgets/1").as_str(), "/widgets/1");
    }

    #[test]
    fn test_identity_normalizes_slashes() {
        assert_eq!(ResourceIdentity::new("/widgets/1/").as_str(), "/widgets/1");
        assert_eq!(ResourceIdentity::new("//widgets//1").as_str(), "/widgets/1");
        assert_eq!(ResourceIdentity::new("widgets/1").as_str(), "/widgets/1");
    }

    #[test]
    fn test_identity_root() {
        assert_eq!(ResourceIdentity::new("/").as_str(), "/");
        assert_eq!(ResourceIdentity::new("").as_str(), "/");
    }

    #[test]
    fn test_identity_keeps_query_verbatim() {
        let id = ResourceIdentity::new("/widgets/?page=2&size=10");
        assert_eq!(id.as_str(), "/widgets?page=2&size=10");
        assert_eq!(id.path(), "/widgets");
    }

    #[test]
    fn test_identity_decodes_unreserved_escapes() {
        assert_eq!(ResourceIdentity::new("/widgets/%31").as_str(), "/widgets/1");
        assert_eq!(ResourceIdentity::new("/%77idgets/1").as_str(), "/widgets/1");
        assert_eq!(ResourceIdentity::new("/widgets/a%7eb").as_str(), "/widgets/a~b");
    }

    #[test]
    fn test_identity_keeps_reserved_escapes() {
        assert_eq!(ResourceIdentity::new("/widgets/a%2fb").as_str(), "/widgets/a%2Fb");
        assert_eq!(ResourceIdentity::new("/widgets/a%2cb").as_str(), "/widgets/a%2Cb");
        assert_eq!(ResourceIdentity::new("/widgets/100%").as_str(), "/widgets/100%");
        assert_eq!(ResourceIdentity::new("/widgets/%zz").as_str(), "/widgets/%zz");
    }

    #[test]
    fn test_identity_query_accessor() {
        assert_eq!(ResourceIdentity::new("/widgets?page=2").query(), Some("page=2"));
        assert_eq!(ResourceIdentity::new("/widgets").query(), None);
    }

    #[test]
    fn test_identity_drops_empty_query() {
        assert_eq!(ResourceIdentity::new("/widgets?").as_str(), "/widgets");
    }

    #[test]
    fn test_identity_distinguishes_queries() {
        assert_ne!(
            ResourceIdentity::new("/widgets?page=1"),
            ResourceIdentity::new("/widgets?page=2")
        );
    }

    #[test]
    fn test_identity_from_uri_ignores_authority() {
        let uri: Uri = "http://example.com:8080/widgets/1?x=y".parse().unwrap();
        assert_eq!(ResourceIdentity::from_uri(&uri).as_str(), "/widgets/1?x=y");
    }

    #[test]
    fn test_identity_parent() {
        let id = ResourceIdentity::new("/widgets/1");
        assert_eq!(id.parent(), Some(ResourceIdentity::new("/widgets")));
        assert_eq!(ResourceIdentity::new("/widgets").parent(), None);
        assert_eq!(ResourceIdentity::new("/").parent(), None);
    }

    #[test]
    fn test_identity_parent_drops_query() {
        let id = ResourceIdentity::new("/widgets/1?verbose=true");
        assert_eq!(id.parent(), Some(ResourceIdentity::new("/widgets")));
    }
}
