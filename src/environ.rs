use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// Environ key carrying the client's Accept-Encoding header.
pub const ACCEPT_ENCODING: &str = "HTTP_ACCEPT_ENCODING";

/// Environ key the application sets to `false` to opt out of compression.
pub const COMPRESSION: &str = "wsgi.compression";

/// Environ key marking an asynchronous response.
pub const ASYNC: &str = "wsgi.async";

/// A single environ value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw bytes, e.g. a header value.
    Bytes(Bytes),
    /// A boolean flag.
    Bool(bool),
}

impl Value {
    /// Returns the bytes of a `Bytes` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            Value::Bool(_) => None,
        }
    }

    /// Returns true only for an explicit `false`.
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Bool(false))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&'static [u8]> for Value {
    fn from(value: &'static [u8]) -> Self {
        Value::Bytes(Bytes::from_static(value))
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

/// Request metadata handed to egress filters.
///
/// Keys are case-sensitive. Filters only read from it. Clones share the
/// underlying map until one of them is modified.
#[derive(Debug, Clone, Default)]
pub struct Environ {
    vars: Arc<HashMap<String, Value>>,
}

impl Environ {
    /// Creates an empty environ.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` and returns the environ, for building in one expression.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        Arc::make_mut(&mut self.vars).insert(key.into(), value.into())
    }

    /// Looks up `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Whether the application explicitly turned compression off.
    pub fn compression_disabled(&self) -> bool {
        self.get(COMPRESSION).is_some_and(Value::is_false)
    }

    /// The Accept-Encoding value, empty when absent or not bytes.
    pub fn accept_encoding(&self) -> &[u8] {
        self.get(ACCEPT_ENCODING)
            .and_then(Value::as_bytes)
            .unwrap_or_default()
    }

    /// Whether the response was flagged as asynchronous.
    pub fn is_async(&self) -> bool {
        matches!(self.get(ASYNC), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_enabled_by_default() {
        assert!(!Environ::new().compression_disabled());
        assert!(!Environ::new().with(COMPRESSION, true).compression_disabled());
    }

    #[test]
    fn test_compression_disabled_only_by_false() {
        assert!(Environ::new().with(COMPRESSION, false).compression_disabled());
        // Bytes are never treated as a falsy override
        assert!(!Environ::new().with(COMPRESSION, "").compression_disabled());
    }

    #[test]
    fn test_accept_encoding() {
        assert_eq!(Environ::new().accept_encoding(), b"");
        assert_eq!(
            Environ::new()
                .with(ACCEPT_ENCODING, "gzip, br")
                .accept_encoding(),
            b"gzip, br"
        );
        assert_eq!(
            Environ::new().with(ACCEPT_ENCODING, true).accept_encoding(),
            b""
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let environ = Environ::new().with("http_accept_encoding", "gzip");
        assert_eq!(environ.accept_encoding(), b"");
        assert!(environ.get("http_accept_encoding").is_some());
    }

    #[test]
    fn test_clone_shares_until_modified() {
        let environ = Environ::new().with(ACCEPT_ENCODING, "gzip");
        let mut copy = environ.clone();
        assert!(Arc::ptr_eq(&environ.vars, &copy.vars));

        copy.insert(COMPRESSION, false);
        assert!(!Arc::ptr_eq(&environ.vars, &copy.vars));
        assert!(copy.compression_disabled());
        assert!(!environ.compression_disabled());
        assert_eq!(environ.accept_encoding(), b"gzip");
    }

    #[test]
    fn test_async_flag() {
        assert!(!Environ::new().is_async());
        assert!(Environ::new().with(ASYNC, true).is_async());
    }
}
