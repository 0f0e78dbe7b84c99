use std::io;

/// Errors produced while applying an egress filter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured gzip level is outside `0..=9`.
    #[error("invalid gzip compression level {0}, expected 0..=9")]
    InvalidLevel(u32),

    /// The response declared a Content-Length that is not an integer.
    #[error("invalid Content-Length header value {0:?}")]
    InvalidContentLength(String),

    /// The gzip encoder failed.
    #[error("gzip compression failed")]
    Compression(#[source] io::Error),
}
