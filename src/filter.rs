use crate::body::{Body, ChunkedBytes, DEFAULT_CHUNK_SIZE};
use crate::codec::{self, GZIP, Gzip};
use crate::decision::{BypassReason, Decision, DecisionLog, TracingLog};
use crate::environ::Environ;
use crate::error::Error;
use crate::headers::Headers;
use bytes::Bytes;
use http::header;
use std::fmt;
use std::sync::Arc;

/// Content-Type prefixes eligible for compression.
const COMPRESSIBLE_PREFIXES: [&[u8]; 2] = [b"text/", b"application/"];

/// A response as it travels through the egress chain.
#[derive(Debug)]
pub struct Response {
    /// Status line, passed through untouched.
    pub status: Bytes,
    /// Ordered response headers.
    pub headers: Headers,
    /// Response body.
    pub body: Body,
}

impl Response {
    /// Creates a response from its parts.
    pub fn new(status: impl Into<Bytes>, headers: impl Into<Headers>, body: Body) -> Self {
        Self {
            status: status.into(),
            headers: headers.into(),
            body,
        }
    }
}

/// A stage applied to a response after the application produced it.
pub trait EgressFilter: Send + Sync {
    /// Transforms `response`, or returns it as-is.
    fn filter(&self, environ: &Environ, response: Response) -> Result<Response, Error>;
}

impl<F> EgressFilter for F
where
    F: Fn(&Environ, Response) -> Result<Response, Error> + Send + Sync,
{
    fn filter(&self, environ: &Environ, response: Response) -> Result<Response, Error> {
        self(environ, response)
    }
}

/// Compression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompressionConfig {
    /// Gzip compression level, `0..=9`.
    pub level: u32,
    /// Size of the chunks the compressed body is yielded in.
    pub chunk_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: codec::DEFAULT_LEVEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Egress filter that gzip-compresses eligible responses.
///
/// The whole body is buffered and compressed before anything is returned,
/// because the new Content-Length has to be known up front. This should be
/// the last filter in a chain; the body is opaque once it has run.
///
/// A response is returned unchanged when, checked in this order:
/// - the environ sets `wsgi.compression` to `false`
/// - the body is asynchronous
/// - `HTTP_ACCEPT_ENCODING` does not contain `gzip`
/// - a `Content-Encoding` header is present
/// - `Content-Type` is missing, does not start with `text/` or
///   `application/`, or contains `zip`
///
/// Otherwise `Content-Encoding: gzip` is appended and Content-Length is
/// replaced in place, or appended when the application did not set one.
#[derive(Clone)]
pub struct CompressionFilter {
    gzip: Gzip,
    chunk_size: usize,
    log: Arc<dyn DecisionLog>,
}

impl CompressionFilter {
    /// Creates a filter at the default level (6).
    pub fn new() -> Self {
        Self {
            gzip: Gzip::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            log: Arc::new(TracingLog),
        }
    }

    /// Creates a filter at the given gzip level.
    pub fn with_level(level: u32) -> Result<Self, Error> {
        Ok(Self {
            gzip: Gzip::new(level)?,
            ..Self::new()
        })
    }

    /// Creates a filter from a configuration.
    pub fn from_config(config: CompressionConfig) -> Result<Self, Error> {
        Ok(Self::with_level(config.level)?.chunk_size(config.chunk_size))
    }

    /// Sets the size of the chunks the compressed body is yielded in.
    ///
    /// A size of zero is treated as one.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Sends decisions to `log` instead of `tracing`.
    pub fn log(mut self, log: impl DecisionLog + 'static) -> Self {
        self.log = Arc::new(log);
        self
    }

    /// The configured gzip level.
    pub fn level(&self) -> u32 {
        self.gzip.level()
    }

    /// The size of the chunks the compressed body is yielded in.
    pub fn output_chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compresses `response` if it is eligible.
    ///
    /// Fails with [`Error::InvalidContentLength`] when a declared
    /// Content-Length is not an integer; nothing is returned in that case.
    pub fn apply(&self, environ: &Environ, response: Response) -> Result<Response, Error> {
        if let Some(reason) = bypass_reason(environ, &response) {
            self.log.record(&Decision::Bypass(reason));
            return Ok(response);
        }

        let Response {
            status,
            mut headers,
            body,
        } = response;

        let original = headers
            .find(header::CONTENT_LENGTH.as_str())
            .map(|(index, value)| parse_content_length(value).map(|len| (index, len)))
            .transpose()?;

        headers.append("Content-Encoding", GZIP);

        let compressed = self.gzip.compress(body.into_chunks())?;
        let compressed_length = compressed.len() as u64;
        let length = Bytes::from(compressed_length.to_string());

        match original {
            Some((index, _)) => headers.replace(index, length),
            None => headers.append("Content-Length", length),
        }

        self.log.record(&Decision::Compressed {
            original_length: original.map(|(_, len)| len),
            compressed_length,
        });

        Ok(Response {
            status,
            headers,
            body: Body::Sync(Box::new(ChunkedBytes::new(compressed, self.chunk_size))),
        })
    }
}

impl Default for CompressionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompressionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionFilter")
            .field("level", &self.gzip.level())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl EgressFilter for CompressionFilter {
    fn filter(&self, environ: &Environ, response: Response) -> Result<Response, Error> {
        self.apply(environ, response)
    }
}

/// Runs the bypass checks in order, returning the first that applies.
fn bypass_reason(environ: &Environ, response: &Response) -> Option<BypassReason> {
    if environ.compression_disabled() {
        return Some(BypassReason::Disabled);
    }

    if response.body.is_async() {
        return Some(BypassReason::AsyncBody);
    }

    if !codec::accepts_gzip(environ.accept_encoding()) {
        return Some(BypassReason::NotAccepted);
    }

    if response.headers.contains(header::CONTENT_ENCODING.as_str()) {
        return Some(BypassReason::AlreadyEncoded);
    }

    match response.headers.find(header::CONTENT_TYPE.as_str()) {
        Some((_, ct)) if is_compressible_content_type(ct) => None,
        Some((_, ct)) => Some(BypassReason::UncompressibleType(Some(
            String::from_utf8_lossy(ct).into_owned(),
        ))),
        None => Some(BypassReason::UncompressibleType(None)),
    }
}

/// Checks for a text or application type that is not already an archive.
fn is_compressible_content_type(content_type: &[u8]) -> bool {
    !content_type.is_empty()
        && COMPRESSIBLE_PREFIXES
            .iter()
            .any(|prefix| content_type.starts_with(prefix))
        && !content_type.windows(3).any(|w| w == b"zip")
}

fn parse_content_length(value: &[u8]) -> Result<u64, Error> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::InvalidContentLength(String::from_utf8_lossy(value).into_owned()))
}
