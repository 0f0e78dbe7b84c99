//! Egress gzip compression for WSGI-style response triples.
//!
//! An egress filter runs after the application has produced a response
//! (status, ordered headers, body) and before the server writes it out.
//! [`CompressionFilter`] buffers the whole body, gzips it and rewrites
//! Content-Length and Content-Encoding to match.
//!
//! # Example
//!
//! ```
//! use egress_compression::{Body, CompressionFilter, Environ, Headers, Response};
//!
//! let filter = CompressionFilter::with_level(1).unwrap();
//! let environ = Environ::new().with("HTTP_ACCEPT_ENCODING", "gzip");
//! let headers: Headers = [("Content-Type", "text/plain"), ("Content-Length", "100")]
//!     .into_iter()
//!     .collect();
//!
//! let response = filter
//!     .apply(&environ, Response::new("200 OK", headers, Body::once(vec![b'a'; 100])))
//!     .unwrap();
//! assert!(response.headers.contains("content-encoding"));
//! ```
//!
//! # Compression Rules
//!
//! The filter will **not** compress responses when:
//! - The environ sets `wsgi.compression` to `false`
//! - The body is asynchronous ([`Body::Async`])
//! - `HTTP_ACCEPT_ENCODING` does not contain `gzip`
//! - `Content-Encoding` header is already set
//! - `Content-Type` is missing, is not `text/*` or `application/*`, or contains `zip`
//!
//! Those responses are returned exactly as received.
//!
//! # Response Modifications
//!
//! When compression is applied:
//! - `Content-Encoding: gzip` is appended
//! - `Content-Length` is replaced in place with the compressed size, or
//!   appended if the application did not set one
//! - The body is the gzip stream, yielded in 4096-byte chunks
//!
//! Compression should be the last stage of a [`FilterChain`], and applications
//! served through Tower can use [`EgressLayer`].

#![deny(missing_docs)]

mod body;
mod chain;
mod codec;
mod decision;
mod environ;
mod error;
mod filter;
mod future;
mod headers;
mod layer;
mod service;

pub use body::{Body, ChunkedBytes, Chunks, DEFAULT_CHUNK_SIZE, Deferred};
pub use chain::FilterChain;
pub use codec::{DEFAULT_LEVEL, Gzip, MAX_LEVEL, MIN_LEVEL, accepts_gzip};
pub use decision::{BypassReason, Decision, DecisionLog, TracingLog};
pub use environ::{ACCEPT_ENCODING, ASYNC, COMPRESSION, Environ, Value};
pub use error::Error;
pub use filter::{CompressionConfig, CompressionFilter, EgressFilter, Response};
pub use future::ResponseFuture;
pub use headers::Headers;
pub use layer::EgressLayer;
pub use service::EgressService;
