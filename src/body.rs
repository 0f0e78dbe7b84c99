use bytes::Bytes;
use std::fmt;

/// Default size of the chunks yielded from a compressed buffer.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A finite sequence of body chunks, possibly produced lazily.
pub type Chunks = Box<dyn Iterator<Item = Bytes> + Send>;

/// A producer that yields the body once the response is ready.
pub type Deferred = Box<dyn FnOnce() -> Chunks + Send>;

/// A response body.
///
/// An `Async` body marks a response whose content is not available yet; it
/// is handed around untouched until the server invokes it.
pub enum Body {
    /// Chunks that can be drained right away.
    Sync(Chunks),
    /// A deferred producer of chunks.
    Async(Deferred),
}

impl Body {
    /// Creates a body from any iterator of chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes> + 'static,
        I::IntoIter: Send + 'static,
    {
        Body::Sync(Box::new(chunks.into_iter().map(Into::<Bytes>::into)))
    }

    /// Creates a body holding a single chunk.
    pub fn once(chunk: impl Into<Bytes>) -> Self {
        Body::Sync(Box::new(std::iter::once(chunk.into())))
    }

    /// Creates an asynchronous body from a producer.
    pub fn deferred<F, I>(producer: F) -> Self
    where
        F: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Body::Async(Box::new(move || Box::new(producer().into_iter()) as Chunks))
    }

    /// Returns whether this body is deferred.
    pub fn is_async(&self) -> bool {
        matches!(self, Body::Async(_))
    }

    /// Returns the chunks, invoking a deferred producer if needed.
    pub fn into_chunks(self) -> Chunks {
        match self {
            Body::Sync(chunks) => chunks,
            Body::Async(producer) => producer(),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Sync(_) => f.write_str("Body::Sync(..)"),
            Body::Async(_) => f.write_str("Body::Async(..)"),
        }
    }
}

/// Yields a buffer in fixed-size slices until it is exhausted.
///
/// Slices share the buffer's allocation.
#[derive(Debug, Clone)]
pub struct ChunkedBytes {
    remaining: Bytes,
    chunk_size: usize,
}

impl ChunkedBytes {
    /// Creates a reader over `buf` yielding at most `chunk_size` bytes at a time.
    pub fn new(buf: Bytes, chunk_size: usize) -> Self {
        Self {
            remaining: buf,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl Iterator for ChunkedBytes {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.remaining.is_empty() {
            return None;
        }
        let at = self.chunk_size.min(self.remaining.len());
        Some(self.remaining.split_to(at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.len().div_ceil(self.chunk_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ChunkedBytes {}
