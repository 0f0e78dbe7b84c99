use crate::filter::CompressionFilter;
use crate::service::EgressService;
use std::sync::Arc;
use tower::Layer;

/// A Tower layer that runs an egress filter over an application's responses.
///
/// The wrapped service takes an [`Environ`](crate::Environ) and returns a
/// [`Response`](crate::Response).
#[derive(Debug)]
pub struct EgressLayer<F> {
    filter: Arc<F>,
}

impl EgressLayer<CompressionFilter> {
    /// Creates a layer with a default [`CompressionFilter`].
    pub fn new() -> Self {
        Self::with_filter(CompressionFilter::new())
    }
}

impl<F> EgressLayer<F> {
    /// Creates a layer running `filter`.
    pub fn with_filter(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }
}

impl Default for EgressLayer<CompressionFilter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Clone for EgressLayer<F> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
        }
    }
}

impl<S, F> Layer<S> for EgressLayer<F> {
    type Service = EgressService<S, F>;

    fn layer(&self, inner: S) -> Self::Service {
        EgressService::new(inner, self.filter.clone())
    }
}
