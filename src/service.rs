use crate::environ::Environ;
use crate::filter::{EgressFilter, Response};
use crate::future::ResponseFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Service};

/// A Tower service that filters the responses of the inner service.
#[derive(Debug)]
pub struct EgressService<S, F> {
    inner: S,
    filter: Arc<F>,
}

impl<S, F> EgressService<S, F> {
    /// Creates a new egress service wrapping the given inner service.
    pub fn new(inner: S, filter: Arc<F>) -> Self {
        Self { inner, filter }
    }

    /// Returns a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner service.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes this service, returning the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Clone, F> Clone for EgressService<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<S, F> Service<Environ> for EgressService<S, F>
where
    S: Service<Environ, Response = Response>,
    S::Error: Into<BoxError>,
    F: EgressFilter,
{
    type Response = Response;
    type Error = BoxError;
    type Future = ResponseFuture<S::Future, F>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, environ: Environ) -> Self::Future {
        // Cheap: clones share the environ's map
        let inner = self.inner.call(environ.clone());

        ResponseFuture::new(inner, environ, self.filter.clone())
    }
}
