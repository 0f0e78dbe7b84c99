use crate::environ::Environ;
use crate::error::Error;
use crate::filter::{EgressFilter, Response};
use std::fmt;
use std::sync::Arc;

/// An ordered list of egress filters.
///
/// Each stage receives the previous stage's output. Stages run in the order
/// they were pushed; put compression last.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn EgressFilter>>,
}

impl FilterChain {
    /// Creates an empty chain, which returns responses unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage to the end of the chain.
    pub fn push(mut self, filter: impl EgressFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl EgressFilter for FilterChain {
    fn filter(&self, environ: &Environ, response: Response) -> Result<Response, Error> {
        self.filters
            .iter()
            .try_fold(response, |response, stage| stage.filter(environ, response))
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}
