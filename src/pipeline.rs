//! Filter ordering and the terminal router, assembled once at startup.

use std::sync::Arc;

use tracing::info;

use crate::config::FilterConfig;
use crate::error::Error;
use crate::middleware::{self, BoxedFilter, Exchange, Filter, Next};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// An ordered list of global filters in front of a [`Router`].
///
/// ```rust,no_run
/// use streamgate::middleware::{SseHeaders, Trace};
/// use streamgate::{Pipeline, Router};
///
/// let pipeline = Pipeline::new(Router::new())
///     .filter(Trace)
///     .filter(SseHeaders);
/// ```
pub struct Pipeline {
    filters: Vec<BoxedFilter>,
    router: Router,
}

impl Pipeline {
    pub fn new(router: Router) -> Self {
        Self { filters: Vec::new(), router }
    }

    /// Builds a pipeline with `filters` run first to last.
    pub fn with_filters(router: Router, filters: Vec<BoxedFilter>) -> Self {
        Self { filters, router }
    }

    /// Builds a pipeline from the configured filter order.
    ///
    /// Fails on the first name that is not a built-in filter.
    pub fn from_config(router: Router, config: &FilterConfig) -> Result<Self, Error> {
        let filters = config.order.iter()
            .map(|name| middleware::by_name(name).ok_or_else(|| Error::UnknownFilter(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let pipeline = Self::with_filters(router, filters);
        info!(filters = ?pipeline.filter_names().collect::<Vec<_>>(), "filter chain assembled");
        Ok(pipeline)
    }

    /// Appends `filter` after those already registered.
    pub fn filter(mut self, filter: impl Filter) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|f| f.name())
    }

    /// Runs one request through every filter and the router.
    pub async fn handle(&self, req: Request) -> Result<Response, Error> {
        Next::new(&self.filters, &self.router).run(Exchange::new(req)).await
    }
}
