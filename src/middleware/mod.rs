//! Filter chain.
//!
//! A filter sees every exchange before the router does, may append response
//! headers, and then hands the exchange to the rest of the chain through
//! [`Next`]. `Next` is consumed by [`Next::run`], so a filter cannot delegate
//! twice; filters that return without calling it short-circuit the chain.
//!
//! ```text
//! Server ─▶ Trace ─▶ SseHeaders ─▶ … ─▶ Router ─▶ handler
//!                                         │
//!   Response ◀── exchange headers appended ┘
//! ```
//!
//! Ordering is whatever the [`Pipeline`](crate::Pipeline) was built with,
//! either explicitly or from [`FilterConfig`](crate::config::FilterConfig).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::HeaderMap;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

mod sse;
mod trace;

pub use sse::{SseHeaders, X_ACCEL_BUFFERING, wants_event_stream};
pub use trace::Trace;

/// A boxed `Send` future borrowing from the chain for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A filter shared by every request the pipeline serves.
pub type BoxedFilter = Arc<dyn Filter>;

/// A global pipeline stage.
///
/// Implementations must hold no per-request state; one instance serves all
/// concurrent requests.
pub trait Filter: Send + Sync + 'static {
    /// Name used in logs and in [`FilterConfig::order`](crate::config::FilterConfig::order).
    fn name(&self) -> &'static str;

    /// Handles one exchange.
    ///
    /// A filter that lets the request through must call [`Next::run`] exactly
    /// once and return its future as-is, so downstream errors reach the
    /// caller unchanged. Response headers queued on the exchange before
    /// delegating are appended to the final response. Returning without
    /// calling `next` short-circuits the rest of the chain.
    fn filter<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>>;
}

/// Looks up a built-in filter by its configured name.
pub fn by_name(name: &str) -> Option<BoxedFilter> {
    match name {
        "sse_headers" => Some(Arc::new(SseHeaders)),
        "trace" => Some(Arc::new(Trace)),
        _ => None,
    }
}

// ── Exchange ──────────────────────────────────────────────────────────────────

/// A request in flight, together with the response headers filters have
/// queued for it.
///
/// Queued headers are appended to whatever response the endpoint produces;
/// they never replace a header the endpoint set.
pub struct Exchange {
    request: Request,
    response_headers: HeaderMap,
}

impl Exchange {
    pub fn new(request: Request) -> Self {
        Self { request, response_headers: HeaderMap::new() }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn response_headers(&self) -> &HeaderMap { &self.response_headers }
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap { &mut self.response_headers }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The remainder of the chain after the current filter.
pub struct Next<'a> {
    filters: &'a [BoxedFilter],
    router: &'a Router,
}

impl<'a> Next<'a> {
    pub(crate) fn new(filters: &'a [BoxedFilter], router: &'a Router) -> Self {
        Self { filters, router }
    }

    /// Passes the exchange to the next filter, or to the router once every
    /// filter has run. The result is returned as the downstream produced it.
    pub fn run(self, exchange: Exchange) -> BoxFuture<'a, Result<Response, Error>> {
        match self.filters.split_first() {
            Some((filter, rest)) => filter.filter(exchange, Next::new(rest, self.router)),
            None => {
                let router = self.router;
                Box::pin(async move {
                    let Exchange { request, response_headers } = exchange;
                    let mut response = router.route(request).await;
                    response.append_headers(&response_headers);
                    Ok(response)
                })
            }
        }
    }
}
