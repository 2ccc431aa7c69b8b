//! Per-request span with method, path, status and latency.

use std::time::Instant;

use tracing::{Instrument, Span, field, info, info_span, warn};

use super::{BoxFuture, Exchange, Filter, Next};
use crate::error::Error;
use crate::response::Response;

/// Global filter registered as `trace`.
///
/// Put it first so the span covers every later filter and the handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Filter for Trace {
    fn name(&self) -> &'static str { "trace" }

    fn filter<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
        let req = exchange.request();
        let span = info_span!(
            "request",
            method = %req.method(),
            path = req.path(),
            status = field::Empty,
        );
        let start = Instant::now();

        let fut = async move {
            let result = next.run(exchange).await;
            let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
            match &result {
                Ok(res) => {
                    Span::current().record("status", res.status_code().as_u16());
                    info!(latency_us, "request completed");
                }
                Err(e) => warn!(latency_us, error = %e, "request failed"),
            }
            result
        };
        Box::pin(fut.instrument(span))
    }
}
