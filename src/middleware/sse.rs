//! Unbuffered responses for server-sent event clients.
//!
//! nginx (and most proxies modelled on it) buffer upstream responses by
//! default, which holds SSE events back until a buffer fills. When a client
//! asks for `text/event-stream`, [`SseHeaders`] appends
//!
//! ```text
//! X-Accel-Buffering: no
//! Cache-Control: no-cache, no-store
//! ```
//!
//! to the response. Detection is a plain case-sensitive substring test on the
//! first `Accept` value, not media-type negotiation: `text/plain,
//! text/event-stream` matches, and so does `application/text/event-stream-ish`.
//! The test runs on the raw bytes, so obs-text elsewhere in the value does not
//! hide a match.

use http::header::{ACCEPT, CACHE_CONTROL, HeaderName, HeaderValue};
use memchr::memmem;
use tracing::debug;

use super::{BoxFuture, Exchange, Filter, Next};
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// nginx's per-response buffering switch.
pub const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

const EVENT_STREAM: &str = "text/event-stream";

/// Whether the first `Accept` value of `req` contains `text/event-stream`.
pub fn wants_event_stream(req: &Request) -> bool {
    req.headers()
        .get(ACCEPT)
        .is_some_and(|accept| memmem::find(accept.as_bytes(), EVENT_STREAM.as_bytes()).is_some())
}

/// Global filter registered as `sse_headers`.
///
/// Always delegates exactly once and returns the downstream result untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct SseHeaders;

impl Filter for SseHeaders {
    fn name(&self) -> &'static str { "sse_headers" }

    fn filter<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
        if wants_event_stream(exchange.request()) {
            debug!(path = exchange.request().path(), "disabling proxy buffering for event stream");
            let headers = exchange.response_headers_mut();
            headers.append(X_ACCEL_BUFFERING, HeaderValue::from_static("no"));
            headers.append(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        }
        next.run(exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use http::{Method, StatusCode};

    use crate::{Pipeline, Router};

    fn request(accept: Option<&str>) -> Request {
        let mut builder = http::Request::get("/stream");
        if let Some(value) = accept {
            builder = builder.header(ACCEPT, value);
        }
        builder.body(Bytes::new()).unwrap().into()
    }

    /// Pipeline with only `SseHeaders` in front of a handler that counts how
    /// often it runs.
    fn pipeline(calls: &Arc<AtomicUsize>) -> Pipeline {
        let calls = Arc::clone(calls);
        let router = Router::new().on(Method::GET, "/stream", move |_req: Request| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Response::text("data: hello\n\n")
            }
        });
        Pipeline::new(router).filter(SseHeaders)
    }

    async fn run(accept: Option<&str>) -> (Response, usize) {
        let calls = Arc::new(AtomicUsize::new(0));
        let res = pipeline(&calls).handle(request(accept)).await.unwrap();
        (res, calls.load(Ordering::SeqCst))
    }

    fn assert_decorated(res: &Response) {
        let buffering: Vec<_> = res.headers().get_all(&X_ACCEL_BUFFERING).iter().collect();
        let cache: Vec<_> = res.headers().get_all(CACHE_CONTROL).iter().collect();
        assert_eq!(buffering, ["no"]);
        assert_eq!(cache, ["no-cache, no-store"]);
    }

    fn assert_untouched(res: &Response) {
        assert!(!res.headers().contains_key(&X_ACCEL_BUFFERING));
        assert!(!res.headers().contains_key(CACHE_CONTROL));
    }

    #[tokio::test]
    async fn event_stream_is_decorated_once() {
        let (res, calls) = run(Some("text/event-stream")).await;
        assert_decorated(&res);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn event_stream_with_params_is_decorated() {
        let (res, _) = run(Some("text/event-stream;charset=utf-8")).await;
        assert_decorated(&res);
    }

    #[tokio::test]
    async fn event_stream_anywhere_in_list_is_decorated() {
        let (res, _) = run(Some("text/plain, text/event-stream")).await;
        assert_decorated(&res);
    }

    #[tokio::test]
    async fn substring_match_is_not_media_type_parsing() {
        let (res, _) = run(Some("application/text/event-stream-ish")).await;
        assert_decorated(&res);
    }

    #[tokio::test]
    async fn json_is_untouched() {
        let (res, calls) = run(Some("application/json")).await;
        assert_untouched(&res);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn missing_accept_is_untouched() {
        let (res, calls) = run(None).await;
        assert_untouched(&res);
        assert_eq!(calls, 1);
    }

    fn raw_accept(value: &'static [u8]) -> Request {
        http::Request::get("/stream")
            .header(ACCEPT, HeaderValue::from_bytes(value).unwrap())
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn non_ascii_accept_with_event_stream_is_decorated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let res = pipeline(&calls)
            .handle(raw_accept(b"text/event-stream; q=\xe9"))
            .await
            .unwrap();
        assert_decorated(&res);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_ascii_bytes_do_not_affect_matching() {
        assert!(!wants_event_stream(&raw_accept(b"text/html; q=\xe9")));
        assert!(wants_event_stream(&raw_accept(b"\xe9text/event-stream")));
    }

    #[tokio::test]
    async fn match_is_case_sensitive() {
        let (res, _) = run(Some("Text/Event-Stream")).await;
        assert_untouched(&res);
    }

    #[tokio::test]
    async fn only_first_accept_value_is_inspected() {
        let req: Request = http::Request::get("/stream")
            .header(ACCEPT, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(Bytes::new())
            .unwrap()
            .into();
        let calls = Arc::new(AtomicUsize::new(0));
        let res = pipeline(&calls).handle(req).await.unwrap();
        assert_untouched(&res);
    }

    #[tokio::test]
    async fn existing_cache_control_is_kept() {
        let router = Router::new().on(Method::GET, "/stream", |_req: Request| async {
            Response::builder()
                .header("cache-control", "max-age=60")
                .text("data: hi\n\n")
        });
        let pipeline = Pipeline::new(router).filter(SseHeaders);

        let res = pipeline.handle(request(Some("text/event-stream"))).await.unwrap();

        let cache: Vec<_> = res.headers().get_all(CACHE_CONTROL).iter().collect();
        assert_eq!(cache, ["max-age=60", "no-cache, no-store"]);
    }

    #[tokio::test]
    async fn downstream_failure_passes_through() {
        struct Fail;

        impl Filter for Fail {
            fn name(&self) -> &'static str { "fail" }

            fn filter<'a>(&'a self, _exchange: Exchange, _next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
                Box::pin(async { Err(Error::filter("fail", "upstream gone")) })
            }
        }

        let pipeline = Pipeline::new(Router::new()).filter(SseHeaders).filter(Fail);
        let err = pipeline.handle(request(Some("text/event-stream"))).await.unwrap_err();

        match err {
            Error::Filter { name, source } => {
                assert_eq!(name, "fail");
                assert_eq!(source.to_string(), "upstream gone");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn not_found_is_still_decorated() {
        let res = Pipeline::new(Router::new())
            .filter(SseHeaders)
            .handle(request(Some("text/event-stream")))
            .await
            .unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_decorated(&res);
    }
}
