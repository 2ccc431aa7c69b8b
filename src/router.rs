//! Radix-tree request router.
//!
//! The terminal stage of every [`Pipeline`](crate::Pipeline): once all
//! filters have delegated, the router picks the endpoint. One tree per HTTP
//! method, O(path-length) lookup.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and hand it to [`Pipeline::new`](crate::Pipeline::new).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax:
    ///
    /// ```rust,no_run
    /// # use streamgate::{Method, Request, Response, Router};
    /// # async fn events(_: Request) -> Response { Response::text("") }
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET, "/events",     events)
    ///     .on(Method::GET, "/users/{id}", get_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with an
    /// existing route for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((Arc::clone(matched.value), params))
    }

    /// Runs the matching endpoint, or answers `404 Not Found`.
    pub(crate) async fn route(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn get(path: &str) -> Request {
        http::Request::get(path).body(Bytes::new()).unwrap().into()
    }

    async fn user(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    #[tokio::test]
    async fn routes_with_params() {
        let router = Router::new().on(Method::GET, "/users/{id}", user);
        let res = router.route(get("/users/7")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"user 7");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let router = Router::new().on(Method::GET, "/users/{id}", user);
        assert_eq!(router.route(get("/nope")).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn method_mismatch_is_404() {
        let router = Router::new().on(Method::POST, "/users/{id}", user);
        assert_eq!(router.route(get("/users/1")).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/users/{id}", user)
            .on(Method::GET, "/users/{name}", user);
    }
}
