//! # streamgate
//!
//! A minimal gateway filter chain for services behind a buffering reverse
//! proxy.
//!
//! ## The problem
//!
//! nginx buffers upstream responses by default. For a server-sent event
//! stream that means events sit in a proxy buffer instead of reaching the
//! client. The fix is two response headers, sent only when the client asked
//! for an event stream:
//!
//! ```text
//! X-Accel-Buffering: no
//! Cache-Control: no-cache, no-store
//! ```
//!
//! [`middleware::SseHeaders`] adds them. Everything else here exists to run
//! that filter: an ordered [`Pipeline`] of global filters, a radix-tree
//! [`Router`] as the terminal stage, and a hyper [`Server`] with graceful
//! shutdown.
//!
//! What streamgate intentionally leaves to the proxy or the application:
//! upstream forwarding, load balancing, retries, TLS, rate limiting, and the
//! SSE wire format itself.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use streamgate::middleware::{SseHeaders, Trace};
//! use streamgate::{ContentType, Method, Pipeline, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), streamgate::Error> {
//!     let app = Router::new().on(Method::GET, "/events", events);
//!     let pipeline = Pipeline::new(app).filter(Trace).filter(SseHeaders);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(pipeline).await
//! }
//!
//! async fn events(_req: Request) -> Response {
//!     Response::builder().bytes(ContentType::EventStream, "data: hello\n\n")
//! }
//! ```

mod error;
mod handler;
mod pipeline;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod middleware;

pub use config::Config;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use pipeline::Pipeline;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
