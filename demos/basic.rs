//! Minimal streamgate gateway — one event stream, one JSON endpoint.
//!
//! Run with:
//!   RUST_LOG=streamgate=debug cargo run --example basic -- demos/gateway.toml
//!
//! Try:
//!   curl -i -H 'accept: text/event-stream' http://localhost:3000/events
//!   curl -i http://localhost:3000/users/42

use streamgate::{Config, ContentType, Method, Pipeline, Request, Response, Router, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), streamgate::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "streamgate=info".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let app = Router::new()
        .on(Method::GET, "/events",     events)
        .on(Method::GET, "/users/{id}", get_user);

    let pipeline = Pipeline::from_config(app, &config.filters)?;

    Server::from_config(&config.server)?
        .serve(pipeline)
        .await
}

// GET /events
//
// The body is a fixed pair of events; the point is the headers the
// sse_headers filter puts on it when the client sends
// `accept: text/event-stream`.
async fn events(_req: Request) -> Response {
    Response::builder().bytes(
        ContentType::EventStream,
        "event: tick\ndata: 1\n\nevent: tick\ndata: 2\n\n",
    )
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}
