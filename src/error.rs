//! Unified error type.

use std::net::AddrParseError;

/// Boxed error for failures raised by user-supplied filters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by streamgate's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding a port, reading configuration, or a
/// filter deciding that an exchange cannot continue.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unknown filter `{0}` in configured order")]
    UnknownFilter(String),

    #[error("failed to read request body: {0}")]
    Body(#[source] hyper::Error),

    /// A filter failed the exchange. Filters that merely delegate never
    /// produce this; it travels back through them unchanged.
    #[error("filter `{name}` failed: {source}")]
    Filter {
        name: &'static str,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Wraps an arbitrary error as a failure of the named filter.
    pub fn filter(name: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Filter { name, source: source.into() }
    }
}
