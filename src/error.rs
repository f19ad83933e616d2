//! Unified error type.

use thiserror::Error;

/// The error type returned by strand's fallible operations.
///
/// Application-level failures (404, 500, etc.) are written to the
/// [`ResponseWriter`](crate::ResponseWriter), not returned as `Error`s. This
/// type surfaces infrastructure failures: resolving the listen address,
/// binding to it, or accepting connections.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}
