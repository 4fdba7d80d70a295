use std::{io, net::SocketAddr};

/// An error that occurs while managing the lifecycle of a [`crate::MockServer`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The server was started while it was already starting or running.
    #[error("The mock server has already been started")]
    AlreadyStarted,
    /// The operation requires a running server.
    #[error("The mock server is not running")]
    NotRunning,
    /// The listening socket could not be created.
    #[error("Failed to bind the mock server to {address}: {source}")]
    Bind {
        /// The requested address
        address: SocketAddr,
        /// The underlying I/O error
        source: io::Error,
    },
    /// A URL could not be constructed or parsed.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

/// An error returned by a callback handler.
///
/// The server answers the request with HTTP 500 and logs the message.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Constructs a new instance with the provided message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
