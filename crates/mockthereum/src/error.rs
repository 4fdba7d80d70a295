use mockthereum_abi::{EncodingError, SignatureError};
use mockthereum_server::ServerError;

/// An error that occurs while building a rule.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The builder was used with missing or inconsistent arguments.
    #[error("{0}")]
    Argument(String),
    /// Parameters or return values could not be ABI-encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// A function signature could not be parsed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// An error that occurs while managing a [`crate::MockNode`].
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The underlying mock server failed.
    #[error(transparent)]
    Server(#[from] ServerError),
}
