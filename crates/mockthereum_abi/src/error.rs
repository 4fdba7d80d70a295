/// An error that occurs while ABI-encoding values.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The number of values differs from the number of types.
    #[error("Expected {types} values to match the provided ABI types, but got {values}")]
    ArityMismatch {
        /// Number of types
        types: usize,
        /// Number of values
        values: usize,
    },
    /// A type string could not be parsed.
    #[error("Invalid ABI type '{ty}'")]
    InvalidType {
        /// The type string
        ty: String,
        /// The parser error
        source: alloy_dyn_abi::Error,
    },
    /// A value does not have the shape of its declared type.
    #[error("Value {value} cannot be encoded as '{ty}': {reason}")]
    InvalidValue {
        /// The declared type
        ty: String,
        /// The offending value
        value: serde_json::Value,
        /// Why the value was rejected
        reason: String,
    },
}

/// An error that occurs while decoding ABI-encoded data.
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    /// The data is not valid hex.
    #[error("Invalid hex data: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// A type string could not be parsed.
    #[error("Invalid ABI type '{ty}'")]
    InvalidType {
        /// The type string
        ty: String,
        /// The parser error
        source: alloy_dyn_abi::Error,
    },
    /// The data does not decode as the provided types.
    #[error("Failed to decode data as {types}: {source}")]
    Abi {
        /// The tuple of types the data was decoded as
        types: String,
        /// The decoder error
        source: alloy_dyn_abi::Error,
    },
}

/// An error that occurs when a function signature cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Invalid function signature '{signature}': {message}")]
pub struct SignatureError {
    /// The signature as provided by the caller
    pub signature: String,
    /// The parser message
    pub message: String,
}
