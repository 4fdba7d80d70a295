//! JSON-RPC 2.0 envelope types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Error code used by mocked error responses unless overridden.
pub const DEFAULT_ERROR_CODE: i64 = -32099;

/// The JSON-RPC version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    /// Version 2.0
    #[serde(rename = "2.0")]
    V2_0,
}

/// Request identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id, which may be negative or fractional
    Num(Number),
    /// String id
    Str(String),
}

/// A JSON-RPC request as sent by a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// The JSON-RPC version
    pub jsonrpc: Version,
    /// The request id. Absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// The method name
    pub method: String,
    /// Positional parameters. Absent and `null` params are both empty.
    #[serde(default, deserialize_with = "deserialize_params")]
    pub params: Vec<Value>,
}

fn deserialize_params<'de, DeserializerT>(
    deserializer: DeserializerT,
) -> Result<Vec<Value>, DeserializerT::Error>
where
    DeserializerT: Deserializer<'de>,
{
    Option::<Vec<Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A JSON-RPC response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// The JSON-RPC version
    pub jsonrpc: Version,
    /// The id of the request. `null` if it could not be determined.
    pub id: Option<Id>,
    /// The result or error
    #[serde(flatten)]
    pub data: ResponseData<T>,
}

/// The payload of a JSON-RPC response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData<T> {
    /// An error
    Error {
        /// The error
        error: Error,
    },
    /// A successful result
    Success {
        /// The result
        result: T,
    },
}

/// A JSON-RPC error object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    /// The error code
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data, such as an ABI-encoded revert reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The error name, as reported by development nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Error {
    /// Constructs an error with the default code and `"0x"` data.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: DEFAULT_ERROR_CODE,
            message: message.into(),
            data: Some(Value::String("0x".to_owned())),
            name: None,
        }
    }

    /// Sets the code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Sets the data.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
