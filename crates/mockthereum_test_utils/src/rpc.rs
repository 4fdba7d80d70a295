use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Errors returned by [`RpcClient`].
#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    /// The request failed at the HTTP level, e.g. because the connection was
    /// closed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The node answered with a JSON-RPC error.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// The error code
        code: i64,
        /// The error message
        message: String,
        /// Additional data
        data: Option<Value>,
        /// The error name
        name: Option<String>,
    },
    /// The response was neither a result nor an error.
    #[error("Invalid JSON-RPC response: {0}")]
    InvalidResponse(Value),
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    name: Option<String>,
}

/// A minimal JSON-RPC client for talking to a mock node in tests.
#[derive(Debug)]
pub struct RpcClient {
    url: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Constructs a client for the node at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Sends a request and returns the full response envelope.
    pub async fn send(&self, method: &str, params: Value) -> Result<Value, RpcClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        self.send_raw(&request).await
    }

    /// Sends `request` as the body verbatim and returns the response body.
    ///
    /// Useful for envelopes [`RpcClient::send`] can't produce, such as
    /// custom ids.
    pub async fn send_raw(&self, request: &Value) -> Result<Value, RpcClientError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response)
    }

    /// Sends a request and returns its result, converting JSON-RPC errors to
    /// [`RpcClientError::JsonRpc`].
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcClientError> {
        let mut response = self.send(method, params).await?;

        if let Some(error) = response.get_mut("error").map(Value::take) {
            let error: ErrorObject = serde_json::from_value(error.clone())
                .map_err(|_error| RpcClientError::InvalidResponse(error))?;

            return Err(RpcClientError::JsonRpc {
                code: error.code,
                message: error.message,
                data: error.data,
                name: error.name,
            });
        }

        match response.get_mut("result").map(Value::take) {
            Some(result) => Ok(result),
            None => Err(RpcClientError::InvalidResponse(response)),
        }
    }
}
