//! Matchers and handlers for JSON-RPC traffic.

use std::future;

use mockthereum_server::{
    CallbackResponse, HandlerError, JsonBodyFlexibleMatcher, MockResponse, RecordedRequest,
    RequestHandler, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde_json::{Map, Value};

use crate::jsonrpc::{self, Id, ResponseData, Version};

/// Matches JSON-RPC requests for `method`.
///
/// The provided `params` are matched positionally against a prefix of the
/// request parameters. Object parameters only need to contain the provided
/// keys.
pub fn call_matcher(method: &str, params: Vec<Value>) -> JsonBodyFlexibleMatcher {
    let mut expected = Map::new();
    expected.insert("jsonrpc".to_owned(), Value::String("2.0".to_owned()));
    expected.insert("method".to_owned(), Value::String(method.to_owned()));

    // Clients may omit `params` entirely when there are none.
    if !params.is_empty() {
        expected.insert("params".to_owned(), Value::Array(params));
    }

    JsonBodyFlexibleMatcher::new(Value::Object(expected))
}

/// Responds with a fixed JSON-RPC result, echoing the request id.
pub fn result_handler(result: Value) -> RequestHandler {
    RequestHandler::callback(move |request: RecordedRequest| {
        future::ready(result_response(&request, result.clone()).map(CallbackResponse::new))
    })
}

/// Responds with a fixed JSON-RPC error, echoing the request id.
pub fn error_handler(error: jsonrpc::Error) -> RequestHandler {
    RequestHandler::callback(move |request: RecordedRequest| {
        future::ready(error_response(&request, error.clone()).map(CallbackResponse::new))
    })
}

/// Builds a JSON-RPC result response to `request`.
pub fn result_response(
    request: &RecordedRequest,
    result: Value,
) -> Result<MockResponse, HandlerError> {
    respond(request, ResponseData::Success { result })
}

/// Builds a JSON-RPC error response to `request`.
pub fn error_response(
    request: &RecordedRequest,
    error: jsonrpc::Error,
) -> Result<MockResponse, HandlerError> {
    respond(request, ResponseData::Error { error })
}

fn respond(
    request: &RecordedRequest,
    data: ResponseData<Value>,
) -> Result<MockResponse, HandlerError> {
    let response = jsonrpc::Response {
        jsonrpc: Version::V2_0,
        id: request_id(request),
        data,
    };

    let body = serde_json::to_vec(&response).map_err(|error| {
        HandlerError::new(format!("Failed to serialize JSON-RPC response: {error}"))
    })?;

    Ok(MockResponse::new(StatusCode::OK)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .with_body(body))
}

/// The id of a JSON-RPC request, if it has a valid one.
pub fn request_id(request: &RecordedRequest) -> Option<Id> {
    match request.json()?.get("id")? {
        Value::Number(number) => Some(Id::Num(number.clone())),
        Value::String(id) => Some(Id::Str(id.clone())),
        _ => None,
    }
}

/// The first positional parameter, if it is an object.
///
/// For `eth_call` and `eth_sendTransaction` this is the transaction object.
pub fn transaction_param(request: &RecordedRequest) -> Option<&Map<String, Value>> {
    request
        .json()?
        .get("params")?
        .as_array()?
        .first()?
        .as_object()
}

/// The call data of a transaction object request.
///
/// Read from `data`, falling back to `input` which newer clients send
/// instead.
pub fn call_data(request: &RecordedRequest) -> Option<&str> {
    let transaction = transaction_param(request)?;
    transaction
        .get("data")
        .or_else(|| transaction.get("input"))?
        .as_str()
}
