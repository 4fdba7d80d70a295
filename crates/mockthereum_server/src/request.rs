use hyper::{HeaderMap, Method, body::Bytes};
use serde_json::Value;
use uuid::Uuid;

/// An HTTP request as received by the mock server.
///
/// The body is buffered in full. If it is valid JSON, the parsed value is
/// kept alongside the raw bytes so matchers don't parse it repeatedly.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    id: Uuid,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    json: Option<Value>,
}

impl RecordedRequest {
    /// Constructs a new instance, parsing the body as JSON when possible.
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        let json = serde_json::from_slice(&body).ok();

        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            headers,
            body,
            json,
        }
    }

    /// Unique identifier of the request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, including the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// The body parsed as JSON, if it is valid JSON.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }
}
