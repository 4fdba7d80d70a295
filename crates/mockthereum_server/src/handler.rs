use std::{fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt as _};
use hyper::{
    HeaderMap, StatusCode,
    body::Bytes,
    header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use serde_json::Value;
use url::Url;

use crate::{HandlerError, RecordedRequest, RequestRule};

/// A canned HTTP response.
#[derive(Clone, Debug)]
pub struct MockResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl MockResponse {
    /// Constructs an empty response with the provided status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Constructs a `200 OK` response with a JSON body.
    pub fn json(value: &Value) -> Self {
        Self::new(StatusCode::OK)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(value.to_string())
    }

    /// Constructs a plain text response.
    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(text.into())
    }

    /// Sets a header, replacing any existing value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// The result of a callback handler: the response to send and rules to
/// register before the response is written.
#[derive(Debug)]
pub struct CallbackResponse {
    /// The response
    pub response: MockResponse,
    /// Follow-up rules
    pub rules: Vec<RequestRule>,
}

impl CallbackResponse {
    /// Constructs a response without follow-up rules.
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            rules: Vec::new(),
        }
    }

    /// Adds a follow-up rule.
    pub fn with_rule(mut self, rule: RequestRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Type of a callback handler.
pub type ResponseCallback = Arc<
    dyn Fn(RecordedRequest) -> BoxFuture<'static, Result<CallbackResponse, HandlerError>>
        + Send
        + Sync,
>;

/// How a rule responds to the requests it matches.
#[derive(Clone)]
pub enum RequestHandler {
    /// Reply with a canned response.
    Reply(MockResponse),
    /// Compute the response, optionally registering follow-up rules.
    Callback(ResponseCallback),
    /// Accept the request and never respond.
    Timeout,
    /// Accept the request, then close the connection without responding.
    CloseConnection,
    /// Forward the request to another server and relay its response.
    Forward(Url),
}

impl RequestHandler {
    /// Constructs a [`RequestHandler::Callback`] from an async function.
    pub fn callback<FutureT>(
        callback: impl Fn(RecordedRequest) -> FutureT + Send + Sync + 'static,
    ) -> Self
    where
        FutureT: Future<Output = Result<CallbackResponse, HandlerError>> + Send + 'static,
    {
        Self::Callback(Arc::new(
            move |request: RecordedRequest| -> BoxFuture<'static, _> { callback(request).boxed() },
        ))
    }
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply(response) => f.debug_tuple("Reply").field(response).finish(),
            Self::Callback(_) => f.write_str("Callback"),
            Self::Timeout => f.write_str("Timeout"),
            Self::CloseConnection => f.write_str("CloseConnection"),
            Self::Forward(url) => f.debug_tuple("Forward").field(url).finish(),
        }
    }
}

impl From<MockResponse> for RequestHandler {
    fn from(response: MockResponse) -> Self {
        Self::Reply(response)
    }
}
