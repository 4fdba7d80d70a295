#![warn(missing_docs)]

//! A programmable HTTP server for tests.
//!
//! Requests are matched against dynamically registered [`RequestRule`]s,
//! each pairing a set of [`RequestMatcher`]s with a [`RequestHandler`]. Rules
//! can reply with canned or computed responses, forward to another server,
//! hang forever or drop the connection.

mod config;
mod error;
mod handler;
mod matcher;
mod request;
mod rule;
mod server;

pub use hyper::{HeaderMap, Method, StatusCode, body::Bytes, header};
pub use url::Url;

pub use self::{
    config::ServerConfig,
    error::{HandlerError, ServerError},
    handler::{CallbackResponse, MockResponse, RequestHandler, ResponseCallback},
    matcher::{CallbackMatcher, JsonBodyFlexibleMatcher, RequestMatcher, json_subset_matches},
    request::RecordedRequest,
    rule::{MockedEndpoint, RequestRule, RulePriority},
    server::{MockServer, UnmatchedRequestBuilder},
};
