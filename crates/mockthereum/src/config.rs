use mockthereum_server::ServerConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// How requests that match no rule are handled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnmatchedRequests {
    /// Answer with deterministic stub values.
    #[default]
    Stub,
    /// Forward to a real node.
    ProxyTo(Url),
}

/// Configuration of a [`crate::MockNode`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeConfig {
    /// Handling of unmatched requests
    pub unmatched_requests: UnmatchedRequests,
    /// The listening socket
    pub server: ServerConfig,
}
