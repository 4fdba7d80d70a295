use std::sync::Arc;

use alloy_primitives::Address;
use mockthereum_server::{MockServer, RecordedRequest};
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;

use crate::{
    CallRuleBuilder, NodeConfig, NodeError, SingleValueRuleBuilder, TransactionRuleBuilder,
    UnmatchedRequests, jsonrpc, stub,
};

/// A mocked Ethereum node.
///
/// Rules are declared with the `for_*` builders. Requests that match no rule
/// get stub values, or are proxied to a real node, depending on the
/// [`NodeConfig`].
#[derive(Clone, Debug)]
pub struct MockNode {
    config: NodeConfig,
    server: MockServer,
    seen_requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockNode {
    /// Constructs a stopped node.
    pub fn new(config: NodeConfig) -> Self {
        let server = MockServer::new(config.server.clone());

        Self {
            config,
            server,
            seen_requests: Arc::default(),
        }
    }

    /// Starts the node with a clean set of default rules.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn start(&self) -> Result<(), NodeError> {
        self.server.start().await?;

        self.server.reset();
        self.seen_requests.lock().clear();

        let seen_requests = Arc::clone(&self.seen_requests);
        self.server.on_request(move |request| {
            seen_requests.lock().push(request.clone());
        });

        self.install_defaults();

        Ok(())
    }

    /// Stops the node, dropping all rules.
    ///
    /// Seen requests remain available until the node is started again.
    pub async fn stop(&self) -> Result<(), NodeError> {
        self.server.stop().await?;
        Ok(())
    }

    /// Removes all rules and seen requests, then reinstalls the default
    /// rules.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn reset(&self) {
        self.server.reset();
        self.seen_requests.lock().clear();
        self.install_defaults();
    }

    /// The HTTP URL of the node.
    pub fn url(&self) -> Result<Url, NodeError> {
        Ok(self.server.url()?)
    }

    /// The configuration of the node.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Mocks `eth_getBalance`, for `address` or for any address.
    pub fn for_balance(&self, address: Option<Address>) -> SingleValueRuleBuilder {
        let params = address
            .map(|address| vec![Value::String(hex::encode_prefixed(address))])
            .unwrap_or_default();

        SingleValueRuleBuilder::new(self.server.clone(), "eth_getBalance", params)
    }

    /// Mocks `eth_blockNumber`.
    pub fn for_block_number(&self) -> SingleValueRuleBuilder {
        SingleValueRuleBuilder::new(self.server.clone(), "eth_blockNumber", Vec::new())
    }

    /// Mocks `eth_gasPrice`.
    pub fn for_gas_price(&self) -> SingleValueRuleBuilder {
        SingleValueRuleBuilder::new(self.server.clone(), "eth_gasPrice", Vec::new())
    }

    /// Mocks `eth_call`, to the contract at `address` or to any contract.
    pub fn for_call(&self, address: Option<Address>) -> CallRuleBuilder {
        CallRuleBuilder::new(self.server.clone(), address)
    }

    /// Mocks `eth_sendTransaction` to any address.
    pub fn for_send_transaction(&self) -> TransactionRuleBuilder {
        TransactionRuleBuilder::new(self.server.clone(), None)
    }

    /// Mocks `eth_sendTransaction` to `address`.
    pub fn for_send_transaction_to(&self, address: Address) -> TransactionRuleBuilder {
        TransactionRuleBuilder::new(self.server.clone(), Some(address))
    }

    /// The JSON-RPC requests received since the node was started or reset,
    /// in arrival order. Requests that are not valid JSON-RPC are skipped.
    pub fn seen_requests(&self) -> Vec<jsonrpc::Request> {
        self.seen_requests
            .lock()
            .iter()
            .filter_map(|request| serde_json::from_value(request.json()?.clone()).ok())
            .collect()
    }

    /// The seen JSON-RPC requests for `method`.
    pub fn seen_method_calls(&self, method: &str) -> Vec<jsonrpc::Request> {
        self.seen_requests()
            .into_iter()
            .filter(|request| request.method == method)
            .collect()
    }

    fn install_defaults(&self) {
        match &self.config.unmatched_requests {
            UnmatchedRequests::Stub => {
                self.server.add_request_rules(stub::stub_rules());
            }
            UnmatchedRequests::ProxyTo(url) => {
                log::debug!("Proxying unmatched requests to {url}");
                self.server.for_unmatched_request().then_forward_to(url.clone());
            }
        }
    }
}

impl Default for MockNode {
    fn default() -> Self {
        Self::new(NodeConfig::default())
    }
}
