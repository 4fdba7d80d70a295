use alloy_primitives::U256;
use mockthereum_server::{
    JsonBodyFlexibleMatcher, MockServer, MockedEndpoint, RequestHandler, RequestRule,
};
use serde_json::Value;

use crate::{jsonrpc, rpc};

/// Builds a rule for a method returning a single quantity, such as
/// `eth_getBalance` or `eth_blockNumber`.
#[derive(Clone, Debug)]
pub struct SingleValueRuleBuilder {
    server: MockServer,
    matcher: JsonBodyFlexibleMatcher,
}

impl SingleValueRuleBuilder {
    pub(crate) fn new(server: MockServer, method: &str, params: Vec<Value>) -> Self {
        Self {
            server,
            matcher: rpc::call_matcher(method, params),
        }
    }

    /// Returns the value as a hex quantity.
    pub fn then_return(self, value: U256) -> MockedEndpoint {
        self.register(rpc::result_handler(Value::String(format!("0x{value:x}"))))
    }

    /// Returns a JSON-RPC error.
    pub fn then_error(self, message: impl Into<String>) -> MockedEndpoint {
        self.register(rpc::error_handler(jsonrpc::Error::new(message)))
    }

    /// Never responds.
    pub fn then_timeout(self) -> MockedEndpoint {
        self.register(RequestHandler::Timeout)
    }

    /// Closes the connection without responding.
    pub fn then_close_connection(self) -> MockedEndpoint {
        self.register(RequestHandler::CloseConnection)
    }

    fn register(self, handler: RequestHandler) -> MockedEndpoint {
        log::debug!("Adding single value rule: {:?}", self.matcher.expected());

        self.server
            .add_request_rule(RequestRule::new(handler).with_matcher(self.matcher))
    }
}
