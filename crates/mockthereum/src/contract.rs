use alloy_primitives::{Address, U256};
use mockthereum_abi::{DecodingError, DynSolValue, strip_selector};
use mockthereum_server::{MockedEndpoint, RecordedRequest};
use serde_json::Value;

use crate::rpc;

/// A contract call or transaction seen by a mocked contract rule.
#[derive(Clone, Debug)]
pub struct ContractRequest {
    /// The target contract, if the request named a valid address.
    pub to: Option<Address>,
    /// The sender, if the request named a valid address.
    pub from: Option<Address>,
    /// The value sent, if any.
    pub value: Option<U256>,
    /// The decoded call parameters, if the parameter types are known.
    pub params: Option<Vec<DynSolValue>>,
    /// The raw HTTP request.
    pub raw_request: RecordedRequest,
}

/// Handle to a contract rule, returned by the call and transaction builders.
#[derive(Clone, Debug)]
pub struct MockedContract {
    endpoint: MockedEndpoint,
    param_types: Option<Vec<String>>,
}

impl MockedContract {
    pub(crate) fn new(endpoint: MockedEndpoint, param_types: Option<Vec<String>>) -> Self {
        Self {
            endpoint,
            param_types,
        }
    }

    /// The underlying endpoint.
    pub fn endpoint(&self) -> &MockedEndpoint {
        &self.endpoint
    }

    /// The parameter types used to decode requests.
    pub fn param_types(&self) -> Option<&[String]> {
        self.param_types.as_deref()
    }

    /// The requests matched by the rule, in arrival order.
    ///
    /// Fails if the call data of a request does not decode as the parameter
    /// types of the rule.
    pub fn requests(&self) -> Result<Vec<ContractRequest>, DecodingError> {
        self.endpoint
            .seen_requests()
            .into_iter()
            .map(|request| self.parse_request(request))
            .collect()
    }

    fn parse_request(
        &self,
        raw_request: RecordedRequest,
    ) -> Result<ContractRequest, DecodingError> {
        let transaction = rpc::transaction_param(&raw_request);
        let field = |name: &str| {
            transaction
                .and_then(|transaction| transaction.get(name))
                .and_then(Value::as_str)
        };

        let params = match (&self.param_types, rpc::call_data(&raw_request)) {
            (Some(types), Some(data)) => {
                let encoded = strip_selector(data).unwrap_or_default();
                Some(mockthereum_abi::decode(types, encoded)?)
            }
            _ => None,
        };

        Ok(ContractRequest {
            to: field("to").and_then(|to| to.parse().ok()),
            from: field("from").and_then(|from| from.parse().ok()),
            value: field("value").and_then(|value| value.parse().ok()),
            params,
            raw_request,
        })
    }
}
