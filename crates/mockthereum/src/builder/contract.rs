use std::sync::Arc;

use alloy_primitives::Address;
use mockthereum_abi::{FunctionSignature, strip_selector};
use mockthereum_server::{
    CallbackMatcher, MockServer, RecordedRequest, RequestHandler, RequestMatcher, RequestRule,
};
use serde_json::{Value, json};

use crate::{MockedContract, RuleError, rpc};

/// The RPC method a contract rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractMethod {
    /// `eth_call`
    Call,
    /// `eth_sendTransaction`
    SendTransaction,
}

impl ContractMethod {
    /// The JSON-RPC method name.
    pub fn rpc_method(self) -> &'static str {
        match self {
            ContractMethod::Call => "eth_call",
            ContractMethod::SendTransaction => "eth_sendTransaction",
        }
    }
}

/// Matchers shared by the call and transaction rule builders.
#[derive(Clone, Debug)]
pub(crate) struct ContractRule {
    server: MockServer,
    method: ContractMethod,
    matchers: Vec<Arc<dyn RequestMatcher>>,
    param_types: Option<Vec<String>>,
    return_types: Option<Vec<String>>,
}

impl ContractRule {
    pub fn new(server: MockServer, method: ContractMethod, target: Option<Address>) -> Self {
        let params = target
            .map(|address| vec![json!({ "to": hex::encode_prefixed(address) })])
            .unwrap_or_default();

        let matcher: Arc<dyn RequestMatcher> =
            Arc::new(rpc::call_matcher(method.rpc_method(), params));

        Self {
            server,
            method,
            matchers: vec![matcher],
            param_types: None,
            return_types: None,
        }
    }

    pub fn for_function(mut self, signature: &str) -> Result<Self, RuleError> {
        let signature = FunctionSignature::parse(signature)?;
        let selector = signature.selector_hex();

        self.param_types = Some(signature.inputs().to_vec());
        self.return_types = signature.outputs().map(<[String]>::to_vec);

        self.matchers.push(Arc::new(CallbackMatcher::new(
            format!("call data starts with {selector}"),
            move |request: &RecordedRequest| {
                rpc::call_data(request)
                    .and_then(|data| data.get(..selector.len()))
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&selector))
            },
        )));

        Ok(self)
    }

    pub fn with_params(self, values: &[Value]) -> Result<Self, RuleError> {
        let types = self.param_types.clone().ok_or_else(|| {
            RuleError::Argument(
                "If no function signature was provided with for_function, parameters must be \
                 provided with with_typed_params"
                    .to_owned(),
            )
        })?;

        self.match_params(types, values)
    }

    pub fn with_typed_params<TypeT: AsRef<str>>(
        self,
        types: &[TypeT],
        values: &[Value],
    ) -> Result<Self, RuleError> {
        let types = types.iter().map(|ty| ty.as_ref().to_owned()).collect();
        self.match_params(types, values)
    }

    fn match_params(mut self, types: Vec<String>, values: &[Value]) -> Result<Self, RuleError> {
        let encoded = mockthereum_abi::encode(&types, values)?;
        let expected = encoded
            .strip_prefix("0x")
            .unwrap_or(&encoded)
            .to_owned();

        self.matchers.push(Arc::new(CallbackMatcher::new(
            format!("call parameters equal 0x{expected}"),
            move |request: &RecordedRequest| {
                rpc::call_data(request)
                    .and_then(strip_selector)
                    .is_some_and(|params| params.eq_ignore_ascii_case(&expected))
            },
        )));
        // Remembered so seen requests can be decoded.
        self.param_types = Some(types);

        Ok(self)
    }

    pub fn return_types(&self) -> Option<&[String]> {
        self.return_types.as_deref()
    }

    pub fn then_timeout(self) -> MockedContract {
        self.register(RequestHandler::Timeout)
    }

    pub fn then_close_connection(self) -> MockedContract {
        self.register(RequestHandler::CloseConnection)
    }

    pub fn register(self, handler: RequestHandler) -> MockedContract {
        log::debug!(
            "Adding {} rule with {} matchers",
            self.method.rpc_method(),
            self.matchers.len()
        );

        let endpoint = self
            .server
            .add_request_rule(RequestRule::new(handler).with_matchers(self.matchers));

        MockedContract::new(endpoint, self.param_types)
    }
}
