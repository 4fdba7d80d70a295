use std::future;

use alloy_primitives::{Address, B256};
use mockthereum_server::{
    CallbackResponse, HandlerError, MockServer, RecordedRequest, RequestHandler, RequestRule,
};
use serde_json::Value;

use super::{ContractMethod, ContractRule};
use crate::{
    MockedContract, RuleError, jsonrpc,
    receipt::{ReceiptOverrides, TransactionOutcome, build_receipt},
    rpc,
};

/// Overrides of the error returned by
/// [`TransactionRuleBuilder::then_fail_immediately`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FailureOptions {
    /// The error code
    pub code: Option<i64>,
    /// The error data
    pub data: Option<Value>,
    /// The error name
    pub name: Option<String>,
}

/// Builds a rule for `eth_sendTransaction` requests.
#[derive(Clone, Debug)]
pub struct TransactionRuleBuilder {
    rule: ContractRule,
}

impl TransactionRuleBuilder {
    pub(crate) fn new(server: MockServer, target: Option<Address>) -> Self {
        Self {
            rule: ContractRule::new(server, ContractMethod::SendTransaction, target),
        }
    }

    /// Only matches transactions calling the function with the provided
    /// signature.
    pub fn for_function(self, signature: &str) -> Result<Self, RuleError> {
        Ok(Self {
            rule: self.rule.for_function(signature)?,
        })
    }

    /// Only matches transactions with the provided parameters, encoded as
    /// the parameter types of [`Self::for_function`].
    pub fn with_params(self, values: &[Value]) -> Result<Self, RuleError> {
        Ok(Self {
            rule: self.rule.with_params(values)?,
        })
    }

    /// Only matches transactions with the provided parameters of explicit
    /// types.
    pub fn with_typed_params<TypeT: AsRef<str>>(
        self,
        types: &[TypeT],
        values: &[Value],
    ) -> Result<Self, RuleError> {
        Ok(Self {
            rule: self.rule.with_typed_params(types, values)?,
        })
    }

    /// Accepts the transaction and serves a successful receipt for it.
    pub fn then_succeed(self, overrides: ReceiptOverrides) -> MockedContract {
        self.rule
            .register(submission_handler(TransactionOutcome::Success, overrides))
    }

    /// Accepts the transaction and serves a reverted receipt for it.
    pub fn then_revert(self, overrides: ReceiptOverrides) -> MockedContract {
        self.rule
            .register(submission_handler(TransactionOutcome::Revert, overrides))
    }

    /// Rejects the transaction with a JSON-RPC error. No receipt is served.
    pub fn then_fail_immediately(
        self,
        message: impl Into<String>,
        options: FailureOptions,
    ) -> MockedContract {
        let FailureOptions { code, data, name } = options;

        let mut error = jsonrpc::Error::new(message);
        if let Some(code) = code {
            error = error.with_code(code);
        }
        if let Some(data) = data {
            error = error.with_data(data);
        }
        if let Some(name) = name {
            error = error.with_name(name);
        }

        self.rule.register(rpc::error_handler(error))
    }

    /// Never responds.
    pub fn then_timeout(self) -> MockedContract {
        self.rule.then_timeout()
    }

    /// Closes the connection without responding.
    pub fn then_close_connection(self) -> MockedContract {
        self.rule.then_close_connection()
    }
}

fn submission_handler(outcome: TransactionOutcome, overrides: ReceiptOverrides) -> RequestHandler {
    RequestHandler::callback(move |request: RecordedRequest| {
        future::ready(submit_transaction(&request, outcome, &overrides))
    })
}

/// Responds with a fresh transaction hash and registers the rule serving
/// its receipt. The server adds the rule before the response is sent.
fn submit_transaction(
    request: &RecordedRequest,
    outcome: TransactionOutcome,
    overrides: &ReceiptOverrides,
) -> Result<CallbackResponse, HandlerError> {
    let transaction_hash = hex::encode_prefixed(B256::random());

    let transaction = rpc::transaction_param(request);
    let field = |name: &str| {
        transaction
            .and_then(|transaction| transaction.get(name))
            .cloned()
            .unwrap_or(Value::Null)
    };

    let receipt = build_receipt(
        outcome,
        &transaction_hash,
        field("from"),
        field("to"),
        overrides,
    );

    log::debug!("Mocking {outcome:?} receipt for transaction {transaction_hash}");

    let receipt_rule = RequestRule::new(rpc::result_handler(Value::Object(receipt))).with_matcher(
        rpc::call_matcher(
            "eth_getTransactionReceipt",
            vec![Value::String(transaction_hash.clone())],
        ),
    );

    let response = rpc::result_response(request, Value::String(transaction_hash))?;
    Ok(CallbackResponse::new(response).with_rule(receipt_rule))
}
