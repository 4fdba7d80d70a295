//! Default rules answering requests that no explicit rule matches.

use mockthereum_server::{RequestRule, RulePriority};
use serde_json::{Value, json};

use crate::{jsonrpc, rpc};

/// Error message for unmatched contract calls.
pub const UNMATCHED_CALL_MESSAGE: &str =
    "No Mockthereum rules found matching Ethereum contract call";
/// Error message for unmatched transactions.
pub const UNMATCHED_TRANSACTION_MESSAGE: &str =
    "No Mockthereum rules found matching Ethereum transaction";
/// Gas price returned when none is mocked.
pub const DEFAULT_GAS_PRICE: &str = "0x3e8";

/// The fallback rules installed when a node runs in stub mode.
pub fn stub_rules() -> Vec<RequestRule> {
    let errors = [
        ("eth_call", UNMATCHED_CALL_MESSAGE),
        ("eth_sendTransaction", UNMATCHED_TRANSACTION_MESSAGE),
        ("eth_sendRawTransaction", UNMATCHED_TRANSACTION_MESSAGE),
    ]
    .into_iter()
    .map(|(method, message)| {
        RequestRule::new(rpc::error_handler(jsonrpc::Error::new(message)))
            .with_matcher(rpc::call_matcher(method, Vec::new()))
    });

    let results = [
        ("eth_getTransactionReceipt", Value::Null),
        ("eth_getBalance", json!("0x0")),
        ("eth_blockNumber", json!("0x1")),
        ("eth_getBlockByNumber", Value::Null),
        ("eth_gasPrice", json!(DEFAULT_GAS_PRICE)),
    ]
    .into_iter()
    .map(|(method, result)| {
        RequestRule::new(rpc::result_handler(result))
            .with_matcher(rpc::call_matcher(method, Vec::new()))
    });

    errors
        .chain(results)
        .map(|rule| rule.with_priority(RulePriority::Fallback))
        .collect()
}
