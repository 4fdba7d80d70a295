//! Synthetic transaction receipts.

use serde_json::{Map, Value, json};

/// Fields to set on a synthesized receipt, on top of the defaults.
pub type ReceiptOverrides = Map<String, Value>;

/// The outcome of a mocked transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// The transaction was mined and succeeded.
    Success,
    /// The transaction was mined and reverted.
    Revert,
}

/// Builds the receipt of a mocked transaction.
///
/// `from` and `to` are copied from the submitted transaction object. Entries
/// in `overrides` replace the defaults.
pub fn build_receipt(
    outcome: TransactionOutcome,
    transaction_hash: &str,
    from: Value,
    to: Value,
    overrides: &ReceiptOverrides,
) -> Map<String, Value> {
    let (status, transaction_type) = match outcome {
        TransactionOutcome::Success => ("0x1", "0x0"),
        TransactionOutcome::Revert => ("0x", "0x2"),
    };

    let mut receipt = Map::new();
    for (key, value) in [
        ("status", json!(status)),
        ("transactionHash", json!(transaction_hash)),
        ("blockNumber", json!("0x100")),
        ("blockHash", json!("0x1")),
        ("from", from),
        ("to", to),
        ("cumulativeGasUsed", json!("0x1")),
        ("gasUsed", json!("0x1")),
        ("effectiveGasPrice", json!("0x0")),
        ("contractAddress", Value::Null),
        ("logs", json!([])),
        ("logsBloom", json!("0x0")),
        ("type", json!(transaction_type)),
    ] {
        receipt.insert(key.to_owned(), value);
    }

    receipt.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    receipt
}
