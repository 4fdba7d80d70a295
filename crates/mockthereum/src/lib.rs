#![warn(missing_docs)]

//! Mock Ethereum nodes for testing.
//!
//! A [`MockNode`] serves JSON-RPC over HTTP. Tests declare how it should
//! answer balance queries, contract calls and transactions, and inspect the
//! requests it received:
//!
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! use mockthereum::{Address, MockNode};
//! use serde_json::json;
//!
//! let node = MockNode::default();
//! node.start().await?;
//!
//! let token: Address = "0x283af0b28c62c092c9727f1ee09c02ca627eb7f5".parse()?;
//! node.for_call(Some(token))
//!     .for_function("function balanceOf(address) returns (uint256)")?
//!     .then_return_value(json!(1000))?;
//!
//! // Point the code under test at `node.url()?`.
//!
//! node.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
mod config;
mod contract;
mod error;
pub mod jsonrpc;
mod node;
pub mod receipt;
pub mod rpc;
pub mod stub;

pub use alloy_primitives::{Address, B256, U256};
pub use mockthereum_abi::DynSolValue;
pub use mockthereum_server::{MockedEndpoint, RecordedRequest, ServerConfig};

pub use self::{
    builder::{
        CallRuleBuilder, ContractMethod, FailureOptions, ReturnValue, SingleValueRuleBuilder,
        TransactionRuleBuilder,
    },
    config::{NodeConfig, UnmatchedRequests},
    contract::{ContractRequest, MockedContract},
    error::{NodeError, RuleError},
    node::MockNode,
    receipt::ReceiptOverrides,
};
