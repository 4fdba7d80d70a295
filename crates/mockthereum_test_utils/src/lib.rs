//! Test utilities shared by the Mockthereum crates.

mod rpc;
mod tracing;

pub use rpc::{RpcClient, RpcClientError};
pub use tracing::init_tracing_for_tests;
