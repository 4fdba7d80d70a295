//! Fluent builders for mock rules.

mod call;
mod contract;
mod single_value;
mod transaction;

pub(crate) use self::contract::ContractRule;
pub use self::{
    call::{CallRuleBuilder, ReturnValue},
    contract::ContractMethod,
    single_value::SingleValueRuleBuilder,
    transaction::{FailureOptions, TransactionRuleBuilder},
};
