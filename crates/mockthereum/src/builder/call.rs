use alloy_primitives::Address;
use mockthereum_server::MockServer;
use serde_json::Value;

use super::{ContractMethod, ContractRule};
use crate::{MockedContract, RuleError, jsonrpc, rpc};

/// The value a mocked contract call returns.
#[derive(Clone, Debug, PartialEq)]
pub enum ReturnValue {
    /// A single value, encoded as the output types of the function.
    Value(Value),
    /// Values encoded as the output types of the function.
    Values(Vec<Value>),
    /// A single value of an explicit type.
    Typed {
        /// The Solidity type
        ty: String,
        /// The value
        value: Value,
    },
    /// Values of explicit types.
    TypedValues {
        /// The Solidity types
        types: Vec<String>,
        /// The values
        values: Vec<Value>,
    },
}

/// Builds a rule for `eth_call` requests.
#[derive(Clone, Debug)]
pub struct CallRuleBuilder {
    rule: ContractRule,
}

impl CallRuleBuilder {
    pub(crate) fn new(server: MockServer, target: Option<Address>) -> Self {
        Self {
            rule: ContractRule::new(server, ContractMethod::Call, target),
        }
    }

    /// Only matches calls to the function with the provided signature, e.g.
    /// `function balanceOf(address) external view returns (uint256)`.
    ///
    /// The parameter and return types of the signature are used by
    /// [`Self::with_params`] and the untyped return operations.
    pub fn for_function(self, signature: &str) -> Result<Self, RuleError> {
        Ok(Self {
            rule: self.rule.for_function(signature)?,
        })
    }

    /// Only matches calls with the provided parameters, encoded as the
    /// parameter types of [`Self::for_function`].
    pub fn with_params(self, values: &[Value]) -> Result<Self, RuleError> {
        Ok(Self {
            rule: self.rule.with_params(values)?,
        })
    }

    /// Only matches calls with the provided parameters of explicit types.
    pub fn with_typed_params<TypeT: AsRef<str>>(
        self,
        types: &[TypeT],
        values: &[Value],
    ) -> Result<Self, RuleError> {
        Ok(Self {
            rule: self.rule.with_typed_params(types, values)?,
        })
    }

    /// Returns an ABI-encoded value.
    pub fn then_return(self, value: ReturnValue) -> Result<MockedContract, RuleError> {
        let (types, values) = match value {
            ReturnValue::Value(value) => (self.declared_outputs()?, vec![value]),
            ReturnValue::Values(values) => (self.declared_outputs()?, values),
            ReturnValue::Typed { ty, value } => (vec![ty], vec![value]),
            ReturnValue::TypedValues { types, values } => (types, values),
        };

        let encoded = mockthereum_abi::encode(&types, &values)?;
        Ok(self.rule.register(rpc::result_handler(Value::String(encoded))))
    }

    /// Returns a single value, encoded as the declared output type.
    pub fn then_return_value(self, value: Value) -> Result<MockedContract, RuleError> {
        self.then_return(ReturnValue::Value(value))
    }

    /// Returns values, encoded as the declared output types.
    pub fn then_return_values(self, values: Vec<Value>) -> Result<MockedContract, RuleError> {
        self.then_return(ReturnValue::Values(values))
    }

    /// Returns a single value of an explicit type.
    pub fn then_return_typed_value(
        self,
        ty: impl Into<String>,
        value: Value,
    ) -> Result<MockedContract, RuleError> {
        self.then_return(ReturnValue::Typed {
            ty: ty.into(),
            value,
        })
    }

    /// Returns values of explicit types.
    pub fn then_return_typed<TypeT: AsRef<str>>(
        self,
        types: &[TypeT],
        values: Vec<Value>,
    ) -> Result<MockedContract, RuleError> {
        self.then_return(ReturnValue::TypedValues {
            types: types.iter().map(|ty| ty.as_ref().to_owned()).collect(),
            values,
        })
    }

    /// Reverts with a Solidity `Error(string)` reason.
    pub fn then_revert(self, message: &str) -> MockedContract {
        let error = jsonrpc::Error::new(format!(
            "VM Exception while processing transaction: revert {message}"
        ))
        .with_name("CallError")
        .with_data(mockthereum_abi::encode_revert_reason(message));

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

    fn declared_outputs(&self) -> Result<Vec<String>, RuleError> {
        self.rule.return_types().map(<[String]>::to_vec).ok_or_else(|| {
            RuleError::Argument(
                "Return values without explicit types require for_function to be called with \
                 a return signature"
                    .to_owned(),
            )
        })
    }
}
