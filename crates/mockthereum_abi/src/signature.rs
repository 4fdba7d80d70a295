use core::str::FromStr;

use alloy_json_abi::Function;
use alloy_primitives::Selector;

use crate::SignatureError;

/// A parsed Solidity function signature.
///
/// Accepts human-readable signatures such as
/// `function getText(string key) public view returns (string)` as well as the
/// canonical `getText(string)` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    canonical: String,
    inputs: Vec<String>,
    outputs: Option<Vec<String>>,
    selector: Selector,
}

impl FunctionSignature {
    /// Parses a human-readable function signature.
    pub fn parse(signature: &str) -> Result<Self, SignatureError> {
        let trimmed = signature.trim();
        let function = Function::parse(trimmed).map_err(|error| SignatureError {
            signature: signature.to_owned(),
            message: error.to_string(),
        })?;

        let inputs = function
            .inputs
            .iter()
            .map(|param| param.selector_type().into_owned())
            .collect();

        // Without a `returns` clause the outputs are unknown rather than empty.
        let outputs = has_returns_clause(trimmed).then(|| {
            function
                .outputs
                .iter()
                .map(|param| param.selector_type().into_owned())
                .collect()
        });

        Ok(Self {
            canonical: function.signature(),
            inputs,
            outputs,
            selector: function.selector(),
        })
    }

    /// The canonical signature, e.g. `foobar(string,bool)`.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The input types, in order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// The output types, if the signature declared a `returns` clause.
    pub fn outputs(&self) -> Option<&[String]> {
        self.outputs.as_deref()
    }

    /// The 4-byte function selector.
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// The 4-byte function selector as a `0x`-prefixed hex string.
    pub fn selector_hex(&self) -> String {
        hex::encode_prefixed(self.selector)
    }
}

impl FromStr for FunctionSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Computes the `0x`-prefixed 4-byte selector of a human-readable function
/// signature.
///
/// # Examples
///
/// ```
/// use mockthereum_abi::function_selector;
///
/// assert_eq!(function_selector("foobar(string,bool)").unwrap(), "0x7fddde58");
/// assert_eq!(
///     function_selector("function foobar(string, bool) returns (bool)").unwrap(),
///     "0x7fddde58"
/// );
/// ```
pub fn function_selector(signature: &str) -> Result<String, SignatureError> {
    FunctionSignature::parse(signature).map(|signature| signature.selector_hex())
}

/// Returns the hex-encoded arguments of `call_data`, after the 4-byte
/// selector. The result has no `0x` prefix.
///
/// Returns `None` if the call data is shorter than a selector.
pub fn strip_selector(call_data: &str) -> Option<&str> {
    let data = call_data.strip_prefix("0x").unwrap_or(call_data);
    data.get(8..)
}

fn has_returns_clause(signature: &str) -> bool {
    signature
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',')
        .any(|token| token == "returns")
}
