#![warn(missing_docs)]

//! ABI encoding of call data, return values and revert reasons for mocked
//! Ethereum contracts.
//!
//! Values are supplied as JSON and coerced against the declared Solidity
//! types, which keeps rule definitions close to what a JSON-RPC client sends
//! over the wire.

mod coerce;
mod error;
mod signature;

pub use alloy_dyn_abi::{DynSolType, DynSolValue};
use serde_json::Value;

pub use self::{
    error::{DecodingError, EncodingError, SignatureError},
    signature::{function_selector, strip_selector, FunctionSignature},
};

/// Selector of `Error(string)`, which prefixes ABI-encoded revert reasons.
pub const ERROR_STRING_SELECTOR: &str = "0x08c379a0";

/// ABI-encodes `values` as a parameter list of the provided `types`.
///
/// Returns a `0x`-prefixed, lowercase hex string.
pub fn encode<TypeT: AsRef<str>>(
    types: &[TypeT],
    values: &[Value],
) -> Result<String, EncodingError> {
    if types.len() != values.len() {
        return Err(EncodingError::ArityMismatch {
            types: types.len(),
            values: values.len(),
        });
    }

    let values = types
        .iter()
        .zip(values)
        .map(|(ty, value)| {
            let ty = DynSolType::parse(ty.as_ref()).map_err(|source| EncodingError::InvalidType {
                ty: ty.as_ref().to_owned(),
                source,
            })?;

            coerce::coerce_json(&ty, value)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(encode_values(values))
}

/// ABI-encodes already-typed values as a parameter list.
pub fn encode_values(values: Vec<DynSolValue>) -> String {
    hex::encode_prefixed(DynSolValue::Tuple(values).abi_encode_params())
}

/// Decodes hex `data` as a parameter list of the provided `types`.
///
/// The `0x` prefix is optional.
pub fn decode<TypeT: AsRef<str>>(
    types: &[TypeT],
    data: &str,
) -> Result<Vec<DynSolValue>, DecodingError> {
    let types = types
        .iter()
        .map(|ty| {
            DynSolType::parse(ty.as_ref()).map_err(|source| DecodingError::InvalidType {
                ty: ty.as_ref().to_owned(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let bytes = hex::decode(data)?;
    let tuple = DynSolType::Tuple(types);

    match tuple.abi_decode_params(&bytes) {
        Ok(DynSolValue::Tuple(values)) => Ok(values),
        Ok(value) => Ok(vec![value]),
        Err(source) => Err(DecodingError::Abi {
            types: tuple.to_string(),
            source,
        }),
    }
}

/// ABI-encodes a Solidity `Error(string)` revert payload for `reason`.
pub fn encode_revert_reason(reason: &str) -> String {
    let encoded =
        DynSolValue::Tuple(vec![DynSolValue::String(reason.to_owned())]).abi_encode_params();

    format!("{ERROR_STRING_SELECTOR}{}", hex::encode(encoded))
}
