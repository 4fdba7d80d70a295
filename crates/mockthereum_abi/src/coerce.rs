use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256};
use serde_json::Value;

use crate::EncodingError;

/// Converts a JSON value to a [`DynSolValue`] of the provided type.
///
/// Scalars are parsed from their string representation, so numbers may be
/// given as JSON numbers, decimal strings or hex strings. Byte types accept
/// either a hex string or an array of byte values.
pub(crate) fn coerce_json(ty: &DynSolType, value: &Value) -> Result<DynSolValue, EncodingError> {
    let invalid = |reason: String| EncodingError::InvalidValue {
        ty: ty.to_string(),
        value: value.clone(),
        reason,
    };

    match (ty, value) {
        (DynSolType::Bool, Value::Bool(boolean)) => Ok(DynSolValue::Bool(*boolean)),
        (DynSolType::String, Value::String(string)) => Ok(DynSolValue::String(string.clone())),
        (DynSolType::Address, Value::String(string)) => string
            .parse::<Address>()
            .map(DynSolValue::Address)
            .map_err(|error| invalid(error.to_string())),
        (DynSolType::Bytes, Value::Array(items)) => byte_array(items)
            .map(DynSolValue::Bytes)
            .map_err(invalid),
        (DynSolType::FixedBytes(size), Value::Array(items)) => {
            let bytes = byte_array(items).map_err(invalid)?;
            if bytes.len() != *size {
                return Err(invalid(format!(
                    "expected {size} bytes, found {}",
                    bytes.len()
                )));
            }

            Ok(DynSolValue::FixedBytes(
                B256::right_padding_from(&bytes),
                *size,
            ))
        }
        (DynSolType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| coerce_json(inner, item))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, length), Value::Array(items)) => {
            if items.len() != *length {
                return Err(invalid(format!(
                    "expected {length} elements, found {}",
                    items.len()
                )));
            }

            items
                .iter()
                .map(|item| coerce_json(inner, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), Value::Array(items)) => {
            if items.len() != types.len() {
                return Err(invalid(format!(
                    "expected {} tuple members, found {}",
                    types.len(),
                    items.len()
                )));
            }

            types
                .iter()
                .zip(items)
                .map(|(ty, item)| coerce_json(ty, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        (DynSolType::Bool | DynSolType::String | DynSolType::Address, _)
        | (_, Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_)) => {
            Err(invalid("unsupported value shape".to_owned()))
        }
        (_, Value::String(string)) => ty
            .coerce_str(string)
            .map_err(|error| invalid(error.to_string())),
        (_, Value::Number(number)) => ty
            .coerce_str(&number.to_string())
            .map_err(|error| invalid(error.to_string())),
    }
}

fn byte_array(items: &[Value]) -> Result<Vec<u8>, String> {
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|byte| u8::try_from(byte).ok())
                .ok_or_else(|| format!("{item} is not a byte value"))
        })
        .collect()
}
