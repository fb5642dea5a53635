//! Typed ABI parameter kinds.
//!
//! User input arrives as text. Each function parameter is resolved once to a
//! [`ParamKind`], which validates and converts text into a [`DynSolValue`].

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::json_abi::Param;
use alloy::primitives::{hex, Address, B256, I256, U256};

use crate::error::{Result, RewardsError};
use crate::utils::hex_encode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer { signed: bool, bits: usize },
    Address,
    Bool,
    /// `size` is `None` for dynamic `bytes`.
    Bytes { size: Option<usize> },
    String,
}

impl ParamKind {
    /// Resolve a Solidity type string such as `uint256` or `bytes32`.
    pub fn from_type(ty: &str) -> Result<Self> {
        let parsed = DynSolType::parse(ty)
            .map_err(|e| RewardsError::Abi(format!("unsupported parameter type {ty}: {e}")))?;

        match parsed {
            DynSolType::Uint(bits) => Ok(ParamKind::Integer {
                signed: false,
                bits,
            }),
            DynSolType::Int(bits) => Ok(ParamKind::Integer { signed: true, bits }),
            DynSolType::Address => Ok(ParamKind::Address),
            DynSolType::Bool => Ok(ParamKind::Bool),
            DynSolType::FixedBytes(size) => Ok(ParamKind::Bytes { size: Some(size) }),
            DynSolType::Bytes => Ok(ParamKind::Bytes { size: None }),
            DynSolType::String => Ok(ParamKind::String),
            other => Err(RewardsError::Abi(format!(
                "unsupported parameter type {other}"
            ))),
        }
    }

    pub fn from_param(param: &Param) -> Result<Self> {
        Self::from_type(&param.ty)
    }

    pub fn type_name(&self) -> String {
        match self {
            ParamKind::Integer { signed: false, bits } => format!("uint{bits}"),
            ParamKind::Integer { signed: true, bits } => format!("int{bits}"),
            ParamKind::Address => "address".to_string(),
            ParamKind::Bool => "bool".to_string(),
            ParamKind::Bytes { size: Some(size) } => format!("bytes{size}"),
            ParamKind::Bytes { size: None } => "bytes".to_string(),
            ParamKind::String => "string".to_string(),
        }
    }

    /// Short input hint shown next to prompts.
    pub fn hint(&self) -> &'static str {
        match self {
            ParamKind::Integer { .. } => " (number)",
            ParamKind::Address => " (0x...)",
            ParamKind::Bool => " (true/false)",
            ParamKind::Bytes { size: Some(_) } => " (number or 0x...)",
            ParamKind::Bytes { size: None } => " (0x...)",
            ParamKind::String => "",
        }
    }

    /// Validate and convert user text into an ABI value.
    pub fn coerce(&self, raw: &str) -> Result<DynSolValue> {
        let value = raw.trim();
        if value.is_empty() && *self != ParamKind::String {
            return Err(self.invalid(raw));
        }

        match *self {
            ParamKind::Integer {
                signed: false,
                bits,
            } => {
                let number = parse_uint(value).map_err(|_| self.invalid(raw))?;
                if bits < 256 && number >= (U256::from(1u8) << bits) {
                    return Err(self.invalid(raw));
                }
                Ok(DynSolValue::Uint(number, bits))
            }
            ParamKind::Integer { signed: true, bits } => {
                let number = parse_int(value).ok_or_else(|| self.invalid(raw))?;
                if bits < 256 {
                    let limit = U256::from(1u8) << (bits - 1);
                    let magnitude = number.unsigned_abs();
                    let in_range = if number.is_negative() {
                        magnitude <= limit
                    } else {
                        magnitude < limit
                    };
                    if !in_range {
                        return Err(self.invalid(raw));
                    }
                }
                Ok(DynSolValue::Int(number, bits))
            }
            ParamKind::Address => parse_address(value)
                .map(DynSolValue::Address)
                .ok_or_else(|| self.invalid(raw)),
            ParamKind::Bool => match value {
                "true" | "1" => Ok(DynSolValue::Bool(true)),
                "false" | "0" => Ok(DynSolValue::Bool(false)),
                _ => Err(self.invalid(raw)),
            },
            ParamKind::Bytes { size: Some(size) } => {
                let bytes = if let Some(hex_part) = strip_hex_prefix(value) {
                    let bytes = hex::decode(hex_part).map_err(|_| self.invalid(raw))?;
                    if bytes.len() != size {
                        return Err(self.invalid(raw));
                    }
                    bytes
                } else {
                    // Numbers are left-padded to the full width, big-endian
                    let number = U256::from_str_radix(value, 10).map_err(|_| self.invalid(raw))?;
                    let be: [u8; 32] = number.to_be_bytes();
                    let (high, low) = be.split_at(32 - size);
                    if high.iter().any(|b| *b != 0) {
                        return Err(self.invalid(raw));
                    }
                    low.to_vec()
                };
                let mut word = B256::ZERO;
                word[..size].copy_from_slice(&bytes);
                Ok(DynSolValue::FixedBytes(word, size))
            }
            ParamKind::Bytes { size: None } => strip_hex_prefix(value)
                .and_then(|hex_part| hex::decode(hex_part).ok())
                .map(DynSolValue::Bytes)
                .ok_or_else(|| self.invalid(raw)),
            ParamKind::String => Ok(DynSolValue::String(raw.to_string())),
        }
    }

    fn invalid(&self, raw: &str) -> RewardsError {
        RewardsError::invalid(self.type_name(), raw)
    }
}

/// Parse an unsigned integer given in decimal or `0x` hex.
pub fn parse_uint(value: &str) -> Result<U256> {
    let value = value.trim();
    let parsed = match strip_hex_prefix(value) {
        Some(hex_part) if !hex_part.is_empty() => U256::from_str_radix(hex_part, 16),
        Some(_) => return Err(RewardsError::invalid("uint256", value)),
        None => U256::from_str_radix(value, 10),
    };
    parsed.map_err(|_| RewardsError::invalid("uint256", value))
}

fn parse_int(value: &str) -> Option<I256> {
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let magnitude = parse_uint(body).ok()?;
    let number = I256::try_from(magnitude).ok()?;
    if negative {
        Some(-number)
    } else {
        Some(number)
    }
}

/// Lower- or upper-case addresses are accepted as-is; mixed case must be a
/// valid EIP-55 checksum.
fn parse_address(value: &str) -> Option<Address> {
    let hex_part = strip_hex_prefix(value)?;
    if hex_part.len() != 40 {
        return None;
    }
    let mixed_case = hex_part.chars().any(|c| c.is_ascii_lowercase())
        && hex_part.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case {
        Address::parse_checksummed(value, None).ok()
    } else {
        value.parse().ok()
    }
}

fn strip_hex_prefix(value: &str) -> Option<&str> {
    value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))
}

/// Render a decoded ABI value the way results are displayed and stored.
pub fn render_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => hex_encode(&word[..*size]),
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::Function(function) => hex_encode(function.as_slice()),
        DynSolValue::Bytes(bytes) => hex_encode(bytes),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => render_values(values),
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}

/// Render several values joined by `", "`.
pub fn render_values(values: &[DynSolValue]) -> String {
    values.iter().map(render_value).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const UINT256: ParamKind = ParamKind::Integer {
        signed: false,
        bits: 256,
    };

    #[test]
    fn test_from_type() {
        assert_eq!(ParamKind::from_type("uint256").unwrap(), UINT256);
        assert_eq!(
            ParamKind::from_type("int24").unwrap(),
            ParamKind::Integer {
                signed: true,
                bits: 24
            }
        );
        assert_eq!(
            ParamKind::from_type("bytes32").unwrap(),
            ParamKind::Bytes { size: Some(32) }
        );
        assert_eq!(ParamKind::from_type("bytes").unwrap(), ParamKind::Bytes { size: None });
        assert_eq!(ParamKind::from_type("address").unwrap(), ParamKind::Address);
        assert!(matches!(ParamKind::from_type("uint256[]"), Err(RewardsError::Abi(_))));
    }

    #[test]
    fn test_coerce_uint() {
        assert_eq!(UINT256.coerce("42").unwrap(), DynSolValue::Uint(U256::from(42), 256));
        assert_eq!(UINT256.coerce("0x2a").unwrap(), DynSolValue::Uint(U256::from(42), 256));
        assert!(UINT256.coerce("").is_err());
        assert!(UINT256.coerce("-1").is_err());
        assert!(UINT256.coerce("abc").is_err());

        let uint8 = ParamKind::Integer {
            signed: false,
            bits: 8,
        };
        assert!(uint8.coerce("255").is_ok());
        assert!(uint8.coerce("256").is_err());
    }

    #[test]
    fn test_coerce_int_range() {
        let int8 = ParamKind::Integer {
            signed: true,
            bits: 8,
        };
        assert_eq!(
            int8.coerce("-128").unwrap(),
            DynSolValue::Int(I256::try_from(-128i64).unwrap(), 8)
        );
        assert!(int8.coerce("127").is_ok());
        assert!(int8.coerce("128").is_err());
        assert!(int8.coerce("-129").is_err());
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(ParamKind::Bool.coerce("1").unwrap(), DynSolValue::Bool(true));
        assert_eq!(ParamKind::Bool.coerce("false").unwrap(), DynSolValue::Bool(false));
        assert!(ParamKind::Bool.coerce("yes").is_err());
    }

    #[test]
    fn test_coerce_address() {
        let lower = "0x82c13fcab02a168f06e12373f9e5d2c2bd47e399";
        let DynSolValue::Address(address) = ParamKind::Address.coerce(lower).unwrap() else {
            panic!("expected address");
        };
        let checksummed = address.to_checksum(None);
        assert!(ParamKind::Address.coerce(&checksummed).is_ok());
        assert!(ParamKind::Address.coerce(&lower.to_uppercase().replace("0X", "0x")).is_ok());

        // flipping the case of a single letter breaks the checksum
        let flip_at = checksummed[2..]
            .find(|c: char| c.is_ascii_alphabetic())
            .map(|i| i + 2)
            .unwrap();
        let mut broken = checksummed.clone();
        let flipped = broken.as_bytes()[flip_at] ^ 0x20;
        broken.replace_range(flip_at..=flip_at, &(flipped as char).to_string());
        assert!(ParamKind::Address.coerce(&broken).is_err());

        assert!(ParamKind::Address.coerce("0x1234").is_err());
    }

    #[test]
    fn test_coerce_bytes32_number_is_left_padded() {
        let kind = ParamKind::Bytes { size: Some(32) };
        let value = kind.coerce("1").unwrap();
        assert_eq!(
            render_value(&value),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_coerce_bytes32_hex_must_be_full_width() {
        let kind = ParamKind::Bytes { size: Some(32) };
        let id = "0x02d1dc927ecebd87407e1a58a6f2d81f0d6c0ade72ac926e865310aa482b893a";
        assert_eq!(render_value(&kind.coerce(id).unwrap()), id);
        assert!(kind.coerce("0x1234").is_err());
    }

    #[test]
    fn test_coerce_small_fixed_bytes() {
        let kind = ParamKind::Bytes { size: Some(4) };
        assert_eq!(render_value(&kind.coerce("258").unwrap()), "0x00000102");
        assert!(kind.coerce("4294967296").is_err());
    }

    #[test]
    fn test_coerce_fixed_bytes_hex_fills_leading_bytes() {
        let kind = ParamKind::Bytes { size: Some(4) };
        let mut expected = B256::ZERO;
        expected[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            kind.coerce("0xdeadbeef").unwrap(),
            DynSolValue::FixedBytes(expected, 4)
        );
    }

    #[test]
    fn test_coerce_dynamic_bytes_and_string() {
        let bytes = ParamKind::Bytes { size: None };
        assert_eq!(bytes.coerce("0xabcd").unwrap(), DynSolValue::Bytes(vec![0xab, 0xcd]));
        assert!(bytes.coerce("12").is_err());
        assert_eq!(
            ParamKind::String.coerce("").unwrap(),
            DynSolValue::String(String::new())
        );
    }

    #[test]
    fn test_render_tuple() {
        let value = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(7), 256),
            DynSolValue::Bool(true),
        ]);
        assert_eq!(render_value(&value), "7, true");
    }

    #[test]
    fn test_hints() {
        assert_eq!(UINT256.hint(), " (number)");
        assert_eq!(ParamKind::Bytes { size: Some(32) }.hint(), " (number or 0x...)");
        assert_eq!(ParamKind::String.hint(), "");
    }
}
