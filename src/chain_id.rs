use alloy::primitives::ChainId;
use serde_json::Value;

use crate::error::{Error, Result};

/// Parse a wallet-reported chain id such as `"0xaa36a7"`.
///
/// Used by `connect`, `refresh` and the `chainChanged` listener so that all
/// three agree on what a valid chain id is.
pub fn parse_chain_id(value: &Value) -> Result<ChainId> {
    parse_chain_id_with(value, |_| true)
}

/// Same as [`parse_chain_id`] with an extra acceptance check on the parsed
/// number. Digits that overflow a [`ChainId`] are rejected before the check
/// runs.
pub fn parse_chain_id_with<F>(value: &Value, is_finite: F) -> Result<ChainId>
where
    F: Fn(ChainId) -> bool,
{
    let raw = value.as_str().ok_or(Error::InvalidChainIdResponse)?;

    let digits = raw
        .strip_prefix("0x")
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| Error::InvalidChainIdFormat(raw.to_string()))?;

    let chain_id = ChainId::from_str_radix(digits, 16)
        .map_err(|_| Error::InvalidChainIdValue(raw.to_string()))?;

    if !is_finite(chain_id) {
        return Err(Error::InvalidChainIdValue(raw.to_string()));
    }
    Ok(chain_id)
}

/// `0x` followed by lowercase hex digits, the form `wallet_switchEthereumChain`
/// expects.
pub fn encode_chain_id(chain_id: ChainId) -> String {
    format!("0x{chain_id:x}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_sepolia() {
        assert_eq!(parse_chain_id(&json!("0xaa36a7")).unwrap(), 11155111);
        assert_eq!(parse_chain_id(&json!("0x1")).unwrap(), 1);
        assert_eq!(parse_chain_id(&json!("0xAA36A7")).unwrap(), 11155111);
    }

    #[test]
    fn test_rejects_non_string() {
        assert!(matches!(
            parse_chain_id(&json!(123)),
            Err(Error::InvalidChainIdResponse)
        ));
        assert!(matches!(
            parse_chain_id(&Value::Null),
            Err(Error::InvalidChainIdResponse)
        ));
    }

    #[test]
    fn test_rejects_bad_format() {
        for raw in ["1", "0xZZ", "0x", "not-hex", "0X1", " 0x1", "0x1 "] {
            assert!(
                matches!(parse_chain_id(&json!(raw)), Err(Error::InvalidChainIdFormat(_))),
                "{raw} should be a format error"
            );
        }
    }

    #[test]
    fn test_predicate_failure_is_value_error() {
        assert!(matches!(
            parse_chain_id_with(&json!("0x1"), |_| false),
            Err(Error::InvalidChainIdValue(_))
        ));
    }

    #[test]
    fn test_overflow_is_value_error() {
        assert!(matches!(
            parse_chain_id(&json!("0x1ffffffffffffffff")),
            Err(Error::InvalidChainIdValue(_))
        ));
    }

    #[test]
    fn test_reencode_matches_up_to_case() {
        for raw in ["0x1", "0xa", "0xAA36A7", "0x2105", "0x0", "0x00ff"] {
            let parsed = parse_chain_id(&json!(raw)).unwrap();
            let reencoded = encode_chain_id(parsed);
            assert_eq!(parse_chain_id(&json!(reencoded)).unwrap(), parsed);
        }
        assert_eq!(encode_chain_id(10), "0xa");
        assert_eq!(encode_chain_id(11155111), "0xaa36a7");
    }
}
