use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::{
    CHAIN_DISCONNECTED, DISCONNECTED, UNAUTHORIZED, UNSUPPORTED_METHOD, USER_REJECTED_REQUEST,
};

/// Methods this crate issues against a wallet provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderMethod {
    #[serde(rename = "eth_requestAccounts")]
    RequestAccounts,

    #[serde(rename = "eth_accounts")]
    Accounts,

    #[serde(rename = "eth_chainId")]
    ChainId,

    #[serde(rename = "eth_blockNumber")]
    BlockNumber,

    #[serde(rename = "eth_getBalance")]
    GetBalance,

    #[serde(rename = "wallet_switchEthereumChain")]
    SwitchEthereumChain,

    #[serde(rename = "wallet_revokePermissions")]
    RevokePermissions,

    #[serde(rename = "eth_getConnectorInfo")]
    GetConnectorInfo,
}

serde_plain::derive_display_from_serialize!(ProviderMethod);
serde_plain::derive_fromstr_from_deserialize!(ProviderMethod);

/// Argument of an EIP-1193 `request` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>, // Could be array or object
}

impl RequestArguments {
    pub fn new(method: ProviderMethod) -> Self {
        Self {
            method: method.to_string(),
            params: None,
        }
    }

    pub fn with_params(method: ProviderMethod, params: Value) -> Self {
        Self {
            method: method.to_string(),
            params: Some(params),
        }
    }

    /// Escape hatch for methods not modelled by [`ProviderMethod`]
    pub fn custom(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub fn switch_ethereum_chain(chain_id_hex: String) -> Self {
        Self::with_params(
            ProviderMethod::SwitchEthereumChain,
            json!([SwitchEthereumChainParameter {
                chain_id: chain_id_hex
            }]),
        )
    }

    pub fn revoke_accounts_permission() -> Self {
        Self::with_params(
            ProviderMethod::RevokePermissions,
            json!([{ "eth_accounts": {} }]),
        )
    }

    pub fn is(&self, method: ProviderMethod) -> bool {
        self.method == method.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchEthereumChainParameter {
    #[serde(rename = "chainId")]
    pub chain_id: String,
}

/// EIP-1193 `ProviderRpcError` (code, message, and optional data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_REQUEST, "User rejected the request")
    }

    pub fn unauthorized() -> Self {
        Self::new(UNAUTHORIZED, "The requested method and/or account has not been authorized")
    }

    pub fn unsupported_method(method: &str) -> Self {
        Self::new(UNSUPPORTED_METHOD, format!("Method not supported: {method}"))
    }

    pub fn disconnected() -> Self {
        Self::new(DISCONNECTED, "The provider is disconnected from all chains")
    }

    pub fn chain_disconnected() -> Self {
        Self::new(CHAIN_DISCONNECTED, "The provider is not connected to the requested chain")
    }
}

impl fmt::Display for ProviderRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderRpcError {}
