use std::fmt;

use crate::rpc_types::ProviderRpcError;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// The candidate carries no request-capable provider
    InvalidProvider,
    /// `eth_chainId` answered with something that is not a string
    InvalidChainIdResponse,
    InvalidChainIdFormat(String),
    InvalidChainIdValue(String),
    /// Failure reported by the wallet transport, passed through unchanged
    Provider(ProviderRpcError),
    SerdeJsonError(serde_json::Error),
    Anyhow(anyhow::Error),
    InternalError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidProvider => {
                write!(f, "Invalid provider: wallet candidate has no EIP-1193 request capability")
            }
            Error::InvalidChainIdResponse => write!(f, "Invalid chainId response"),
            Error::InvalidChainIdFormat(raw) => write!(f, "Invalid chainId format: {raw:?}"),
            Error::InvalidChainIdValue(raw) => write!(f, "Invalid chainId value: {raw:?}"),
            Error::Provider(e) => write!(f, "Provider error: {e}"),
            Error::SerdeJsonError(e) => write!(f, "JSON error: {e}"),
            Error::Anyhow(e) => write!(f, "{e}"),
            Error::InternalError(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Provider(e) => Some(e),
            Error::SerdeJsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// True for the three chain-id parser failures
    pub fn is_chain_id_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidChainIdResponse
                | Error::InvalidChainIdFormat(_)
                | Error::InvalidChainIdValue(_)
        )
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::InternalError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::InternalError(e)
    }
}

impl From<ProviderRpcError> for Error {
    fn from(e: ProviderRpcError) -> Self {
        Error::Provider(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerdeJsonError(e)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Anyhow(e)
    }
}
