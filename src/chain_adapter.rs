use alloy::primitives::{Address, ChainId, U64, U256};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::chain_id::parse_chain_id;
use crate::error::Result;
use crate::provider::SharedProvider;
use crate::rpc_types::{ProviderMethod, RequestArguments};

/// Typed view over a session's provider for downstream RPC consumers.
/// Requests are relayed to the wallet unchanged.
#[derive(Debug, Clone)]
pub struct ChainAdapter {
    provider: SharedProvider,
}

impl ChainAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T> {
        let value = self
            .provider
            .request(RequestArguments::custom(method, params))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn chain_id(&self) -> Result<ChainId> {
        let value = self
            .provider
            .request(RequestArguments::new(ProviderMethod::ChainId))
            .await?;
        parse_chain_id(&value)
    }

    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request(&ProviderMethod::Accounts.to_string(), None).await
    }

    pub async fn block_number(&self) -> Result<u64> {
        let number: U64 = self.request(&ProviderMethod::BlockNumber.to_string(), None).await?;
        Ok(number.to::<u64>())
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.request(
            &ProviderMethod::GetBalance.to_string(),
            Some(json!([address, "latest"])),
        )
        .await
    }
}
