/// Connector info
///
/// Asks the wallet to describe how it is connected (`eth_getConnectorInfo`)
/// and falls back to what can be inferred locally. Descriptive fields are
/// taken from the wallet. `id` and `source` never are: the resolver stamps
/// them itself so a provider cannot pose as another wallet or claim its
/// answer was inferred.
///
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::constants::{DEFAULT_CONNECTOR_INFO_TIMEOUT, UNKNOWN_CONNECTOR_NAME};
use crate::error::{Error, Result};
use crate::provider::Eip1193Provider;
use crate::rpc_types::{ProviderMethod, RequestArguments};
use crate::types::{
    ConnectorInfo, ConnectorInfoFallback, ConnectorType, InfoSource, Mediation, RpcVisibility,
};
use crate::utils::best_effort;

/// The wallet's answer. `id` and `source` are deliberately absent so serde
/// drops whatever the wallet put there.
#[derive(Debug, Deserialize)]
struct ReportedConnectorInfo {
    #[serde(rename = "connectorType")]
    connector_type: ConnectorType,
    #[serde(rename = "connectorName")]
    connector_name: String,
    mediation: Mediation,
    #[serde(rename = "relayProvider", default)]
    relay_provider: Option<String>,
    #[serde(rename = "thirdPartyInfrastructure")]
    third_party_infrastructure: bool,
    #[serde(rename = "rpcVisibility")]
    rpc_visibility: RpcVisibility,
}

impl ReportedConnectorInfo {
    fn into_info(self, wallet_id: &str) -> ConnectorInfo {
        ConnectorInfo {
            id: wallet_id.to_string(),
            connector_type: self.connector_type,
            connector_name: self.connector_name,
            mediation: self.mediation,
            relay_provider: self.relay_provider,
            third_party_infrastructure: self.third_party_infrastructure,
            rpc_visibility: self.rpc_visibility,
            source: InfoSource::Wallet,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectorInfoResolver {
    timeout: Duration,
}

impl Default for ConnectorInfoResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTOR_INFO_TIMEOUT)
    }
}

impl ConnectorInfoResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Never fails. Any problem with the self-describe query (error,
    /// timeout, non-object, missing fields) yields inferred info.
    pub async fn resolve(
        &self,
        provider: &dyn Eip1193Provider,
        wallet_id: &str,
        fallback: Option<ConnectorInfoFallback>,
    ) -> ConnectorInfo {
        match best_effort("eth_getConnectorInfo", self.query(provider)).await {
            Some(reported) => {
                debug!("wallet {wallet_id} described its connector");
                reported.into_info(wallet_id)
            }
            None => inferred(wallet_id, fallback.unwrap_or_default()),
        }
    }

    async fn query(&self, provider: &dyn Eip1193Provider) -> Result<ReportedConnectorInfo> {
        let value = tokio::time::timeout(
            self.timeout,
            provider.request(RequestArguments::new(ProviderMethod::GetConnectorInfo)),
        )
        .await
        .map_err(|_| Error::from(format!("no answer within {:?}", self.timeout)))??;

        if !value.is_object() {
            return Err(format!("expected an object, got {value}").into());
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn inferred(wallet_id: &str, fallback: ConnectorInfoFallback) -> ConnectorInfo {
    ConnectorInfo {
        id: wallet_id.to_string(),
        connector_type: fallback.connector_type.unwrap_or(ConnectorType::Custom),
        connector_name: fallback
            .connector_name
            .unwrap_or_else(|| UNKNOWN_CONNECTOR_NAME.to_string()),
        mediation: fallback.mediation.unwrap_or(Mediation::Direct),
        relay_provider: fallback.relay_provider,
        third_party_infrastructure: fallback.third_party_infrastructure.unwrap_or(false),
        rpc_visibility: fallback.rpc_visibility.unwrap_or(RpcVisibility::Direct),
        source: InfoSource::Inferred,
    }
}
