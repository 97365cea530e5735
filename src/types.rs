/// Types
///
/// Data model shared by discovery, connector info resolution and sessions.
/// Everything that crosses a wallet boundary is serde-encoded with the
/// camelCase names wallets and dApps use on the wire.
///
use serde::{Deserialize, Serialize};

use crate::provider::SharedProvider;
use crate::utils::is_data_uri;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateHints {
    #[serde(rename = "isInjected", default, skip_serializing_if = "Option::is_none")]
    pub is_injected: Option<bool>,
}

/// A wallet the user may pick. Immutable once built.
#[derive(Debug, Clone)]
pub struct WalletCandidate {
    pub id: String,
    pub name: String,
    pub rdns: Option<String>,
    /// Inline `data:` URI, remote URLs are never kept
    pub icon: Option<String>,
    pub provider: Option<SharedProvider>,
    pub hints: CandidateHints,
}

impl WalletCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: SharedProvider) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rdns: None,
            icon: None,
            provider: Some(provider),
            hints: CandidateHints::default(),
        }
    }

    pub fn with_rdns(mut self, rdns: impl Into<String>) -> Self {
        self.rdns = Some(rdns.into());
        self
    }

    /// Sets the icon if it is an inline data URI, drops it otherwise
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.icon = is_data_uri(&icon).then_some(icon);
        self
    }

    pub fn injected(mut self) -> Self {
        self.hints.is_injected = Some(true);
        self
    }

    pub fn is_injected(&self) -> bool {
        self.hints.is_injected.unwrap_or(false)
    }

    /// Identity used when collapsing duplicates: id, then rdns, then name
    pub fn dedup_key(&self) -> &str {
        if !self.id.is_empty() {
            &self.id
        } else if let Some(rdns) = self.rdns.as_deref().filter(|r| !r.is_empty()) {
            rdns
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    Injected,
    #[serde(rename = "walletconnect")]
    WalletConnect,
    #[default]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mediation {
    #[default]
    Direct,
    Relay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcVisibility {
    #[default]
    Direct,
    Proxied,
}

/// Who produced a [`ConnectorInfo`]. Always set by the resolver, never read
/// from a wallet response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoSource {
    Wallet,
    Inferred,
}

serde_plain::derive_display_from_serialize!(ConnectorType);
serde_plain::derive_display_from_serialize!(Mediation);
serde_plain::derive_display_from_serialize!(RpcVisibility);
serde_plain::derive_display_from_serialize!(InfoSource);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub id: String,
    #[serde(rename = "connectorType")]
    pub connector_type: ConnectorType,
    #[serde(rename = "connectorName")]
    pub connector_name: String,
    pub mediation: Mediation,
    #[serde(rename = "relayProvider", default, skip_serializing_if = "Option::is_none")]
    pub relay_provider: Option<String>,
    #[serde(rename = "thirdPartyInfrastructure")]
    pub third_party_infrastructure: bool,
    #[serde(rename = "rpcVisibility")]
    pub rpc_visibility: RpcVisibility,
    pub source: InfoSource,
}

/// Caller-supplied defaults for connector info, any field may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfoFallback {
    #[serde(rename = "connectorType", default)]
    pub connector_type: Option<ConnectorType>,
    #[serde(rename = "connectorName", default)]
    pub connector_name: Option<String>,
    #[serde(default)]
    pub mediation: Option<Mediation>,
    #[serde(rename = "relayProvider", default)]
    pub relay_provider: Option<String>,
    #[serde(rename = "thirdPartyInfrastructure", default)]
    pub third_party_infrastructure: Option<bool>,
    #[serde(rename = "rpcVisibility", default)]
    pub rpc_visibility: Option<RpcVisibility>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    #[serde(rename = "chainId", default)]
    pub chain_id: Option<u64>,
}

impl ConnectOptions {
    pub fn chain(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRequests {
    None,
    RpcOnly,
    ThirdParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Telemetry {
    None,
    Anonymous,
    Pseudonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistentStorage {
    None,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicy {
    UserGestureOnly,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconPolicy {
    DataUriOnly,
    RemoteAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPolicy {
    None,
    LocalOnly,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureSource {
    Connector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDisclosure {
    pub eip6963: DiscoveryPolicy,
    #[serde(rename = "remoteCalls")]
    pub remote_calls: bool,
}

/// What the connector itself does with the network, storage and logs.
/// Authored by the connector, never by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDisclosure {
    pub source: DisclosureSource,
    #[serde(rename = "networkRequests")]
    pub network_requests: NetworkRequests,
    pub telemetry: Telemetry,
    #[serde(rename = "persistentStorage")]
    pub persistent_storage: PersistentStorage,
    pub discovery: DiscoveryDisclosure,
    #[serde(rename = "iconPolicy")]
    pub icon_policy: IconPolicy,
    pub logs: LogPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::MockProvider;

    #[test]
    fn test_connector_info_wire_names() {
        let info = ConnectorInfo {
            id: "io.metamask".to_string(),
            connector_type: ConnectorType::WalletConnect,
            connector_name: "MetaMask".to_string(),
            mediation: Mediation::Relay,
            relay_provider: Some("relay.walletconnect.org".to_string()),
            third_party_infrastructure: true,
            rpc_visibility: RpcVisibility::Proxied,
            source: InfoSource::Wallet,
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "id": "io.metamask",
                "connectorType": "walletconnect",
                "connectorName": "MetaMask",
                "mediation": "relay",
                "relayProvider": "relay.walletconnect.org",
                "thirdPartyInfrastructure": true,
                "rpcVisibility": "proxied",
                "source": "wallet"
            })
        );
        assert_eq!(ConnectorType::Injected.to_string(), "injected");
    }

    #[test]
    fn test_dedup_key_priority() {
        let provider = MockProvider::new().shared();
        let with_id = WalletCandidate::new("a", "Name", provider.clone()).with_rdns("com.a");
        assert_eq!(with_id.dedup_key(), "a");

        let with_rdns = WalletCandidate::new("", "Name", provider.clone()).with_rdns("com.b");
        assert_eq!(with_rdns.dedup_key(), "com.b");

        let name_only = WalletCandidate::new("", "Name", provider).with_rdns("");
        assert_eq!(name_only.dedup_key(), "Name");
    }

    #[test]
    fn test_remote_icon_is_dropped() {
        let provider = MockProvider::new().shared();
        let remote = WalletCandidate::new("a", "A", provider.clone())
            .with_icon("https://evil.example/track.png");
        assert_eq!(remote.icon, None);

        let inline = WalletCandidate::new("a", "A", provider)
            .with_icon("data:image/svg+xml;base64,PHN2Zy8+");
        assert!(inline.icon.is_some());
    }
}
