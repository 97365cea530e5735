use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::connector_info::ConnectorInfoResolver;
use crate::constants::{DEFAULT_CONNECTOR_INFO_TIMEOUT, DEFAULT_DISCOVERY_TIMEOUT};
use crate::discovery::{AnnouncementBus, Eip6963Source};
use crate::error::Result;
use crate::provider::Eip1193Provider;
use crate::session::{self, ConnectedSession};
use crate::types::{
    ConnectOptions, ConnectorDisclosure, ConnectorInfo, ConnectorInfoFallback, DisclosureSource,
    DiscoveryDisclosure, DiscoveryPolicy, IconPolicy, LogPolicy, NetworkRequests,
    PersistentStorage, Telemetry, WalletCandidate,
};
use crate::utils::{best_effort, dedupe_candidates};

/// Supplies a wallet that is listed ahead of everything EIP-6963 finds.
/// Errors are swallowed and contribute nothing.
pub type PrivilegedResolver =
    Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Option<WalletCandidate>>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    #[serde(rename = "enableEip6963")]
    pub enable_eip6963: bool,
    #[serde(rename = "discoveryTimeoutMs")]
    pub discovery_timeout_ms: u64,
    #[serde(rename = "connectorInfoTimeoutMs")]
    pub connector_info_timeout_ms: u64,
    /// Chain requested by [`crate::controller::WalletController::connect`]
    #[serde(rename = "preferredChainId")]
    pub preferred_chain_id: Option<u64>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            enable_eip6963: true,
            discovery_timeout_ms: DEFAULT_DISCOVERY_TIMEOUT.as_millis() as u64,
            connector_info_timeout_ms: DEFAULT_CONNECTOR_INFO_TIMEOUT.as_millis() as u64,
            preferred_chain_id: None,
        }
    }
}

impl ConnectorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn connector_info_timeout(&self) -> Duration {
        Duration::from_millis(self.connector_info_timeout_ms)
    }
}

impl ConnectorDisclosure {
    /// What this connector does: nothing leaves the page except requests the
    /// caller relays to the wallet, and only inline icons are shown.
    pub fn privacy_first() -> Self {
        Self {
            source: DisclosureSource::Connector,
            network_requests: NetworkRequests::None,
            telemetry: Telemetry::None,
            persistent_storage: PersistentStorage::None,
            discovery: DiscoveryDisclosure {
                eip6963: DiscoveryPolicy::UserGestureOnly,
                remote_calls: false,
            },
            icon_policy: IconPolicy::DataUriOnly,
            logs: LogPolicy::LocalOnly,
            notes: vec![
                "No analytics, telemetry or tracking.".to_string(),
                "Wallet discovery runs only after a user action.".to_string(),
                "Wallet icons are rendered from inline data URIs, never fetched.".to_string(),
                "Session state is kept in memory and never persisted.".to_string(),
            ],
        }
    }
}

/// Entry point for callers: discovery, connect, connector info and the
/// connector's own disclosure.
pub struct Connector {
    config: ConnectorConfig,
    eip6963: Eip6963Source,
    privileged: Option<PrivilegedResolver>,
    resolver: ConnectorInfoResolver,
    disclosure: ConnectorDisclosure,
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(ConnectorConfig::default())
    }
}

impl Connector {
    /// Starts without an announcement bus, see [`Self::with_announcement_bus`]
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            resolver: ConnectorInfoResolver::new(config.connector_info_timeout()),
            config,
            eip6963: Eip6963Source::default(),
            privileged: None,
            disclosure: ConnectorDisclosure::privacy_first(),
        }
    }

    pub fn with_announcement_bus(mut self, bus: Arc<dyn AnnouncementBus>) -> Self {
        self.eip6963 = Eip6963Source::with_bus(bus);
        self
    }

    pub fn with_privileged_candidate<F, Fut>(mut self, resolver: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<WalletCandidate>>> + Send + 'static,
    {
        self.privileged = Some(Arc::new(move || resolver().boxed()));
        self
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Privileged candidate first, then EIP-6963 announcements, duplicates
    /// collapsed to their first occurrence. Call this from a user action.
    pub async fn discover_wallets(&self) -> Vec<WalletCandidate> {
        let privileged = async {
            match &self.privileged {
                Some(resolve) => best_effort("privileged candidate", resolve())
                    .await
                    .flatten(),
                None => None,
            }
        };
        let announced = async {
            if self.config.enable_eip6963 {
                self.eip6963.discover(self.config.discovery_timeout()).await
            } else {
                vec![]
            }
        };

        let (privileged, announced) = tokio::join!(privileged, announced);
        let wallets = dedupe_candidates(privileged.into_iter().chain(announced).collect());
        debug!("discovered {} wallet(s)", wallets.len());
        wallets
    }

    pub async fn connect(
        &self,
        candidate: WalletCandidate,
        opts: ConnectOptions,
    ) -> Result<ConnectedSession> {
        session::connect(candidate, opts, &self.resolver).await
    }

    pub async fn get_connector_info(
        &self,
        provider: &dyn Eip1193Provider,
        wallet_id: &str,
        fallback: Option<ConnectorInfoFallback>,
    ) -> ConnectorInfo {
        self.resolver.resolve(provider, wallet_id, fallback).await
    }

    pub fn get_connector_disclosure(&self) -> &ConnectorDisclosure {
        &self.disclosure
    }
}
