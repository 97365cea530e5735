/// Discovery
///
/// EIP-6963 multi injected provider discovery. The host's global event
/// target is abstracted as an [`AnnouncementBus`]: the source listens for
/// `eip6963:announceProvider`, dispatches `eip6963:requestProvider` and
/// collects whatever answers inside a short time box.
///
/// Discovery must only run because the user asked for it (a click on
/// "connect"), never on page load.
///
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DISCOVERY_TIMEOUT, EIP6963_ANNOUNCE_EVENT, EIP6963_REQUEST_EVENT, UNKNOWN_WALLET_NAME,
};
use crate::provider::SharedProvider;
use crate::types::{CandidateHints, WalletCandidate};
use crate::utils::is_data_uri;

/// `info` member of an announce event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rdns: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnnounceDetail {
    pub info: ProviderInfo,
    pub provider: Option<SharedProvider>,
}

impl AnnounceDetail {
    pub fn new(info: ProviderInfo, provider: SharedProvider) -> Self {
        Self {
            info,
            provider: Some(provider),
        }
    }
}

pub type AnnounceListener = Arc<dyn Fn(&AnnounceDetail) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Host-side broadcast mechanism (a browser `window` in practice).
pub trait AnnouncementBus: Send + Sync {
    fn add_announce_listener(&self, listener: AnnounceListener) -> ListenerId;

    fn remove_announce_listener(&self, id: ListenerId);

    /// Dispatch the request event so wallets announce themselves
    fn request_providers(&self);
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: Vec<(ListenerId, AnnounceListener)>,
    wallets: Vec<AnnounceDetail>,
}

/// In-memory [`AnnouncementBus`]. Registered wallets answer every request
/// event the way EIP-6963 extensions do.
#[derive(Default)]
pub struct BroadcastBus {
    state: Mutex<BusState>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a wallet that announces now and on every later request
    pub fn register_wallet(&self, detail: AnnounceDetail) {
        self.state.lock().wallets.push(detail.clone());
        self.announce(&detail);
    }

    /// Dispatch one announce event to the current listeners
    pub fn announce(&self, detail: &AnnounceDetail) {
        let listeners: Vec<AnnounceListener> = self
            .state
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        debug!(
            "{EIP6963_ANNOUNCE_EVENT} uuid={} to {} listener(s)",
            detail.info.uuid,
            listeners.len()
        );
        for listener in listeners {
            listener(detail);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}

impl AnnouncementBus for BroadcastBus {
    fn add_announce_listener(&self, listener: AnnounceListener) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, listener));
        id
    }

    fn remove_announce_listener(&self, id: ListenerId) {
        self.state.lock().listeners.retain(|(l, _)| *l != id);
    }

    fn request_providers(&self) {
        let wallets = self.state.lock().wallets.clone();
        debug!("{EIP6963_REQUEST_EVENT}, {} registered wallet(s)", wallets.len());
        for detail in &wallets {
            self.announce(detail);
        }
    }
}

impl fmt::Debug for BroadcastBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BroadcastBus")
            .field("listeners", &state.listeners.len())
            .field("wallets", &state.wallets.len())
            .finish()
    }
}

/// Removes the announce listener when dropped, so an early return or a
/// dropped discovery future never leaves it behind.
struct ListenerGuard<'a> {
    bus: &'a dyn AnnouncementBus,
    id: ListenerId,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.bus.remove_announce_listener(self.id);
    }
}

#[derive(Clone, Default)]
pub struct Eip6963Source {
    bus: Option<Arc<dyn AnnouncementBus>>,
}

impl Eip6963Source {
    /// `None` stands for a host without a broadcast mechanism
    pub fn new(bus: Option<Arc<dyn AnnouncementBus>>) -> Self {
        Self { bus }
    }

    pub fn with_bus(bus: Arc<dyn AnnouncementBus>) -> Self {
        Self { bus: Some(bus) }
    }

    pub fn has_bus(&self) -> bool {
        self.bus.is_some()
    }

    pub async fn discover_default(&self) -> Vec<WalletCandidate> {
        self.discover(DEFAULT_DISCOVERY_TIMEOUT).await
    }

    /// Collect the wallets that announce within `timeout`. A later
    /// announcement for a uuid replaces the earlier one in place.
    pub async fn discover(&self, timeout: Duration) -> Vec<WalletCandidate> {
        let Some(bus) = self.bus.as_deref() else {
            debug!("no announcement bus, skipping EIP-6963 discovery");
            return vec![];
        };

        let found: Arc<Mutex<Vec<WalletCandidate>>> = Arc::new(Mutex::new(vec![]));
        let handler: AnnounceListener = {
            let found = found.clone();
            Arc::new(move |detail: &AnnounceDetail| {
                let Some(candidate) = candidate_from_announcement(detail) else {
                    return;
                };
                let mut found = found.lock();
                match found.iter_mut().find(|w| w.id == candidate.id) {
                    Some(slot) => *slot = candidate,
                    None => found.push(candidate),
                }
            })
        };

        let guard = ListenerGuard {
            bus,
            id: bus.add_announce_listener(handler),
        };
        bus.request_providers();
        tokio::time::sleep(timeout).await;
        drop(guard);

        let wallets = std::mem::take(&mut *found.lock());
        debug!("EIP-6963 discovery collected {} wallet(s)", wallets.len());
        wallets
    }
}

impl fmt::Debug for Eip6963Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eip6963Source")
            .field("has_bus", &self.has_bus())
            .finish()
    }
}

fn candidate_from_announcement(detail: &AnnounceDetail) -> Option<WalletCandidate> {
    let info = &detail.info;
    let provider = detail.provider.clone()?;
    if info.uuid.is_empty() {
        return None;
    }

    Some(WalletCandidate {
        id: info.uuid.clone(),
        name: info
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN_WALLET_NAME.to_string()),
        rdns: info.rdns.clone().filter(|r| !r.is_empty()),
        icon: info.icon.clone().filter(|i| is_data_uri(i)),
        provider: Some(provider),
        hints: CandidateHints {
            is_injected: Some(true),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;

    fn detail(uuid: &str, name: Option<&str>) -> AnnounceDetail {
        AnnounceDetail::new(
            ProviderInfo {
                uuid: uuid.to_string(),
                name: name.map(str::to_string),
                ..Default::default()
            },
            MockProvider::new().shared(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_bus_returns_immediately() {
        let start = tokio::time::Instant::now();
        let wallets = Eip6963Source::new(None).discover_default().await;
        assert!(wallets.is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wallets_returns_empty_after_timeout() {
        let bus = Arc::new(BroadcastBus::new());
        let source = Eip6963Source::with_bus(bus.clone());

        let start = tokio::time::Instant::now();
        let wallets = source.discover(Duration::from_millis(20)).await;

        assert!(wallets.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(bus.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collects_registered_wallet() {
        let bus = Arc::new(BroadcastBus::new());
        bus.register_wallet(AnnounceDetail::new(
            ProviderInfo {
                uuid: "a".to_string(),
                name: Some("Wallet A".to_string()),
                rdns: Some("com.wallet.a".to_string()),
                icon: Some("data:image/svg+xml;base64,PHN2Zy8+".to_string()),
            },
            MockProvider::new().shared(),
        ));

        let wallets = Eip6963Source::with_bus(bus.clone())
            .discover(Duration::from_millis(50))
            .await;

        assert_eq!(wallets.len(), 1);
        let wallet = &wallets[0];
        assert_eq!(wallet.id, "a");
        assert_eq!(wallet.name, "Wallet A");
        assert_eq!(wallet.rdns.as_deref(), Some("com.wallet.a"));
        assert!(wallet.icon.is_some());
        assert!(wallet.is_injected());
        assert_eq!(bus.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_uuid_last_announcement_wins() {
        let bus = Arc::new(BroadcastBus::new());
        bus.register_wallet(detail("dup", Some("One")));
        bus.register_wallet(detail("dup", Some("Two")));
        bus.register_wallet(detail("other", None));

        let wallets = Eip6963Source::with_bus(bus)
            .discover(Duration::from_millis(50))
            .await;

        let got: Vec<_> = wallets
            .iter()
            .map(|w| (w.id.as_str(), w.name.as_str()))
            .collect();
        assert_eq!(got, vec![("dup", "Two"), ("other", UNKNOWN_WALLET_NAME)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignores_incomplete_announcements() {
        let bus = Arc::new(BroadcastBus::new());
        bus.register_wallet(AnnounceDetail {
            info: ProviderInfo {
                uuid: "no-provider".to_string(),
                ..Default::default()
            },
            provider: None,
        });
        bus.register_wallet(detail("", Some("No uuid")));
        let mut remote_icon = detail("remote-icon", Some("Remote"));
        remote_icon.info.icon = Some("https://tracker.example/icon.png".to_string());
        bus.register_wallet(remote_icon);

        let wallets = Eip6963Source::with_bus(bus)
            .discover(Duration::from_millis(50))
            .await;

        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].id, "remote-icon");
        assert_eq!(wallets[0].icon, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_announcements_inside_time_box() {
        let bus = Arc::new(BroadcastBus::new());
        let source = Eip6963Source::with_bus(bus.clone());

        let early = {
            let bus = bus.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                bus.announce(&detail("early", Some("Early")));
            })
        };
        let late = {
            let bus = bus.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                bus.announce(&detail("late", Some("Late")));
            })
        };

        let wallets = source.discover(Duration::from_millis(150)).await;
        early.await.unwrap();
        late.await.unwrap();

        let ids: Vec<_> = wallets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["early"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_discovery_removes_listener() {
        let bus = Arc::new(BroadcastBus::new());
        let source = Eip6963Source::with_bus(bus.clone());

        let result =
            tokio::time::timeout(Duration::from_millis(10), source.discover(Duration::from_secs(1)))
                .await;

        assert!(result.is_err());
        assert_eq!(bus.listener_count(), 0);
    }
}
