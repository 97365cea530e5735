/// Provider
///
/// The wallet-side capability this crate drives. A provider always answers
/// `request`; event subscription is optional and advertised once through
/// [`EventSupport`] instead of being probed on every call.
///
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc_types::{ProviderRpcError, RequestArguments};

pub type SharedProvider = Arc<dyn Eip1193Provider>;

/// Event callback handed to [`Eip1193Provider::on`]. The same `Arc` is later
/// passed to [`Eip1193Provider::remove_listener`], so providers can match
/// registrations with `Arc::ptr_eq`.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderEvent {
    #[serde(rename = "accountsChanged")]
    AccountsChanged,

    #[serde(rename = "chainChanged")]
    ChainChanged,
}

serde_plain::derive_display_from_serialize!(ProviderEvent);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSupport {
    /// Request only, `on`/`remove_listener` are never called
    #[default]
    None,
    /// `on` works but listeners cannot be detached
    Subscribe,
    SubscribeAndRemove,
}

impl EventSupport {
    pub fn can_subscribe(self) -> bool {
        !matches!(self, EventSupport::None)
    }

    pub fn can_remove(self) -> bool {
        matches!(self, EventSupport::SubscribeAndRemove)
    }
}

#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderRpcError>;

    fn event_support(&self) -> EventSupport {
        EventSupport::None
    }

    fn on(&self, _event: ProviderEvent, _listener: Listener) {}

    fn remove_listener(&self, _event: ProviderEvent, _listener: &Listener) {}
}

impl fmt::Debug for dyn Eip1193Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eip1193Provider")
            .field("event_support", &self.event_support())
            .finish()
    }
}
