//! # wallet-session-sdk
//!
//! Privacy-first wallet connections for EIP-1193 providers.
//!
//! ## Features
//! - EIP-6963 wallet discovery, time boxed and only on user action
//! - Session lifecycle: connect, optional chain switch, live
//!   `accountsChanged` / `chainChanged` tracking, refresh and disconnect
//! - Connector transparency info that wallets cannot use to spoof identity
//! - A static self-disclosure of what the connector does
//!
//! ## Example
//!
//! ```rust,ignore
//! let bus = Arc::new(BroadcastBus::new());
//! let connector = Connector::new(ConnectorConfig::default())
//!     .with_announcement_bus(bus.clone());
//!
//! // Triggered by a click on "Connect wallet"
//! let wallets = connector.discover_wallets().await;
//!
//! let session = connector
//!     .connect(wallets[0].clone(), ConnectOptions::chain(11155111))
//!     .await?;
//!
//! println!("accounts: {:?} on chain {}", session.accounts(), session.chain_id());
//!
//! session.disconnect().await;
//! ```
//!
//! ## License
//! MIT OR Apache-2.0

pub mod chain_adapter;
pub mod chain_id;
pub mod connector;
pub mod connector_info;
pub mod constants;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod provider;
pub mod rpc_types;
pub mod session;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

/// Exposed for easy access
pub use chain_id::parse_chain_id;
pub use connector::{Connector, ConnectorConfig};
pub use controller::WalletController;
pub use discovery::{AnnouncementBus, BroadcastBus, Eip6963Source};
pub use error::{Error, Result};
pub use provider::{Eip1193Provider, EventSupport, Listener, ProviderEvent, SharedProvider};
pub use session::{ConnectedSession, SessionStatus};
pub use types::{ConnectOptions, ConnectorInfo, WalletCandidate};
