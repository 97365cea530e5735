/// Controller
///
/// Headless connection state for a UI: the discovered wallets, the current
/// session, a connecting flag and the last error message. Rendering is left
/// to whoever reads it.
///
use std::sync::Arc;

use alloy::primitives::ChainId;
use log::debug;
use parking_lot::Mutex;

use crate::connector::Connector;
use crate::error::Result;
use crate::session::ConnectedSession;
use crate::types::{ConnectOptions, ConnectorDisclosure, ConnectorInfo, WalletCandidate};

#[derive(Debug, Default)]
struct ControllerState {
    /// In-flight `connect` calls
    connecting: usize,
    error: Option<String>,
    wallets: Vec<WalletCandidate>,
    session: Option<Arc<ConnectedSession>>,
}

/// Counts one connect attempt, released even if the connect future is dropped
struct ConnectingGuard<'a>(&'a Mutex<ControllerState>);

impl<'a> ConnectingGuard<'a> {
    fn start(state: &'a Mutex<ControllerState>) -> Self {
        state.lock().connecting += 1;
        Self(state)
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().connecting -= 1;
    }
}

pub struct WalletController {
    connector: Connector,
    state: Mutex<ControllerState>,
}

impl WalletController {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub async fn discover(&self) -> Vec<WalletCandidate> {
        self.clear_error();
        let wallets = self.connector.discover_wallets().await;
        self.state.lock().wallets = wallets.clone();
        wallets
    }

    /// Connect using the configured preferred chain. A failure is kept as
    /// the error message and returned as well.
    pub async fn connect(&self, candidate: WalletCandidate) -> Result<Arc<ConnectedSession>> {
        self.clear_error();
        let opts = ConnectOptions {
            chain_id: self.connector.config().preferred_chain_id,
        };

        let result = {
            let _connecting = ConnectingGuard::start(&self.state);
            self.connector.connect(candidate, opts).await
        };

        match result {
            Ok(session) => {
                let session = Arc::new(session);
                let previous = self.state.lock().session.replace(session.clone());
                if let Some(previous) = previous {
                    debug!("replacing session with {}", previous.candidate().id);
                    previous.disconnect().await;
                }
                Ok(session)
            }
            Err(e) => {
                self.state.lock().error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Session state is cleared whatever the wallet does during teardown
    pub async fn disconnect(&self) {
        self.clear_error();
        let session = self.state.lock().session.take();
        if let Some(session) = session {
            session.disconnect().await;
        }
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// True while any `connect` call is still pending
    pub fn is_connecting(&self) -> bool {
        self.state.lock().connecting > 0
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().session.is_some()
    }

    pub fn wallets(&self) -> Vec<WalletCandidate> {
        self.state.lock().wallets.clone()
    }

    pub fn session(&self) -> Option<Arc<ConnectedSession>> {
        self.state.lock().session.clone()
    }

    pub fn accounts(&self) -> Vec<String> {
        self.session().map(|s| s.accounts()).unwrap_or_default()
    }

    pub fn address(&self) -> Option<String> {
        self.session().and_then(|s| s.address())
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.session().map(|s| s.chain_id())
    }

    pub fn connector_info(&self) -> Option<ConnectorInfo> {
        self.session().map(|s| s.connector_info().clone())
    }

    pub fn connector_disclosure(&self) -> &ConnectorDisclosure {
        self.connector.get_connector_disclosure()
    }
}
