/// Session
///
/// Connection establishment and the live state of one wallet connection.
///
/// A session goes Connecting -> Connected -> Disconnected and never comes
/// back from Disconnected. Its accounts and chain id live in one record
/// shared with the wallet event listeners; every writer checks the
/// disconnected flag under the same lock before touching it.
///
use std::fmt;
use std::sync::{Arc, Weak};

use alloy::primitives::ChainId;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::Value;

use crate::chain_adapter::ChainAdapter;
use crate::chain_id::{encode_chain_id, parse_chain_id};
use crate::connector_info::ConnectorInfoResolver;
use crate::error::{Error, Result};
use crate::provider::{EventSupport, Listener, ProviderEvent, SharedProvider};
use crate::rpc_types::{ProviderMethod, RequestArguments};
use crate::types::{
    ConnectOptions, ConnectorInfo, ConnectorInfoFallback, ConnectorType, Mediation,
    RpcVisibility, WalletCandidate,
};
use crate::utils::{best_effort, coerce_accounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connected,
    Disconnected,
}

#[derive(Debug)]
struct SessionState {
    accounts: Vec<String>,
    chain_id: ChainId,
    disconnected: bool,
}

/// The two callbacks registered on the provider. Kept so `disconnect` can
/// hand the very same `Arc`s back to `remove_listener`.
struct SessionListeners {
    accounts_changed: Listener,
    chain_changed: Listener,
}

impl SessionListeners {
    fn new(state: &Arc<Mutex<SessionState>>) -> Self {
        Self {
            accounts_changed: accounts_changed_listener(Arc::downgrade(state)),
            chain_changed: chain_changed_listener(Arc::downgrade(state)),
        }
    }

    fn iter(&self) -> [(ProviderEvent, &Listener); 2] {
        [
            (ProviderEvent::AccountsChanged, &self.accounts_changed),
            (ProviderEvent::ChainChanged, &self.chain_changed),
        ]
    }
}

fn accounts_changed_listener(state: Weak<Mutex<SessionState>>) -> Listener {
    Arc::new(move |payload: &Value| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut state = state.lock();
        if state.disconnected {
            return;
        }
        state.accounts = coerce_accounts(payload);
        debug!("accountsChanged: {} account(s)", state.accounts.len());
    })
}

fn chain_changed_listener(state: Weak<Mutex<SessionState>>) -> Listener {
    Arc::new(move |payload: &Value| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut state = state.lock();
        if state.disconnected {
            return;
        }
        // A malformed push update is dropped, the session keeps its chain id
        match parse_chain_id(payload) {
            Ok(chain_id) => {
                state.chain_id = chain_id;
                debug!("chainChanged: {chain_id}");
            }
            Err(e) => warn!("ignoring chainChanged payload {payload}: {e}"),
        }
    })
}

/// Live state of one wallet connection, returned by `connect`.
pub struct ConnectedSession {
    candidate: WalletCandidate,
    provider: SharedProvider,
    chain_adapter: ChainAdapter,
    connector_info: ConnectorInfo,
    event_support: EventSupport,
    listeners: SessionListeners,
    state: Arc<Mutex<SessionState>>,
}

/// Establish a session with `candidate`.
///
/// 1. Ask for account authorization
/// 2. Read and validate the current chain id
/// 3. Switch chain if `opts.chain_id` asks for a different one
/// 4. Resolve connector info, inferring it from the candidate if needed
/// 5. Attach `accountsChanged` / `chainChanged` listeners when supported
pub async fn connect(
    candidate: WalletCandidate,
    opts: ConnectOptions,
    resolver: &ConnectorInfoResolver,
) -> Result<ConnectedSession> {
    let provider = candidate.provider.clone().ok_or(Error::InvalidProvider)?;
    debug!("connecting to wallet {} ({})", candidate.id, candidate.name);

    let accounts = provider
        .request(RequestArguments::new(ProviderMethod::RequestAccounts))
        .await?;
    let accounts = coerce_accounts(&accounts);

    let chain_id = provider
        .request(RequestArguments::new(ProviderMethod::ChainId))
        .await?;
    let chain_id = parse_chain_id(&chain_id)?;

    if let Some(target) = opts.chain_id.filter(|target| *target != chain_id) {
        debug!("switching wallet {} from chain {chain_id} to {target}", candidate.id);
        provider
            .request(RequestArguments::switch_ethereum_chain(encode_chain_id(target)))
            .await?;
    }

    let chain_adapter = ChainAdapter::new(provider.clone());

    let fallback = ConnectorInfoFallback {
        connector_type: Some(if candidate.is_injected() {
            ConnectorType::Injected
        } else {
            ConnectorType::Custom
        }),
        connector_name: Some(candidate.name.clone()),
        mediation: Some(Mediation::Direct),
        relay_provider: None,
        third_party_infrastructure: Some(false),
        rpc_visibility: Some(RpcVisibility::Direct),
    };
    let connector_info = resolver
        .resolve(provider.as_ref(), &candidate.id, Some(fallback))
        .await;

    let state = Arc::new(Mutex::new(SessionState {
        accounts,
        chain_id,
        disconnected: false,
    }));
    let listeners = SessionListeners::new(&state);

    let event_support = provider.event_support();
    if event_support.can_subscribe() {
        for (event, listener) in listeners.iter() {
            provider.on(event, listener.clone());
        }
        debug!("attached wallet event listeners for {}", candidate.id);
    }

    info!(
        "connected to {} on chain {chain_id} ({} connector, source {})",
        candidate.id, connector_info.connector_type, connector_info.source
    );

    Ok(ConnectedSession {
        candidate,
        provider,
        chain_adapter,
        connector_info,
        event_support,
        listeners,
        state,
    })
}

impl ConnectedSession {
    pub fn candidate(&self) -> &WalletCandidate {
        &self.candidate
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    pub fn chain_adapter(&self) -> &ChainAdapter {
        &self.chain_adapter
    }

    pub fn connector_info(&self) -> &ConnectorInfo {
        &self.connector_info
    }

    pub fn event_support(&self) -> EventSupport {
        self.event_support
    }

    pub fn accounts(&self) -> Vec<String> {
        self.state.lock().accounts.clone()
    }

    /// First authorized account
    pub fn address(&self) -> Option<String> {
        self.state.lock().accounts.first().cloned()
    }

    pub fn chain_id(&self) -> ChainId {
        self.state.lock().chain_id
    }

    pub fn is_disconnected(&self) -> bool {
        self.state.lock().disconnected
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_disconnected() {
            SessionStatus::Disconnected
        } else {
            SessionStatus::Connected
        }
    }

    /// Re-read accounts and chain id from the wallet.
    ///
    /// No-op once disconnected. Unlike the `chainChanged` listener, a
    /// malformed chain id here is returned as an error.
    pub async fn refresh(&self) -> Result<()> {
        if self.is_disconnected() {
            return Ok(());
        }

        let accounts = self
            .provider
            .request(RequestArguments::new(ProviderMethod::Accounts))
            .await?;
        let chain_id = self
            .provider
            .request(RequestArguments::new(ProviderMethod::ChainId))
            .await?;

        let accounts = coerce_accounts(&accounts);
        let chain_id = parse_chain_id(&chain_id)?;

        let mut state = self.state.lock();
        if state.disconnected {
            debug!("session {} disconnected during refresh", self.candidate.id);
            return Ok(());
        }
        state.accounts = accounts;
        state.chain_id = chain_id;
        Ok(())
    }

    /// Tear the session down. Safe to call any number of times and never
    /// fails; revoking permissions is attempted but its outcome ignored.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.lock();
            if state.disconnected {
                return;
            }
            state.disconnected = true;
        }

        if self.event_support.can_remove() {
            for (event, listener) in self.listeners.iter() {
                self.provider.remove_listener(event, listener);
            }
            debug!("detached wallet event listeners for {}", self.candidate.id);
        }

        best_effort(
            "wallet_revokePermissions",
            self.provider.request(RequestArguments::revoke_accounts_permission()),
        )
        .await;

        info!("disconnected from {}", self.candidate.id);
    }
}

impl fmt::Debug for ConnectedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConnectedSession")
            .field("wallet", &self.candidate.id)
            .field("accounts", &state.accounts)
            .field("chain_id", &state.chain_id)
            .field("disconnected", &state.disconnected)
            .field("connector_info", &self.connector_info)
            .finish()
    }
}
