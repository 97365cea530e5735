use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use wallet_session_sdk::{
    BroadcastBus, ConnectOptions, Connector, ConnectorConfig, Eip1193Provider, EventSupport,
    Listener, ProviderEvent,
    discovery::{AnnounceDetail, ProviderInfo},
    rpc_types::{ProviderRpcError, RequestArguments},
};

/// Minimal in-process wallet. Answers the handful of methods the connector
/// uses and lets the demo push events.
#[derive(Default)]
struct DemoWallet {
    chain_id: Mutex<String>,
    listeners: Mutex<Vec<(ProviderEvent, Listener)>>,
}

impl DemoWallet {
    fn emit(&self, event: ProviderEvent, payload: Value) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&payload);
        }
    }
}

#[async_trait]
impl Eip1193Provider for DemoWallet {
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderRpcError> {
        match args.method.as_str() {
            "eth_requestAccounts" | "eth_accounts" => {
                Ok(json!(["0x0000000000000000000000000000000000000123"]))
            }
            "eth_chainId" => Ok(json!(self.chain_id.lock().clone())),
            "wallet_switchEthereumChain" => {
                let target = args
                    .params
                    .as_ref()
                    .and_then(|p| p[0]["chainId"].as_str())
                    .ok_or_else(|| ProviderRpcError::new(-32602, "missing chainId"))?
                    .to_string();
                *self.chain_id.lock() = target.clone();
                self.emit(ProviderEvent::ChainChanged, json!(target));
                Ok(Value::Null)
            }
            "eth_getConnectorInfo" => Ok(json!({
                "connectorType": "injected",
                "connectorName": "Demo Wallet",
                "mediation": "direct",
                "thirdPartyInfrastructure": false,
                "rpcVisibility": "direct"
            })),
            method => Err(ProviderRpcError::unsupported_method(method)),
        }
    }

    fn event_support(&self) -> EventSupport {
        EventSupport::SubscribeAndRemove
    }

    fn on(&self, event: ProviderEvent, listener: Listener) {
        self.listeners.lock().push((event, listener));
    }

    fn remove_listener(&self, event: ProviderEvent, listener: &Listener) {
        self.listeners
            .lock()
            .retain(|(e, l)| !(*e == event && Arc::ptr_eq(l, listener)));
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let wallet = Arc::new(DemoWallet {
        chain_id: Mutex::new("0x1".to_string()),
        ..Default::default()
    });

    // Stands in for the browser window the wallet extension announces on
    let bus = Arc::new(BroadcastBus::new());
    bus.register_wallet(AnnounceDetail::new(
        ProviderInfo {
            uuid: "350670db-19fa-4704-a166-e52e178b59d2".to_string(),
            name: Some("Demo Wallet".to_string()),
            rdns: Some("com.example.demo".to_string()),
            icon: Some("data:image/svg+xml;base64,PHN2Zy8+".to_string()),
        },
        wallet.clone(),
    ));

    let connector = Connector::new(ConnectorConfig::default()).with_announcement_bus(bus);
    let disclosure = serde_json::to_string_pretty(connector.get_connector_disclosure()).unwrap();
    println!("disclosure: {disclosure}");

    let wallets = connector.discover_wallets().await;
    println!("discovered: {:?}", wallets.iter().map(|w| &w.name).collect::<Vec<_>>());

    let Some(candidate) = wallets.into_iter().next() else {
        println!("no wallet announced");
        return;
    };

    let session = connector
        .connect(candidate, ConnectOptions::chain(11155111))
        .await
        .expect("connect failed");

    // The switch happened before listeners were attached, re-read the wallet
    session.refresh().await.expect("refresh failed");

    println!("connector info: {:?}", session.connector_info());
    println!("accounts: {:?}", session.accounts());
    println!("chain id: {}", session.chain_id());

    wallet.emit(
        ProviderEvent::AccountsChanged,
        json!(["0x0000000000000000000000000000000000000456"]),
    );
    println!("accounts after change: {:?}", session.accounts());

    session.disconnect().await;
    println!("status: {:?}", session.status());
}
