use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::provider::{Eip1193Provider, EventSupport, Listener, ProviderEvent, SharedProvider};
use crate::rpc_types::{ProviderRpcError, RequestArguments};

#[derive(Clone)]
enum Scripted {
    Reply(Value),
    Fail(ProviderRpcError),
    Hang,
}

/// Scripted wallet. Records every request and listener registration.
pub struct MockProvider {
    script: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<RequestArguments>>,
    listeners: Mutex<Vec<(ProviderEvent, Listener)>>,
    removed: Mutex<Vec<(ProviderEvent, Listener)>>,
    side_effects: Mutex<HashMap<String, Vec<(ProviderEvent, Value)>>>,
    event_support: EventSupport,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_events(EventSupport::None)
    }

    pub fn with_events(event_support: EventSupport) -> Self {
        let mock = Self {
            script: Mutex::new(HashMap::new()),
            requests: Mutex::new(vec![]),
            listeners: Mutex::new(vec![]),
            removed: Mutex::new(vec![]),
            side_effects: Mutex::new(HashMap::new()),
            event_support,
        };
        mock.respond("eth_requestAccounts", json!(["0xabc"]));
        mock.respond("eth_accounts", json!(["0xdef"]));
        mock.respond("eth_chainId", json!("0x1"));
        mock.respond("wallet_revokePermissions", Value::Null);
        mock
    }

    pub fn shared(self) -> SharedProvider {
        Arc::new(self)
    }

    pub fn respond(&self, method: &str, value: Value) {
        self.script
            .lock()
            .insert(method.to_string(), Scripted::Reply(value));
    }

    pub fn fail(&self, method: &str, error: ProviderRpcError) {
        self.script
            .lock()
            .insert(method.to_string(), Scripted::Fail(error));
    }

    /// The request never completes
    pub fn hang(&self, method: &str) {
        self.script.lock().insert(method.to_string(), Scripted::Hang);
    }

    /// Fire `event` to the attached listeners while `method` is being served
    pub fn emit_during(&self, method: &str, event: ProviderEvent, payload: Value) {
        self.side_effects
            .lock()
            .entry(method.to_string())
            .or_default()
            .push((event, payload));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RequestArguments> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    pub fn listener_count(&self, event: ProviderEvent) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .count()
    }

    pub fn attached(&self) -> Vec<(ProviderEvent, Listener)> {
        self.listeners.lock().clone()
    }

    pub fn removed(&self) -> Vec<(ProviderEvent, Listener)> {
        self.removed.lock().clone()
    }

    pub fn emit(&self, event: ProviderEvent, payload: Value) {
        let targets: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in targets {
            listener(&payload);
        }
    }
}

#[async_trait]
impl Eip1193Provider for MockProvider {
    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderRpcError> {
        let scripted = self.script.lock().get(&args.method).cloned();
        let side_effects = self
            .side_effects
            .lock()
            .get(&args.method)
            .cloned()
            .unwrap_or_default();
        self.requests.lock().push(args);
        for (event, payload) in side_effects {
            self.emit(event, payload);
        }
        match scripted {
            Some(Scripted::Reply(value)) => Ok(value),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Hang) => futures::future::pending().await,
            None => Ok(Value::Null),
        }
    }

    fn event_support(&self) -> EventSupport {
        self.event_support
    }

    fn on(&self, event: ProviderEvent, listener: Listener) {
        self.listeners.lock().push((event, listener));
    }

    fn remove_listener(&self, event: ProviderEvent, listener: &Listener) {
        self.listeners
            .lock()
            .retain(|(e, l)| !(*e == event && Arc::ptr_eq(l, listener)));
        self.removed.lock().push((event, listener.clone()));
    }
}
