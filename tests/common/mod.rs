//! Shared utilities for integration tests.

#![allow(dead_code)]

use alloy::primitives::Address;
use metrics::{
    Counter, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

use certchain_session::config::{ContractConfig, NetworkConfig};
use certchain_session::contract::ContractBinding;
use certchain_session::lifecycle::ReloadHandle;
use certchain_session::wallet::{AccountSigner, WalletError, WalletEvent, WalletProvider, WalletResult};
use certchain_session::SessionManager;

/// Signer handed out by the mock wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSigner {
    address: Address,
}

impl AccountSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }
}

/// Programmable wallet state.
#[derive(Debug, Default)]
pub struct MockState {
    /// Chain the wallet reports.
    pub chain_id: u64,
    /// Accounts already authorized for the app.
    pub authorized: Vec<Address>,
    /// Accounts the user picks when prompted.
    pub grant: Vec<Address>,
    pub reject_request: bool,
    pub fail_chain_query: bool,
    pub fail_accounts: bool,
    pub fail_signer: bool,
    pub fail_switch: bool,
    /// Wallet methods invoked, in order.
    pub calls: Vec<&'static str>,
}

/// In-memory wallet provider.
pub struct MockWallet {
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<WalletEvent>,
}

/// Control side of a `MockWallet`, usable after the wallet moved into a manager.
#[derive(Clone)]
pub struct MockControl {
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    pub fn new(chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Arc::new(Mutex::new(MockState {
                chain_id,
                ..MockState::default()
            })),
            events,
        }
    }

    /// Accounts granted when the user approves the prompt.
    pub fn granting(self, accounts: Vec<Address>) -> Self {
        self.state.lock().unwrap().grant = accounts;
        self
    }

    /// Accounts authorized before the app started.
    pub fn authorized(self, accounts: Vec<Address>) -> Self {
        self.state.lock().unwrap().authorized = accounts;
        self
    }

    pub fn control(&self) -> MockControl {
        MockControl {
            state: self.state.clone(),
            events: self.events.clone(),
        }
    }

    fn record(&self, call: &'static str) -> MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

impl MockControl {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    /// User switches accounts in the wallet.
    pub fn push_accounts(&self, accounts: Vec<Address>) {
        self.state().authorized = accounts.clone();
        let _ = self.events.send(WalletEvent::AccountsChanged(accounts));
    }

    /// User switches networks in the wallet.
    pub fn push_chain(&self, chain_id: u64) {
        self.state().chain_id = chain_id;
        let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
    }
}

impl WalletProvider for MockWallet {
    type Signer = MockSigner;

    async fn chain_id(&self) -> WalletResult<u64> {
        let state = self.record("eth_chainId");
        if state.fail_chain_query {
            return Err(WalletError::Rpc("connection refused".into()));
        }
        Ok(state.chain_id)
    }

    async fn accounts(&self) -> WalletResult<Vec<Address>> {
        let state = self.record("eth_accounts");
        if state.fail_accounts {
            return Err(WalletError::Rpc("connection refused".into()));
        }
        Ok(state.authorized.clone())
    }

    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        let mut state = self.record("eth_requestAccounts");
        if state.reject_request {
            return Err(WalletError::Rejected("User rejected the request.".into()));
        }
        if state.authorized.is_empty() {
            state.authorized = state.grant.clone();
        }
        Ok(state.authorized.clone())
    }

    async fn signer(&self) -> WalletResult<MockSigner> {
        let state = self.record("signer");
        if state.fail_signer {
            return Err(WalletError::Rpc("signer unavailable".into()));
        }
        state
            .authorized
            .first()
            .map(|address| MockSigner { address: *address })
            .ok_or(WalletError::NoAuthorizedAccount)
    }

    async fn switch_chain(&self, _chain_id: u64) -> WalletResult<()> {
        let state = self.record("wallet_switchEthereumChain");
        if state.fail_switch {
            return Err(WalletError::Rejected("User rejected the request.".into()));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

pub fn binding() -> ContractBinding {
    ContractBinding::from_config(&ContractConfig::default()).unwrap()
}

/// Ganache, chain 1337.
pub fn network() -> NetworkConfig {
    NetworkConfig::default()
}

pub fn manager(wallet: Option<MockWallet>) -> (Arc<SessionManager<MockWallet>>, ReloadHandle) {
    let reload = ReloadHandle::new();
    let manager = SessionManager::new(wallet, network(), binding(), reload.clone());
    (Arc::new(manager), reload)
}

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Recorder that keeps every value a gauge was set to.
#[derive(Default)]
pub struct GaugeRecorder {
    sets: Arc<Mutex<Vec<(String, f64)>>>,
}

struct RecordedGauge {
    name: String,
    sets: Arc<Mutex<Vec<(String, f64)>>>,
}

impl GaugeFn for RecordedGauge {
    fn increment(&self, _value: f64) {}

    fn decrement(&self, _value: f64) {}

    fn set(&self, value: f64) {
        self.sets.lock().unwrap().push((self.name.clone(), value));
    }
}

impl GaugeRecorder {
    /// Last value set on gauge `name`.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.sets
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(gauge, _)| gauge == name)
            .map(|(_, value)| *value)
    }
}

impl Recorder for GaugeRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, _key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::noop()
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(RecordedGauge {
            name: key.name().to_string(),
            sets: self.sets.clone(),
        }))
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
