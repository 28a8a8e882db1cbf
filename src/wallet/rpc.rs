//! JSON-RPC backed wallet.
//!
//! # Responsibilities
//! - Connect to the wallet's JSON-RPC endpoint
//! - Resolve authorized accounts from the node or from a local key
//! - Bound every call with the configured timeout
//! - Push `accountsChanged` / `chainChanged` notifications from a watcher task

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::TransportError;
use serde::Serialize;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::config::WalletConfig;
use crate::wallet::local::LocalKey;
use crate::wallet::provider::{AccountSigner, WalletProvider};
use crate::wallet::types::{WalletError, WalletEvent, WalletResult};

/// EIP-1193 "user rejected request".
const USER_REJECTED: i64 = 4001;
/// EIP-1193 "unsupported method".
const UNSUPPORTED_METHOD: i64 = 4200;
/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Where authorized accounts come from.
#[derive(Debug, Clone)]
enum AccountSource {
    /// Accounts managed (and unlocked) by the node.
    Node,
    /// A single account whose key is held by this process.
    Local(LocalKey),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParams {
    chain_id: String,
}

struct Inner {
    provider: DynProvider,
    source: AccountSource,
    events: broadcast::Sender<WalletEvent>,
    timeout: Duration,
}

impl Inner {
    async fn bounded<T, F>(&self, fut: F) -> WalletResult<T>
    where
        F: IntoFuture<Output = Result<T, TransportError>>,
    {
        match timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(WalletError::Timeout(self.timeout.as_secs())),
        }
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        self.bounded(self.provider.get_chain_id()).await
    }

    async fn accounts(&self) -> WalletResult<Vec<Address>> {
        match &self.source {
            AccountSource::Local(key) => Ok(vec![key.address()]),
            AccountSource::Node => self.bounded(self.provider.get_accounts()).await,
        }
    }

    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        match &self.source {
            AccountSource::Local(key) => Ok(vec![key.address()]),
            AccountSource::Node => {
                let requested = self
                    .bounded(self.provider.raw_request::<_, Vec<Address>>(
                        "eth_requestAccounts".into(),
                        Vec::<serde_json::Value>::new(),
                    ))
                    .await;
                match requested {
                    // Plain nodes expose their unlocked accounts without a prompt.
                    Err(WalletError::Unsupported(_)) => self.accounts().await,
                    other => other,
                }
            }
        }
    }
}

/// Map a transport error onto the wallet error taxonomy.
fn classify(err: TransportError) -> WalletError {
    if let Some(payload) = err.as_error_resp() {
        match payload.code {
            USER_REJECTED => return WalletError::Rejected(payload.message.to_string()),
            UNSUPPORTED_METHOD | METHOD_NOT_FOUND => {
                return WalletError::Unsupported(payload.message.to_string())
            }
            _ => {}
        }
    }
    WalletError::Rpc(err.to_string())
}

/// Wallet reached over JSON-RPC.
pub struct RpcWallet {
    inner: Arc<Inner>,
    watcher: Option<JoinHandle<()>>,
}

impl RpcWallet {
    /// Create a wallet for the given endpoint.
    ///
    /// # Arguments
    /// * `rpc_url` - JSON-RPC endpoint
    /// * `timeout_secs` - Per-call timeout
    /// * `local_key` - Sign locally with this key instead of node accounts
    pub fn new(rpc_url: &str, timeout_secs: u64, local_key: Option<LocalKey>) -> WalletResult<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| WalletError::Rpc(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let (provider, source) = match local_key {
            Some(key) => {
                let provider = ProviderBuilder::new()
                    .wallet(key.ethereum_wallet())
                    .connect_http(url)
                    .erased();
                (provider, AccountSource::Local(key))
            }
            None => (
                ProviderBuilder::new().connect_http(url).erased(),
                AccountSource::Node,
            ),
        };

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            rpc_url = %rpc_url,
            local_key = matches!(source, AccountSource::Local(_)),
            "Wallet provider initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                provider,
                source,
                events,
                timeout: Duration::from_secs(timeout_secs),
            }),
            watcher: None,
        })
    }

    /// Detect a wallet from configuration.
    ///
    /// Returns `Ok(None)` when no endpoint is configured, which the session
    /// reports as a missing wallet.
    pub fn detect(config: &WalletConfig) -> WalletResult<Option<Self>> {
        let Some(rpc_url) = config.rpc_url.as_deref() else {
            tracing::info!("No wallet endpoint configured");
            return Ok(None);
        };

        let mut wallet = Self::new(rpc_url, config.rpc_timeout_secs, LocalKey::from_env()?)?;
        if config.event_poll_ms > 0 {
            wallet.spawn_event_watcher(Duration::from_millis(config.event_poll_ms));
        }
        Ok(Some(wallet))
    }

    /// Start pushing change notifications, checking every `every`.
    ///
    /// Replaces a previously started watcher.
    pub fn spawn_event_watcher(&mut self, every: Duration) {
        if let Some(old) = self.watcher.take() {
            old.abort();
        }
        let inner = self.inner.clone();
        self.watcher = Some(tokio::spawn(watch_wallet(inner, every)));
    }
}

impl Drop for RpcWallet {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

impl std::fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWallet")
            .field("local_key", &matches!(self.inner.source, AccountSource::Local(_)))
            .field("timeout", &self.inner.timeout)
            .field("watching", &self.watcher.is_some())
            .finish()
    }
}

/// Compare chain and accounts periodically, emitting events on change.
async fn watch_wallet(inner: Arc<Inner>, every: Duration) {
    let mut last_chain = inner.chain_id().await.ok();
    let mut last_accounts = inner.accounts().await.ok();

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match inner.chain_id().await {
            Ok(chain_id) => {
                if last_chain.is_some_and(|last| last != chain_id) {
                    tracing::debug!(chain_id, "Wallet chain changed");
                    let _ = inner.events.send(WalletEvent::ChainChanged(chain_id));
                }
                last_chain = Some(chain_id);
            }
            Err(e) => tracing::debug!(error = %e, "Chain poll failed"),
        }

        match inner.accounts().await {
            Ok(accounts) => {
                if last_accounts.as_ref().is_some_and(|last| *last != accounts) {
                    tracing::debug!(count = accounts.len(), "Wallet accounts changed");
                    let _ = inner
                        .events
                        .send(WalletEvent::AccountsChanged(accounts.clone()));
                }
                last_accounts = Some(accounts);
            }
            Err(e) => tracing::debug!(error = %e, "Account poll failed"),
        }
    }
}

impl WalletProvider for RpcWallet {
    type Signer = RpcSigner;

    async fn chain_id(&self) -> WalletResult<u64> {
        self.inner.chain_id().await
    }

    async fn accounts(&self) -> WalletResult<Vec<Address>> {
        self.inner.accounts().await
    }

    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        self.inner.request_accounts().await
    }

    async fn signer(&self) -> WalletResult<RpcSigner> {
        let accounts = self.inner.accounts().await?;
        let address = accounts
            .first()
            .copied()
            .ok_or(WalletError::NoAuthorizedAccount)?;

        Ok(RpcSigner {
            address,
            provider: self.inner.provider.clone(),
        })
    }

    async fn switch_chain(&self, chain_id: u64) -> WalletResult<()> {
        let params = [SwitchChainParams {
            chain_id: format!("{:#x}", chain_id),
        }];
        self.inner
            .bounded(self.inner.provider.raw_request::<_, serde_json::Value>(
                "wallet_switchEthereumChain".into(),
                params,
            ))
            .await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.inner.events.subscribe()
    }
}

/// Signer for an account reachable through the RPC wallet.
#[derive(Clone)]
pub struct RpcSigner {
    address: Address,
    provider: DynProvider,
}

impl RpcSigner {
    /// Provider that submits calls and transactions for this account.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl AccountSigner for RpcSigner {
    fn address(&self) -> Address {
        self.address
    }
}

impl std::fmt::Debug for RpcSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSigner")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_detect_without_endpoint() {
        let config = WalletConfig::default();
        let wallet = RpcWallet::detect(&config).unwrap();
        assert!(wallet.is_none());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let result = RpcWallet::new("not a url", 5, None);
        assert!(result.unwrap_err().to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_local_key_accounts_need_no_rpc() {
        let key = LocalKey::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let expected = key.address();
        // Nothing listens here; local accounts never touch the endpoint.
        let wallet = RpcWallet::new("http://127.0.0.1:1", 1, Some(key)).unwrap();

        assert_eq!(wallet.accounts().await.unwrap(), vec![expected]);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![expected]);
        assert_eq!(wallet.signer().await.unwrap().address(), expected);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_errors() {
        let wallet = RpcWallet::new("http://127.0.0.1:1", 1, None).unwrap();
        assert!(wallet.chain_id().await.is_err());
    }

    #[test]
    fn test_switch_params_shape() {
        let params = [SwitchChainParams {
            chain_id: format!("{:#x}", 1337u64),
        }];
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json, serde_json::json!([{ "chainId": "0x539" }]));
    }
}
