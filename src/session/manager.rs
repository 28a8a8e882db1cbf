//! Session Manager.
//!
//! # Responsibilities
//! - Single source of truth for "connected, on the right network, with a
//!   usable contract handle"
//! - Mediate every call into the wallet provider
//! - Absorb wallet failures: log them, expose only declarative state
//!
//! # Design Decisions
//! - Session snapshots live in an `ArcSwap`; every mutation is one
//!   read-copy-update commit, so readers never see a signer paired with a
//!   stale contract handle
//! - Racing connect sequences resolve as last write wins
//! - A chain change restarts the application instead of patching state

use alloy::primitives::Address;
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::NetworkConfig;
use crate::contract::{ContractBinding, ContractHandle};
use crate::lifecycle::reload::{ReloadHandle, ReloadReason};
use crate::observability::metrics;
use crate::session::notice::Notice;
use crate::session::state::{Connection, Session, SessionError, SessionView};
use crate::wallet::{AccountSigner, WalletError, WalletEvent, WalletProvider, WalletResult};

const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Step of the connect sequence, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStep {
    NetworkCheck,
    RequestAccounts,
    Signer,
}

impl ConnectStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectStep::NetworkCheck => "network_check",
            ConnectStep::RequestAccounts => "request_accounts",
            ConnectStep::Signer => "signer",
        }
    }
}

impl fmt::Display for ConnectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connect step that failed, and why.
#[derive(Debug)]
struct ConnectFailure {
    step: ConnectStep,
    source: WalletError,
}

impl ConnectFailure {
    fn at(step: ConnectStep) -> impl FnOnce(WalletError) -> Self {
        move |source| Self { step, source }
    }
}

/// Owns the wallet session for one application instance.
pub struct SessionManager<P: WalletProvider> {
    provider: Option<P>,
    network: NetworkConfig,
    binding: ContractBinding,
    session: ArcSwap<Session<P::Signer>>,
    notices: broadcast::Sender<Notice>,
    reload: ReloadHandle,
    pub(crate) listening: Arc<AtomicBool>,
}

impl<P: WalletProvider> SessionManager<P> {
    /// Create a manager with an empty session.
    ///
    /// # Arguments
    /// * `provider` - The wallet, or `None` when no wallet is present
    /// * `network` - The one network the session may operate on
    /// * `binding` - Contract address and ABI
    /// * `reload` - Where chain changes request an application restart
    pub fn new(
        provider: Option<P>,
        network: NetworkConfig,
        binding: ContractBinding,
        reload: ReloadHandle,
    ) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            provider,
            network,
            binding,
            session: ArcSwap::from_pointee(Session::default()),
            notices,
            reload,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Arc<Session<P::Signer>> {
        self.session.load_full()
    }

    /// Current session as a display summary.
    pub fn view(&self) -> SessionView {
        self.session.load().view(self.network.chain_id)
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    /// Subscribe to transient user notices.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Apply `f` to a copy of the session and publish it in one step.
    ///
    /// `f` may run more than once if another commit races this one; the
    /// result of the attempt that won is returned.
    fn update<R: Default>(&self, mut f: impl FnMut(&mut Session<P::Signer>) -> R) -> R {
        let mut out = None;
        self.session.rcu(|current| {
            let mut next = Session::clone(current);
            out = Some(f(&mut next));
            next
        });
        out.unwrap_or_default()
    }

    fn notify(&self, notice: Notice) {
        tracing::info!(notice = %notice, "User notice");
        let _ = self.notices.send(notice);
    }

    /// Query the wallet's chain and compare it with the expected one.
    ///
    /// Stores the reported chain ID. On mismatch sets the Access-Denied
    /// error and returns `false`; on match clears any error.
    pub async fn check_network(&self, provider: &P) -> WalletResult<bool> {
        let chain_id = provider.chain_id().await?;
        let (matches, dropped) = self.update(|session| {
            let was_connected = session.is_connected();
            let matches = session.record_chain(chain_id, &self.network);
            (matches, was_connected && !matches)
        });

        if dropped {
            metrics::set_session_connected(false);
        }
        if !matches {
            tracing::warn!(
                chain_id,
                expected = self.network.chain_id,
                network = %self.network.name,
                "Wallet is on the wrong network"
            );
            metrics::record_network_mismatch();
        }
        Ok(matches)
    }

    /// Run the full connect sequence.
    ///
    /// Never fails from the caller's point of view: a missing wallet sets
    /// the "not found" error, a wrong network leaves the Access-Denied
    /// error, and any other failure is logged with the session unchanged.
    pub async fn connect_wallet(&self) {
        let Some(provider) = self.provider.as_ref() else {
            tracing::warn!("No wallet provider available");
            self.update(|session| session.set_error(SessionError::WalletNotFound));
            return;
        };

        let sequence = Uuid::new_v4();
        let span = tracing::info_span!("connect_wallet", %sequence);
        self.run_connect(provider).instrument(span).await;
    }

    async fn run_connect(&self, provider: &P) {
        metrics::record_connect_attempt();

        match self.check_network(provider).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(source) => {
                self.log_failure(ConnectFailure {
                    step: ConnectStep::NetworkCheck,
                    source,
                });
                return;
            }
        }

        let connection = match self.establish(provider).await {
            Ok(connection) => connection,
            Err(failure) => {
                self.log_failure(failure);
                return;
            }
        };

        let account = connection.account();
        let committed = self.update(|session| session.commit_connection(connection.clone()));
        if committed {
            tracing::info!(account = %account, "Wallet connected");
            metrics::set_session_connected(true);
        } else {
            tracing::warn!(account = %account, "Network changed during connect, connection discarded");
        }
    }

    /// Steps 3-5: authorize, obtain the signer, bind the contract.
    async fn establish(&self, provider: &P) -> Result<Connection<P::Signer>, ConnectFailure> {
        provider
            .request_accounts()
            .await
            .map_err(ConnectFailure::at(ConnectStep::RequestAccounts))?;

        let signer = provider
            .signer()
            .await
            .map_err(ConnectFailure::at(ConnectStep::Signer))?;
        let account = signer.address();

        let contract = ContractHandle::new(self.binding.clone(), signer.clone());
        Ok(Connection::new(account, signer, contract))
    }

    fn log_failure(&self, failure: ConnectFailure) {
        tracing::error!(
            step = %failure.step,
            error = %failure.source,
            "Wallet connection failed"
        );
        metrics::record_connect_failure(failure.step.as_str());
    }

    /// Handle an `accountsChanged` notification.
    ///
    /// An empty list disconnects; anything else re-runs the connect
    /// sequence so the contract handle follows the new signer.
    pub async fn handle_accounts_changed(&self, accounts: Vec<Address>) {
        match accounts.first() {
            None => {
                self.update(Session::clear_connection);
                metrics::set_session_connected(false);
                self.notify(Notice::Disconnected);
            }
            Some(first) => {
                tracing::info!(account = %first, "Wallet account changed, reconnecting");
                self.connect_wallet().await;
            }
        }
    }

    /// Handle a `chainChanged` notification by restarting the application.
    pub fn handle_chain_changed(&self, chain_id: u64) {
        tracing::info!(chain_id, "Wallet chain changed, reloading");
        self.reload.request(ReloadReason::ChainChanged(chain_id));
    }

    /// Route a pushed wallet event to its handler.
    pub async fn dispatch(&self, event: WalletEvent) {
        metrics::record_wallet_event(event.kind());
        match event {
            WalletEvent::AccountsChanged(accounts) => self.handle_accounts_changed(accounts).await,
            WalletEvent::ChainChanged(chain_id) => self.handle_chain_changed(chain_id),
        }
    }

    /// Reconnect silently if the wallet already authorized an account.
    ///
    /// Best effort: every failure on this path is ignored.
    pub async fn auto_connect(&self) {
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        if let Ok(accounts) = provider.accounts().await {
            if !accounts.is_empty() {
                self.connect_wallet().await;
            }
        }
    }

    /// Ask the wallet to switch to the expected network.
    ///
    /// Session state is not touched; the switch is observed through the
    /// chain-changed notification. A failure only emits a notice.
    pub async fn switch_network(&self) -> bool {
        let result = match self.provider.as_ref() {
            Some(provider) => provider.switch_chain(self.network.chain_id).await,
            None => Err(WalletError::Unsupported("no wallet provider".to_string())),
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    chain_id = %self.network.chain_id_hex(),
                    network = %self.network.name,
                    "Network switch requested"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Network switch failed");
                self.notify(Notice::NetworkSwitchFailed);
                false
            }
        }
    }
}

impl<P: WalletProvider> fmt::Debug for SessionManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("has_provider", &self.provider.is_some())
            .field("network", &self.network)
            .field("contract", &self.binding.address())
            .field("session", &self.view())
            .finish()
    }
}
