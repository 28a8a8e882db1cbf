//! Startup orchestration.
//!
//! # Responsibilities
//! - Build one application instance: contract binding, wallet, session
//!   manager, event handlers, notice logging, auto-connect
//! - Run the host loop that rebuilds the instance on every reload
//!
//! # Design Decisions
//! - Fail fast on the first start: a bad contract binding or wallet key is
//!   fatal. A restart that fails falls back to the last configuration that
//!   started
//! - A reload never patches state in place; the old instance is dropped
//!   (releasing its listeners) before the new one starts

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::watcher::ConfigWatcher;
use crate::config::{CertChainConfig, ConfigError};
use crate::contract::{ContractBinding, ContractError};
use crate::lifecycle::reload::{ReloadHandle, ReloadReason};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::session::{EventSubscription, ListenError, Notice, SessionManager};
use crate::wallet::{RpcWallet, WalletError, WalletProvider};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("contract: {0}")]
    Contract(#[from] ContractError),

    #[error("wallet: {0}")]
    Wallet(#[from] WalletError),

    #[error("event handlers: {0}")]
    Listen(#[from] ListenError),
}

/// One running application instance.
pub struct Application<P: WalletProvider> {
    manager: Arc<SessionManager<P>>,
    _subscription: Option<EventSubscription>,
    notice_logger: JoinHandle<()>,
}

impl Application<RpcWallet> {
    /// Start an instance against the configured JSON-RPC wallet.
    pub async fn start(config: &CertChainConfig, reload: ReloadHandle) -> Result<Self, StartupError> {
        let binding = ContractBinding::from_config(&config.contract)?;
        let provider = RpcWallet::detect(&config.wallet)?;
        Self::with_provider(provider, config, binding, reload).await
    }
}

impl<P: WalletProvider> Application<P> {
    /// Start an instance around an already-built wallet provider.
    pub async fn with_provider(
        provider: Option<P>,
        config: &CertChainConfig,
        binding: ContractBinding,
        reload: ReloadHandle,
    ) -> Result<Self, StartupError> {
        let manager = Arc::new(SessionManager::new(
            provider,
            config.network.clone(),
            binding,
            reload,
        ));

        let subscription = match manager.listen() {
            Ok(subscription) => Some(subscription),
            Err(ListenError::NoProvider) => None,
            Err(e) => return Err(e.into()),
        };
        let notice_logger = spawn_notice_logger(manager.subscribe_notices());

        manager.auto_connect().await;

        let view = manager.view();
        tracing::info!(
            connected = view.connected,
            chain_id = ?view.chain_id,
            expected_chain_id = config.network.chain_id,
            "Application started"
        );
        metrics::set_session_connected(view.connected);

        Ok(Self {
            manager,
            _subscription: subscription,
            notice_logger,
        })
    }

    pub fn manager(&self) -> &Arc<SessionManager<P>> {
        &self.manager
    }
}

impl<P: WalletProvider> Drop for Application<P> {
    fn drop(&mut self) {
        self.notice_logger.abort();
    }
}

/// Surface notices the way a toast would: one log line each.
fn spawn_notice_logger(mut notices: broadcast::Receiver<Notice>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            if notice.is_error() {
                tracing::warn!(target: "certchain::notice", "{}", notice);
            } else {
                tracing::info!(target: "certchain::notice", "{}", notice);
            }
        }
    })
}

/// Run application instances until shutdown, restarting on every reload.
pub async fn run_host(
    mut config: CertChainConfig,
    config_path: Option<&Path>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let mut shutdown_rx = shutdown.subscribe();

    let (_watcher, mut config_updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, file changes ignored");
                    (None, updates)
                }
            }
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    // Configuration of the last instance that started.
    let mut last_good: Option<CertChainConfig> = None;

    loop {
        if shutdown.is_triggered() {
            break;
        }

        let reload = ReloadHandle::new();
        let mut reloads = reload.subscribe();
        let app = match Application::<RpcWallet>::start(&config, reload).await {
            Ok(app) => {
                last_good = Some(config.clone());
                app
            }
            Err(e) => match last_good.take() {
                Some(previous) if previous != config => {
                    tracing::error!(
                        error = %e,
                        "Restart with new configuration failed, keeping current configuration"
                    );
                    config = previous;
                    continue;
                }
                _ => return Err(e),
            },
        };

        tokio::select! {
            reason = reloads.recv() => {
                if let Ok(reason) = reason {
                    tracing::info!(reason = %reason, "Restarting application");
                }
            }
            Some(new_config) = config_updates.recv() => {
                metrics::record_reload(ReloadReason::ConfigChanged.as_str());
                tracing::info!(reason = %ReloadReason::ConfigChanged, "Restarting application");
                config = new_config;
            }
            _ = shutdown_rx.recv() => break,
        }

        drop(app);
    }

    tracing::info!("Session host stopped");
    Ok(())
}
