//! Wallet event subscription.
//!
//! Handlers are registered once per manager and released when the returned
//! guard is dropped, so reconnects never stack duplicate handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::session::manager::SessionManager;
use crate::wallet::WalletProvider;

/// Why event handlers could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenError {
    #[error("no wallet provider to listen to")]
    NoProvider,

    #[error("wallet event handlers are already registered")]
    AlreadyListening,
}

/// Registered `accountsChanged` / `chainChanged` handlers.
///
/// Dropping the subscription deregisters them.
#[derive(Debug)]
pub struct EventSubscription {
    task: JoinHandle<()>,
    registered: Arc<AtomicBool>,
}

impl EventSubscription {
    /// Whether the dispatch task is still running.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.task.abort();
        self.registered.store(false, Ordering::SeqCst);
        tracing::debug!("Wallet event handlers removed");
    }
}

impl<P: WalletProvider> SessionManager<P> {
    /// Register the wallet event handlers.
    ///
    /// Events are handled one at a time, in the order the wallet pushed them.
    pub fn listen(self: &Arc<Self>) -> Result<EventSubscription, ListenError> {
        let provider = self.provider().ok_or(ListenError::NoProvider)?;

        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ListenError::AlreadyListening);
        }

        let mut events = provider.subscribe();
        let manager = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => manager.dispatch(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Wallet events dropped, handler fell behind");
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Wallet event stream closed");
                        break;
                    }
                }
            }
        });

        tracing::debug!("Wallet event handlers registered");
        Ok(EventSubscription {
            task,
            registered: Arc::clone(&self.listening),
        })
    }
}
