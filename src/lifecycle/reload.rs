//! Application reload requests.
//!
//! A reload throws away the whole application instance (wallet, session,
//! listeners) and starts a fresh one.

use std::fmt;
use tokio::sync::broadcast;

use crate::observability::metrics;

/// Why the application must restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The wallet moved to another chain.
    ChainChanged(u64),
    /// The configuration file changed.
    ConfigChanged,
}

impl ReloadReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadReason::ChainChanged(_) => "chain_changed",
            ReloadReason::ConfigChanged => "config_changed",
        }
    }
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadReason::ChainChanged(chain_id) => write!(f, "chain changed to {}", chain_id),
            ReloadReason::ConfigChanged => f.write_str("configuration changed"),
        }
    }
}

/// Handle through which any component can ask for a restart.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    tx: broadcast::Sender<ReloadReason>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Subscribe to reload requests.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadReason> {
        self.tx.subscribe()
    }

    /// Ask the host to restart the application.
    pub fn request(&self, reason: ReloadReason) {
        metrics::record_reload(reason.as_str());
        if self.tx.send(reason).is_err() {
            tracing::debug!(reason = %reason, "Reload requested with no host listening");
        }
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_reaches_subscriber() {
        let reload = ReloadHandle::new();
        let mut rx = reload.subscribe();

        reload.clone().request(ReloadReason::ChainChanged(5));
        assert_eq!(rx.recv().await.unwrap(), ReloadReason::ChainChanged(5));
    }

    #[test]
    fn test_request_without_subscribers() {
        ReloadHandle::new().request(ReloadReason::ConfigChanged);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ReloadReason::ChainChanged(1).to_string(),
            "chain changed to 1"
        );
        assert_eq!(ReloadReason::ConfigChanged.as_str(), "config_changed");
    }
}
