//! Configuration file watcher.
//!
//! A saved file only restarts the application when it differs from the
//! running configuration and the contract it names can actually be bound.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::CertChainConfig;
use crate::contract::ContractBinding;

/// What a change on disk means for the running instance.
#[derive(Debug)]
pub enum ConfigChange {
    /// Content is equivalent to the running configuration.
    Unchanged,
    /// A usable new configuration.
    Updated(CertChainConfig),
    /// The file no longer describes a startable instance.
    Rejected(String),
}

/// Load `path` and compare it against `running`.
///
/// The contract binding is built up front so a bad ABI path or address is
/// refused here instead of failing the restart.
pub fn evaluate_change(path: &Path, running: &CertChainConfig) -> ConfigChange {
    let candidate = match load_config(path) {
        Ok(config) => config,
        Err(e) => return ConfigChange::Rejected(e.to_string()),
    };
    if candidate == *running {
        return ConfigChange::Unchanged;
    }
    match ContractBinding::from_config(&candidate.contract) {
        Ok(_) => ConfigChange::Updated(candidate),
        Err(e) => ConfigChange::Rejected(e.to_string()),
    }
}

/// Watches the configuration file of a running host.
pub struct ConfigWatcher {
    path: PathBuf,
    running: CertChainConfig,
    update_tx: mpsc::UnboundedSender<CertChainConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, starting from the configuration in use.
    ///
    /// Returns the watcher and a receiver for accepted configurations.
    pub fn new(
        path: &Path,
        running: CertChainConfig,
    ) -> (Self, mpsc::UnboundedReceiver<CertChainConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                running,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching on notify's background thread.
    ///
    /// The returned handle must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut running,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match evaluate_change(&path, &running) {
                        ConfigChange::Unchanged => {
                            tracing::debug!(path = ?path, "Config file saved without changes");
                        }
                        ConfigChange::Updated(config) => {
                            tracing::info!(path = ?path, "Config file changed, restarting application");
                            running = config.clone();
                            let _ = update_tx.send(config);
                        }
                        ConfigChange::Rejected(reason) => {
                            tracing::error!(
                                error = %reason,
                                "Config file rejected, keeping current configuration"
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn running() -> CertChainConfig {
        let mut config = CertChainConfig::default();
        config.apply_env();
        config
    }

    #[test]
    fn test_identical_content_is_unchanged() {
        let file = config_file("[network]\nchain_id = 1337\nname = \"Ganache\"\n");
        assert!(matches!(
            evaluate_change(file.path(), &running()),
            ConfigChange::Unchanged
        ));
    }

    #[test]
    fn test_new_network_is_updated() {
        let file = config_file("[network]\nchain_id = 31337\nname = \"Localhost\"\n");
        match evaluate_change(file.path(), &running()) {
            ConfigChange::Updated(config) => assert_eq!(config.network.chain_id, 31337),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_abi_is_rejected() {
        let file = config_file("[contract]\nabi_path = \"/no/such/abi.json\"\n");
        match evaluate_change(file.path(), &running()) {
            ConfigChange::Rejected(reason) => assert!(reason.contains("/no/such/abi.json")),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_file_is_rejected() {
        let file = config_file("[network\nchain_id = ");
        assert!(matches!(
            evaluate_change(file.path(), &running()),
            ConfigChange::Rejected(_)
        ));
    }
}
