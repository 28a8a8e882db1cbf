//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the session host.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment variable overriding `wallet.rpc_url`.
pub const WALLET_URL_ENV_VAR: &str = "CERTCHAIN_WALLET_URL";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CertChainConfig {
    /// The single network the dApp is allowed to operate on.
    pub network: NetworkConfig,

    /// Deployed certificate contract.
    pub contract: ContractConfig,

    /// Wallet provider settings.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl CertChainConfig {
    /// Apply environment overrides on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(WALLET_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                self.wallet.rpc_url = Some(url);
            }
        }
    }
}

/// Expected network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain ID the wallet must report (1337 for a local Ganache).
    pub chain_id: u64,

    /// Display name used in user-facing messages.
    pub name: String,
}

impl NetworkConfig {
    /// Chain ID as the `0x`-prefixed hex string wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            name: "Ganache".to_string(),
        }
    }
}

/// Certificate contract location and interface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address.
    pub address: String,

    /// Path to a JSON ABI file. The bundled CertChain ABI is used when unset.
    pub abi_path: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            // First contract deployed by the default local dev account.
            address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            abi_path: None,
        }
    }
}

/// Wallet provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet. No wallet is available when unset.
    pub rpc_url: Option<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Interval at which the wallet checks for account and chain changes.
    /// Zero disables change notifications.
    pub event_poll_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            rpc_timeout_secs: 10,
            event_poll_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CertChainConfig::default();
        assert_eq!(config.network.chain_id, 1337);
        assert_eq!(config.network.name, "Ganache");
        assert!(config.wallet.rpc_url.is_none());
        assert!(config.contract.abi_path.is_none());
    }

    #[test]
    fn test_chain_id_hex() {
        let network = NetworkConfig::default();
        assert_eq!(network.chain_id_hex(), "0x539");

        let mainnet = NetworkConfig {
            chain_id: 1,
            name: "Ethereum".into(),
        };
        assert_eq!(mainnet.chain_id_hex(), "0x1");
    }

    #[test]
    fn test_partial_toml() {
        let config: CertChainConfig = toml::from_str(
            r#"
            [network]
            chain_id = 5777

            [wallet]
            rpc_url = "http://127.0.0.1:7545"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.chain_id, 5777);
        assert_eq!(config.network.name, "Ganache");
        assert_eq!(config.wallet.rpc_url.as_deref(), Some("http://127.0.0.1:7545"));
        assert_eq!(config.wallet.rpc_timeout_secs, 10);
    }
}
