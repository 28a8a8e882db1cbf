//! Fixed contract address and interface.

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::ContractConfig;
use crate::contract::{ContractError, ContractResult};

/// ABI shipped with the crate for the CertChain contract.
pub const BUNDLED_ABI: &str = include_str!("../../abi/CertChain.json");

/// Where the certificate contract lives and what it can be called with.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    abi: Arc<JsonAbi>,
}

impl ContractBinding {
    /// Bind an address to a parsed ABI.
    pub fn new(address: Address, abi: JsonAbi) -> ContractResult<Self> {
        if abi.functions.is_empty() {
            return Err(ContractError::Abi("ABI declares no functions".to_string()));
        }
        Ok(Self {
            address,
            abi: Arc::new(abi),
        })
    }

    /// Build the binding described by configuration.
    ///
    /// Falls back to the bundled ABI when no `abi_path` is configured.
    pub fn from_config(config: &ContractConfig) -> ContractResult<Self> {
        let address: Address = config
            .address
            .parse()
            .map_err(|e| ContractError::Address(format!("'{}': {}", config.address, e)))?;

        let abi = match &config.abi_path {
            Some(path) => load_abi(Path::new(path))?,
            None => parse_abi(BUNDLED_ABI)?,
        };

        let binding = Self::new(address, abi)?;
        tracing::debug!(
            address = %binding.address,
            functions = binding.abi.functions.len(),
            "Contract binding loaded"
        );
        Ok(binding)
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Contract interface.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }
}

fn load_abi(path: &Path) -> ContractResult<JsonAbi> {
    let content = fs::read_to_string(path)
        .map_err(|e| ContractError::Abi(format!("{}: {}", path.display(), e)))?;
    parse_abi(&content)
}

fn parse_abi(json: &str) -> ContractResult<JsonAbi> {
    serde_json::from_str(json).map_err(|e| ContractError::Abi(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_abi() {
        let binding = ContractBinding::from_config(&ContractConfig::default()).unwrap();
        assert!(binding.abi().function("issueCertificate").is_some());
        assert!(binding.abi().function("verifyCertificate").is_some());
        assert_eq!(
            binding.address().to_string().to_lowercase(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn test_invalid_address() {
        let config = ContractConfig {
            address: "0x1234".into(),
            abi_path: None,
        };
        let err = ContractBinding::from_config(&config).unwrap_err();
        assert!(matches!(err, ContractError::Address(_)));
    }

    #[test]
    fn test_abi_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"type":"function","name":"ping","stateMutability":"view","inputs":[],"outputs":[]}}]"#
        )
        .unwrap();

        let config = ContractConfig {
            abi_path: Some(file.path().to_string_lossy().into_owned()),
            ..ContractConfig::default()
        };
        let binding = ContractBinding::from_config(&config).unwrap();
        assert!(binding.abi().function("ping").is_some());
        assert!(binding.abi().function("issueCertificate").is_none());
    }

    #[test]
    fn test_empty_abi_rejected() {
        let err = ContractBinding::new(Address::ZERO, JsonAbi::default()).unwrap_err();
        assert!(err.to_string().contains("no functions"));
    }
}
