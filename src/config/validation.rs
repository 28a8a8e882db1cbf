//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and URLs parse
//! - Validate value ranges (timeouts > 0, chain id > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CertChainConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::CertChainConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("network.chain_id must be greater than zero")]
    ZeroChainId,

    #[error("network.name must not be empty")]
    EmptyNetworkName,

    #[error("contract.address '{0}' is not a valid address")]
    InvalidContractAddress(String),

    #[error("contract.address must not be the zero address")]
    ZeroContractAddress,

    #[error("contract.abi_path must not be empty")]
    EmptyAbiPath,

    #[error("wallet.rpc_url '{0}' is not a valid URL")]
    InvalidRpcUrl(String),

    #[error("wallet.rpc_timeout_secs must be greater than zero")]
    ZeroRpcTimeout,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &CertChainConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.network.chain_id == 0 {
        errors.push(ValidationError::ZeroChainId);
    }
    if config.network.name.trim().is_empty() {
        errors.push(ValidationError::EmptyNetworkName);
    }

    match config.contract.address.parse::<Address>() {
        Ok(address) if address == Address::ZERO => {
            errors.push(ValidationError::ZeroContractAddress)
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidContractAddress(
            config.contract.address.clone(),
        )),
    }
    if let Some(path) = &config.contract.abi_path {
        if path.trim().is_empty() {
            errors.push(ValidationError::EmptyAbiPath);
        }
    }

    if let Some(url) = &config.wallet.rpc_url {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::InvalidRpcUrl(url.clone()));
        }
    }
    if config.wallet.rpc_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRpcTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
