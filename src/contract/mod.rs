//! Certificate contract access.
//!
//! # Data Flow
//! ```text
//! ContractConfig (address, optional ABI path)
//!     → binding.rs (parsed address + JSON ABI, loaded once at startup)
//!     → handle.rs (binding + signer, rebuilt whenever the signer changes)
//! ```

pub mod binding;
pub mod handle;

use thiserror::Error;

pub use binding::ContractBinding;
pub use handle::ContractHandle;

/// Errors from building or using a contract handle.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Contract address did not parse.
    #[error("Invalid contract address {0}")]
    Address(String),

    /// ABI missing or malformed.
    #[error("Invalid contract ABI: {0}")]
    Abi(String),

    /// The call or transaction failed.
    #[error("Contract call failed: {0}")]
    Call(#[from] alloy::contract::Error),
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;
