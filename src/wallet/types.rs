//! Wallet events and error definitions.

use alloy::primitives::Address;
use thiserror::Error;

/// Notification pushed by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of authorized accounts changed. Empty means disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(u64),
}

impl WalletEvent {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletEvent::AccountsChanged(_) => "accounts_changed",
            WalletEvent::ChainChanged(_) => "chain_changed",
        }
    }
}

/// Errors that can occur talking to a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The user declined the request in the wallet.
    #[error("Request rejected by user: {0}")]
    Rejected(String),

    /// No account has been authorized for this application.
    #[error("No authorized account")]
    NoAuthorizedAccount,

    /// Invalid private key format or derivation error.
    #[error("Key error: {0}")]
    Key(String),

    /// The wallet does not implement the requested method.
    #[error("Unsupported wallet method: {0}")]
    Unsupported(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(WalletEvent::ChainChanged(1).kind(), "chain_changed");
        assert_eq!(WalletEvent::AccountsChanged(vec![]).kind(), "accounts_changed");
    }

    #[test]
    fn test_error_display() {
        let err = WalletError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = WalletError::Rejected("User denied account authorization".into());
        assert!(err.to_string().contains("User denied"));
    }
}
