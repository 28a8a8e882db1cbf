//! Wallet provider capability.
//!
//! Shaped after the browser-injected provider API: chain queries, silent and
//! prompting account queries, signer access, chain switching and pushed
//! `accountsChanged` / `chainChanged` notifications.

use alloy::primitives::Address;
use std::future::Future;
use tokio::sync::broadcast;

use crate::wallet::types::{WalletEvent, WalletResult};

/// Capability bound to one authorized account.
pub trait AccountSigner: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Address of the bound account.
    fn address(&self) -> Address;
}

/// A wallet the session can talk to.
pub trait WalletProvider: Send + Sync + 'static {
    /// Signer handed out for the authorized account.
    type Signer: AccountSigner;

    /// Current chain ID (`eth_chainId`).
    fn chain_id(&self) -> impl Future<Output = WalletResult<u64>> + Send;

    /// Already-authorized accounts, without prompting (`eth_accounts`).
    fn accounts(&self) -> impl Future<Output = WalletResult<Vec<Address>>> + Send;

    /// Request authorization, prompting the user if needed (`eth_requestAccounts`).
    fn request_accounts(&self) -> impl Future<Output = WalletResult<Vec<Address>>> + Send;

    /// Signer for the first authorized account.
    fn signer(&self) -> impl Future<Output = WalletResult<Self::Signer>> + Send;

    /// Ask the wallet to switch networks (`wallet_switchEthereumChain`).
    fn switch_chain(&self, chain_id: u64) -> impl Future<Output = WalletResult<()>> + Send;

    /// Subscribe to pushed wallet events.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}
