//! Wallet provider subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (RPC URL) + environment (optional private key)
//!     → rpc.rs (JSON-RPC provider, account source, change watcher)
//!     → provider.rs (WalletProvider / AccountSigner traits)
//!     → session manager
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod local;
pub mod provider;
pub mod rpc;
pub mod types;

pub use local::LocalKey;
pub use provider::{AccountSigner, WalletProvider};
pub use rpc::{RpcSigner, RpcWallet};
pub use types::{WalletError, WalletEvent, WalletResult};
