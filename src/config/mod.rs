//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → CertChainConfig (validated, immutable)
//!     → handed to lifecycle::startup for one application instance
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → host restarts the application with the new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Secrets (private keys) never live in the config file

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use watcher::{evaluate_change, ConfigChange, ConfigWatcher};
pub use schema::{CertChainConfig, ContractConfig, NetworkConfig, ObservabilityConfig, WalletConfig};
