//! CertChain wallet session library.

pub mod config;
pub mod contract;
pub mod lifecycle;
pub mod observability;
pub mod session;
pub mod wallet;

pub use config::CertChainConfig;
pub use lifecycle::{Application, Shutdown};
pub use session::{Session, SessionError, SessionManager, SessionView};
