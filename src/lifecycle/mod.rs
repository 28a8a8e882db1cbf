//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Bind contract → Detect wallet → Session manager
//!     → Register wallet event handlers → Auto-connect
//!
//! Reload (reload.rs):
//!     chainChanged / config file change → drop instance → start fresh
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown → drop instance → exit
//! ```

pub mod reload;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use reload::{ReloadHandle, ReloadReason};
pub use shutdown::Shutdown;
pub use startup::{run_host, Application, StartupError};
