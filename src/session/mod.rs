//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! connect request / auto-connect
//!     → manager.rs: check network → request accounts → signer → contract handle
//!     → state.rs: one atomic commit of {account, signer, contract}
//!     → consumers read Session snapshots / SessionView
//!
//! wallet pushes events
//!     → listener.rs (scoped subscription)
//!     → manager.rs: accountsChanged → disconnect or reconnect
//!                   chainChanged    → lifecycle reload
//!
//! transient messages → notice.rs → host logs them
//! ```

pub mod listener;
pub mod manager;
pub mod notice;
pub mod state;

pub use listener::{EventSubscription, ListenError};
pub use manager::{ConnectStep, SessionManager};
pub use notice::Notice;
pub use state::{
    network_name, short_account, Connection, Session, SessionError, SessionView,
    ACCESS_DENIED_PREFIX,
};
