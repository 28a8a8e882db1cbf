//! Transient user notices. Fire-and-forget, nobody acknowledges them.

use std::fmt;

/// A one-shot message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The wallet revoked every account.
    Disconnected,
    /// The wallet refused or failed to switch networks.
    NetworkSwitchFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Disconnected => "Wallet disconnected",
            Notice::NetworkSwitchFailed => "Failed to switch network.",
        }
    }

    /// Whether the notice reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::NetworkSwitchFailed)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
