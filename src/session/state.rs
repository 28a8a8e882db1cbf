//! Session state and derived views.

use alloy::primitives::Address;
use serde::Serialize;
use thiserror::Error;

use crate::config::NetworkConfig;
use crate::contract::ContractHandle;
use crate::wallet::AccountSigner;

/// Prefix that marks the blocking wrong-network error.
pub const ACCESS_DENIED_PREFIX: &str = "Access Denied";

/// User-visible session error. At most one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The wallet is on another chain.
    #[error("Access Denied: Please switch MetaMask to {network} (Chain ID {chain_id}).")]
    WrongNetwork { network: String, chain_id: u64 },

    /// No wallet provider is present.
    #[error("MetaMask not found.")]
    WalletNotFound,
}

impl SessionError {
    /// Whether the error blocks the whole interface rather than showing inline.
    pub fn is_blocking(&self) -> bool {
        matches!(self, SessionError::WrongNetwork { .. })
    }
}

/// An established wallet connection: account, signer and contract handle
/// always travel together.
#[derive(Debug, Clone)]
pub struct Connection<S> {
    account: Address,
    signer: S,
    contract: ContractHandle<S>,
}

impl<S: AccountSigner> Connection<S> {
    pub(crate) fn new(account: Address, signer: S, contract: ContractHandle<S>) -> Self {
        Self {
            account,
            signer,
            contract,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn contract(&self) -> &ContractHandle<S> {
        &self.contract
    }
}

/// Wallet session for one running application instance.
#[derive(Debug, Clone)]
pub struct Session<S> {
    chain_id: Option<u64>,
    connection: Option<Connection<S>>,
    error: Option<SessionError>,
}

impl<S> Default for Session<S> {
    fn default() -> Self {
        Self {
            chain_id: None,
            connection: None,
            error: None,
        }
    }
}

impl<S: AccountSigner> Session<S> {
    /// Connected account, if any.
    pub fn account(&self) -> Option<Address> {
        self.connection.as_ref().map(Connection::account)
    }

    /// Chain last reported by the wallet.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Signer for the connected account.
    pub fn signer(&self) -> Option<&S> {
        self.connection.as_ref().map(Connection::signer)
    }

    /// Contract handle bound to the current signer.
    pub fn contract(&self) -> Option<&ContractHandle<S>> {
        self.connection.as_ref().map(Connection::contract)
    }

    pub fn connection(&self) -> Option<&Connection<S>> {
        self.connection.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Whether the wallet last reported `expected`.
    pub fn is_on_network(&self, expected: u64) -> bool {
        self.chain_id == Some(expected)
    }

    /// Read-only summary for display.
    pub fn view(&self, expected_chain_id: u64) -> SessionView {
        let account = self.account();
        SessionView {
            account,
            short_account: account.as_ref().map(short_account),
            chain_id: self.chain_id,
            network_name: self.chain_id.map(network_name),
            error: self.error.as_ref().map(ToString::to_string),
            connected: self.is_connected(),
            on_expected_network: self.is_on_network(expected_chain_id),
            blocking: self.error.as_ref().is_some_and(SessionError::is_blocking),
        }
    }

    /// Record the chain reported by the wallet. Returns whether it matches.
    ///
    /// A mismatch replaces the error and drops any connection, since a
    /// contract handle is never valid on the wrong network.
    pub(crate) fn record_chain(&mut self, chain_id: u64, network: &NetworkConfig) -> bool {
        self.chain_id = Some(chain_id);
        if chain_id == network.chain_id {
            self.error = None;
            true
        } else {
            self.error = Some(SessionError::WrongNetwork {
                network: network.name.clone(),
                chain_id: network.chain_id,
            });
            self.connection = None;
            false
        }
    }

    /// Install a connection. Refused while the wrong-network error is active.
    pub(crate) fn commit_connection(&mut self, connection: Connection<S>) -> bool {
        if self.error.as_ref().is_some_and(SessionError::is_blocking) {
            return false;
        }
        self.connection = Some(connection);
        true
    }

    pub(crate) fn clear_connection(&mut self) {
        self.connection = None;
    }

    pub(crate) fn set_error(&mut self, error: SessionError) {
        self.error = Some(error);
    }
}

/// Display name for a chain ID, falling back to `Chain <id>`.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        1337 => "Ganache".to_string(),
        11155111 => "Sepolia".to_string(),
        31337 => "Localhost".to_string(),
        other => format!("Chain {}", other),
    }
}

/// First six and last four characters of the checksummed address.
pub fn short_account(account: &Address) -> String {
    let full = account.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Serializable snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub account: Option<Address>,
    /// Account abbreviated as `0x1234...abcd`.
    pub short_account: Option<String>,
    pub chain_id: Option<u64>,
    /// Display name of the wallet's current chain.
    pub network_name: Option<String>,
    pub error: Option<String>,
    pub connected: bool,
    pub on_expected_network: bool,
    pub blocking: bool,
}
