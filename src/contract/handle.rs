//! Signer-bound contract handle.
//!
//! Errors from contract calls are returned to the caller as-is; only the
//! session boundary absorbs wallet failures.

use alloy::contract::{ContractInstance, Interface};
use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, TxHash};
use alloy::providers::DynProvider;

use crate::contract::binding::ContractBinding;
use crate::contract::ContractResult;
use crate::wallet::{AccountSigner, RpcSigner};

/// Contract address + interface + the signer that will issue calls.
#[derive(Debug, Clone)]
pub struct ContractHandle<S> {
    binding: ContractBinding,
    signer: S,
}

impl<S: AccountSigner> ContractHandle<S> {
    /// Bind the contract to a signer.
    pub fn new(binding: ContractBinding, signer: S) -> Self {
        Self { binding, signer }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.binding.address()
    }

    /// Contract interface.
    pub fn abi(&self) -> &JsonAbi {
        self.binding.abi()
    }

    /// Signer the handle is bound to.
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Account calls are made from.
    pub fn caller(&self) -> Address {
        self.signer.address()
    }
}

impl ContractHandle<RpcSigner> {
    fn instance(&self) -> ContractInstance<DynProvider> {
        ContractInstance::new(
            self.address(),
            self.signer.provider().clone(),
            Interface::new(self.abi().clone()),
        )
    }

    /// Read-only call, returning the decoded outputs.
    pub async fn call(&self, function: &str, args: &[DynSolValue]) -> ContractResult<Vec<DynSolValue>> {
        let instance = self.instance();
        let outputs = instance
            .function(function, args)?
            .from(self.caller())
            .call()
            .await?;

        tracing::debug!(function, contract = %self.address(), "Contract call returned");
        Ok(outputs)
    }

    /// Submit a signed transaction, returning its hash once broadcast.
    pub async fn send(&self, function: &str, args: &[DynSolValue]) -> ContractResult<TxHash> {
        let instance = self.instance();
        let pending = instance
            .function(function, args)?
            .from(self.caller())
            .send()
            .await?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            function,
            tx_hash = %tx_hash,
            from = %self.caller(),
            "Contract transaction submitted"
        );
        Ok(tx_hash)
    }
}
