//! The wallet provider contract.
//!
//! The gateway depends on exactly four provider capabilities: list accounts,
//! hand out a signer, send a transaction, and call a view method. Anything
//! that offers those (a browser extension bridge, a JSON-RPC client, the
//! in-memory wallet) can back a [`WalletSession`](crate::WalletSession).

use async_trait::async_trait;
use bytes::Bytes;
use etherdocs_core::{Address, PublicKey, TxHash};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// A call against a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract address.
    pub to: Address,
    /// ABI calldata.
    pub data: Bytes,
}

/// A signing capability for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerHandle {
    pub address: Address,
    pub public_key: PublicKey,
}

/// Proof that a transaction reached finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// Block height the transaction was included at.
    pub block: u64,
    pub from: Address,
}

/// Wallet provider: the external collaborator behind a session.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for its accounts. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Get the signer for one of the accounts.
    async fn get_signer(&self, account: &Address) -> Result<SignerHandle>;

    /// Sign and submit a state-changing call, resolving once it is final.
    ///
    /// A revert is reported as [`ProviderError::Reverted`]. Dropping the
    /// returned future does not withdraw a transaction already submitted.
    async fn send_transaction(&self, signer: &SignerHandle, call: ContractCall)
        -> Result<TxReceipt>;

    /// Execute a read-only call against current ledger state.
    async fn call_view(&self, call: ContractCall) -> Result<Bytes>;
}
