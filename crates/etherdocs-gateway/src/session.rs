//! Wallet sessions.

use std::fmt;
use std::sync::Arc;

use etherdocs_core::Address;

use crate::error::{GatewayError, Result};
use crate::provider::{SignerHandle, WalletProvider};

/// An authenticated signing capability: one account on one provider.
///
/// Owned by the caller and passed explicitly into every gateway call; the
/// gateway borrows it for the duration of that call and keeps nothing.
#[derive(Clone)]
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    signer: SignerHandle,
}

impl WalletSession {
    /// Connect to a provider: request its accounts and take the first one.
    pub async fn connect(provider: Arc<dyn WalletProvider>) -> Result<Self> {
        let accounts = provider.request_accounts().await?;
        let account = *accounts.first().ok_or(GatewayError::NoWalletAvailable)?;
        let signer = provider.get_signer(&account).await?;

        tracing::info!(address = %account, "wallet session connected");
        Ok(Self { provider, signer })
    }

    /// Build a session from a provider and a signer obtained elsewhere.
    pub fn from_parts(provider: Arc<dyn WalletProvider>, signer: SignerHandle) -> Self {
        Self { provider, signer }
    }

    /// The session's account.
    pub fn address(&self) -> Address {
        self.signer.address
    }

    pub fn signer(&self) -> &SignerHandle {
        &self.signer
    }

    pub fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.signer.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLedger, MemoryWallet};
    use etherdocs_core::Keypair;

    #[tokio::test]
    async fn test_connect_takes_first_account() {
        let ledger = MemoryLedger::new(Address::ZERO);
        let first = Keypair::from_seed(&[1; 32]);
        let second = Keypair::from_seed(&[2; 32]);
        let expected = first.address();
        let wallet = MemoryWallet::new(ledger, vec![first, second]);

        let session = WalletSession::connect(Arc::new(wallet)).await.unwrap();
        assert_eq!(session.address(), expected);
        assert_eq!(session.signer().public_key.address(), expected);
    }

    #[tokio::test]
    async fn test_connect_without_accounts() {
        let ledger = MemoryLedger::new(Address::ZERO);
        let wallet = MemoryWallet::new(ledger, Vec::new());

        let err = WalletSession::connect(Arc::new(wallet)).await.unwrap_err();
        assert_eq!(err, GatewayError::NoWalletAvailable);
    }

    #[tokio::test]
    async fn test_debug_hides_provider() {
        let ledger = MemoryLedger::new(Address::ZERO);
        let wallet = MemoryWallet::with_random_account(ledger);
        let session = WalletSession::connect(Arc::new(wallet)).await.unwrap();
        let rendered = format!("{session:?}");
        assert!(rendered.starts_with("WalletSession { address: Address(0x"));
    }
}
