//! The ledger gateway: fingerprint operations as registry contract calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use etherdocs_core::{Address, Fingerprint, TxHash};
use serde::{Deserialize, Serialize};

use crate::abi;
use crate::error::{GatewayError, ProviderError, Result, TransportError};
use crate::provider::ContractCall;
use crate::session::WalletSession;

const VERIFY_OPERATION: &str = "verifyDocument";
const REGISTER_OPERATION: &str = "registerDocument";

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// The transaction is final and the fingerprint is bound to `issuer`.
    Registered {
        tx_hash: TxHash,
        block: u64,
        issuer: Address,
    },
    /// The fingerprint was already on the ledger; nothing was written.
    AlreadyRegistered,
}

/// Outcome of a lookup, as of the ledger state at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Found,
    NotFound,
}

impl From<bool> for VerifyOutcome {
    fn from(registered: bool) -> Self {
        if registered {
            Self::Found
        } else {
            Self::NotFound
        }
    }
}

/// Fingerprint operations against the ledger.
///
/// The session is passed per call; `None` means no wallet is connected and
/// yields [`GatewayError::NoWalletAvailable`].
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Bind `fingerprint` to the session's account. Suspends until the
    /// transaction is final or the finality budget runs out.
    async fn register(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<RegisterOutcome>;

    /// Read-only lookup. Sends no transaction.
    async fn verify(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<VerifyOutcome>;
}

#[async_trait]
impl<G: LedgerGateway + ?Sized> LedgerGateway for Arc<G> {
    async fn register(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<RegisterOutcome> {
        (**self).register(session, fingerprint).await
    }

    async fn verify(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<VerifyOutcome> {
        (**self).verify(session, fingerprint).await
    }
}

/// Configuration for [`RegistryGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address of the registry contract.
    pub contract: Address,
    /// Budget for a view call, in milliseconds.
    pub view_timeout_ms: u64,
    /// Budget for a transaction to reach finality (including the wallet
    /// prompt), in milliseconds.
    pub finality_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            contract: Address::ZERO,
            view_timeout_ms: 10_000,
            finality_timeout_ms: 120_000,
        }
    }
}

impl GatewayConfig {
    pub fn view_timeout(&self) -> Duration {
        Duration::from_millis(self.view_timeout_ms)
    }

    pub fn finality_timeout(&self) -> Duration {
        Duration::from_millis(self.finality_timeout_ms)
    }
}

/// [`LedgerGateway`] over the registry contract, reached through whatever
/// provider backs the session.
#[derive(Debug, Clone, Default)]
pub struct RegistryGateway {
    config: GatewayConfig,
}

impl RegistryGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn call(&self, data: bytes::Bytes) -> ContractCall {
        ContractCall {
            to: self.config.contract,
            data,
        }
    }

    async fn query(
        &self,
        session: &WalletSession,
        fingerprint: &Fingerprint,
    ) -> Result<VerifyOutcome> {
        let call = self.call(abi::encode_verify(fingerprint));
        let word = bounded(
            VERIFY_OPERATION,
            self.config.view_timeout(),
            session.provider().call_view(call),
        )
        .await?;
        Ok(abi::decode_bool(&word)?.into())
    }
}

/// Run a provider future under a time budget.
async fn bounded<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, ProviderError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result.map_err(GatewayError::from),
        Err(_) => {
            tracing::warn!(operation, ?after, "ledger call timed out");
            Err(TransportError::Timeout { operation, after }.into())
        }
    }
}

#[async_trait]
impl LedgerGateway for RegistryGateway {
    async fn register(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<RegisterOutcome> {
        let session = session.ok_or(GatewayError::NoWalletAvailable)?;

        if self.query(session, fingerprint).await? == VerifyOutcome::Found {
            tracing::debug!(%fingerprint, "already registered, no transaction sent");
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let call = self.call(abi::encode_register(fingerprint));
        let sent = bounded(
            REGISTER_OPERATION,
            self.config.finality_timeout(),
            session.provider().send_transaction(session.signer(), call),
        )
        .await;

        match sent {
            Ok(receipt) => {
                tracing::info!(
                    %fingerprint,
                    tx = %receipt.tx_hash,
                    block = receipt.block,
                    issuer = %receipt.from,
                    "document registered"
                );
                Ok(RegisterOutcome::Registered {
                    tx_hash: receipt.tx_hash,
                    block: receipt.block,
                    issuer: receipt.from,
                })
            }
            Err(GatewayError::Transport(TransportError::Reverted(reason))) => {
                // Lost a race with another issuer, or a real revert.
                match self.query(session, fingerprint).await {
                    Ok(VerifyOutcome::Found) => {
                        tracing::debug!(%fingerprint, "registered concurrently");
                        Ok(RegisterOutcome::AlreadyRegistered)
                    }
                    _ => {
                        tracing::warn!(%fingerprint, %reason, "registration reverted");
                        Err(TransportError::Reverted(reason).into())
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn verify(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<VerifyOutcome> {
        let session = session.ok_or(GatewayError::NoWalletAvailable)?;
        let outcome = self.query(session, fingerprint).await?;
        tracing::debug!(%fingerprint, ?outcome, "ledger lookup");
        Ok(outcome)
    }
}
