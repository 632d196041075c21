//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an in-memory ledger, a wallet
//! with a deterministic key, a connected session, and a coordinator whose
//! gateway counts its calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use etherdocs::{
    Coordinator, EtherdocsConfig, IssuanceResult, VerificationRequest, VerificationResult,
};
use etherdocs_core::{Fingerprint, Keypair};
use etherdocs_gateway::{
    LedgerGateway, MemoryLedger, MemoryWallet, RegisterOutcome, RegistryGateway, Result,
    SignerHandle, VerifyOutcome, WalletSession,
};
use etherdocs_qr::QrCodec;

/// A [`LedgerGateway`] wrapper that counts calls.
pub struct CountingGateway<G> {
    inner: G,
    registers: AtomicUsize,
    verifies: AtomicUsize,
}

impl<G> CountingGateway<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            registers: AtomicUsize::new(0),
            verifies: AtomicUsize::new(0),
        }
    }

    pub fn register_calls(&self) -> usize {
        self.registers.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }

    /// Calls of either kind.
    pub fn total_calls(&self) -> usize {
        self.register_calls() + self.verify_calls()
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: LedgerGateway> LedgerGateway for CountingGateway<G> {
    async fn register(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<RegisterOutcome> {
        self.registers.fetch_add(1, Ordering::SeqCst);
        self.inner.register(session, fingerprint).await
    }

    async fn verify(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
    ) -> Result<VerifyOutcome> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(session, fingerprint).await
    }
}

/// A coordinator over the in-memory ledger with one connected issuer.
pub struct TestFixture {
    pub keypair: Keypair,
    pub ledger: Arc<MemoryLedger>,
    pub wallet: Arc<MemoryWallet>,
    pub session: WalletSession,
    pub coordinator: Coordinator<CountingGateway<RegistryGateway>>,
}

impl TestFixture {
    /// Create a new fixture with a random issuer key.
    pub fn new() -> Self {
        Self::build(Keypair::generate(), None, EtherdocsConfig::default())
    }

    /// Create with a deterministic issuer key.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::build(Keypair::from_seed(&seed), None, EtherdocsConfig::default())
    }

    /// Create with explicit configuration.
    pub fn with_config(config: EtherdocsConfig) -> Self {
        Self::build(Keypair::generate(), None, config)
    }

    /// Another issuer on the same ledger as `self`.
    pub fn second_issuer(&self, seed: [u8; 32]) -> Self {
        let config = EtherdocsConfig {
            gateway: self.coordinator.gateway().inner().config().clone(),
            ..EtherdocsConfig::default()
        };
        Self::build(Keypair::from_seed(&seed), Some(self.ledger.clone()), config)
    }

    fn build(keypair: Keypair, ledger: Option<Arc<MemoryLedger>>, config: EtherdocsConfig) -> Self {
        let ledger = ledger.unwrap_or_else(|| MemoryLedger::new(config.gateway.contract));
        let wallet = Arc::new(MemoryWallet::new(ledger.clone(), vec![keypair.clone()]));
        let signer = SignerHandle {
            address: keypair.address(),
            public_key: keypair.public_key(),
        };
        let session = WalletSession::from_parts(wallet.clone(), signer);
        let coordinator = Coordinator::new(
            CountingGateway::new(RegistryGateway::new(config.gateway.clone())),
            QrCodec::new(config.qr.clone()),
            config.coordinator.clone(),
        );
        Self {
            keypair,
            ledger,
            wallet,
            session,
            coordinator,
        }
    }

    /// The gateway's call counters.
    pub fn gateway(&self) -> &CountingGateway<RegistryGateway> {
        self.coordinator.gateway()
    }

    /// Issue a document from this fixture's session.
    pub async fn issue(&self, document: &[u8]) -> IssuanceResult {
        self.coordinator.issue(document, Some(&self.session)).await
    }

    /// Run a check with this fixture's session.
    pub async fn verify(&self, request: VerificationRequest) -> VerificationResult {
        self.coordinator.verify(request, Some(&self.session)).await
    }

    /// Run a check with no wallet connected.
    pub async fn verify_without_wallet(&self, request: VerificationRequest) -> VerificationResult {
        self.coordinator.verify(request, None).await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Several issuers sharing one ledger.
pub fn multi_issuer_fixtures(count: usize) -> Vec<TestFixture> {
    let first = TestFixture::with_seed([0u8; 32]);
    let mut fixtures = Vec::with_capacity(count);
    for i in 1..count {
        let mut seed = [0u8; 32];
        seed[0] = i as u8;
        fixtures.push(first.second_issuer(seed));
    }
    fixtures.insert(0, first);
    fixtures.truncate(count);
    fixtures
}
