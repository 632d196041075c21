//! In-memory registry ledger and wallet.
//!
//! This is primarily for testing. [`MemoryLedger`] has the same contract
//! semantics as the deployed registry (duplicate registration reverts,
//! lookups are free) but keeps everything in memory. [`MemoryWallet`] is a
//! [`WalletProvider`] holding real Ed25519 keys, with knobs for the failure
//! modes a browser wallet exhibits.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use etherdocs_core::{Address, Fingerprint, Keypair, TxHash};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::abi::{self, RegistryCall};
use crate::error::ProviderError;
use crate::provider::{ContractCall, Result, SignerHandle, TxReceipt, WalletProvider};
use crate::tx::{SignedTransaction, Transaction};

/// Chain id used by the in-memory ledger.
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Revert reason for a duplicate `registerDocument`.
pub const ALREADY_REGISTERED_REASON: &str = "document already registered";

/// What the registry stores per fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerRecord {
    pub issuer: Address,
    /// Unix ms at inclusion.
    pub timestamp: u64,
    pub block: u64,
    /// `None` for records seeded directly by tests.
    pub tx_hash: Option<TxHash>,
}

/// In-memory registry ledger.
///
/// Thread-safe via RwLock; no lock is held across an await.
pub struct MemoryLedger {
    chain_id: u64,
    contract: Address,
    offline: AtomicBool,
    inner: RwLock<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    records: HashMap<Fingerprint, LedgerRecord>,
    /// Hashes of every applied transaction, for replay rejection.
    applied: HashSet<TxHash>,
    height: u64,
}

impl MemoryLedger {
    /// Create an empty ledger with the registry deployed at `contract`.
    pub fn new(contract: Address) -> Arc<Self> {
        Arc::new(Self {
            chain_id: DEFAULT_CHAIN_ID,
            contract,
            offline: AtomicBool::new(false),
            inner: RwLock::new(LedgerInner::default()),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Simulate the node being unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current block height.
    pub fn height(&self) -> u64 {
        self.read().height
    }

    /// Number of registered fingerprints.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record(&self, fingerprint: &Fingerprint) -> Option<LedgerRecord> {
        self.read().records.get(fingerprint).copied()
    }

    /// Seed a record without a transaction, as if another issuer had
    /// registered it out of band.
    pub fn insert_record(&self, fingerprint: Fingerprint, issuer: Address) {
        let mut inner = self.write();
        inner.height += 1;
        let record = LedgerRecord {
            issuer,
            timestamp: unix_ms(),
            block: inner.height,
            tx_hash: None,
        };
        inner.records.insert(fingerprint, record);
    }

    /// Execute a view call against current state.
    pub fn call_view(&self, call: &ContractCall) -> Result<Bytes> {
        self.ensure_online()?;
        match self.decode(call.to, &call.data)? {
            RegistryCall::Verify(fp) => Ok(abi::encode_bool(self.read().records.contains_key(&fp))),
            RegistryCall::Register(_) => Err(ProviderError::Reverted(
                "registerDocument cannot be called as a view".into(),
            )),
        }
    }

    /// Validate and apply a signed transaction.
    pub fn submit(&self, signed: &SignedTransaction) -> Result<TxReceipt> {
        self.ensure_online()?;
        signed
            .verify()
            .map_err(|e| ProviderError::Reverted(format!("bad transaction signature: {e}")))?;
        if signed.tx.chain_id != self.chain_id {
            return Err(ProviderError::Reverted(format!(
                "wrong chain id {}",
                signed.tx.chain_id
            )));
        }

        let fingerprint = match self.decode(signed.tx.to, &signed.tx.data)? {
            RegistryCall::Register(fp) => fp,
            RegistryCall::Verify(_) => {
                return Err(ProviderError::Reverted(
                    "verifyDocument does not change state".into(),
                ))
            }
        };

        let tx_hash = signed
            .hash()
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let mut inner = self.write();
        if !inner.applied.insert(tx_hash) {
            return Err(ProviderError::Reverted("transaction already applied".into()));
        }
        if inner.records.contains_key(&fingerprint) {
            return Err(ProviderError::Reverted(ALREADY_REGISTERED_REASON.into()));
        }

        inner.height += 1;
        let record = LedgerRecord {
            issuer: signed.tx.from,
            timestamp: unix_ms(),
            block: inner.height,
            tx_hash: Some(tx_hash),
        };
        inner.records.insert(fingerprint, record);

        Ok(TxReceipt {
            tx_hash,
            block: record.block,
            from: record.issuer,
        })
    }

    fn decode(&self, to: Address, data: &[u8]) -> Result<RegistryCall> {
        if to != self.contract {
            return Err(ProviderError::Reverted(format!("no contract at {to}")));
        }
        abi::decode_call(data).map_err(|e| ProviderError::Reverted(e.to_string()))
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("ledger node unreachable".into()));
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// In-memory wallet provider over a [`MemoryLedger`].
pub struct MemoryWallet {
    ledger: Arc<MemoryLedger>,
    accounts: Vec<Keypair>,
    nonce: AtomicU64,
    sent: AtomicU64,
    reject_next_transaction: AtomicBool,
    reject_next_read: AtomicBool,
    finality_delay_ms: AtomicU64,
}

impl MemoryWallet {
    /// A wallet holding `accounts`, in order. An empty list behaves like a
    /// locked wallet.
    pub fn new(ledger: Arc<MemoryLedger>, accounts: Vec<Keypair>) -> Self {
        Self {
            ledger,
            accounts,
            nonce: AtomicU64::new(0),
            sent: AtomicU64::new(0),
            reject_next_transaction: AtomicBool::new(false),
            reject_next_read: AtomicBool::new(false),
            finality_delay_ms: AtomicU64::new(0),
        }
    }

    /// A wallet with one freshly generated account.
    pub fn with_random_account(ledger: Arc<MemoryLedger>) -> Self {
        Self::new(ledger, vec![Keypair::generate()])
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(Keypair::address).collect()
    }

    pub fn ledger(&self) -> &Arc<MemoryLedger> {
        &self.ledger
    }

    /// The user declines the next transaction prompt.
    pub fn reject_next_transaction(&self) {
        self.reject_next_transaction.store(true, Ordering::SeqCst);
    }

    /// The user declines the next read request.
    pub fn reject_next_read(&self) {
        self.reject_next_read.store(true, Ordering::SeqCst);
    }

    /// Delay between submission and finality. A transaction whose caller
    /// stops waiting still lands once the delay has elapsed.
    pub fn set_finality_delay(&self, delay: Duration) {
        self.finality_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of transactions signed and submitted.
    pub fn transactions_sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }

    fn keypair(&self, address: &Address) -> Result<&Keypair> {
        self.accounts
            .iter()
            .find(|kp| kp.address() == *address)
            .ok_or(ProviderError::UnknownAccount(*address))
    }
}

#[async_trait]
impl WalletProvider for MemoryWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        if self.accounts.is_empty() {
            return Err(ProviderError::NoAccounts);
        }
        Ok(self.addresses())
    }

    async fn get_signer(&self, account: &Address) -> Result<SignerHandle> {
        let keypair = self.keypair(account)?;
        Ok(SignerHandle {
            address: *account,
            public_key: keypair.public_key(),
        })
    }

    async fn send_transaction(&self, signer: &SignerHandle, call: ContractCall) -> Result<TxReceipt> {
        if self.reject_next_transaction.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::UserRejected);
        }
        let keypair = self.keypair(&signer.address)?;

        let tx = Transaction {
            chain_id: self.ledger.chain_id(),
            nonce: self.nonce.fetch_add(1, Ordering::SeqCst),
            from: signer.address,
            to: call.to,
            data: call.data,
        };
        let signed = SignedTransaction::sign(tx, keypair)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        self.sent.fetch_add(1, Ordering::SeqCst);

        // Inclusion runs detached so that abandoning this future does not
        // withdraw the transaction.
        let delay = Duration::from_millis(self.finality_delay_ms.load(Ordering::SeqCst));
        let ledger = Arc::clone(&self.ledger);
        let (done, receipt) = oneshot::channel();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let _ = done.send(ledger.submit(&signed));
        });

        receipt
            .await
            .map_err(|_| ProviderError::Unavailable("inclusion task dropped".into()))?
    }

    async fn call_view(&self, call: ContractCall) -> Result<Bytes> {
        if self.reject_next_read.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::UserRejected);
        }
        self.ledger.call_view(&call)
    }
}
