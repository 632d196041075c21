//! The verification coordinator.
//!
//! One [`Coordinator`] serves many checks. Each [`Coordinator::verify`] call
//! runs a fresh [`Check`] through
//!
//! ```text
//! Idle -> Preparing -> AwaitingLedger -> Resolved(outcome)
//!                  \-> Resolved(Invalid)
//! ```
//!
//! and returns the trail of phases it passed through. Nothing carries over
//! between checks; a failed check is retried by submitting a new request.
//!
//! [`Coordinator::issue`] runs the same machine with `register` in place of
//! the lookup. Fingerprinting cannot fail, so an issuance never resolves
//! `Invalid`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use etherdocs_core::{fingerprint, Address, Fingerprint, TxHash};
use etherdocs_gateway::{
    GatewayError, LedgerGateway, RegisterOutcome, RegistryGateway, VerifyOutcome, WalletProvider,
    WalletSession,
};
use etherdocs_qr::{DecodeError, QrCodec, QrPayload};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;

use crate::config::{CoordinatorConfig, EtherdocsConfig};
use crate::error::Result;

const VERIFIED: &str = "document is verified and authentic";
const NOT_FOUND: &str = "document not found on the ledger";
const NO_QR_CODE: &str = "could not detect a QR code";
const NO_WALLET: &str = "no wallet available: connect a wallet provider first";
const WALLET_REJECTED: &str = "wallet request was rejected";

/// How the user supplied the document to check.
#[derive(Clone, PartialEq, Eq)]
pub enum VerificationRequest {
    /// A fingerprint typed or pasted by the user.
    ByHash(String),
    /// The document itself.
    ByFile(Vec<u8>),
    /// An image file (PNG, JPEG) of the document's QR code.
    ByScannedImage(Vec<u8>),
}

impl VerificationRequest {
    /// Short name of the entry point, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ByHash(_) => "hash",
            Self::ByFile(_) => "file",
            Self::ByScannedImage(_) => "image",
        }
    }
}

impl std::fmt::Debug for VerificationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByHash(text) => f.debug_tuple("ByHash").field(text).finish(),
            Self::ByFile(bytes) => write!(f, "ByFile({} bytes)", bytes.len()),
            Self::ByScannedImage(bytes) => write!(f, "ByScannedImage({} bytes)", bytes.len()),
        }
    }
}

/// Final classification of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The fingerprint is registered.
    Success,
    /// The ledger answered and the fingerprint is not registered.
    NotFound,
    /// The input never became a fingerprint; the ledger was not contacted.
    Invalid,
    /// No answer from the ledger. Never to be read as "not found".
    TransportError,
}

/// Where a check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "outcome", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Preparing,
    AwaitingLedger,
    Resolved(Outcome),
}

impl Phase {
    /// Whether a check may move from `self` to `next`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        match (self, next) {
            (Phase::Idle, Phase::Preparing) => true,
            (Phase::Preparing, Phase::AwaitingLedger) => true,
            (Phase::Preparing, Phase::Resolved(Outcome::Invalid)) => true,
            (Phase::AwaitingLedger, Phase::Resolved(outcome)) => outcome != Outcome::Invalid,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Resolved(_))
    }
}

/// A single check's state machine.
#[derive(Debug, Clone)]
pub struct Check {
    trail: Vec<Phase>,
}

impl Check {
    pub fn new() -> Self {
        Self {
            trail: vec![Phase::Idle],
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.trail.last().copied().unwrap_or(Phase::Idle)
    }

    /// Phases visited so far, oldest first.
    pub fn trail(&self) -> &[Phase] {
        &self.trail
    }

    /// Move to `next`. Illegal moves are refused and leave the check as is.
    pub fn advance(&mut self, next: Phase) -> bool {
        let current = self.phase();
        if !current.can_advance_to(next) {
            tracing::error!(?current, ?next, "illegal phase transition refused");
            return false;
        }
        tracing::debug!(from = ?current, to = ?next, "check advanced");
        self.trail.push(next);
        true
    }

    /// Resolve and hand back the full trail.
    fn finish(mut self, outcome: Outcome) -> Vec<Phase> {
        self.advance(Phase::Resolved(outcome));
        self.trail
    }

    fn resolve(
        self,
        outcome: Outcome,
        fingerprint: Option<Fingerprint>,
        detail: String,
    ) -> VerificationResult {
        VerificationResult {
            outcome,
            fingerprint,
            detail,
            trail: self.finish(outcome),
        }
    }
}

impl Default for Check {
    fn default() -> Self {
        Self::new()
    }
}

/// What the presentation layer gets back from a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub outcome: Outcome,
    /// The fingerprint checked, once one was obtained.
    pub fingerprint: Option<Fingerprint>,
    /// Human-readable explanation.
    pub detail: String,
    pub trail: Vec<Phase>,
}

impl VerificationResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// JSON form for the presentation layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Outcome of an issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IssuanceOutcome {
    /// Bound to the issuer. `tx` is absent when registration was only
    /// confirmed by a lookup after a finality timeout.
    Registered { tx: Option<TxHash>, block: Option<u64> },
    /// Already on the ledger; nothing was written.
    AlreadyRegistered,
    /// The user declined the transaction.
    Rejected,
    /// No answer from the ledger. The transaction may still land.
    TransportError,
}

impl IssuanceOutcome {
    /// The check outcome an issuance resolves its phase trail with.
    pub fn check_outcome(self) -> Outcome {
        match self {
            Self::Registered { .. } | Self::AlreadyRegistered => Outcome::Success,
            Self::Rejected | Self::TransportError => Outcome::TransportError,
        }
    }
}

/// What the issuer gets back.
#[derive(Debug, Clone, Serialize)]
pub struct IssuanceResult {
    pub outcome: IssuanceOutcome,
    pub fingerprint: Fingerprint,
    pub detail: String,
    /// QR code of the fingerprint, present whenever the document is on the
    /// ledger.
    #[serde(skip)]
    pub qr: Option<QrPayload>,
    pub trail: Vec<Phase>,
}

impl IssuanceResult {
    /// JSON form for the presentation layer. The QR code is not included;
    /// fetch it as PNG via [`QrPayload::to_png`].
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Drives checks and issuances against a [`LedgerGateway`].
pub struct Coordinator<G: LedgerGateway> {
    gateway: G,
    codec: QrCodec,
    config: CoordinatorConfig,
    /// Per-account admission locks for registrations. Entries nobody holds
    /// or waits on are pruned on the next admission.
    session_locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl Coordinator<RegistryGateway> {
    /// A coordinator over the registry contract, fully configured.
    pub fn from_config(config: &EtherdocsConfig) -> Self {
        Self::new(
            RegistryGateway::new(config.gateway.clone()),
            QrCodec::new(config.qr.clone()),
            config.coordinator.clone(),
        )
    }
}

impl<G: LedgerGateway> Coordinator<G> {
    pub fn new(gateway: G, codec: QrCodec, config: CoordinatorConfig) -> Self {
        Self {
            gateway,
            codec,
            config,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn codec(&self) -> &QrCodec {
        &self.codec
    }

    /// Connect a wallet provider and open a session on its first account.
    pub async fn connect(&self, provider: Arc<dyn WalletProvider>) -> Result<WalletSession> {
        Ok(WalletSession::connect(provider).await?)
    }

    /// Run one check.
    pub async fn verify(
        &self,
        request: VerificationRequest,
        session: Option<&WalletSession>,
    ) -> VerificationResult {
        let mut check = Check::new();
        check.advance(Phase::Preparing);

        let fingerprint = match self.prepare(&request) {
            Ok(fp) => fp,
            Err(detail) => {
                tracing::info!(kind = request.kind(), %detail, "check resolved invalid");
                return check.resolve(Outcome::Invalid, None, detail);
            }
        };

        check.advance(Phase::AwaitingLedger);
        let (outcome, detail) = match self.gateway.verify(session, &fingerprint).await {
            Ok(VerifyOutcome::Found) => (Outcome::Success, VERIFIED.to_string()),
            Ok(VerifyOutcome::NotFound) => (Outcome::NotFound, NOT_FOUND.to_string()),
            Err(err) => {
                tracing::warn!(%fingerprint, error = %err, "ledger lookup failed");
                (Outcome::TransportError, transport_detail(&err))
            }
        };

        tracing::info!(kind = request.kind(), %fingerprint, ?outcome, "check resolved");
        check.resolve(outcome, Some(fingerprint), detail)
    }

    /// Fingerprint a document, register it, and render its QR code.
    pub async fn issue(&self, document: &[u8], session: Option<&WalletSession>) -> IssuanceResult {
        let mut check = Check::new();
        check.advance(Phase::Preparing);
        let fingerprint = fingerprint(document);
        let _admission = self.admit(session).await;

        check.advance(Phase::AwaitingLedger);
        let (outcome, detail) = match self.gateway.register(session, &fingerprint).await {
            Ok(RegisterOutcome::Registered { tx_hash, block, .. }) => (
                IssuanceOutcome::Registered {
                    tx: Some(tx_hash),
                    block: Some(block),
                },
                "document registered on the ledger".to_string(),
            ),
            Ok(RegisterOutcome::AlreadyRegistered) => (
                IssuanceOutcome::AlreadyRegistered,
                "document is already registered".to_string(),
            ),
            Err(GatewayError::UserRejected) => (
                IssuanceOutcome::Rejected,
                "registration was rejected in the wallet".to_string(),
            ),
            Err(err) if err.is_timeout() && self.config.recheck_after_timeout => {
                self.recheck(session, &fingerprint, &err).await
            }
            Err(err) => {
                tracing::warn!(%fingerprint, error = %err, "registration failed");
                (IssuanceOutcome::TransportError, transport_detail(&err))
            }
        };

        let qr = match outcome {
            IssuanceOutcome::Registered { .. } | IssuanceOutcome::AlreadyRegistered => {
                match self.render_qr(&fingerprint) {
                    Ok(payload) => Some(payload),
                    Err(err) => {
                        tracing::error!(%fingerprint, error = %err, "QR rendering failed");
                        None
                    }
                }
            }
            IssuanceOutcome::Rejected | IssuanceOutcome::TransportError => None,
        };

        tracing::info!(%fingerprint, ?outcome, "issuance resolved");
        IssuanceResult {
            outcome,
            fingerprint,
            detail,
            qr,
            trail: check.finish(outcome.check_outcome()),
        }
    }

    /// Render the QR code for a fingerprint.
    pub fn render_qr(&self, fingerprint: &Fingerprint) -> Result<QrPayload> {
        Ok(self.codec.encode(fingerprint)?)
    }

    fn prepare(&self, request: &VerificationRequest) -> std::result::Result<Fingerprint, String> {
        match request {
            VerificationRequest::ByHash(text) => {
                Fingerprint::parse(text).map_err(|e| format!("invalid hash format: {e}"))
            }
            VerificationRequest::ByFile(bytes) => Ok(fingerprint(bytes)),
            VerificationRequest::ByScannedImage(bytes) => {
                self.codec.decode_bytes(bytes).map_err(|e| decode_detail(&e))
            }
        }
    }

    async fn recheck(
        &self,
        session: Option<&WalletSession>,
        fingerprint: &Fingerprint,
        cause: &GatewayError,
    ) -> (IssuanceOutcome, String) {
        match self.gateway.verify(session, fingerprint).await {
            Ok(VerifyOutcome::Found) => {
                tracing::info!(%fingerprint, "registration confirmed after timeout");
                (
                    IssuanceOutcome::Registered {
                        tx: None,
                        block: None,
                    },
                    "document registered on the ledger (confirmed after timeout)".to_string(),
                )
            }
            _ => (IssuanceOutcome::TransportError, transport_detail(cause)),
        }
    }

    async fn admit(&self, session: Option<&WalletSession>) -> Option<OwnedMutexGuard<()>> {
        if !self.config.serialize_sessions {
            return None;
        }
        let address = session?.address();
        let lock = {
            let mut locks = self
                .session_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(address).or_default())
        };
        Some(lock.lock_owned().await)
    }
}

impl<G: LedgerGateway> Coordinator<G> {
    #[cfg(test)]
    fn admission_entries(&self) -> usize {
        self.session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn decode_detail(err: &DecodeError) -> String {
    match err {
        DecodeError::NoCodeFound => NO_QR_CODE.to_string(),
        DecodeError::NotAFingerprint { reason, .. } => {
            format!("QR code does not contain a valid hash: {reason}")
        }
        DecodeError::UnreadableCode(detail) => format!("QR code could not be read: {detail}"),
        DecodeError::MalformedImage(detail) => format!("image could not be read: {detail}"),
    }
}

fn transport_detail(err: &GatewayError) -> String {
    match err {
        GatewayError::NoWalletAvailable => NO_WALLET.to_string(),
        GatewayError::UserRejected => WALLET_REJECTED.to_string(),
        GatewayError::Transport(inner) => format!("ledger unavailable: {inner}"),
    }
}
