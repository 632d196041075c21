//! # Etherdocs
//!
//! Tamper-evident document verification: a document is identified by the
//! Keccak-256 fingerprint of its bytes, the fingerprint is registered on a
//! ledger by its issuer, and anyone can later check a copy by hash, by file,
//! or by scanning its QR code.
//!
//! ## Overview
//!
//! - **Fingerprints**: pure, deterministic, `0x`-prefixed hex digests
//! - **QR exchange**: the fingerprint travels as a QR symbol and nothing else
//! - **Ledger gateway**: `registerDocument` / `verifyDocument` through a wallet session
//! - **Coordinator**: one state machine per check, results as typed values
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use etherdocs::{Coordinator, EtherdocsConfig, Outcome, VerificationRequest};
//! use etherdocs::gateway::{MemoryLedger, MemoryWallet};
//!
//! # async fn example() -> etherdocs::Result<()> {
//! let config = EtherdocsConfig::default();
//! let coordinator = Coordinator::from_config(&config);
//!
//! let ledger = MemoryLedger::new(config.gateway.contract);
//! let session = coordinator
//!     .connect(Arc::new(MemoryWallet::with_random_account(ledger)))
//!     .await?;
//!
//! let issued = coordinator.issue(b"diploma", Some(&session)).await;
//! let png = issued.qr.expect("registered").to_png()?;
//!
//! let result = coordinator
//!     .verify(VerificationRequest::ByScannedImage(png), Some(&session))
//!     .await;
//! assert_eq!(result.outcome, Outcome::Success);
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `etherdocs::core` - Fingerprints, addresses, keys
//! - `etherdocs::qr` - QR encode/decode
//! - `etherdocs::gateway` - Ledger gateway, wallet providers, in-memory ledger

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;

// Re-export component crates
pub use etherdocs_core as core;
pub use etherdocs_gateway as gateway;
pub use etherdocs_qr as qr;

// Re-export main types for convenience
pub use config::{CoordinatorConfig, EtherdocsConfig, LoggingConfig};
pub use coordinator::{
    Check, Coordinator, IssuanceOutcome, IssuanceResult, Outcome, Phase, VerificationRequest,
    VerificationResult,
};
pub use error::{EtherdocsError, Result};
pub use logging::{init_from_config, init_logging, LogFormat};

pub use etherdocs_core::{fingerprint, Fingerprint};
pub use etherdocs_gateway::{LedgerGateway, WalletSession};
pub use etherdocs_qr::QrPayload;
