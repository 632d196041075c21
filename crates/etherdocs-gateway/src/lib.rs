//! # Etherdocs Gateway
//!
//! Translates fingerprint operations into calls against the document
//! registry contract, through a wallet-authenticated channel.
//!
//! ## Key Types
//!
//! - [`LedgerGateway`] - `register` / `verify` over a fingerprint
//! - [`RegistryGateway`] - The production gateway, generic over any [`WalletProvider`]
//! - [`WalletSession`] - One account on one provider, passed explicitly per call
//! - [`MemoryLedger`] / [`MemoryWallet`] - In-memory registry and wallet for tests
//!
//! ## Failure taxonomy
//!
//! | Situation | Result |
//! |---|---|
//! | no session, or wallet has no accounts | [`GatewayError::NoWalletAvailable`] |
//! | user declines the prompt | [`GatewayError::UserRejected`] |
//! | unreachable node, bad response, timeout | [`GatewayError::Transport`] |
//! | fingerprint not on the ledger | [`VerifyOutcome::NotFound`] |
//! | fingerprint registered before | [`RegisterOutcome::AlreadyRegistered`] |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use etherdocs_core::{fingerprint, Address};
//! use etherdocs_gateway::{
//!     GatewayConfig, LedgerGateway, MemoryLedger, MemoryWallet, RegistryGateway,
//!     VerifyOutcome, WalletSession,
//! };
//!
//! # async fn example() -> Result<(), etherdocs_gateway::GatewayError> {
//! let ledger = MemoryLedger::new(Address::ZERO);
//! let wallet = Arc::new(MemoryWallet::with_random_account(ledger));
//! let session = WalletSession::connect(wallet).await?;
//!
//! let gateway = RegistryGateway::new(GatewayConfig::default());
//! let fp = fingerprint(b"diploma");
//! gateway.register(Some(&session), &fp).await?;
//! assert_eq!(gateway.verify(Some(&session), &fp).await?, VerifyOutcome::Found);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod provider;
pub mod session;
pub mod tx;

pub use error::{AbiError, GatewayError, ProviderError, Result, TransportError};
pub use gateway::{GatewayConfig, LedgerGateway, RegisterOutcome, RegistryGateway, VerifyOutcome};
pub use memory::{LedgerRecord, MemoryLedger, MemoryWallet};
pub use provider::{ContractCall, SignerHandle, TxReceipt, WalletProvider};
pub use session::WalletSession;
pub use tx::{SignedTransaction, Transaction};
