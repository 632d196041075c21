//! # Etherdocs Testkit
//!
//! Testing utilities for Etherdocs.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known Keccak-256 fingerprints and ABI selectors
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An in-memory ledger, wallet and coordinator wired together
//!
//! ## Golden Vectors
//!
//! ```rust
//! use etherdocs_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, actual) in verify_all_vectors() {
//!     assert!(passed, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use etherdocs_testkit::generators::fingerprint_text;
//!
//! proptest! {
//!     #[test]
//!     fn typed_hashes_parse((fp, text) in fingerprint_text()) {
//!         prop_assert_eq!(text.parse::<Fingerprint>().unwrap(), fp);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use etherdocs::VerificationRequest;
//! use etherdocs_testkit::fixtures::TestFixture;
//!
//! # async fn example() {
//! let fixture = TestFixture::new();
//! fixture.issue(b"diploma").await;
//! let result = fixture.verify(VerificationRequest::ByFile(b"diploma".to_vec())).await;
//! assert!(result.is_success());
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_issuer_fixtures, CountingGateway, TestFixture};
pub use vectors::{all_vectors, selector_vectors, verify_all_vectors, GoldenVector, SelectorVector};
