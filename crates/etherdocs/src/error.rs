//! Error types for the Etherdocs facade.
//!
//! Verification and issuance never fail through this type: their negative
//! outcomes are values ([`VerificationResult`](crate::VerificationResult),
//! [`IssuanceResult`](crate::IssuanceResult)). These errors cover setup.

use etherdocs_gateway::GatewayError;
use etherdocs_qr::EncodeError;
use thiserror::Error;

/// Errors from configuration, logging setup, wallet connection and QR rendering.
#[derive(Debug, Error)]
pub enum EtherdocsError {
    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A global tracing subscriber is already installed.
    #[error("logging error: {0}")]
    Logging(String),

    /// Wallet connection failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// QR rendering failed.
    #[error("QR encoding error: {0}")]
    Encode(#[from] EncodeError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, EtherdocsError>;
