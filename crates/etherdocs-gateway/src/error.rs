//! Error types for the ledger gateway.
//!
//! Two layers: [`ProviderError`] is what a wallet provider reports, and
//! [`GatewayError`] is the taxonomy callers of the gateway see. The gateway
//! is the only place provider failures are reclassified.

use std::time::Duration;

use etherdocs_core::Address;
use thiserror::Error;

/// Failures reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider exposes no accounts (not installed, locked, or empty).
    #[error("no accounts available")]
    NoAccounts,

    /// The requested account is not managed by this provider.
    #[error("unknown account {0}")]
    UnknownAccount(Address),

    /// The user declined the authorization prompt.
    #[error("user rejected the request")]
    UserRejected,

    /// The provider or the ledger node behind it could not be reached.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The contract rejected the call.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// The provider answered with something we cannot interpret.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// ABI encoding/decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unknown selector 0x{0}")]
    UnknownSelector(String),

    #[error("return word is not a canonical bool")]
    NotABool,
}

/// A ledger call that did not produce a domain answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Provider-level failure (network, node, wallet plumbing).
    #[error("provider error: {0}")]
    Provider(String),

    /// No answer within the budget. For a registration the transaction may
    /// still land later.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The transaction reverted for a reason other than a duplicate.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// The ledger answered, but not in the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors surfaced by [`LedgerGateway`](crate::LedgerGateway) calls.
///
/// `NotFound` and `AlreadyRegistered` are not here: they are outcomes, not
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No signing capability was supplied or the wallet has no accounts.
    #[error("no wallet available")]
    NoWalletAvailable,

    /// The user declined the transaction or request.
    #[error("user rejected the request")]
    UserRejected,

    /// Network, ledger, or response failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Whether this is a timeout, i.e. the outcome is unknown rather than
    /// negative.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Timeout { .. }))
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NoAccounts | ProviderError::UnknownAccount(_) => {
                Self::NoWalletAvailable
            }
            ProviderError::UserRejected => Self::UserRejected,
            ProviderError::Unavailable(detail) => TransportError::Provider(detail).into(),
            ProviderError::Reverted(reason) => TransportError::Reverted(reason).into(),
            ProviderError::Malformed(detail) => TransportError::MalformedResponse(detail).into(),
        }
    }
}

impl From<AbiError> for GatewayError {
    fn from(err: AbiError) -> Self {
        TransportError::MalformedResponse(err.to_string()).into()
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_reclassified() {
        assert_eq!(
            GatewayError::from(ProviderError::NoAccounts),
            GatewayError::NoWalletAvailable
        );
        assert_eq!(
            GatewayError::from(ProviderError::UnknownAccount(Address::ZERO)),
            GatewayError::NoWalletAvailable
        );
        assert_eq!(
            GatewayError::from(ProviderError::UserRejected),
            GatewayError::UserRejected
        );
        assert_eq!(
            GatewayError::from(ProviderError::Unavailable("offline".into())),
            GatewayError::Transport(TransportError::Provider("offline".into()))
        );
        assert_eq!(
            GatewayError::from(ProviderError::Reverted("nope".into())),
            GatewayError::Transport(TransportError::Reverted("nope".into()))
        );
    }

    #[test]
    fn test_timeout_detection() {
        let err = GatewayError::from(TransportError::Timeout {
            operation: "registerDocument",
            after: Duration::from_secs(2),
        });
        assert!(err.is_timeout());
        assert!(err.to_string().contains("registerDocument timed out"));
        assert!(!GatewayError::NoWalletAvailable.is_timeout());
    }
}
