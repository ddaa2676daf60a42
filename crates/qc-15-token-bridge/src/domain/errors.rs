//! # Domain Errors
//!
//! Error taxonomy for the token bridge.
//!
//! Every variant belongs to one [`ErrorKind`]. None of them is retried inside
//! this crate: a retried chain submission can produce a duplicate transfer, so
//! transport failures surface to the caller unchanged.

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Coarse classification of a [`BridgeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown chain, missing token config, missing wrapped-asset mapping.
    Configuration,
    /// Operation not available on the chain/token (e.g. relayed send).
    UnsupportedOperation,
    /// A required asset, contract or message does not exist.
    NotFound,
    /// RPC/provider failure or wallet rejection.
    Transport,
    /// Amount cannot be represented at the chain's decimal precision.
    Precision,
    /// Malformed caller input (addresses, signed messages).
    InvalidInput,
    /// Query not available for this chain family.
    NotImplemented,
}

/// Token bridge error types.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Chain was never configured.
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    /// Token has no entry in the token directory.
    #[error("Token not configured: {0}")]
    TokenNotConfigured(String),

    /// Native-only token config without a usable wrapped counterpart.
    #[error("Wrapped asset missing for token {0}")]
    WrappedAssetMissing(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation not supported by the chain or token.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Token was never attested on the requested chain.
    #[error("Foreign asset not found: {token} on {chain}")]
    ForeignAssetNotFound {
        /// Token identifier (chain/address)
        token: String,
        /// Chain that was queried
        chain: String,
    },

    /// Contract address missing from the chain configuration.
    #[error("Contract not found: {contract} on {chain}")]
    ContractNotFound {
        /// Chain name
        chain: String,
        /// Contract role (core, relayer, ...)
        contract: &'static str,
    },

    /// Transaction carries no token bridge transfer.
    #[error("No transfer message in transaction {0}")]
    MessageNotFound(String),

    /// RPC, provider or wallet failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Amount cannot be expressed in base units.
    #[error("Cannot represent amount {amount:?}: {reason}")]
    Precision {
        /// Offending amount as supplied
        amount: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Address is not valid for the chain family.
    #[error("Invalid {family} address: {address}")]
    InvalidAddress {
        /// Chain family name
        family: String,
        /// Offending address
        address: String,
    },

    /// Signed message or payload could not be decoded.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Request names a different chain than the one handling it.
    #[error("Chain mismatch: expected {expected}, got {actual}")]
    ChainMismatch {
        /// Chain handling the request
        expected: String,
        /// Chain named by the request
        actual: String,
    },

    /// Redeem on this chain requires a fee payer.
    #[error("Redeem on {0} requires a payer address")]
    MissingPayer(String),

    /// Query not implemented for the chain family.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl BridgeError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownChain(_)
            | Self::TokenNotConfigured(_)
            | Self::WrappedAssetMissing(_)
            | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::ForeignAssetNotFound { .. }
            | Self::ContractNotFound { .. }
            | Self::MessageNotFound(_) => ErrorKind::NotFound,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Precision { .. } => ErrorKind::Precision,
            Self::InvalidAddress { .. }
            | Self::InvalidMessage(_)
            | Self::ChainMismatch { .. }
            | Self::MissingPayer(_) => ErrorKind::InvalidInput,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    pub(crate) fn precision(amount: &str, reason: impl Into<String>) -> Self {
        Self::Precision {
            amount: amount.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn truncated(what: &str) -> Self {
        Self::InvalidMessage(format!("truncated {}", what))
    }
}
