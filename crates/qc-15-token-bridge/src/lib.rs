//! # QC-15 Token Bridge
//!
//! Chain-agnostic token transfers over a guardian-attested message bridge.
//!
//! **Subsystem ID:** 15
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//! **Chains:** EVM, Solana, Sui, Aptos
//!
//! ## Purpose
//!
//! Move tokens between heterogeneous chains in two phases:
//! - **Send** on the source chain; the token bridge emits a transfer message
//! - **Attest**: guardians sign the message into a VAA (outside this crate)
//! - **Redeem** the VAA on the destination chain, either manually by the
//!   recipient or automatically through a relayer
//!
//! ## Payment Options
//!
//! | Option | Payload | Redeemed by | Destination fee |
//! |--------|---------|-------------|-----------------|
//! | Manual | 1 | Recipient wallet | Recipient pays gas |
//! | Automatic | 3 | Relayer contract | Relayer fee in the token |
//!
//! ## Module Structure
//!
//! ```text
//! qc-15-token-bridge/
//! ├── domain/     # Ids, amounts, address codecs, payloads, VAAs, errors
//! ├── ports/      # TokenBridgeApi, ChainProvider, TransactionSigner, ...
//! ├── adapters/   # EVM, Solana, Sui, Aptos adapters + token directory
//! ├── registry    # ChainRef -> ChainContext dispatch
//! ├── parser      # Source tx -> TransferMessage
//! ├── fees        # Per-family gas models
//! ├── service     # TokenBridgeService (orchestration)
//! ├── config      # BridgeConfig (JSON) + validation
//! └── telemetry   # tracing-subscriber setup
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = BridgeConfig::from_env()?;
//! init_tracing(&config.logging)?;
//!
//! let mut builder = ContextRegistry::builder(config.clone());
//! for chain in &config.chains {
//!     builder = builder.with_provider(chain.name.clone(), rpc_for(chain));
//! }
//! let registry = Arc::new(builder.build()?);
//! let directory = Arc::new(ConfiguredTokenDirectory::from_config(&config));
//! let service = TokenBridgeService::new(registry, signer, directory, poster);
//!
//! let tx = service.send_transfer(params).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod fees;
pub mod parser;
pub mod ports;
pub mod registry;
pub mod service;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use adapters::{AptosAdapter, ConfiguredTokenDirectory, EvmAdapter, SolanaAdapter, SuiAdapter};
pub use config::{
    BridgeConfig, ChainConfig, ChainContracts, ConfigError, LoggingConfig, Network, TokenConfig,
    DEFAULT_CLAIM_GAS_LIMIT,
};
pub use domain::{
    format_address, format_units, from_normalized, parse_address, parse_units, to_normalized,
    BridgeCall, BridgeError, BridgeResult, ChainFamily, ChainId, ChainName, ChainRef, ErrorKind,
    ParsedMessage, ParsedRelayerMessage, PaymentOption, PreparedTransaction, SignedVaa,
    SourceAsset, TokenId, TokenRef, TransferMessage, TransferParams, TransferPayload,
    TransferState, TxOverrides, WalletRole, WireAddress,
};
pub use parser::MessageParser;
pub use ports::{
    ChainProvider, MessagePoster, MockChainProvider, MockMessagePoster, MockRelayer, MockSigner,
    RelayerContract, TokenBridgeAdapter, TokenBridgeApi, TokenDirectory, TransactionSigner,
};
pub use registry::{ChainContext, ContextRegistry, ContextRegistryBuilder};
pub use service::TokenBridgeService;
pub use telemetry::{init_tracing, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
