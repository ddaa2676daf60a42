//! # Ports Module
//!
//! Hexagonal architecture ports.

pub mod inbound;
pub mod outbound;

pub use inbound::TokenBridgeApi;
pub use outbound::{
    BridgeLog, ChainProvider, CompletionKey, MessagePoster, MockChainProvider,
    MockMessagePoster, MockRelayer, MockSigner, RelayerContract, SubmittedTx, TokenBridgeAdapter,
    TokenDirectory, TransactionSigner,
};
