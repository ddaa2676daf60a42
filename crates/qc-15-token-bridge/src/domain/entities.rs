//! # Domain Entities
//!
//! Requests, prepared transactions and parsed transfer records.

use super::payload::TransferPayload;
use super::value_objects::{
    ChainFamily, ChainId, ChainName, ChainRef, PaymentOption, TokenId, TokenRef, WireAddress,
};
use primitive_types::U256;
use serde::Serialize;
use uuid::Uuid;

// =============================================================================
// Requests
// =============================================================================

/// User-level transfer request, amounts as human decimal strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferParams {
    /// Token to send (`Native` for the source chain's gas token).
    pub token: TokenRef,
    /// Human-readable amount, e.g. `"1.5"`.
    pub amount: String,
    /// Source chain.
    pub from_chain: ChainRef,
    /// Sender on the source chain.
    pub from_address: String,
    /// Destination chain.
    pub to_chain: ChainRef,
    /// Recipient on the destination chain.
    pub to_address: String,
    /// Redeem path.
    pub payment: PaymentOption,
    /// Amount to swap into destination gas (automatic only).
    pub to_native_token: Option<String>,
}

/// Asset being sent, as the source chain identifies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceAsset {
    /// Gas token of the source chain.
    Native,
    /// Token contract / mint / coin type on the source chain.
    Token(String),
}

/// Relayer instructions for an automatic transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayParams {
    /// Base units to swap into destination gas.
    pub to_native_token_amount: U256,
}

/// Chain-level transfer request handed to an adapter. Amounts are base units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// Asset on the source chain.
    pub asset: SourceAsset,
    /// Amount in source-chain base units.
    pub amount: U256,
    /// Source chain.
    pub source_chain: ChainName,
    /// Sender on the source chain.
    pub sender: String,
    /// Destination chain.
    pub recipient_chain: ChainId,
    /// Recipient in wire form.
    pub recipient: WireAddress,
    /// Present for automatic (relayed) transfers.
    pub relay: Option<RelayParams>,
}

// =============================================================================
// Prepared transactions
// =============================================================================

/// Overrides applied to a prepared transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxOverrides {
    /// Gas / compute limit.
    pub gas_limit: Option<u64>,
}

/// Contract call carried by a [`PreparedTransaction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeCall {
    /// Token bridge `transferTokens` / `wrapAndTransfer`.
    Transfer {
        /// Source asset.
        asset: SourceAsset,
        /// Base units.
        amount: U256,
        /// Destination chain id.
        recipient_chain: ChainId,
        /// Recipient in wire form.
        recipient: WireAddress,
        /// Arbiter fee (always zero from this crate).
        arbiter_fee: U256,
        /// Message nonce.
        nonce: u32,
    },
    /// Token bridge transfer carrying an application payload.
    TransferWithPayload {
        /// Source asset.
        asset: SourceAsset,
        /// Base units.
        amount: U256,
        /// Destination chain id.
        recipient_chain: ChainId,
        /// Recipient in wire form.
        recipient: WireAddress,
        /// Application payload.
        payload: Vec<u8>,
        /// Message nonce.
        nonce: u32,
    },
    /// Relayer `transferTokensWithRelay`.
    TransferWithRelay {
        /// Relayer contract.
        relayer: String,
        /// Source asset.
        asset: SourceAsset,
        /// Base units.
        amount: U256,
        /// Base units swapped into destination gas.
        to_native_token_amount: U256,
        /// Destination chain id.
        recipient_chain: ChainId,
        /// Recipient in wire form.
        recipient: WireAddress,
        /// Batch id (zero for single messages).
        batch_id: u32,
    },
    /// Token bridge `completeTransfer`.
    Redeem {
        /// Signed VAA bytes.
        vaa: Vec<u8>,
        /// Unwrap the chain's wrapped native token on delivery.
        unwrap_native: bool,
    },
    /// Relayer `completeTransferWithRelay`.
    RedeemWithRelay {
        /// Relayer contract.
        relayer: String,
        /// Signed VAA bytes.
        vaa: Vec<u8>,
    },
}

impl BridgeCall {
    /// Short method label for logs.
    pub fn method(&self) -> &'static str {
        match self {
            BridgeCall::Transfer { .. } => "transfer",
            BridgeCall::TransferWithPayload { .. } => "transfer_with_payload",
            BridgeCall::TransferWithRelay { .. } => "transfer_with_relay",
            BridgeCall::Redeem { .. } => "redeem",
            BridgeCall::RedeemWithRelay { .. } => "redeem_with_relay",
        }
    }
}

/// Unsigned transaction handed to the signing collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedTransaction {
    /// Correlation id for logs.
    pub id: Uuid,
    /// Chain the transaction targets.
    pub chain: ChainName,
    /// Chain family (selects the signer's encoding).
    pub family: ChainFamily,
    /// Contract / program / package invoked.
    pub contract: String,
    /// Sender, when the caller supplied one.
    pub sender: Option<String>,
    /// The call.
    pub call: BridgeCall,
    /// Gas overrides.
    pub overrides: TxOverrides,
}

impl PreparedTransaction {
    /// Prepare a call against `contract` on `chain`.
    pub fn new(chain: ChainName, family: ChainFamily, contract: String, call: BridgeCall) -> Self {
        Self {
            id: Uuid::new_v4(),
            chain,
            family,
            contract,
            sender: None,
            call,
            overrides: TxOverrides::default(),
        }
    }

    /// Set the sender.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Apply gas overrides.
    pub fn with_overrides(mut self, overrides: TxOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

// =============================================================================
// Parsed messages
// =============================================================================

/// Transfer decoded from a source transaction, before metadata resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedTransfer {
    /// Source transaction hash.
    pub send_tx: String,
    /// Transaction sender.
    pub sender: String,
    /// Source chain.
    pub from_chain: ChainName,
    /// Emitting token bridge (wire form).
    pub emitter_address: WireAddress,
    /// Emitter sequence.
    pub sequence: u64,
    /// Block / slot / checkpoint.
    pub block: u64,
    /// Gas paid, in native base units.
    pub gas_fee: Option<U256>,
    /// Decoded payload.
    pub transfer: TransferPayload,
}

/// Transfer message with normalized metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMessage {
    /// Source transaction hash.
    pub send_tx: String,
    /// Transaction sender.
    pub sender: String,
    /// Amount in the source-chain token's base units.
    pub amount: String,
    /// 1 (manual) or 3 (relayer).
    pub payload_id: u8,
    /// Recipient in destination-native form.
    pub recipient: String,
    /// Destination chain.
    pub to_chain: ChainName,
    /// Source chain.
    pub from_chain: ChainName,
    /// Token address on its native chain.
    pub token_address: String,
    /// Token native chain.
    pub token_chain: ChainName,
    /// Token identity.
    pub token_id: TokenId,
    /// Configured token key, when known.
    pub token_key: Option<String>,
    /// Decimals used for `amount`.
    pub token_decimals: u8,
    /// Emitter address, hex without prefix.
    pub emitter_address: String,
    /// Emitter sequence.
    pub sequence: String,
    /// Block / slot / checkpoint.
    pub block: u64,
    /// Gas paid on the source chain.
    pub gas_fee: Option<String>,
    /// Raw inner payload, hex.
    pub payload: Option<String>,
}

/// Relayed transfer message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRelayerMessage {
    /// Common fields.
    #[serde(flatten)]
    pub base: ParsedMessage,
    /// Relayer payload id.
    pub relayer_payload_id: u8,
    /// Final recipient.
    pub to: String,
    /// Fee paid to the relayer (token base units).
    pub relayer_fee: String,
    /// Amount swapped into destination gas (token base units).
    pub to_native_token_amount: String,
}

/// Message classified by payload id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransferMessage {
    /// Payload 1.
    Manual(ParsedMessage),
    /// Payload 3.
    Relayer(ParsedRelayerMessage),
}

impl TransferMessage {
    /// Common fields.
    pub fn base(&self) -> &ParsedMessage {
        match self {
            TransferMessage::Manual(msg) => msg,
            TransferMessage::Relayer(msg) => &msg.base,
        }
    }

    /// Payload id.
    pub fn payload_id(&self) -> u8 {
        self.base().payload_id
    }

    /// Relayer fields, when relayed.
    pub fn relayer(&self) -> Option<&ParsedRelayerMessage> {
        match self {
            TransferMessage::Relayer(msg) => Some(msg),
            TransferMessage::Manual(_) => None,
        }
    }
}
