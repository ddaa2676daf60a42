//! # Token Bridge Payloads
//!
//! Layouts (big-endian):
//!
//! ```text
//! Transfer (id 1)             TransferWithPayload (id 3)
//! ───────────────────────     ───────────────────────────
//! u8   payload_id             u8   payload_id
//! u256 amount (8 dec)         u256 amount (8 dec)
//! [32] token_address          [32] token_address
//! u16  token_chain            u16  token_chain
//! [32] to                     [32] to
//! u16  to_chain               u16  to_chain
//! u256 fee                    [32] from_address
//!                             ...  payload
//! ```
//!
//! The relayer's inner payload (id 1) is
//! `u8 id | u256 target_relayer_fee | u256 to_native_token_amount | [32] target_recipient`.

use super::errors::{BridgeError, BridgeResult};
use super::value_objects::{ChainId, WireAddress};
use super::wire::{u256_bytes, Reader};
use primitive_types::U256;

/// Plain transfer payload id.
pub const PAYLOAD_TRANSFER: u8 = 1;

/// Transfer-with-payload id (relayed transfers use it).
pub const PAYLOAD_TRANSFER_WITH_PAYLOAD: u8 = 3;

/// Relayer inner payload id.
pub const RELAYER_PAYLOAD_ID: u8 = 1;

/// Payload-id specific tail of a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferKind {
    /// id 1: arbiter fee.
    Transfer {
        /// Fee for the redeemer (normalized).
        fee: U256,
    },
    /// id 3: sender and arbitrary payload.
    WithPayload {
        /// Address that initiated the transfer.
        from_address: WireAddress,
        /// Contract-to-contract payload.
        payload: Vec<u8>,
    },
}

/// Decoded token transfer message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferPayload {
    /// Amount in normalized (8) decimals.
    pub amount: U256,
    /// Token address on its origin chain.
    pub token_address: WireAddress,
    /// Token origin chain.
    pub token_chain: ChainId,
    /// Recipient on the destination chain.
    pub to: WireAddress,
    /// Destination chain.
    pub to_chain: ChainId,
    /// Payload-specific fields.
    pub kind: TransferKind,
}

impl TransferPayload {
    /// Payload id on the wire.
    pub fn payload_id(&self) -> u8 {
        match self.kind {
            TransferKind::Transfer { .. } => PAYLOAD_TRANSFER,
            TransferKind::WithPayload { .. } => PAYLOAD_TRANSFER_WITH_PAYLOAD,
        }
    }

    /// Decode a transfer payload.
    pub fn decode(bytes: &[u8]) -> BridgeResult<Self> {
        let mut reader = Reader::new(bytes);
        let payload_id = reader.u8("payload id")?;
        if payload_id != PAYLOAD_TRANSFER && payload_id != PAYLOAD_TRANSFER_WITH_PAYLOAD {
            return Err(BridgeError::InvalidMessage(format!(
                "not a token transfer payload (id {})",
                payload_id
            )));
        }

        let amount = reader.u256("amount")?;
        let token_address = reader.address("token address")?;
        let token_chain = ChainId(reader.u16("token chain")?);
        let to = reader.address("recipient")?;
        let to_chain = ChainId(reader.u16("recipient chain")?);

        let kind = if payload_id == PAYLOAD_TRANSFER {
            let fee = reader.u256("fee")?;
            if !reader.is_empty() {
                return Err(BridgeError::InvalidMessage(
                    "trailing bytes after transfer payload".to_string(),
                ));
            }
            TransferKind::Transfer { fee }
        } else {
            let from_address = reader.address("sender")?;
            TransferKind::WithPayload {
                from_address,
                payload: reader.rest().to_vec(),
            }
        };

        Ok(Self {
            amount,
            token_address,
            token_chain,
            to,
            to_chain,
            kind,
        })
    }

    /// Encode to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(133);
        out.push(self.payload_id());
        out.extend_from_slice(&u256_bytes(self.amount));
        out.extend_from_slice(self.token_address.as_bytes());
        out.extend_from_slice(&self.token_chain.0.to_be_bytes());
        out.extend_from_slice(self.to.as_bytes());
        out.extend_from_slice(&self.to_chain.0.to_be_bytes());
        match &self.kind {
            TransferKind::Transfer { fee } => out.extend_from_slice(&u256_bytes(*fee)),
            TransferKind::WithPayload {
                from_address,
                payload,
            } => {
                out.extend_from_slice(from_address.as_bytes());
                out.extend_from_slice(payload);
            }
        }
        out
    }

    /// Inner payload bytes, if any.
    pub fn inner_payload(&self) -> Option<&[u8]> {
        match &self.kind {
            TransferKind::WithPayload { payload, .. } => Some(payload),
            TransferKind::Transfer { .. } => None,
        }
    }

    /// Decode the relayer instructions carried by an id-3 transfer.
    pub fn relayer_payload(&self) -> BridgeResult<RelayerPayload> {
        let inner = self.inner_payload().ok_or_else(|| {
            BridgeError::InvalidMessage("transfer carries no relayer payload".to_string())
        })?;
        RelayerPayload::decode(inner)
    }
}

/// Relayer instructions embedded in a transfer-with-payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayerPayload {
    /// Relayer payload id.
    pub payload_id: u8,
    /// Fee paid to the relayer (normalized).
    pub target_relayer_fee: U256,
    /// Amount to swap into destination gas (normalized).
    pub to_native_token_amount: U256,
    /// Final recipient.
    pub target_recipient: WireAddress,
}

impl RelayerPayload {
    /// Decode relayer instructions.
    pub fn decode(bytes: &[u8]) -> BridgeResult<Self> {
        let mut reader = Reader::new(bytes);
        let payload_id = reader.u8("relayer payload id")?;
        if payload_id != RELAYER_PAYLOAD_ID {
            return Err(BridgeError::InvalidMessage(format!(
                "unknown relayer payload id {}",
                payload_id
            )));
        }
        Ok(Self {
            payload_id,
            target_relayer_fee: reader.u256("relayer fee")?,
            to_native_token_amount: reader.u256("native token amount")?,
            target_recipient: reader.address("target recipient")?,
        })
    }

    /// Encode to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(97);
        out.push(self.payload_id);
        out.extend_from_slice(&u256_bytes(self.target_relayer_fee));
        out.extend_from_slice(&u256_bytes(self.to_native_token_amount));
        out.extend_from_slice(self.target_recipient.as_bytes());
        out
    }
}
