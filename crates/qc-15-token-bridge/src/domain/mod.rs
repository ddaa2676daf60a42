//! # Domain Module
//!
//! Core domain types for the token bridge: identifiers, amounts, address
//! codecs, wire payloads and signed messages.

pub mod address;
pub mod amount;
pub mod entities;
pub mod errors;
pub mod payload;
pub mod vaa;
pub mod value_objects;

mod wire;

pub use address::{format_address, parse_address};
pub use amount::{format_units, from_normalized, parse_units, to_normalized, NORMALIZED_DECIMALS};
pub use entities::*;
pub use errors::*;
pub use payload::{
    RelayerPayload, TransferKind, TransferPayload, PAYLOAD_TRANSFER,
    PAYLOAD_TRANSFER_WITH_PAYLOAD, RELAYER_PAYLOAD_ID,
};
pub use vaa::{GuardianSignature, SignedVaa, VAA_VERSION};
pub use value_objects::*;
