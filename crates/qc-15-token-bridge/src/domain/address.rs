//! # Address Codecs
//!
//! Display ↔ wire conversion per chain family. Canonical display forms:
//!
//! | Family | Display | Wire |
//! |--------|---------|------|
//! | EVM | `0x` + 40 lowercase hex | left-padded 20 bytes |
//! | Solana | base58, 32 bytes | raw 32 bytes |
//! | Sui / Aptos | `0x` + 64 lowercase hex | raw 32 bytes |
//!
//! `parse_address(format_address(x)) == x` holds for every canonical address.

use super::errors::{BridgeError, BridgeResult};
use super::value_objects::{ChainFamily, WireAddress};

/// Convert a display address into its wire form.
pub fn format_address(family: ChainFamily, address: &str) -> BridgeResult<WireAddress> {
    let invalid = || BridgeError::InvalidAddress {
        family: family.to_string(),
        address: address.to_string(),
    };

    match family {
        ChainFamily::Evm => {
            let stripped = strip_hex_prefix(address).ok_or_else(invalid)?;
            if stripped.len() != 40 {
                return Err(invalid());
            }
            let bytes = hex::decode(stripped).map_err(|_| invalid())?;
            WireAddress::left_padded(&bytes).ok_or_else(invalid)
        }
        ChainFamily::Solana => {
            let bytes = bs58::decode(address).into_vec().map_err(|_| invalid())?;
            if bytes.len() != 32 {
                return Err(invalid());
            }
            WireAddress::left_padded(&bytes).ok_or_else(invalid)
        }
        ChainFamily::Sui | ChainFamily::Aptos => {
            let stripped = strip_hex_prefix(address).ok_or_else(invalid)?;
            if stripped.is_empty() || stripped.len() > 64 {
                return Err(invalid());
            }
            // Move addresses may be written in short form ("0x2").
            let padded = format!("{:0>64}", stripped);
            let bytes = hex::decode(padded).map_err(|_| invalid())?;
            WireAddress::left_padded(&bytes).ok_or_else(invalid)
        }
    }
}

/// Convert a wire address into its canonical display form.
pub fn parse_address(family: ChainFamily, address: &WireAddress) -> String {
    match family {
        ChainFamily::Evm => format!("0x{}", hex::encode(&address.0[12..])),
        ChainFamily::Solana => bs58::encode(address.0).into_string(),
        ChainFamily::Sui | ChainFamily::Aptos => format!("0x{}", address.to_hex()),
    }
}

fn strip_hex_prefix(address: &str) -> Option<&str> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
}
