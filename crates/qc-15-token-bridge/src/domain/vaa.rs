//! # Signed VAA
//!
//! Structural parsing of the attestation produced by the guardian network.
//! Signatures are carried but never verified here.
//!
//! ```text
//! header: u8 version | u32 guardian_set_index | u8 n | n × (u8 index, [65] sig)
//! body:   u32 timestamp | u32 nonce | u16 emitter_chain | [32] emitter
//!         | u64 sequence | u8 consistency_level | payload...
//! ```

use super::errors::{BridgeError, BridgeResult};
use super::payload::TransferPayload;
use super::value_objects::{ChainId, WireAddress};
use super::wire::Reader;
use sha3::{Digest, Keccak256};

/// Supported VAA version.
pub const VAA_VERSION: u8 = 1;

/// Guardian signature over the body digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardianSignature {
    /// Index in the guardian set.
    pub guardian_index: u8,
    /// Recoverable secp256k1 signature (r, s, v).
    pub signature: [u8; 65],
}

/// Parsed signed VAA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedVaa {
    /// Format version.
    pub version: u8,
    /// Guardian set that signed.
    pub guardian_set_index: u32,
    /// Guardian signatures.
    pub signatures: Vec<GuardianSignature>,
    /// Observation time.
    pub timestamp: u32,
    /// Emitter-chosen nonce.
    pub nonce: u32,
    /// Source chain.
    pub emitter_chain: ChainId,
    /// Emitting contract.
    pub emitter_address: WireAddress,
    /// Per-emitter sequence.
    pub sequence: u64,
    /// Requested finality.
    pub consistency_level: u8,
    /// Application payload.
    pub payload: Vec<u8>,
}

impl SignedVaa {
    /// Parse the byte envelope.
    pub fn parse(bytes: &[u8]) -> BridgeResult<Self> {
        let mut reader = Reader::new(bytes);
        let version = reader.u8("version")?;
        if version != VAA_VERSION {
            return Err(BridgeError::InvalidMessage(format!(
                "unsupported VAA version {}",
                version
            )));
        }
        let guardian_set_index = reader.u32("guardian set index")?;
        let count = reader.u8("signature count")?;
        let mut signatures = Vec::with_capacity(count as usize);
        for _ in 0..count {
            signatures.push(GuardianSignature {
                guardian_index: reader.u8("guardian index")?,
                signature: reader.array::<65>("signature")?,
            });
        }

        Ok(Self {
            version,
            guardian_set_index,
            signatures,
            timestamp: reader.u32("timestamp")?,
            nonce: reader.u32("nonce")?,
            emitter_chain: ChainId(reader.u16("emitter chain")?),
            emitter_address: reader.address("emitter address")?,
            sequence: reader.u64("sequence")?,
            consistency_level: reader.u8("consistency level")?,
            payload: reader.rest().to_vec(),
        })
    }

    /// Parse a hex string (with or without `0x`).
    pub fn from_hex(encoded: &str) -> BridgeResult<Self> {
        let stripped = encoded.strip_prefix("0x").unwrap_or(encoded);
        let bytes = hex::decode(stripped)
            .map_err(|e| BridgeError::InvalidMessage(format!("VAA is not hex: {}", e)))?;
        Self::parse(&bytes)
    }

    /// Body bytes (everything after the signatures).
    pub fn body(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(51 + self.payload.len());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.emitter_chain.0.to_be_bytes());
        out.extend_from_slice(self.emitter_address.as_bytes());
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out.push(self.consistency_level);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Keccak-256 of the body.
    pub fn body_hash(&self) -> [u8; 32] {
        Keccak256::digest(self.body()).into()
    }

    /// Double Keccak-256 of the body, the key token bridges record
    /// completed transfers under.
    pub fn digest(&self) -> [u8; 32] {
        Keccak256::digest(self.body_hash()).into()
    }

    /// Serialize back to the wire envelope.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.signatures.len() * 66);
        out.push(self.version);
        out.extend_from_slice(&self.guardian_set_index.to_be_bytes());
        out.push(self.signatures.len() as u8);
        for sig in &self.signatures {
            out.push(sig.guardian_index);
            out.extend_from_slice(&sig.signature);
        }
        out.extend_from_slice(&self.body());
        out
    }

    /// Decode the payload as a token transfer.
    pub fn transfer_payload(&self) -> BridgeResult<TransferPayload> {
        TransferPayload::decode(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::TransferKind;
    use primitive_types::U256;

    fn sample_vaa() -> SignedVaa {
        let transfer = TransferPayload {
            amount: U256::from(1_000u64),
            token_address: WireAddress([0x11; 32]),
            token_chain: ChainId(2),
            to: WireAddress([0x22; 32]),
            to_chain: ChainId(1),
            kind: TransferKind::Transfer { fee: U256::zero() },
        };
        SignedVaa {
            version: VAA_VERSION,
            guardian_set_index: 3,
            signatures: vec![GuardianSignature {
                guardian_index: 0,
                signature: [0x5A; 65],
            }],
            timestamp: 1_690_000_000,
            nonce: 7,
            emitter_chain: ChainId(2),
            emitter_address: WireAddress([0x99; 32]),
            sequence: 42,
            consistency_level: 15,
            payload: transfer.encode(),
        }
    }

    #[test]
    fn test_parse_envelope() {
        let vaa = sample_vaa();
        let parsed = SignedVaa::parse(&vaa.to_bytes()).unwrap();
        assert_eq!(parsed, vaa);
        assert_eq!(parsed.transfer_payload().unwrap().to_chain, ChainId(1));
    }

    #[test]
    fn test_from_hex() {
        let vaa = sample_vaa();
        let encoded = format!("0x{}", hex::encode(vaa.to_bytes()));
        assert_eq!(SignedVaa::from_hex(&encoded).unwrap().sequence, 42);
        assert!(SignedVaa::from_hex("0xnothex").is_err());
    }

    #[test]
    fn test_digest_depends_on_body_only() {
        let vaa = sample_vaa();
        let mut resigned = vaa.clone();
        resigned.guardian_set_index = 4;
        resigned.signatures[0].signature = [0x01; 65];
        assert_eq!(vaa.digest(), resigned.digest());

        let mut other = vaa.clone();
        other.sequence = 43;
        assert_ne!(vaa.digest(), other.digest());
    }

    #[test]
    fn test_digest_is_double_keccak_of_body() {
        let vaa = sample_vaa();
        let once: [u8; 32] = Keccak256::digest(vaa.body()).into();
        let twice: [u8; 32] = Keccak256::digest(once).into();
        assert_eq!(vaa.body_hash(), once);
        assert_eq!(vaa.digest(), twice);
        assert_ne!(vaa.digest(), vaa.body_hash());
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut bytes = sample_vaa().to_bytes();
        bytes[0] = 2;
        assert!(SignedVaa::parse(&bytes).is_err());
    }

    #[test]
    fn test_rejects_truncated_signatures() {
        let bytes = sample_vaa().to_bytes();
        assert!(SignedVaa::parse(&bytes[..40]).is_err());
    }
}
