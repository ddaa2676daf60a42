//! # Domain Value Objects
//!
//! Immutable value types shared by every chain family.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Numeric bridge chain identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u16);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ChainId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// Symbolic chain name (e.g. `"solana"`, `"goerli"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainName(String);

impl ChainName {
    /// Create a chain name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Either form of chain reference. Normalized by the registry before any
/// adapter sees it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChainRef {
    /// Numeric id.
    Id(ChainId),
    /// Symbolic name.
    Name(ChainName),
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<ChainId> for ChainRef {
    fn from(id: ChainId) -> Self {
        Self::Id(id)
    }
}

impl From<u16> for ChainRef {
    fn from(id: u16) -> Self {
        Self::Id(ChainId(id))
    }
}

impl From<ChainName> for ChainRef {
    fn from(name: ChainName) -> Self {
        Self::Name(name)
    }
}

impl From<&ChainName> for ChainRef {
    fn from(name: &ChainName) -> Self {
        Self::Name(name.clone())
    }
}

impl From<&str> for ChainRef {
    fn from(name: &str) -> Self {
        Self::Name(ChainName::from(name))
    }
}

/// Execution/account model shared by a group of chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// EVM-compatible account chains.
    Evm,
    /// Solana and forks.
    Solana,
    /// Sui Move chains.
    Sui,
    /// Aptos Move chains.
    Aptos,
}

impl ChainFamily {
    /// Decimals of the family's native gas token. Protocol constants, not
    /// queryable on-chain.
    pub fn native_decimals(&self) -> u8 {
        match self {
            ChainFamily::Solana => 9,
            ChainFamily::Sui => 9,
            ChainFamily::Aptos => 8,
            ChainFamily::Evm => 18,
        }
    }

    /// Whether the signed message must be posted on-chain before redeem.
    pub fn requires_message_posting(&self) -> bool {
        matches!(self, ChainFamily::Solana)
    }

    /// Lowercase family name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Solana => "solana",
            ChainFamily::Sui => "sui",
            ChainFamily::Aptos => "aptos",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which redeem path a transfer takes. Values equal the payload ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PaymentOption {
    /// User redeems on the destination chain and pays gas.
    Manual = 1,
    /// Relayer redeems, paid out of the transferred amount.
    Automatic = 3,
}

impl PaymentOption {
    /// Payload id this option produces on the wire.
    pub fn payload_id(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for PaymentOption {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Manual),
            3 => Ok(Self::Automatic),
            other => Err(other),
        }
    }
}

/// Connected wallet that signs a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletRole {
    /// Wallet on the source chain.
    Sending,
    /// Wallet on the destination chain.
    Receiving,
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletRole::Sending => f.write_str("sending"),
            WalletRole::Receiving => f.write_str("receiving"),
        }
    }
}

/// Token on its native chain. The address keeps its chain-native encoding.
///
/// Equality ignores ASCII case of the address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenId {
    /// Native chain.
    pub chain: ChainName,
    /// Contract / mint / coin type on that chain.
    pub address: String,
}

impl TokenId {
    /// Create a token id.
    pub fn new(chain: impl Into<ChainName>, address: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            address: address.into(),
        }
    }
}

impl PartialEq for TokenId {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain && self.address.eq_ignore_ascii_case(&other.address)
    }
}

impl Eq for TokenId {}

impl Hash for TokenId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain.hash(state);
        self.address.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chain, self.address)
    }
}

/// Token argument of a transfer: a configured token or the chain's gas token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenRef {
    /// The source chain's native gas token.
    Native,
    /// A token identified on its native chain.
    Token(TokenId),
}

impl From<TokenId> for TokenRef {
    fn from(id: TokenId) -> Self {
        Self::Token(id)
    }
}

/// 32-byte universal address used on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireAddress(pub [u8; 32]);

impl WireAddress {
    /// Left-pad a shorter address (e.g. 20-byte EVM) into 32 bytes.
    pub fn left_padded(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > 32 {
            return None;
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        Some(Self(out))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for WireAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Implicit transfer lifecycle. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferState {
    /// Amount parsed, adapter resolved.
    #[default]
    Created,
    /// Source transaction submitted.
    Sent,
    /// Signed message available.
    Attested,
    /// Destination transaction submitted.
    Redeemed,
    /// Destination contract confirms the transfer.
    Completed,
}

impl TransferState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Sent)
                | (Self::Sent, Self::Attested)
                | (Self::Attested, Self::Redeemed)
                // relayer redeemed on our behalf
                | (Self::Attested, Self::Completed)
                | (Self::Redeemed, Self::Completed)
                // resubmitted redeem
                | (Self::Redeemed, Self::Redeemed)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}
