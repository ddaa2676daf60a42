//! Bridge configuration with validation.
//!
//! Loaded once, validated, then handed to
//! [`ContextRegistry::builder`](crate::registry::ContextRegistry::builder).
//!
//! # Environment Variables
//!
//! - `QC_BRIDGE_CONFIG`: path to a JSON config file
//! - `QC_LOG_LEVEL` or `RUST_LOG`: log level (default: info)
//! - `QC_JSON_LOGS`: emit JSON logs (default: false)

use crate::domain::{BridgeError, ChainFamily, ChainId, ChainName, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Default gas limit applied to redeem transactions.
pub const DEFAULT_CLAIM_GAS_LIMIT: u64 = 250_000;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "QC_BRIDGE_CONFIG";

/// Deployment network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production networks.
    Mainnet,
    /// Public testnets.
    #[default]
    Testnet,
    /// Local devnet.
    Devnet,
}

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Network the chains belong to
    pub network: Network,
    /// Configured chains
    pub chains: Vec<ChainConfig>,
    /// Configured tokens
    pub tokens: Vec<TokenConfig>,
    /// Gas limit for redeem transactions
    pub claim_gas_limit: u64,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            chains: Vec::new(),
            tokens: Vec::new(),
            claim_gas_limit: DEFAULT_CLAIM_GAS_LIMIT,
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Load the file named by `QC_BRIDGE_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            env::var(CONFIG_PATH_ENV).map_err(|_| ConfigError::EnvMissing(CONFIG_PATH_ENV))?;
        Self::from_file(path)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chains.is_empty() {
            return Err(ConfigError::NoChains);
        }

        if self.claim_gas_limit == 0 {
            return Err(ConfigError::InvalidClaimGasLimit);
        }

        // id <-> name must be a bijection
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for chain in &self.chains {
            if !ids.insert(chain.id) {
                return Err(ConfigError::DuplicateChainId(chain.id.0));
            }
            if !names.insert(chain.name.as_str()) {
                return Err(ConfigError::DuplicateChainName(chain.name.to_string()));
            }
            if chain.contracts.token_bridge.is_empty() {
                return Err(ConfigError::MissingContract {
                    chain: chain.name.to_string(),
                    contract: "tokenBridge",
                });
            }
        }

        let mut keys = HashSet::new();
        for token in &self.tokens {
            if !keys.insert(token.key.as_str()) {
                return Err(ConfigError::DuplicateToken(token.key.clone()));
            }
        }

        for token in &self.tokens {
            if !names.contains(token.native_chain.as_str()) {
                return Err(ConfigError::UnknownTokenChain {
                    token: token.key.clone(),
                    chain: token.native_chain.to_string(),
                });
            }
            match (&token.token_id, &token.wrapped_asset) {
                (Some(id), _) if !names.contains(id.chain.as_str()) => {
                    return Err(ConfigError::UnknownTokenChain {
                        token: token.key.clone(),
                        chain: id.chain.to_string(),
                    });
                }
                (None, Some(wrapped)) if !keys.contains(wrapped.as_str()) => {
                    return Err(ConfigError::UnknownWrappedAsset {
                        token: token.key.clone(),
                        wrapped: wrapped.clone(),
                    });
                }
                (None, None) => return Err(ConfigError::TokenWithoutIdentity(token.key.clone())),
                _ => {}
            }
        }

        Ok(())
    }
}

/// Contract addresses deployed on one chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainContracts {
    /// Core messaging contract (required to post messages)
    #[serde(default)]
    pub core: Option<String>,
    /// Token bridge contract / program / package
    pub token_bridge: String,
    /// Token bridge relayer, when deployed
    #[serde(default)]
    pub relayer: Option<String>,
}

/// One configured chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Symbolic name
    pub name: ChainName,
    /// Bridge chain id
    pub id: ChainId,
    /// Chain family
    pub family: ChainFamily,
    /// Deployed contracts
    pub contracts: ChainContracts,
    /// Wrapped native token address (EVM unwrap on redeem)
    #[serde(default)]
    pub wrapped_native: Option<String>,
}

/// One configured token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    /// Lookup key
    pub key: String,
    /// Ticker
    pub symbol: String,
    /// Chain the token is native to
    pub native_chain: ChainName,
    /// On-chain identity; absent for gas tokens
    #[serde(default)]
    pub token_id: Option<TokenId>,
    /// Key of the wrapped counterpart for gas tokens
    #[serde(default)]
    pub wrapped_asset: Option<String>,
    /// Decimals on EVM chains and the default elsewhere
    pub decimals: u8,
    /// Decimals on Solana
    #[serde(default)]
    pub sol_decimals: Option<u8>,
    /// Decimals on Sui
    #[serde(default)]
    pub sui_decimals: Option<u8>,
    /// Decimals on Aptos
    #[serde(default)]
    pub aptos_decimals: Option<u8>,
}

impl TokenConfig {
    /// Decimals of this token's representation on a chain family.
    pub fn decimals_for(&self, family: ChainFamily) -> u8 {
        let specific = match family {
            ChainFamily::Evm => None,
            ChainFamily::Solana => self.sol_decimals,
            ChainFamily::Sui => self.sui_decimals,
            ChainFamily::Aptos => self.aptos_decimals,
        };
        specific.unwrap_or(self.decimals)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Read `QC_LOG_LEVEL` (or `RUST_LOG`) and `QC_JSON_LOGS`.
    pub fn from_env() -> Self {
        Self {
            level: env::var("QC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),
            json: env::var("QC_JSON_LOGS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config: {0}")]
    Io(String),

    /// Config document is malformed
    #[error("Cannot parse config: {0}")]
    Parse(String),

    /// Required environment variable unset
    #[error("Environment variable {0} is not set")]
    EnvMissing(&'static str),

    /// No chains configured
    #[error("No chains configured")]
    NoChains,

    /// Two chains share an id
    #[error("Duplicate chain id: {0}")]
    DuplicateChainId(u16),

    /// Two chains share a name
    #[error("Duplicate chain name: {0}")]
    DuplicateChainName(String),

    /// Required contract address missing
    #[error("Missing {contract} contract on {chain}")]
    MissingContract {
        /// Chain name
        chain: String,
        /// Contract role
        contract: &'static str,
    },

    /// Two tokens share a key
    #[error("Duplicate token key: {0}")]
    DuplicateToken(String),

    /// Token references an unconfigured chain
    #[error("Token {token} references unknown chain {chain}")]
    UnknownTokenChain {
        /// Token key
        token: String,
        /// Chain name
        chain: String,
    },

    /// Wrapped-asset key does not exist
    #[error("Token {token} references unknown wrapped asset {wrapped}")]
    UnknownWrappedAsset {
        /// Token key
        token: String,
        /// Referenced key
        wrapped: String,
    },

    /// Token has neither a token id nor a wrapped asset
    #[error("Token {0} has neither tokenId nor wrappedAsset")]
    TokenWithoutIdentity(String),

    /// Claim gas limit is zero
    #[error("claimGasLimit cannot be 0")]
    InvalidClaimGasLimit,
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        BridgeError::InvalidConfig(err.to_string())
    }
}
