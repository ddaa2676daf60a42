//! Config-backed Token Directory
//!
//! Implements `TokenDirectory` over the `tokens` section of a
//! [`BridgeConfig`]. Read-only after construction.

use crate::config::{BridgeConfig, TokenConfig};
use crate::domain::{BridgeError, BridgeResult, ChainFamily, ChainId, TokenId, TokenRef};
use crate::ports::outbound::TokenDirectory;
use std::collections::HashMap;

/// Token directory built from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredTokenDirectory {
    tokens: Vec<TokenConfig>,
    by_key: HashMap<String, usize>,
    families: HashMap<ChainId, ChainFamily>,
}

impl ConfiguredTokenDirectory {
    /// Index the tokens and chain families of `config`.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let tokens = config.tokens.clone();
        let by_key = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.key.clone(), i))
            .collect();
        let families = config.chains.iter().map(|c| (c.id, c.family)).collect();
        Self {
            tokens,
            by_key,
            families,
        }
    }

    /// All configured tokens.
    pub fn tokens(&self) -> &[TokenConfig] {
        &self.tokens
    }
}

impl TokenDirectory for ConfiguredTokenDirectory {
    fn get_token(&self, key: &str) -> BridgeResult<&TokenConfig> {
        self.by_key
            .get(key)
            .map(|&i| &self.tokens[i])
            .ok_or_else(|| BridgeError::TokenNotConfigured(key.to_string()))
    }

    fn get_token_by_id(&self, id: &TokenId) -> Option<&TokenConfig> {
        self.tokens
            .iter()
            .find(|t| t.token_id.as_ref() == Some(id))
    }

    fn get_token_decimals(&self, chain: ChainId, token: &TokenRef) -> BridgeResult<u8> {
        let family = self
            .families
            .get(&chain)
            .copied()
            .ok_or_else(|| BridgeError::UnknownChain(chain.to_string()))?;

        match token {
            TokenRef::Native => Ok(family.native_decimals()),
            TokenRef::Token(id) => self
                .get_token_by_id(id)
                .map(|t| t.decimals_for(family))
                .ok_or_else(|| BridgeError::TokenNotConfigured(id.to_string())),
        }
    }

    fn wrapped_token_id(&self, key: &str) -> BridgeResult<TokenId> {
        let token = self.get_token(key)?;
        if let Some(id) = &token.token_id {
            return Ok(id.clone());
        }

        let wrapped_key = token
            .wrapped_asset
            .as_deref()
            .ok_or_else(|| BridgeError::WrappedAssetMissing(key.to_string()))?;
        self.get_token(wrapped_key)
            .ok()
            .and_then(|wrapped| wrapped.token_id.clone())
            .ok_or_else(|| BridgeError::WrappedAssetMissing(key.to_string()))
    }
}
