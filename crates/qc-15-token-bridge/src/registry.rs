//! # Context Registry
//!
//! Maps chain references to per-chain contexts. Built once from a validated
//! [`BridgeConfig`], shared by `Arc`, never mutated afterwards.
//!
//! ```text
//! ChainRef::Id(1) ─┐
//!                  ├─> ContextRegistry::resolve ─> ChainContext::Solana(SolanaAdapter)
//! "solana" ────────┘
//! ```

use crate::adapters::{AptosAdapter, EvmAdapter, SolanaAdapter, SuiAdapter};
use crate::config::{BridgeConfig, ChainConfig, Network};
use crate::domain::{
    BridgeError, BridgeResult, ChainFamily, ChainId, ChainName, ChainRef, TokenId,
};
use crate::ports::outbound::{ChainProvider, RelayerContract, TokenBridgeAdapter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Adapter for one configured chain, tagged by family.
pub enum ChainContext {
    /// EVM chain.
    Evm(EvmAdapter),
    /// Solana.
    Solana(SolanaAdapter),
    /// Sui.
    Sui(SuiAdapter),
    /// Aptos.
    Aptos(AptosAdapter),
}

impl ChainContext {
    fn new(
        chain: ChainConfig,
        provider: Arc<dyn ChainProvider>,
        relayer: Option<Arc<dyn RelayerContract>>,
    ) -> Self {
        match chain.family {
            ChainFamily::Evm => Self::Evm(EvmAdapter::new(chain, provider, relayer)),
            ChainFamily::Solana => Self::Solana(SolanaAdapter::new(chain, provider, relayer)),
            ChainFamily::Sui => Self::Sui(SuiAdapter::new(chain, provider, relayer)),
            ChainFamily::Aptos => Self::Aptos(AptosAdapter::new(chain, provider, relayer)),
        }
    }

    /// The family adapter.
    pub fn adapter(&self) -> &dyn TokenBridgeAdapter {
        match self {
            Self::Evm(a) => a,
            Self::Solana(a) => a,
            Self::Sui(a) => a,
            Self::Aptos(a) => a,
        }
    }

    /// Chain family.
    pub fn family(&self) -> ChainFamily {
        self.adapter().family()
    }

    /// Chain configuration.
    pub fn config(&self) -> &ChainConfig {
        self.adapter().chain()
    }

    /// Bridge chain id.
    pub fn chain_id(&self) -> ChainId {
        self.config().id
    }

    /// Chain name.
    pub fn chain_name(&self) -> &ChainName {
        &self.config().name
    }

    /// RPC handle of the chain.
    pub fn connection(&self) -> &Arc<dyn ChainProvider> {
        match self {
            Self::Evm(a) => a.provider(),
            Self::Solana(a) => a.connection(),
            Self::Sui(a) => a.provider(),
            Self::Aptos(a) => a.provider(),
        }
    }

    /// The Solana adapter, for Solana-only queries.
    pub fn as_solana(&self) -> Option<&SolanaAdapter> {
        match self {
            Self::Solana(a) => Some(a),
            _ => None,
        }
    }
}

/// Builder for [`ContextRegistry`].
pub struct ContextRegistryBuilder {
    config: BridgeConfig,
    providers: HashMap<ChainName, Arc<dyn ChainProvider>>,
    relayers: HashMap<ChainName, Arc<dyn RelayerContract>>,
}

impl ContextRegistryBuilder {
    /// Attach the RPC handle for `chain`. Every configured chain needs one.
    pub fn with_provider(
        mut self,
        chain: impl Into<ChainName>,
        provider: Arc<dyn ChainProvider>,
    ) -> Self {
        self.providers.insert(chain.into(), provider);
        self
    }

    /// Attach the relayer handle for `chain`.
    pub fn with_relayer(
        mut self,
        chain: impl Into<ChainName>,
        relayer: Arc<dyn RelayerContract>,
    ) -> Self {
        self.relayers.insert(chain.into(), relayer);
        self
    }

    /// Validate and build.
    pub fn build(mut self) -> BridgeResult<ContextRegistry> {
        self.config.validate()?;

        let mut contexts = Vec::with_capacity(self.config.chains.len());
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();

        for chain in &self.config.chains {
            let provider = self.providers.remove(&chain.name).ok_or_else(|| {
                BridgeError::InvalidConfig(format!("no provider for chain {}", chain.name))
            })?;
            let relayer = self.relayers.remove(&chain.name);
            if relayer.is_some() && chain.contracts.relayer.is_none() {
                return Err(BridgeError::InvalidConfig(format!(
                    "relayer handle given for {} but no relayer contract configured",
                    chain.name
                )));
            }

            debug!(
                "[qc-15] Registering {} (id={}, family={}, relayer={})",
                chain.name,
                chain.id,
                chain.family,
                relayer.is_some()
            );
            by_id.insert(chain.id, contexts.len());
            by_name.insert(chain.name.clone(), contexts.len());
            contexts.push(ChainContext::new(chain.clone(), provider, relayer));
        }

        if let Some(name) = self
            .providers
            .keys()
            .chain(self.relayers.keys())
            .next()
        {
            return Err(BridgeError::UnknownChain(name.to_string()));
        }

        info!(
            "[qc-15] Context registry ready: {} chain(s) on {:?}",
            contexts.len(),
            self.config.network
        );

        Ok(ContextRegistry {
            network: self.config.network,
            claim_gas_limit: self.config.claim_gas_limit,
            contexts,
            by_id,
            by_name,
        })
    }
}

/// Chain reference → context dispatcher.
pub struct ContextRegistry {
    network: Network,
    claim_gas_limit: u64,
    contexts: Vec<ChainContext>,
    by_id: HashMap<ChainId, usize>,
    by_name: HashMap<ChainName, usize>,
}

impl ContextRegistry {
    /// Start building a registry for `config`.
    pub fn builder(config: BridgeConfig) -> ContextRegistryBuilder {
        ContextRegistryBuilder {
            config,
            providers: HashMap::new(),
            relayers: HashMap::new(),
        }
    }

    /// Context for a chain id or name.
    pub fn resolve(&self, chain: impl Into<ChainRef>) -> BridgeResult<&ChainContext> {
        let chain = chain.into();
        let index = match &chain {
            ChainRef::Id(id) => self.by_id.get(id),
            ChainRef::Name(name) => self.by_name.get(name),
        };
        index
            .map(|&i| &self.contexts[i])
            .ok_or_else(|| BridgeError::UnknownChain(chain.to_string()))
    }

    /// Numeric id of a chain reference.
    pub fn to_chain_id(&self, chain: impl Into<ChainRef>) -> BridgeResult<ChainId> {
        self.resolve(chain).map(ChainContext::chain_id)
    }

    /// Name of a chain reference.
    pub fn to_chain_name(&self, chain: impl Into<ChainRef>) -> BridgeResult<ChainName> {
        self.resolve(chain).map(|c| c.chain_name().clone())
    }

    /// All contexts, in configuration order.
    pub fn contexts(&self) -> impl Iterator<Item = &ChainContext> {
        self.contexts.iter()
    }

    /// Network of the configured chains.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Gas limit applied to redeem transactions.
    pub fn claim_gas_limit(&self) -> u64 {
        self.claim_gas_limit
    }

    /// Representation of `token` on `chain`.
    ///
    /// The token's own address on its native chain; `None` when the token
    /// was never attested to `chain`.
    pub async fn get_foreign_asset(
        &self,
        token: &TokenId,
        chain: impl Into<ChainRef>,
    ) -> BridgeResult<Option<String>> {
        let target = self.resolve(chain)?;
        if &token.chain == target.chain_name() {
            return Ok(Some(token.address.clone()));
        }

        let origin = self.resolve(&token.chain)?;
        let origin_address = origin
            .adapter()
            .format_asset_address(&token.address)
            .await?;
        target
            .adapter()
            .wrapped_asset(origin.chain_id(), &origin_address)
            .await
    }

    /// Like [`get_foreign_asset`](Self::get_foreign_asset) but absence is an error.
    pub async fn must_get_foreign_asset(
        &self,
        token: &TokenId,
        chain: impl Into<ChainRef>,
    ) -> BridgeResult<String> {
        let chain = chain.into();
        self.get_foreign_asset(token, chain.clone())
            .await?
            .ok_or_else(|| BridgeError::ForeignAssetNotFound {
                token: token.to_string(),
                chain: chain.to_string(),
            })
    }

    /// On-chain decimals of `token`'s representation on `chain`.
    pub async fn fetch_token_decimals(
        &self,
        token: &TokenId,
        chain: impl Into<ChainRef>,
    ) -> BridgeResult<u8> {
        let target = self.resolve(chain)?;
        let asset = self
            .must_get_foreign_asset(token, target.chain_name())
            .await?;
        target.adapter().fetch_token_decimals(&asset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{format_address, ErrorKind, WireAddress};
    use crate::test_utils::{testnet_config, MockChains};

    #[test]
    fn test_resolve_by_id_and_name() {
        let chains = MockChains::testnet();
        let registry = chains.registry();

        let by_id = registry.resolve(1u16).unwrap();
        let by_name = registry.resolve("solana").unwrap();
        assert_eq!(by_id.chain_name(), by_name.chain_name());
        assert_eq!(by_id.family(), ChainFamily::Solana);
        assert!(by_id.as_solana().is_some());

        assert_eq!(registry.to_chain_id("sui").unwrap(), ChainId(21));
        assert_eq!(registry.to_chain_name(22u16).unwrap().as_str(), "aptos");
        assert_eq!(registry.to_chain_id(ChainId(2)).unwrap(), ChainId(2));
    }

    #[test]
    fn test_unknown_chain() {
        let registry = MockChains::testnet().registry();
        let err = registry.resolve("karura").err().unwrap();
        assert!(matches!(err, BridgeError::UnknownChain(ref name) if name == "karura"));
        assert_eq!(registry.to_chain_id(9999u16).unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_families_dispatch_to_matching_adapter() {
        let registry = MockChains::testnet().registry();
        for context in registry.contexts() {
            assert_eq!(context.family(), context.config().family);
            assert_eq!(context.adapter().family(), context.family());
        }
    }

    #[test]
    fn test_build_requires_every_provider() {
        let err = ContextRegistry::builder(testnet_config())
            .with_provider("goerli", Arc::new(crate::ports::MockChainProvider::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }

    #[test]
    fn test_build_rejects_relayer_without_contract() {
        let chains = MockChains::testnet();
        let err = chains
            .builder()
            .with_relayer("aptos", Arc::new(crate::ports::MockRelayer::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }

    #[test]
    fn test_build_rejects_unconfigured_provider() {
        let chains = MockChains::testnet();
        let err = chains
            .builder()
            .with_provider("karura", Arc::new(crate::ports::MockChainProvider::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::UnknownChain(_)));
    }

    #[test]
    fn test_build_validates_config() {
        let mut config = testnet_config();
        config.claim_gas_limit = 0;
        assert!(ContextRegistry::builder(config).build().is_err());
    }

    #[test]
    fn test_registry_exposes_settings() {
        let registry = MockChains::testnet().registry();
        assert_eq!(registry.network(), Network::Testnet);
        assert_eq!(registry.claim_gas_limit(), 250_000);
        assert!(registry.resolve("goerli").unwrap().adapter().supports_relay());
        assert!(!registry.resolve("aptos").unwrap().adapter().supports_relay());
    }

    #[tokio::test]
    async fn test_foreign_asset_on_native_chain_is_token_address() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        let usdc = TokenId::new("goerli", "0x07865c6e87b9f70255377e024ace6630c1eaa37f");

        let asset = registry.get_foreign_asset(&usdc, "goerli").await.unwrap();
        assert_eq!(asset.as_deref(), Some(usdc.address.as_str()));
        assert_eq!(chains.provider("goerli").call_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_asset_lookup() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        let usdc = TokenId::new("goerli", "0x07865c6e87b9f70255377e024ace6630c1eaa37f");

        assert_eq!(registry.get_foreign_asset(&usdc, "fuji").await.unwrap(), None);
        let err = registry.must_get_foreign_asset(&usdc, "fuji").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let wire: WireAddress = format_address(ChainFamily::Evm, &usdc.address).unwrap();
        chains
            .provider("fuji")
            .set_wrapped_asset(ChainId(2), wire, "0x63a30f239dc8d1c17bf6653a68fc6c2f83641e25");
        chains
            .provider("fuji")
            .set_decimals("0x63a30f239dc8d1c17bf6653a68fc6c2f83641e25", 6);

        assert_eq!(
            registry.must_get_foreign_asset(&usdc, 6u16).await.unwrap(),
            "0x63a30f239dc8d1c17bf6653a68fc6c2f83641e25"
        );
        assert_eq!(registry.fetch_token_decimals(&usdc, "fuji").await.unwrap(), 6);
    }
}
