//! Test fixtures: the sample testnet config, signed VAA construction and a
//! registry wired to in-memory chains.

use crate::adapters::ConfiguredTokenDirectory;
use crate::config::{BridgeConfig, ChainConfig};
use crate::domain::{ChainId, GuardianSignature, SignedVaa, TransferPayload, WireAddress, VAA_VERSION};
use crate::ports::{MockChainProvider, MockMessagePoster, MockRelayer, MockSigner};
use crate::registry::{ContextRegistry, ContextRegistryBuilder};
use crate::service::TokenBridgeService;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) const TESTNET_JSON: &str = include_str!("../config/testnet.json");

pub(crate) fn testnet_config() -> BridgeConfig {
    BridgeConfig::from_json_str(TESTNET_JSON).unwrap()
}

pub(crate) fn chain_config(config: &BridgeConfig, name: &str) -> ChainConfig {
    config
        .chains
        .iter()
        .find(|c| c.name.as_str() == name)
        .cloned()
        .unwrap()
}

/// Wrap `transfer` in a VAA with one dummy guardian signature.
pub(crate) fn signed_transfer_vaa(
    emitter_chain: ChainId,
    sequence: u64,
    transfer: &TransferPayload,
) -> SignedVaa {
    SignedVaa {
        version: VAA_VERSION,
        guardian_set_index: 0,
        signatures: vec![GuardianSignature {
            guardian_index: 0,
            signature: [0x42; 65],
        }],
        timestamp: 1_700_000_000,
        nonce: 0,
        emitter_chain,
        emitter_address: WireAddress([0xEE; 32]),
        sequence,
        consistency_level: 1,
        payload: transfer.encode(),
    }
}

/// One mock provider per configured chain, one mock relayer per chain with
/// a relayer contract.
pub(crate) struct MockChains {
    pub(crate) config: BridgeConfig,
    providers: HashMap<String, Arc<MockChainProvider>>,
    relayers: HashMap<String, Arc<MockRelayer>>,
}

impl MockChains {
    pub(crate) fn testnet() -> Self {
        Self::from_config(testnet_config())
    }

    pub(crate) fn from_config(config: BridgeConfig) -> Self {
        let providers = config
            .chains
            .iter()
            .map(|c| (c.name.to_string(), Arc::new(MockChainProvider::new())))
            .collect();
        let relayers = config
            .chains
            .iter()
            .filter(|c| c.contracts.relayer.is_some())
            .map(|c| (c.name.to_string(), Arc::new(MockRelayer::new())))
            .collect();
        Self {
            config,
            providers,
            relayers,
        }
    }

    pub(crate) fn provider(&self, name: &str) -> &Arc<MockChainProvider> {
        &self.providers[name]
    }

    pub(crate) fn relayer(&self, name: &str) -> &Arc<MockRelayer> {
        &self.relayers[name]
    }

    pub(crate) fn total_provider_calls(&self) -> usize {
        self.providers.values().map(|p| p.call_count()).sum()
    }

    pub(crate) fn builder(&self) -> ContextRegistryBuilder {
        let mut builder = ContextRegistry::builder(self.config.clone());
        for (name, provider) in &self.providers {
            builder = builder.with_provider(name.as_str(), provider.clone());
        }
        for (name, relayer) in &self.relayers {
            builder = builder.with_relayer(name.as_str(), relayer.clone());
        }
        builder
    }

    pub(crate) fn registry(&self) -> ContextRegistry {
        self.builder().build().unwrap()
    }
}

pub(crate) type MockService =
    TokenBridgeService<MockSigner, ConfiguredTokenDirectory, MockMessagePoster>;

/// Service over [`MockChains`] with a recording signer and poster.
pub(crate) struct Harness {
    pub(crate) chains: MockChains,
    pub(crate) signer: Arc<MockSigner>,
    pub(crate) poster: Arc<MockMessagePoster>,
    pub(crate) service: MockService,
}

impl Harness {
    pub(crate) fn testnet() -> Self {
        let chains = MockChains::testnet();
        let signer = Arc::new(MockSigner::new());
        let poster = Arc::new(MockMessagePoster::new());
        let directory = Arc::new(ConfiguredTokenDirectory::from_config(&chains.config));
        let service = TokenBridgeService::new(
            Arc::new(chains.registry()),
            signer.clone(),
            directory,
            poster.clone(),
        );
        Self {
            chains,
            signer,
            poster,
            service,
        }
    }
}
