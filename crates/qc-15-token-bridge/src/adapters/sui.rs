//! Sui Token Bridge Adapter
//!
//! Coin types have no intrinsic 32-byte form; the token bridge registry
//! assigns one, so asset formatting goes through the provider.

use super::BridgeCore;
use crate::config::ChainConfig;
use crate::domain::{
    BridgeError, BridgeResult, ChainFamily, ChainId, ParsedTransfer, PreparedTransaction,
    TransferRequest, TxOverrides, WireAddress,
};
use crate::ports::outbound::{ChainProvider, CompletionKey, RelayerContract, TokenBridgeAdapter};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::Arc;

/// Adapter for Sui.
pub struct SuiAdapter {
    core: BridgeCore,
}

impl SuiAdapter {
    /// Create an adapter over `provider`.
    pub fn new(
        chain: ChainConfig,
        provider: Arc<dyn ChainProvider>,
        relayer: Option<Arc<dyn RelayerContract>>,
    ) -> Self {
        Self {
            core: BridgeCore::new(chain, provider, relayer),
        }
    }

    /// RPC handle.
    pub fn provider(&self) -> &Arc<dyn ChainProvider> {
        &self.core.provider
    }

    fn not_registered(&self, asset: String) -> BridgeError {
        BridgeError::ForeignAssetNotFound {
            token: asset,
            chain: self.core.chain.name.to_string(),
        }
    }
}

#[async_trait]
impl TokenBridgeAdapter for SuiAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Sui
    }

    fn chain(&self) -> &ChainConfig {
        &self.core.chain
    }

    async fn send(&self, request: &TransferRequest) -> BridgeResult<PreparedTransaction> {
        self.core.transfer_call(request)
    }

    async fn send_with_payload(
        &self,
        request: &TransferRequest,
        payload: Vec<u8>,
    ) -> BridgeResult<PreparedTransaction> {
        self.core.transfer_with_payload_call(request, payload)
    }

    async fn format_asset_address(&self, asset: &str) -> BridgeResult<WireAddress> {
        self.core
            .provider
            .asset_wire_address(asset)
            .await?
            .ok_or_else(|| self.not_registered(asset.to_string()))
    }

    async fn parse_asset_address(&self, address: &WireAddress) -> BridgeResult<String> {
        self.core
            .provider
            .asset_from_wire(address)
            .await?
            .ok_or_else(|| self.not_registered(address.to_string()))
    }

    async fn wrapped_asset(
        &self,
        origin_chain: ChainId,
        origin_address: &WireAddress,
    ) -> BridgeResult<Option<String>> {
        self.core
            .provider
            .wrapped_asset(self.core.token_bridge(), origin_chain, origin_address)
            .await
    }

    async fn parse_message_from_tx(&self, tx: &str) -> BridgeResult<Vec<ParsedTransfer>> {
        self.core.parse_logs(tx).await
    }

    async fn native_balance(&self, address: &str) -> BridgeResult<U256> {
        self.core.provider.native_balance(address).await
    }

    async fn token_balance(&self, asset: &str, owner: &str) -> BridgeResult<Option<U256>> {
        self.core.provider.token_balance(asset, owner).await
    }

    async fn redeem(
        &self,
        vaa: &[u8],
        overrides: &TxOverrides,
        _payer: Option<&str>,
    ) -> BridgeResult<PreparedTransaction> {
        self.core.redeem_call(vaa, overrides, |_| false)
    }

    async fn is_transfer_completed(&self, vaa: &[u8]) -> BridgeResult<bool> {
        self.core.is_completed(vaa, CompletionKey::digest).await
    }

    async fn current_block(&self) -> BridgeResult<u64> {
        // latest checkpoint sequence number
        self.core.provider.current_block().await
    }

    async fn fetch_token_decimals(&self, asset: &str) -> BridgeResult<u8> {
        self.core.provider.token_decimals(asset).await
    }

    fn relayer(&self) -> Option<&Arc<dyn RelayerContract>> {
        self.core.relayer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::ports::outbound::MockChainProvider;
    use crate::test_utils::{chain_config, testnet_config};

    const SUI_COIN: &str = "0x2::sui::SUI";

    fn adapter() -> (SuiAdapter, Arc<MockChainProvider>) {
        let provider = Arc::new(MockChainProvider::new());
        let chain = chain_config(&testnet_config(), "sui");
        (SuiAdapter::new(chain, provider.clone(), None), provider)
    }

    #[tokio::test]
    async fn test_asset_lookup_round_trip() {
        let (adapter, provider) = adapter();
        provider.set_asset_wire_address(SUI_COIN, WireAddress([0x09; 32]));

        let wire = adapter.format_asset_address(SUI_COIN).await.unwrap();
        assert_eq!(wire, WireAddress([0x09; 32]));
        assert_eq!(adapter.parse_asset_address(&wire).await.unwrap(), SUI_COIN);
    }

    #[tokio::test]
    async fn test_unregistered_asset_is_not_found() {
        let (adapter, _) = adapter();
        let err = adapter.format_asset_address(SUI_COIN).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = adapter
            .parse_asset_address(&WireAddress([1; 32]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_current_block_is_checkpoint() {
        let (adapter, provider) = adapter();
        provider.set_block(1_234_567);
        assert_eq!(adapter.current_block().await.unwrap(), 1_234_567);
    }

    #[test]
    fn test_account_addresses_are_hex() {
        let (adapter, _) = adapter();
        let addr = "0x6fb10cdb7aa299e9a4308752dadecb049ff55a892de92992a1edbd7912b3d6da";
        let wire = adapter.format_address(addr).unwrap();
        assert_eq!(adapter.parse_address(&wire), addr);
    }
}
