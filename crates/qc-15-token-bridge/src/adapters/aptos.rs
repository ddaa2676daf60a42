//! Aptos Token Bridge Adapter
//!
//! Native coin types are identified on the wire by the SHA3-256 of the type
//! string. The reverse mapping is only known to the token bridge state.

use super::BridgeCore;
use crate::config::ChainConfig;
use crate::domain::{
    BridgeError, BridgeResult, ChainFamily, ChainId, ParsedTransfer, PreparedTransaction,
    TransferRequest, TxOverrides, WireAddress,
};
use crate::ports::outbound::{ChainProvider, CompletionKey, RelayerContract, TokenBridgeAdapter};
use async_trait::async_trait;
use primitive_types::U256;
use sha3::{Digest, Sha3_256};
use std::sync::Arc;

/// Adapter for Aptos.
pub struct AptosAdapter {
    core: BridgeCore,
}

impl AptosAdapter {
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
}

/// Wire form of a fully qualified coin type.
pub(crate) fn coin_type_address(coin_type: &str) -> WireAddress {
    WireAddress(Sha3_256::digest(coin_type.as_bytes()).into())
}

#[async_trait]
impl TokenBridgeAdapter for AptosAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Aptos
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
        if asset.contains("::") {
            Ok(coin_type_address(asset))
        } else {
            self.format_address(asset)
        }
    }

    async fn parse_asset_address(&self, address: &WireAddress) -> BridgeResult<String> {
        self.core
            .provider
            .asset_from_wire(address)
            .await?
            .ok_or_else(|| BridgeError::ForeignAssetNotFound {
                token: address.to_string(),
                chain: self.core.chain.name.to_string(),
            })
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
        Err(BridgeError::NotImplemented(
            "Aptos current block".to_string(),
        ))
    }

    async fn fetch_token_decimals(&self, asset: &str) -> BridgeResult<u8> {
        self.core.provider.token_decimals(asset).await
    }

    fn relayer(&self) -> Option<&Arc<dyn RelayerContract>> {
        self.core.relayer.as_ref()
    }
}
