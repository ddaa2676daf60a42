//! EVM Token Bridge Adapter
//!
//! Asset ids are contract addresses, so asset formatting is plain address
//! formatting. A missing ERC-20 balance reads as zero.

use super::BridgeCore;
use crate::config::ChainConfig;
use crate::domain::{
    parse_address, BridgeResult, ChainFamily, ChainId, ParsedTransfer, PreparedTransaction,
    TransferPayload, TransferRequest, TxOverrides, WireAddress,
};
use crate::ports::outbound::{ChainProvider, CompletionKey, RelayerContract, TokenBridgeAdapter};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::Arc;

/// Adapter for EVM chains.
pub struct EvmAdapter {
    core: BridgeCore,
}

impl EvmAdapter {
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

    /// Whether the transfer delivers this chain's wrapped native token.
    fn is_wrapped_native(&self, transfer: &TransferPayload) -> bool {
        let chain = &self.core.chain;
        match &chain.wrapped_native {
            Some(wrapped) => {
                transfer.token_chain == chain.id
                    && parse_address(ChainFamily::Evm, &transfer.token_address)
                        .eq_ignore_ascii_case(wrapped)
            }
            None => false,
        }
    }
}

#[async_trait]
impl TokenBridgeAdapter for EvmAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
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
        self.format_address(asset)
    }

    async fn parse_asset_address(&self, address: &WireAddress) -> BridgeResult<String> {
        Ok(self.parse_address(address))
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
        // ERC-20 balanceOf is total: no account means zero.
        let balance = self.core.provider.token_balance(asset, owner).await?;
        Ok(Some(balance.unwrap_or_default()))
    }

    async fn redeem(
        &self,
        vaa: &[u8],
        overrides: &TxOverrides,
        _payer: Option<&str>,
    ) -> BridgeResult<PreparedTransaction> {
        self.core
            .redeem_call(vaa, overrides, |transfer| self.is_wrapped_native(transfer))
    }

    async fn is_transfer_completed(&self, vaa: &[u8]) -> BridgeResult<bool> {
        self.core.is_completed(vaa, CompletionKey::digest).await
    }

    async fn current_block(&self) -> BridgeResult<u64> {
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
    use crate::domain::{format_address, BridgeCall, SignedVaa, TransferKind};
    use crate::ports::outbound::MockChainProvider;
    use crate::test_utils::{chain_config, signed_transfer_vaa, testnet_config};

    fn adapter(name: &str) -> (EvmAdapter, Arc<MockChainProvider>) {
        let provider = Arc::new(MockChainProvider::new());
        let chain = chain_config(&testnet_config(), name);
        (EvmAdapter::new(chain, provider.clone(), None), provider)
    }

    fn transfer_of(token_chain: ChainId, token: &str, to_chain: ChainId) -> TransferPayload {
        TransferPayload {
            amount: U256::from(100u64),
            token_address: format_address(ChainFamily::Evm, token).unwrap(),
            token_chain,
            to: WireAddress([4; 32]),
            to_chain,
            kind: TransferKind::Transfer { fee: U256::zero() },
        }
    }

    #[tokio::test]
    async fn test_missing_token_account_reads_zero() {
        let (adapter, _) = adapter("goerli");
        let balance = adapter.token_balance("0xabc", "0xme").await.unwrap();
        assert_eq!(balance, Some(U256::zero()));
    }

    #[tokio::test]
    async fn test_asset_address_round_trip() {
        let (adapter, _) = adapter("goerli");
        let asset = "0x07865c6e87b9f70255377e024ace6630c1eaa37f";
        let wire = adapter.format_asset_address(asset).await.unwrap();
        assert_eq!(adapter.parse_asset_address(&wire).await.unwrap(), asset);
    }

    #[tokio::test]
    async fn test_redeem_unwraps_native() {
        let (adapter, _) = adapter("goerli");
        let weth = adapter.chain().wrapped_native.clone().unwrap();
        let vaa = signed_transfer_vaa(
            ChainId(6),
            3,
            &transfer_of(ChainId(2), &weth, ChainId(2)),
        );

        let tx = adapter
            .redeem(&vaa.to_bytes(), &TxOverrides::default(), None)
            .await
            .unwrap();
        assert!(matches!(
            tx.call,
            BridgeCall::Redeem {
                unwrap_native: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_redeem_foreign_token_does_not_unwrap() {
        let (adapter, _) = adapter("goerli");
        let weth = adapter.chain().wrapped_native.clone().unwrap();
        // same address, but originating elsewhere
        let vaa = signed_transfer_vaa(
            ChainId(6),
            3,
            &transfer_of(ChainId(6), &weth, ChainId(2)),
        );

        let tx = adapter
            .redeem(&vaa.to_bytes(), &TxOverrides::default(), None)
            .await
            .unwrap();
        assert!(matches!(
            tx.call,
            BridgeCall::Redeem {
                unwrap_native: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_completion_uses_digest_and_is_idempotent() {
        let (adapter, provider) = adapter("goerli");
        let vaa: SignedVaa = signed_transfer_vaa(
            ChainId(6),
            3,
            &transfer_of(ChainId(6), "0x0000000000000000000000000000000000000001", ChainId(2)),
        );
        let bytes = vaa.to_bytes();

        assert!(!adapter.is_transfer_completed(&bytes).await.unwrap());
        provider.mark_completed(CompletionKey::digest(&vaa));
        assert!(adapter.is_transfer_completed(&bytes).await.unwrap());
        assert!(adapter.is_transfer_completed(&bytes).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrapped_asset_lookup() {
        let (adapter, provider) = adapter("fuji");
        let origin = WireAddress([0xAA; 32]);
        assert_eq!(adapter.wrapped_asset(ChainId(1), &origin).await.unwrap(), None);
        provider.set_wrapped_asset(ChainId(1), origin, "0xwrapped");
        assert_eq!(
            adapter.wrapped_asset(ChainId(1), &origin).await.unwrap(),
            Some("0xwrapped".to_string())
        );
    }

    #[test]
    fn test_relay_capability_follows_handle() {
        let (adapter, _) = adapter("goerli");
        assert!(!adapter.supports_relay());
        assert!(!adapter.requires_message_posting());
    }
}
