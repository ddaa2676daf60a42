//! Solana Token Bridge Adapter
//!
//! Mints are base58 keys. Redeem needs a fee payer, and the signed VAA must
//! already be posted to the core program. Completion is tracked per
//! emitter/sequence claim account, not per digest.

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
use tracing::debug;

/// Adapter for Solana.
pub struct SolanaAdapter {
    core: BridgeCore,
}

impl SolanaAdapter {
    /// Create an adapter over `connection`.
    pub fn new(
        chain: ChainConfig,
        connection: Arc<dyn ChainProvider>,
        relayer: Option<Arc<dyn RelayerContract>>,
    ) -> Self {
        Self {
            core: BridgeCore::new(chain, connection, relayer),
        }
    }

    /// RPC connection.
    pub fn connection(&self) -> &Arc<dyn ChainProvider> {
        &self.core.provider
    }

    /// Wallet owning `token_account`, when the account exists.
    pub async fn token_account_owner(&self, token_account: &str) -> BridgeResult<Option<String>> {
        let owner = self.core.provider.token_account_owner(token_account).await?;
        debug!(
            "[qc-15] Token account {} owner: {:?}",
            token_account, owner
        );
        Ok(owner)
    }
}

#[async_trait]
impl TokenBridgeAdapter for SolanaAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
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
        self.core.provider.token_balance(asset, owner).await
    }

    async fn redeem(
        &self,
        vaa: &[u8],
        overrides: &TxOverrides,
        payer: Option<&str>,
    ) -> BridgeResult<PreparedTransaction> {
        let payer = payer
            .filter(|p| !p.is_empty())
            .ok_or_else(|| BridgeError::MissingPayer(self.core.chain.name.to_string()))?;
        let tx = self.core.redeem_call(vaa, overrides, |_| false)?;
        Ok(tx.with_sender(payer))
    }

    async fn is_transfer_completed(&self, vaa: &[u8]) -> BridgeResult<bool> {
        self.core.is_completed(vaa, CompletionKey::claim).await
    }

    async fn current_block(&self) -> BridgeResult<u64> {
        // slot
        self.core.provider.current_block().await
    }

    async fn fetch_token_decimals(&self, asset: &str) -> BridgeResult<u8> {
        self.core.provider.token_decimals(asset).await
    }

    fn relayer(&self) -> Option<&Arc<dyn RelayerContract>> {
        self.core.relayer.as_ref()
    }

    fn requires_payer(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransferKind, TransferPayload};
    use crate::ports::outbound::MockChainProvider;
    use crate::test_utils::{chain_config, signed_transfer_vaa, testnet_config};

    const WSOL: &str = "So11111111111111111111111111111111111111112";

    fn adapter() -> (SolanaAdapter, Arc<MockChainProvider>) {
        let provider = Arc::new(MockChainProvider::new());
        let chain = chain_config(&testnet_config(), "solana");
        (SolanaAdapter::new(chain, provider.clone(), None), provider)
    }

    fn vaa_bytes() -> (crate::domain::SignedVaa, Vec<u8>) {
        let transfer = TransferPayload {
            amount: U256::from(100u64),
            token_address: WireAddress([1; 32]),
            token_chain: ChainId(2),
            to: WireAddress([2; 32]),
            to_chain: ChainId(1),
            kind: TransferKind::Transfer { fee: U256::zero() },
        };
        let vaa = signed_transfer_vaa(ChainId(2), 11, &transfer);
        let bytes = vaa.to_bytes();
        (vaa, bytes)
    }

    #[tokio::test]
    async fn test_missing_token_account_is_none() {
        let (adapter, provider) = adapter();
        assert_eq!(adapter.token_balance(WSOL, "me").await.unwrap(), None);
        provider.set_token_balance(WSOL, "me", U256::zero());
        assert_eq!(
            adapter.token_balance(WSOL, "me").await.unwrap(),
            Some(U256::zero())
        );
    }

    #[tokio::test]
    async fn test_mint_round_trip() {
        let (adapter, _) = adapter();
        let wire = adapter.format_asset_address(WSOL).await.unwrap();
        assert_eq!(adapter.parse_asset_address(&wire).await.unwrap(), WSOL);
    }

    #[tokio::test]
    async fn test_redeem_requires_payer() {
        let (adapter, _) = adapter();
        let (_, bytes) = vaa_bytes();
        let overrides = TxOverrides::default();

        assert!(matches!(
            adapter.redeem(&bytes, &overrides, None).await,
            Err(BridgeError::MissingPayer(_))
        ));
        assert!(matches!(
            adapter.redeem(&bytes, &overrides, Some("")).await,
            Err(BridgeError::MissingPayer(_))
        ));

        let tx = adapter
            .redeem(&bytes, &overrides, Some("payer111"))
            .await
            .unwrap();
        assert_eq!(tx.sender.as_deref(), Some("payer111"));
    }

    #[tokio::test]
    async fn test_completion_uses_claim_key() {
        let (adapter, provider) = adapter();
        let (vaa, bytes) = vaa_bytes();

        provider.mark_completed(CompletionKey::digest(&vaa));
        assert!(!adapter.is_transfer_completed(&bytes).await.unwrap());

        provider.mark_completed(CompletionKey::claim(&vaa));
        assert!(adapter.is_transfer_completed(&bytes).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_account_owner() {
        let (adapter, provider) = adapter();
        provider.set_token_account_owner("ata111", "wallet111");
        assert_eq!(
            adapter.token_account_owner("ata111").await.unwrap(),
            Some("wallet111".to_string())
        );
        assert_eq!(adapter.token_account_owner("ata222").await.unwrap(), None);
    }

    #[test]
    fn test_requires_message_posting() {
        let (adapter, _) = adapter();
        assert!(adapter.requires_message_posting());
        assert!(adapter.requires_payer());
    }
}
