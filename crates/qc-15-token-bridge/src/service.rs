//! Token Bridge Service - transfer orchestration
//!
//! Drives the two-phase protocol: send on the source chain, redeem the
//! signed VAA on the destination chain. The service keeps no transfer
//! state; every call re-reads the chains it needs.

use crate::domain::{
    parse_units, BridgeError, BridgeResult, ChainRef, PaymentOption, PreparedTransaction,
    RelayParams, SignedVaa, SourceAsset, TokenId, TokenRef, TransferMessage, TransferParams,
    TransferRequest, TransferState, TxOverrides, WalletRole, WireAddress,
};
use crate::fees;
use crate::parser::MessageParser;
use crate::ports::inbound::TokenBridgeApi;
use crate::ports::outbound::{MessagePoster, RelayerContract, TokenDirectory, TransactionSigner};
use crate::registry::{ChainContext, ContextRegistry};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Token Bridge Service implementation
pub struct TokenBridgeService<S, D, M>
where
    S: TransactionSigner,
    D: TokenDirectory,
    M: MessagePoster,
{
    registry: Arc<ContextRegistry>,
    signer: Arc<S>,
    directory: Arc<D>,
    poster: Arc<M>,
}

impl<S, D, M> TokenBridgeService<S, D, M>
where
    S: TransactionSigner,
    D: TokenDirectory,
    M: MessagePoster,
{
    /// Create a new service over a built registry.
    pub fn new(
        registry: Arc<ContextRegistry>,
        signer: Arc<S>,
        directory: Arc<D>,
        poster: Arc<M>,
    ) -> Self {
        Self {
            registry,
            signer,
            directory,
            poster,
        }
    }

    /// The chain registry.
    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    /// Build the source transaction for `params` without submitting it.
    ///
    /// Amount conversion and the relayer check run before any chain call.
    pub async fn prepare_send(
        &self,
        params: &TransferParams,
    ) -> BridgeResult<(&ChainContext, PreparedTransaction)> {
        let source = self.registry.resolve(params.from_chain.clone())?;
        let dest = self.registry.resolve(params.to_chain.clone())?;

        let decimals = self
            .directory
            .get_token_decimals(source.chain_id(), &params.token)?;
        let amount = parse_units(&params.amount, decimals)?;

        let relay = match params.payment {
            PaymentOption::Manual => None,
            PaymentOption::Automatic => {
                if !source.adapter().supports_relay() {
                    warn!(
                        "[qc-15] Rejected automatic transfer from {}: no relayer",
                        source.chain_name()
                    );
                    return Err(BridgeError::UnsupportedOperation(format!(
                        "automatic transfers are not supported from {}",
                        source.chain_name()
                    )));
                }
                let native = params.to_native_token.as_deref().unwrap_or("0");
                Some(RelayParams {
                    to_native_token_amount: parse_units(native, decimals)?,
                })
            }
        };

        let recipient = dest.adapter().format_address(&params.to_address)?;
        let asset = match &params.token {
            TokenRef::Native => SourceAsset::Native,
            TokenRef::Token(id) => SourceAsset::Token(
                self.registry
                    .must_get_foreign_asset(id, source.chain_name())
                    .await?,
            ),
        };

        let request = TransferRequest {
            asset,
            amount,
            source_chain: source.chain_name().clone(),
            sender: params.from_address.clone(),
            recipient_chain: dest.chain_id(),
            recipient,
            relay,
        };
        let tx = source.adapter().send(&request).await?;
        Ok((source, tx))
    }

    fn relayer_context(
        &self,
        chain: ChainRef,
    ) -> BridgeResult<(&ChainContext, &Arc<dyn RelayerContract>)> {
        let context = self.registry.resolve(chain)?;
        let relayer = context.adapter().relayer().ok_or_else(|| {
            BridgeError::UnsupportedOperation(format!("no relayer on {}", context.chain_name()))
        })?;
        Ok((context, relayer))
    }
}

#[async_trait]
impl<S, D, M> TokenBridgeApi for TokenBridgeService<S, D, M>
where
    S: TransactionSigner,
    D: TokenDirectory,
    M: MessagePoster,
{
    async fn send_transfer(&self, params: TransferParams) -> BridgeResult<String> {
        let (source, tx) = self.prepare_send(&params).await?;
        let method = tx.call.method();
        let id = tx.id;

        let tx_id = self
            .signer
            .sign_and_send(source.chain_name(), tx, WalletRole::Sending)
            .await?;

        info!(
            "[qc-15] Sent {} {} from {} to {} ({:?}): tx={} id={}",
            params.amount,
            method,
            source.chain_name(),
            params.to_chain,
            params.payment,
            tx_id,
            id
        );
        Ok(tx_id)
    }

    async fn claim_transfer(
        &self,
        dest: ChainRef,
        signed_vaa: &[u8],
        payer: &str,
    ) -> BridgeResult<String> {
        let context = self.registry.resolve(dest)?;
        let vaa = SignedVaa::parse(signed_vaa)?;
        let transfer = vaa.transfer_payload()?;
        if transfer.to_chain != context.chain_id() {
            return Err(BridgeError::ChainMismatch {
                expected: context.chain_id().to_string(),
                actual: transfer.to_chain.to_string(),
            });
        }

        let payer = Some(payer).filter(|p| !p.is_empty());
        if payer.is_none() && context.adapter().requires_payer() {
            return Err(BridgeError::MissingPayer(context.chain_name().to_string()));
        }

        if context.adapter().requires_message_posting() {
            let core = context.config().contracts.core.as_deref().ok_or_else(|| {
                BridgeError::ContractNotFound {
                    chain: context.chain_name().to_string(),
                    contract: "core",
                }
            })?;
            debug!(
                "[qc-15] Posting VAA seq={} to {} core {}",
                vaa.sequence,
                context.chain_name(),
                core
            );
            self.poster
                .post_message(context.connection().as_ref(), core, signed_vaa)
                .await?;
        }

        let overrides = TxOverrides {
            gas_limit: Some(self.registry.claim_gas_limit()),
        };
        let tx = context
            .adapter()
            .redeem(signed_vaa, &overrides, payer)
            .await?;
        let method = tx.call.method();

        let tx_id = self
            .signer
            .sign_and_send(context.chain_name(), tx, WalletRole::Receiving)
            .await?;

        info!(
            "[qc-15] Claimed seq={} from chain {} on {} via {}: tx={}",
            vaa.sequence,
            vaa.emitter_chain,
            context.chain_name(),
            method,
            tx_id
        );
        Ok(tx_id)
    }

    async fn get_transfer_complete(
        &self,
        dest: ChainRef,
        signed_vaa: &[u8],
    ) -> BridgeResult<bool> {
        self.registry
            .resolve(dest)?
            .adapter()
            .is_transfer_completed(signed_vaa)
            .await
    }

    async fn transfer_state(
        &self,
        dest: ChainRef,
        signed_vaa: &[u8],
    ) -> BridgeResult<TransferState> {
        if self.get_transfer_complete(dest, signed_vaa).await? {
            Ok(TransferState::Completed)
        } else {
            Ok(TransferState::Attested)
        }
    }

    async fn parse_message_from_tx(
        &self,
        tx: &str,
        chain: ChainRef,
    ) -> BridgeResult<TransferMessage> {
        MessageParser::new(&self.registry, self.directory.as_ref())
            .parse(tx, chain)
            .await
    }

    async fn estimate_send_gas_fee(&self, params: &TransferParams) -> BridgeResult<String> {
        let (source, tx) = self.prepare_send(params).await?;
        fees::estimate_send(source, &tx).await
    }

    async fn estimate_claim_gas_fee(
        &self,
        dest: ChainRef,
        payment: PaymentOption,
    ) -> BridgeResult<String> {
        let context = self.registry.resolve(dest)?;
        fees::estimate_claim(context, payment, self.registry.claim_gas_limit()).await
    }

    async fn get_balance(
        &self,
        wallet: &str,
        token: &TokenId,
        chain: ChainRef,
    ) -> BridgeResult<Option<U256>> {
        let context = self.registry.resolve(chain)?;
        let asset = match self
            .registry
            .get_foreign_asset(token, context.chain_name())
            .await?
        {
            Some(asset) => asset,
            None => {
                debug!(
                    "[qc-15] {} not attested on {}",
                    token,
                    context.chain_name()
                );
                return Ok(None);
            }
        };
        context.adapter().token_balance(&asset, wallet).await
    }

    async fn get_native_balance(&self, wallet: &str, chain: ChainRef) -> BridgeResult<U256> {
        self.registry
            .resolve(chain)?
            .adapter()
            .native_balance(wallet)
            .await
    }

    async fn get_foreign_asset(
        &self,
        token: &TokenId,
        chain: ChainRef,
    ) -> BridgeResult<Option<String>> {
        self.registry.get_foreign_asset(token, chain).await
    }

    async fn calculate_max_swap_amount(
        &self,
        dest: ChainRef,
        token: &TokenId,
        wallet: &str,
    ) -> BridgeResult<Option<U256>> {
        let context = self.registry.resolve(dest)?;
        let Some(relayer) = context.adapter().relayer() else {
            return Ok(None);
        };
        let asset = self
            .registry
            .must_get_foreign_asset(token, context.chain_name())
            .await?;
        relayer.max_swap_amount_in(&asset, wallet).await.map(Some)
    }

    async fn calculate_native_token_amt(
        &self,
        dest: ChainRef,
        token: &TokenId,
        amount: U256,
        wallet: &str,
    ) -> BridgeResult<U256> {
        let (context, relayer) = self.relayer_context(dest)?;
        let asset = self
            .registry
            .must_get_foreign_asset(token, context.chain_name())
            .await?;
        relayer.native_swap_amount_out(&asset, amount, wallet).await
    }

    async fn is_accepted_token(&self, token: &TokenId) -> BridgeResult<bool> {
        let context = self.registry.resolve(&token.chain)?;
        match context.adapter().relayer() {
            Some(relayer) => relayer.is_accepted_token(&token.address).await,
            None => Ok(false),
        }
    }

    async fn get_relayer_fee(
        &self,
        source: ChainRef,
        dest: ChainRef,
        token_key: &str,
    ) -> BridgeResult<U256> {
        let token = self.directory.wrapped_token_id(token_key)?;
        let (context, relayer) = self.relayer_context(source)?;
        let dest_id = self.registry.to_chain_id(dest)?;
        let asset = self
            .registry
            .must_get_foreign_asset(&token, context.chain_name())
            .await?;
        relayer.relayer_fee(dest_id, &asset).await
    }

    async fn get_current_block(&self, chain: ChainRef) -> BridgeResult<u64> {
        self.registry.resolve(chain)?.adapter().current_block().await
    }

    async fn fetch_token_decimals(&self, token: &TokenId, chain: ChainRef) -> BridgeResult<u8> {
        self.registry.fetch_token_decimals(token, chain).await
    }

    fn format_address(&self, chain: ChainRef, address: &str) -> BridgeResult<WireAddress> {
        self.registry.resolve(chain)?.adapter().format_address(address)
    }

    fn parse_address(&self, chain: ChainRef, address: &WireAddress) -> BridgeResult<String> {
        Ok(self.registry.resolve(chain)?.adapter().parse_address(address))
    }

    async fn format_asset_address(
        &self,
        chain: ChainRef,
        asset: &str,
    ) -> BridgeResult<WireAddress> {
        self.registry
            .resolve(chain)?
            .adapter()
            .format_asset_address(asset)
            .await
    }
}
