//! # Message Parser
//!
//! Turns the raw transfer found in a source transaction into a
//! [`TransferMessage`] with chain-native addresses and token metadata.
//!
//! Amounts on the wire carry 8 decimals; parsed messages report them in the
//! token's decimals on the source chain.

use crate::domain::{
    from_normalized, BridgeError, BridgeResult, ChainRef, ParsedMessage, ParsedRelayerMessage,
    TokenId, TransferKind, TransferMessage,
};
use crate::ports::outbound::TokenDirectory;
use crate::registry::ContextRegistry;
use tracing::debug;

/// Parses token bridge transfers out of source transactions.
pub struct MessageParser<'a, D: TokenDirectory + ?Sized> {
    registry: &'a ContextRegistry,
    directory: &'a D,
}

impl<'a, D: TokenDirectory + ?Sized> MessageParser<'a, D> {
    /// Parser over a registry and token directory.
    pub fn new(registry: &'a ContextRegistry, directory: &'a D) -> Self {
        Self {
            registry,
            directory,
        }
    }

    /// First transfer emitted by `tx` on `chain`.
    pub async fn parse(&self, tx: &str, chain: ChainRef) -> BridgeResult<TransferMessage> {
        let source = self.registry.resolve(chain)?;
        let parsed = source
            .adapter()
            .parse_message_from_tx(tx)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::MessageNotFound(tx.to_string()))?;
        let transfer = &parsed.transfer;

        let token_context = self.registry.resolve(transfer.token_chain)?;
        let token_address = token_context
            .adapter()
            .parse_asset_address(&transfer.token_address)
            .await?;
        let token_id = TokenId::new(token_context.chain_name().clone(), token_address.clone());
        let token = self.directory.get_token_by_id(&token_id);

        let decimals = match token {
            Some(config) => config.decimals_for(source.family()),
            None => {
                self.registry
                    .fetch_token_decimals(&token_id, source.chain_name())
                    .await?
            }
        };

        let to_context = self.registry.resolve(transfer.to_chain)?;
        let mut recipient = to_context.adapter().parse_address(&transfer.to);
        if let Some(solana) = to_context.as_solana() {
            // Solana transfers land in a token account; report its owner.
            if let Some(owner) = solana.token_account_owner(&recipient).await? {
                recipient = owner;
            }
        }

        debug!(
            "[qc-15] Parsed transfer {} seq={} payload={} token={}",
            tx,
            parsed.sequence,
            transfer.payload_id(),
            token_id
        );

        let base = ParsedMessage {
            send_tx: parsed.send_tx.clone(),
            sender: parsed.sender.clone(),
            amount: from_normalized(transfer.amount, decimals)?.to_string(),
            payload_id: transfer.payload_id(),
            recipient,
            to_chain: to_context.chain_name().clone(),
            from_chain: parsed.from_chain.clone(),
            token_address,
            token_chain: token_context.chain_name().clone(),
            token_id,
            token_key: token.map(|t| t.key.clone()),
            token_decimals: decimals,
            emitter_address: parsed.emitter_address.to_hex(),
            sequence: parsed.sequence.to_string(),
            block: parsed.block,
            gas_fee: parsed.gas_fee.map(|fee| fee.to_string()),
            payload: transfer.inner_payload().map(hex::encode),
        };

        match &transfer.kind {
            TransferKind::Transfer { .. } => Ok(TransferMessage::Manual(base)),
            TransferKind::WithPayload { .. } => {
                let relayer = transfer.relayer_payload()?;
                Ok(TransferMessage::Relayer(ParsedRelayerMessage {
                    base,
                    relayer_payload_id: relayer.payload_id,
                    to: to_context.adapter().parse_address(&relayer.target_recipient),
                    relayer_fee: from_normalized(relayer.target_relayer_fee, decimals)?
                        .to_string(),
                    to_native_token_amount: from_normalized(
                        relayer.to_native_token_amount,
                        decimals,
                    )?
                    .to_string(),
                }))
            }
        }
    }
}
