//! # Adapters Layer (Hexagonal Architecture)
//!
//! One [`TokenBridgeAdapter`](crate::ports::TokenBridgeAdapter) per chain
//! family plus the config-backed token directory.
//!
//! The families share [`BridgeCore`]: call preparation, relayer routing,
//! log decoding and completion lookups. What differs per family (asset ids,
//! balance semantics, payer handling, completion key) lives in the family
//! module.

mod aptos;
mod evm;
mod solana;
mod sui;
mod token_directory;

pub use aptos::AptosAdapter;
pub use evm::EvmAdapter;
pub use solana::SolanaAdapter;
pub use sui::SuiAdapter;
pub use token_directory::ConfiguredTokenDirectory;

use crate::config::ChainConfig;
use crate::domain::{
    format_address, BridgeCall, BridgeError, BridgeResult, ParsedTransfer, PreparedTransaction,
    SignedVaa, TransferPayload, TransferRequest, TxOverrides, PAYLOAD_TRANSFER,
    PAYLOAD_TRANSFER_WITH_PAYLOAD,
};
use crate::ports::outbound::{ChainProvider, CompletionKey, RelayerContract};
use primitive_types::U256;
use std::sync::Arc;
use tracing::debug;

/// State and behaviour shared by every family adapter.
pub(crate) struct BridgeCore {
    pub(crate) chain: ChainConfig,
    pub(crate) provider: Arc<dyn ChainProvider>,
    pub(crate) relayer: Option<Arc<dyn RelayerContract>>,
}

impl BridgeCore {
    pub(crate) fn new(
        chain: ChainConfig,
        provider: Arc<dyn ChainProvider>,
        relayer: Option<Arc<dyn RelayerContract>>,
    ) -> Self {
        Self {
            chain,
            provider,
            relayer,
        }
    }

    pub(crate) fn token_bridge(&self) -> &str {
        &self.chain.contracts.token_bridge
    }

    fn relayer_address(&self) -> BridgeResult<&str> {
        self.chain
            .contracts
            .relayer
            .as_deref()
            .ok_or_else(|| BridgeError::ContractNotFound {
                chain: self.chain.name.to_string(),
                contract: "relayer",
            })
    }

    fn prepare(&self, contract: &str, call: BridgeCall) -> PreparedTransaction {
        let tx = PreparedTransaction::new(
            self.chain.name.clone(),
            self.chain.family,
            contract.to_string(),
            call,
        );
        debug!(
            "[qc-15] Prepared {} on {} (id={})",
            tx.call.method(),
            self.chain.name,
            tx.id
        );
        tx
    }

    fn check_source(&self, request: &TransferRequest) -> BridgeResult<()> {
        if request.source_chain != self.chain.name {
            return Err(BridgeError::ChainMismatch {
                expected: self.chain.name.to_string(),
                actual: request.source_chain.to_string(),
            });
        }
        Ok(())
    }

    /// Plain or relayed transfer, chosen by `request.relay`.
    pub(crate) fn transfer_call(&self, request: &TransferRequest) -> BridgeResult<PreparedTransaction> {
        self.check_source(request)?;

        let tx = match &request.relay {
            None => self.prepare(
                self.token_bridge(),
                BridgeCall::Transfer {
                    asset: request.asset.clone(),
                    amount: request.amount,
                    recipient_chain: request.recipient_chain,
                    recipient: request.recipient,
                    arbiter_fee: U256::zero(),
                    nonce: rand::random(),
                },
            ),
            Some(relay) => {
                if self.relayer.is_none() {
                    return Err(BridgeError::UnsupportedOperation(format!(
                        "send with relay not supported on {}",
                        self.chain.name
                    )));
                }
                let relayer = self.relayer_address()?;
                self.prepare(
                    relayer,
                    BridgeCall::TransferWithRelay {
                        relayer: relayer.to_string(),
                        asset: request.asset.clone(),
                        amount: request.amount,
                        to_native_token_amount: relay.to_native_token_amount,
                        recipient_chain: request.recipient_chain,
                        recipient: request.recipient,
                        batch_id: 0,
                    },
                )
            }
        };

        Ok(tx.with_sender(request.sender.clone()))
    }

    /// Transfer with an application payload. Never relayed.
    pub(crate) fn transfer_with_payload_call(
        &self,
        request: &TransferRequest,
        payload: Vec<u8>,
    ) -> BridgeResult<PreparedTransaction> {
        self.check_source(request)?;
        if request.relay.is_some() {
            return Err(BridgeError::UnsupportedOperation(
                "relayed transfers cannot carry a custom payload".to_string(),
            ));
        }

        let tx = self.prepare(
            self.token_bridge(),
            BridgeCall::TransferWithPayload {
                asset: request.asset.clone(),
                amount: request.amount,
                recipient_chain: request.recipient_chain,
                recipient: request.recipient,
                payload,
                nonce: rand::random(),
            },
        );
        Ok(tx.with_sender(request.sender.clone()))
    }

    /// Relayer address, when `transfer` is a payload-3 transfer addressed to it.
    fn relay_target(&self, transfer: &TransferPayload) -> Option<String> {
        if transfer.payload_id() != PAYLOAD_TRANSFER_WITH_PAYLOAD {
            return None;
        }
        let relayer = self.chain.contracts.relayer.as_ref()?;
        let wire = format_address(self.chain.family, relayer).ok()?;
        (wire == transfer.to).then(|| relayer.clone())
    }

    /// Redeem through the relayer for relayed transfers, else the token bridge.
    pub(crate) fn redeem_call<F>(
        &self,
        vaa: &[u8],
        overrides: &TxOverrides,
        unwrap_native: F,
    ) -> BridgeResult<PreparedTransaction>
    where
        F: FnOnce(&TransferPayload) -> bool,
    {
        let parsed = SignedVaa::parse(vaa)?;
        let transfer = parsed.transfer_payload()?;

        let tx = match self.relay_target(&transfer) {
            Some(relayer) => self.prepare(
                &relayer,
                BridgeCall::RedeemWithRelay {
                    relayer: relayer.clone(),
                    vaa: vaa.to_vec(),
                },
            ),
            None => self.prepare(
                self.token_bridge(),
                BridgeCall::Redeem {
                    vaa: vaa.to_vec(),
                    unwrap_native: unwrap_native(&transfer),
                },
            ),
        };
        Ok(tx.with_overrides(*overrides))
    }

    /// Decode every token transfer event of `tx`.
    ///
    /// Other token bridge events (asset attestations, upgrades) are skipped.
    pub(crate) async fn parse_logs(&self, tx: &str) -> BridgeResult<Vec<ParsedTransfer>> {
        let logs = self.provider.bridge_logs(self.token_bridge(), tx).await?;
        debug!(
            "[qc-15] {} bridge log(s) in {} on {}",
            logs.len(),
            tx,
            self.chain.name
        );

        logs.into_iter()
            .filter(|log| match log.payload.first() {
                Some(&id) => id == PAYLOAD_TRANSFER || id == PAYLOAD_TRANSFER_WITH_PAYLOAD,
                None => true,
            })
            .map(|log| {
                Ok(ParsedTransfer {
                    send_tx: tx.to_string(),
                    sender: log.sender,
                    from_chain: self.chain.name.clone(),
                    emitter_address: log.emitter_address,
                    sequence: log.sequence,
                    block: log.block,
                    gas_fee: log.gas_fee,
                    transfer: TransferPayload::decode(&log.payload)?,
                })
            })
            .collect()
    }

    pub(crate) async fn is_completed(
        &self,
        vaa: &[u8],
        key: fn(&SignedVaa) -> CompletionKey,
    ) -> BridgeResult<bool> {
        let parsed = SignedVaa::parse(vaa)?;
        self.provider
            .is_transfer_completed(self.token_bridge(), &key(&parsed))
            .await
    }
}
