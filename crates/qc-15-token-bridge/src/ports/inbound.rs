//! # Inbound Ports
//!
//! API trait defining what the token bridge subsystem can do.

use crate::domain::{
    BridgeResult, ChainRef, PaymentOption, TokenId, TransferMessage, TransferParams,
    TransferState, WireAddress,
};
use async_trait::async_trait;
use primitive_types::U256;

/// Token bridge API - inbound port.
///
/// Every chain argument accepts either a chain id or a chain name.
#[async_trait]
pub trait TokenBridgeApi: Send + Sync {
    /// Send tokens from `params.from_chain`, returning the source tx id.
    async fn send_transfer(&self, params: TransferParams) -> BridgeResult<String>;

    /// Redeem a signed VAA on `dest`, returning the destination tx id.
    async fn claim_transfer(
        &self,
        dest: ChainRef,
        signed_vaa: &[u8],
        payer: &str,
    ) -> BridgeResult<String>;

    /// Whether the VAA was redeemed on `dest`.
    async fn get_transfer_complete(&self, dest: ChainRef, signed_vaa: &[u8])
        -> BridgeResult<bool>;

    /// `Completed` when redeemed, otherwise `Attested`.
    async fn transfer_state(&self, dest: ChainRef, signed_vaa: &[u8])
        -> BridgeResult<TransferState>;

    /// First transfer emitted by `tx` on `chain`.
    async fn parse_message_from_tx(&self, tx: &str, chain: ChainRef)
        -> BridgeResult<TransferMessage>;

    /// Source-chain fee for a transfer, native units as a decimal string.
    async fn estimate_send_gas_fee(&self, params: &TransferParams) -> BridgeResult<String>;

    /// Destination-chain fee for redeeming, native units as a decimal string.
    async fn estimate_claim_gas_fee(
        &self,
        dest: ChainRef,
        payment: PaymentOption,
    ) -> BridgeResult<String>;

    /// Token balance on `chain`; `None` when the token is not there.
    async fn get_balance(
        &self,
        wallet: &str,
        token: &TokenId,
        chain: ChainRef,
    ) -> BridgeResult<Option<U256>>;

    /// Gas token balance on `chain`.
    async fn get_native_balance(&self, wallet: &str, chain: ChainRef) -> BridgeResult<U256>;

    /// Representation of `token` on `chain`, `None` if never attested.
    async fn get_foreign_asset(&self, token: &TokenId, chain: ChainRef)
        -> BridgeResult<Option<String>>;

    /// Max amount of `token` the destination relayer swaps into gas.
    ///
    /// `None` when `dest` has no relayer.
    async fn calculate_max_swap_amount(
        &self,
        dest: ChainRef,
        token: &TokenId,
        wallet: &str,
    ) -> BridgeResult<Option<U256>>;

    /// Native gas received on `dest` for swapping `amount` of `token`.
    async fn calculate_native_token_amt(
        &self,
        dest: ChainRef,
        token: &TokenId,
        amount: U256,
        wallet: &str,
    ) -> BridgeResult<U256>;

    /// Whether the relayer on the token's native chain accepts it.
    async fn is_accepted_token(&self, token: &TokenId) -> BridgeResult<bool>;

    /// Relayer fee for sending the token keyed `token_key`.
    async fn get_relayer_fee(
        &self,
        source: ChainRef,
        dest: ChainRef,
        token_key: &str,
    ) -> BridgeResult<U256>;

    /// Block height, slot or checkpoint of `chain`.
    async fn get_current_block(&self, chain: ChainRef) -> BridgeResult<u64>;

    /// On-chain decimals of `token`'s representation on `chain`.
    async fn fetch_token_decimals(&self, token: &TokenId, chain: ChainRef) -> BridgeResult<u8>;

    /// Display address to wire form.
    fn format_address(&self, chain: ChainRef, address: &str) -> BridgeResult<WireAddress>;

    /// Wire address to display form.
    fn parse_address(&self, chain: ChainRef, address: &WireAddress) -> BridgeResult<String>;

    /// Asset id to wire form.
    async fn format_asset_address(&self, chain: ChainRef, asset: &str)
        -> BridgeResult<WireAddress>;
}
