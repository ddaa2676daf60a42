//! # Outbound Ports
//!
//! Traits for external dependencies: chain RPC handles, relayer contracts,
//! wallets, the message poster and the token directory. Also the per-family
//! adapter contract the registry dispatches to.

use crate::config::{ChainConfig, TokenConfig};
use crate::domain::{
    BridgeError, BridgeResult, ChainFamily, ChainId, ChainName, ParsedTransfer,
    PreparedTransaction, SignedVaa, TokenId, TokenRef, TransferRequest, TxOverrides, WalletRole,
    WireAddress,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use primitive_types::U256;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// =============================================================================
// Chain adapter
// =============================================================================

/// Per-family token bridge adapter.
///
/// Adapters never sign. Every state-changing operation returns a
/// [`PreparedTransaction`] for the [`TransactionSigner`].
#[async_trait]
pub trait TokenBridgeAdapter: Send + Sync {
    /// Chain family served by this adapter.
    fn family(&self) -> ChainFamily;

    /// Chain configuration.
    fn chain(&self) -> &ChainConfig;

    /// Prepare a token transfer. Relay parameters require a relayer.
    async fn send(&self, request: &TransferRequest) -> BridgeResult<PreparedTransaction>;

    /// Prepare a transfer carrying an application payload.
    ///
    /// Fails with `UnsupportedOperation` when `request.relay` is set.
    async fn send_with_payload(
        &self,
        request: &TransferRequest,
        payload: Vec<u8>,
    ) -> BridgeResult<PreparedTransaction>;

    /// Display address to wire form.
    fn format_address(&self, address: &str) -> BridgeResult<WireAddress> {
        crate::domain::format_address(self.family(), address)
    }

    /// Wire address to display form.
    fn parse_address(&self, address: &WireAddress) -> String {
        crate::domain::parse_address(self.family(), address)
    }

    /// Asset id (contract, mint, coin type) to wire form.
    async fn format_asset_address(&self, asset: &str) -> BridgeResult<WireAddress>;

    /// Wire form back to an asset id native to this chain.
    async fn parse_asset_address(&self, address: &WireAddress) -> BridgeResult<String>;

    /// Local representation of a foreign token, `None` if never attested.
    async fn wrapped_asset(
        &self,
        origin_chain: ChainId,
        origin_address: &WireAddress,
    ) -> BridgeResult<Option<String>>;

    /// Transfers emitted by a transaction, in log order.
    async fn parse_message_from_tx(&self, tx: &str) -> BridgeResult<Vec<ParsedTransfer>>;

    /// Gas token balance in base units.
    async fn native_balance(&self, address: &str) -> BridgeResult<U256>;

    /// Token balance in base units, `None` when the owner has no account.
    async fn token_balance(&self, asset: &str, owner: &str) -> BridgeResult<Option<U256>>;

    /// Prepare a redeem of a signed VAA.
    async fn redeem(
        &self,
        vaa: &[u8],
        overrides: &TxOverrides,
        payer: Option<&str>,
    ) -> BridgeResult<PreparedTransaction>;

    /// Whether the VAA was already redeemed here.
    async fn is_transfer_completed(&self, vaa: &[u8]) -> BridgeResult<bool>;

    /// Block height, slot or checkpoint.
    async fn current_block(&self) -> BridgeResult<u64>;

    /// On-chain decimals of an asset.
    async fn fetch_token_decimals(&self, asset: &str) -> BridgeResult<u8>;

    /// Relayer handle, when one is deployed on this chain.
    fn relayer(&self) -> Option<&Arc<dyn RelayerContract>>;

    /// Whether automatic transfers can start here.
    fn supports_relay(&self) -> bool {
        self.relayer().is_some()
    }

    /// Whether redeem must be preceded by posting the VAA.
    fn requires_message_posting(&self) -> bool {
        self.family().requires_message_posting()
    }

    /// Whether redeem needs an explicit fee payer.
    fn requires_payer(&self) -> bool {
        false
    }
}

// =============================================================================
// Chain provider
// =============================================================================

/// Token bridge event decoded from a transaction receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeLog {
    /// Emitting contract.
    pub emitter_address: WireAddress,
    /// Emitter sequence.
    pub sequence: u64,
    /// Block / slot / checkpoint.
    pub block: u64,
    /// Transaction sender.
    pub sender: String,
    /// Raw transfer payload.
    pub payload: Vec<u8>,
    /// Fee paid by the transaction.
    pub gas_fee: Option<U256>,
}

/// Key under which a destination chain records a redeemed transfer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKey {
    /// Double Keccak-256 body digest (EVM, Sui, Aptos).
    Digest([u8; 32]),
    /// Emitter/sequence claim account (Solana).
    Claim {
        /// Source chain.
        emitter_chain: ChainId,
        /// Emitting contract.
        emitter_address: WireAddress,
        /// Emitter sequence.
        sequence: u64,
    },
}

impl CompletionKey {
    /// Digest key for a VAA.
    pub fn digest(vaa: &SignedVaa) -> Self {
        Self::Digest(vaa.digest())
    }

    /// Claim key for a VAA.
    pub fn claim(vaa: &SignedVaa) -> Self {
        Self::Claim {
            emitter_chain: vaa.emitter_chain,
            emitter_address: vaa.emitter_address,
            sequence: vaa.sequence,
        }
    }
}

/// Per-chain RPC handle - outbound port.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Latest block / slot / checkpoint.
    async fn current_block(&self) -> BridgeResult<u64>;

    /// Gas token balance.
    async fn native_balance(&self, address: &str) -> BridgeResult<U256>;

    /// Token balance, `None` when no token account exists.
    async fn token_balance(&self, asset: &str, owner: &str) -> BridgeResult<Option<U256>>;

    /// Decimals read from the token contract / mint / coin info.
    async fn token_decimals(&self, asset: &str) -> BridgeResult<u8>;

    /// Token bridge wrapped-asset lookup.
    async fn wrapped_asset(
        &self,
        token_bridge: &str,
        origin_chain: ChainId,
        origin_address: &WireAddress,
    ) -> BridgeResult<Option<String>>;

    /// Registered wire address of a local asset id.
    async fn asset_wire_address(&self, asset: &str) -> BridgeResult<Option<WireAddress>>;

    /// Local asset id registered under a wire address.
    async fn asset_from_wire(&self, address: &WireAddress) -> BridgeResult<Option<String>>;

    /// Token bridge events of a transaction.
    async fn bridge_logs(&self, token_bridge: &str, tx: &str) -> BridgeResult<Vec<BridgeLog>>;

    /// Whether the token bridge recorded the key as redeemed.
    async fn is_transfer_completed(
        &self,
        token_bridge: &str,
        key: &CompletionKey,
    ) -> BridgeResult<bool>;

    /// Fee quote for a prepared transaction, native base units.
    async fn estimate_fee(&self, tx: &PreparedTransaction) -> BridgeResult<U256>;

    /// Current gas price, native base units per gas unit.
    async fn gas_price(&self) -> BridgeResult<U256>;

    /// Owner of a Solana token account.
    async fn token_account_owner(&self, token_account: &str) -> BridgeResult<Option<String>>;
}

// =============================================================================
// Relayer, signer, poster, directory
// =============================================================================

/// Token bridge relayer views - outbound port.
#[async_trait]
pub trait RelayerContract: Send + Sync {
    /// Fee charged for relaying `asset` to `target_chain`, token base units.
    async fn relayer_fee(&self, target_chain: ChainId, asset: &str) -> BridgeResult<U256>;

    /// Largest amount of `asset` the relayer will swap into gas.
    async fn max_swap_amount_in(&self, asset: &str, wallet: &str) -> BridgeResult<U256>;

    /// Native gas received for swapping `amount` of `asset`.
    async fn native_swap_amount_out(
        &self,
        asset: &str,
        amount: U256,
        wallet: &str,
    ) -> BridgeResult<U256>;

    /// Whether the relayer accepts `asset`.
    async fn is_accepted_token(&self, asset: &str) -> BridgeResult<bool>;
}

/// Wallet collaborator - outbound port.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign and submit, returning the transaction id.
    ///
    /// Must fail rather than wait when no wallet is connected for `role`.
    async fn sign_and_send(
        &self,
        chain: &ChainName,
        tx: PreparedTransaction,
        role: WalletRole,
    ) -> BridgeResult<String>;
}

/// Posts a signed VAA to the core contract - outbound port.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    /// Post `vaa` through `core_contract`. Idempotent.
    async fn post_message(
        &self,
        connection: &dyn ChainProvider,
        core_contract: &str,
        vaa: &[u8],
    ) -> BridgeResult<()>;
}

/// Configured token metadata - outbound port.
pub trait TokenDirectory: Send + Sync {
    /// Token by key.
    fn get_token(&self, key: &str) -> BridgeResult<&TokenConfig>;

    /// Token by on-chain identity.
    fn get_token_by_id(&self, id: &TokenId) -> Option<&TokenConfig>;

    /// Decimals of `token` on the chain with id `chain`.
    fn get_token_decimals(&self, chain: ChainId, token: &TokenRef) -> BridgeResult<u8>;

    /// Token id of a key, following `wrapped_asset` for gas tokens.
    fn wrapped_token_id(&self, key: &str) -> BridgeResult<TokenId>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockProviderState {
    block: u64,
    native_balances: HashMap<String, U256>,
    token_balances: HashMap<(String, String), U256>,
    decimals: HashMap<String, u8>,
    wrapped: HashMap<(ChainId, WireAddress), String>,
    asset_wire: HashMap<String, WireAddress>,
    logs: HashMap<String, Vec<BridgeLog>>,
    completed: HashSet<CompletionKey>,
    fee: U256,
    gas_price: U256,
    token_owners: HashMap<String, String>,
    failure: Option<String>,
    calls: usize,
}

/// In-memory chain provider for testing.
#[derive(Default)]
pub struct MockChainProvider {
    state: RwLock<MockProviderState>,
}

impl MockChainProvider {
    /// Empty provider at block 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current block.
    pub fn set_block(&self, block: u64) {
        self.state.write().block = block;
    }

    /// Set a gas token balance.
    pub fn set_native_balance(&self, address: &str, balance: U256) {
        self.state
            .write()
            .native_balances
            .insert(address.to_string(), balance);
    }

    /// Create a token account with a balance.
    pub fn set_token_balance(&self, asset: &str, owner: &str, balance: U256) {
        self.state
            .write()
            .token_balances
            .insert((asset.to_ascii_lowercase(), owner.to_string()), balance);
    }

    /// Set on-chain decimals for an asset.
    pub fn set_decimals(&self, asset: &str, decimals: u8) {
        self.state
            .write()
            .decimals
            .insert(asset.to_ascii_lowercase(), decimals);
    }

    /// Register a wrapped asset.
    pub fn set_wrapped_asset(&self, origin_chain: ChainId, origin: WireAddress, local: &str) {
        self.state
            .write()
            .wrapped
            .insert((origin_chain, origin), local.to_string());
    }

    /// Register the wire address of a local asset id.
    pub fn set_asset_wire_address(&self, asset: &str, address: WireAddress) {
        self.state.write().asset_wire.insert(asset.to_string(), address);
    }

    /// Attach a bridge event to a transaction.
    pub fn add_bridge_log(&self, tx: &str, log: BridgeLog) {
        self.state
            .write()
            .logs
            .entry(tx.to_string())
            .or_default()
            .push(log);
    }

    /// Record a transfer as redeemed.
    pub fn mark_completed(&self, key: CompletionKey) {
        self.state.write().completed.insert(key);
    }

    /// Fee returned by `estimate_fee`.
    pub fn set_fee(&self, fee: U256) {
        self.state.write().fee = fee;
    }

    /// Gas price returned by `gas_price`.
    pub fn set_gas_price(&self, price: U256) {
        self.state.write().gas_price = price;
    }

    /// Register the owner of a token account.
    pub fn set_token_account_owner(&self, token_account: &str, owner: &str) {
        self.state
            .write()
            .token_owners
            .insert(token_account.to_string(), owner.to_string());
    }

    /// Make every subsequent call fail with a transport error.
    pub fn fail_with(&self, message: &str) {
        self.state.write().failure = Some(message.to_string());
    }

    /// Number of calls made against this provider.
    pub fn call_count(&self) -> usize {
        self.state.read().calls
    }

    fn enter(&self) -> BridgeResult<parking_lot::RwLockReadGuard<'_, MockProviderState>> {
        {
            let mut state = self.state.write();
            state.calls += 1;
            if let Some(msg) = &state.failure {
                return Err(BridgeError::Transport(msg.clone()));
            }
        }
        Ok(self.state.read())
    }
}

#[async_trait]
impl ChainProvider for MockChainProvider {
    async fn current_block(&self) -> BridgeResult<u64> {
        Ok(self.enter()?.block)
    }

    async fn native_balance(&self, address: &str) -> BridgeResult<U256> {
        let state = self.enter()?;
        Ok(state
            .native_balances
            .get(address)
            .copied()
            .unwrap_or_default())
    }

    async fn token_balance(&self, asset: &str, owner: &str) -> BridgeResult<Option<U256>> {
        let state = self.enter()?;
        Ok(state
            .token_balances
            .get(&(asset.to_ascii_lowercase(), owner.to_string()))
            .copied())
    }

    async fn token_decimals(&self, asset: &str) -> BridgeResult<u8> {
        let state = self.enter()?;
        state
            .decimals
            .get(&asset.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| BridgeError::Transport(format!("no token at {}", asset)))
    }

    async fn wrapped_asset(
        &self,
        _token_bridge: &str,
        origin_chain: ChainId,
        origin_address: &WireAddress,
    ) -> BridgeResult<Option<String>> {
        let state = self.enter()?;
        Ok(state.wrapped.get(&(origin_chain, *origin_address)).cloned())
    }

    async fn asset_wire_address(&self, asset: &str) -> BridgeResult<Option<WireAddress>> {
        Ok(self.enter()?.asset_wire.get(asset).copied())
    }

    async fn asset_from_wire(&self, address: &WireAddress) -> BridgeResult<Option<String>> {
        let state = self.enter()?;
        Ok(state
            .asset_wire
            .iter()
            .find(|(_, wire)| *wire == address)
            .map(|(asset, _)| asset.clone()))
    }

    async fn bridge_logs(&self, _token_bridge: &str, tx: &str) -> BridgeResult<Vec<BridgeLog>> {
        Ok(self.enter()?.logs.get(tx).cloned().unwrap_or_default())
    }

    async fn is_transfer_completed(
        &self,
        _token_bridge: &str,
        key: &CompletionKey,
    ) -> BridgeResult<bool> {
        Ok(self.enter()?.completed.contains(key))
    }

    async fn estimate_fee(&self, _tx: &PreparedTransaction) -> BridgeResult<U256> {
        Ok(self.enter()?.fee)
    }

    async fn gas_price(&self) -> BridgeResult<U256> {
        Ok(self.enter()?.gas_price)
    }

    async fn token_account_owner(&self, token_account: &str) -> BridgeResult<Option<String>> {
        Ok(self.enter()?.token_owners.get(token_account).cloned())
    }
}

/// Transaction received by [`MockSigner`].
#[derive(Clone, Debug)]
pub struct SubmittedTx {
    /// Target chain.
    pub chain: ChainName,
    /// The transaction.
    pub tx: PreparedTransaction,
    /// Wallet that signed.
    pub role: WalletRole,
}

#[derive(Default)]
struct MockSignerState {
    submitted: Vec<SubmittedTx>,
    disconnected: HashSet<WalletRole>,
    rejection: Option<String>,
}

/// Recording signer for testing. Both wallets start connected.
#[derive(Default)]
pub struct MockSigner {
    state: RwLock<MockSignerState>,
}

impl MockSigner {
    /// Signer with both wallets connected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disconnect the wallet for `role`.
    pub fn disconnect(&self, role: WalletRole) {
        self.state.write().disconnected.insert(role);
    }

    /// Reject every submission as the user would.
    pub fn reject_with(&self, message: &str) {
        self.state.write().rejection = Some(message.to_string());
    }

    /// Accepted submissions, in order.
    pub fn submitted(&self) -> Vec<SubmittedTx> {
        self.state.read().submitted.clone()
    }

    /// Number of accepted submissions.
    pub fn call_count(&self) -> usize {
        self.state.read().submitted.len()
    }
}

#[async_trait]
impl TransactionSigner for MockSigner {
    async fn sign_and_send(
        &self,
        chain: &ChainName,
        tx: PreparedTransaction,
        role: WalletRole,
    ) -> BridgeResult<String> {
        let mut state = self.state.write();
        if state.disconnected.contains(&role) {
            return Err(BridgeError::Transport(format!(
                "no {} wallet connected",
                role
            )));
        }
        if let Some(msg) = &state.rejection {
            return Err(BridgeError::Transport(msg.clone()));
        }
        state.submitted.push(SubmittedTx {
            chain: chain.clone(),
            tx,
            role,
        });
        Ok(format!("0x{:064x}", state.submitted.len()))
    }
}

/// Recording message poster for testing.
#[derive(Default)]
pub struct MockMessagePoster {
    posted: RwLock<Vec<(String, Vec<u8>)>>,
}

impl MockMessagePoster {
    /// Empty poster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct `(core_contract, vaa)` pairs posted.
    pub fn posted(&self) -> Vec<(String, Vec<u8>)> {
        self.posted.read().clone()
    }
}

#[async_trait]
impl MessagePoster for MockMessagePoster {
    async fn post_message(
        &self,
        _connection: &dyn ChainProvider,
        core_contract: &str,
        vaa: &[u8],
    ) -> BridgeResult<()> {
        let mut posted = self.posted.write();
        if !posted
            .iter()
            .any(|(core, bytes)| core == core_contract && bytes == vaa)
        {
            posted.push((core_contract.to_string(), vaa.to_vec()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct MockRelayerState {
    fee: U256,
    max_swap: U256,
    // native out = amount * rate / 10^8
    swap_rate: U256,
    accepted: HashSet<String>,
    calls: usize,
}

/// Relayer views for testing.
#[derive(Default)]
pub struct MockRelayer {
    state: RwLock<MockRelayerState>,
}

impl MockRelayer {
    /// Relayer that accepts nothing and charges nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relayer fee.
    pub fn set_fee(&self, fee: U256) {
        self.state.write().fee = fee;
    }

    /// Set the max swap amount.
    pub fn set_max_swap(&self, amount: U256) {
        self.state.write().max_swap = amount;
    }

    /// Set the swap rate, scaled by 10^8.
    pub fn set_swap_rate(&self, rate: U256) {
        self.state.write().swap_rate = rate;
    }

    /// Accept a token.
    pub fn accept(&self, asset: &str) {
        self.state
            .write()
            .accepted
            .insert(asset.to_ascii_lowercase());
    }

    /// Number of calls made against this relayer.
    pub fn call_count(&self) -> usize {
        self.state.read().calls
    }
}

#[async_trait]
impl RelayerContract for MockRelayer {
    async fn relayer_fee(&self, _target_chain: ChainId, _asset: &str) -> BridgeResult<U256> {
        let mut state = self.state.write();
        state.calls += 1;
        Ok(state.fee)
    }

    async fn max_swap_amount_in(&self, _asset: &str, _wallet: &str) -> BridgeResult<U256> {
        let mut state = self.state.write();
        state.calls += 1;
        Ok(state.max_swap)
    }

    async fn native_swap_amount_out(
        &self,
        _asset: &str,
        amount: U256,
        _wallet: &str,
    ) -> BridgeResult<U256> {
        let mut state = self.state.write();
        state.calls += 1;
        let out = amount
            .checked_mul(state.swap_rate)
            .map(|v| v / U256::from(100_000_000u64))
            .ok_or_else(|| BridgeError::precision(&amount.to_string(), "swap overflow"))?;
        Ok(out)
    }

    async fn is_accepted_token(&self, asset: &str) -> BridgeResult<bool> {
        let mut state = self.state.write();
        state.calls += 1;
        Ok(state.accepted.contains(&asset.to_ascii_lowercase()))
    }
}
