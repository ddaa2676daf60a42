//! # Fee Estimator
//!
//! Per-family gas models for the source transfer and the destination redeem.
//! Quotes never sign or submit anything. Results are decimal strings in the
//! chain's native units (ETH, SOL, SUI, APT).
//!
//! | Family | Send | Claim (manual) |
//! |--------|------|----------------|
//! | EVM | provider quote | gas price x claim gas limit |
//! | Solana | 5 000 lamports per signature | 5 000 lamports x 5 signatures |
//! | Sui | provider quote | gas price x 20 000 units |
//! | Aptos | provider quote | gas price x 10 000 units |
//!
//! Automatic claims cost the user nothing on the destination chain.

use crate::domain::{format_units, BridgeResult, ChainFamily, PaymentOption, PreparedTransaction};
use crate::registry::ChainContext;
use primitive_types::U256;
use tracing::debug;

/// Solana base fee per transaction signature.
pub const SOLANA_LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Signatures in a Solana redeem: post VAA, verify signatures, complete transfer.
pub const SOLANA_CLAIM_SIGNATURES: u64 = 5;

/// Gas units budgeted for a Sui redeem.
pub const SUI_CLAIM_GAS_UNITS: u64 = 20_000;

/// Gas units budgeted for an Aptos redeem.
pub const APTOS_CLAIM_GAS_UNITS: u64 = 10_000;

/// Source-chain fee for sending `tx`.
pub async fn estimate_send(
    context: &ChainContext,
    tx: &PreparedTransaction,
) -> BridgeResult<String> {
    let family = context.family();
    let fee = match family {
        ChainFamily::Solana => U256::from(SOLANA_LAMPORTS_PER_SIGNATURE),
        ChainFamily::Evm | ChainFamily::Sui | ChainFamily::Aptos => {
            context.connection().estimate_fee(tx).await?
        }
    };

    debug!(
        "[qc-15] Send fee on {}: {} base units ({})",
        context.chain_name(),
        fee,
        tx.call.method()
    );
    Ok(format_units(fee, family.native_decimals()))
}

/// Destination-chain fee for redeeming with `payment`.
pub async fn estimate_claim(
    context: &ChainContext,
    payment: PaymentOption,
    claim_gas_limit: u64,
) -> BridgeResult<String> {
    let family = context.family();
    if payment == PaymentOption::Automatic {
        return Ok(format_units(U256::zero(), family.native_decimals()));
    }

    let fee = match family {
        ChainFamily::Solana => {
            U256::from(SOLANA_LAMPORTS_PER_SIGNATURE) * U256::from(SOLANA_CLAIM_SIGNATURES)
        }
        ChainFamily::Evm => gas_cost(context, claim_gas_limit).await?,
        ChainFamily::Sui => gas_cost(context, SUI_CLAIM_GAS_UNITS).await?,
        ChainFamily::Aptos => gas_cost(context, APTOS_CLAIM_GAS_UNITS).await?,
    };

    debug!(
        "[qc-15] Claim fee on {}: {} base units",
        context.chain_name(),
        fee
    );
    Ok(format_units(fee, family.native_decimals()))
}

async fn gas_cost(context: &ChainContext, units: u64) -> BridgeResult<U256> {
    let price = context.connection().gas_price().await?;
    Ok(price.saturating_mul(U256::from(units)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BridgeCall;
    use crate::test_utils::MockChains;

    fn dummy_tx(context: &ChainContext) -> PreparedTransaction {
        PreparedTransaction::new(
            context.chain_name().clone(),
            context.family(),
            context.config().contracts.token_bridge.clone(),
            BridgeCall::Redeem {
                vaa: vec![],
                unwrap_native: false,
            },
        )
    }

    #[tokio::test]
    async fn test_evm_send_uses_provider_quote() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        let goerli = registry.resolve("goerli").unwrap();
        chains
            .provider("goerli")
            .set_fee(U256::from(2_100_000_000_000_000u64));

        let fee = estimate_send(goerli, &dummy_tx(goerli)).await.unwrap();
        assert_eq!(fee, "0.0021");
    }

    #[tokio::test]
    async fn test_solana_send_is_constant() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        let solana = registry.resolve("solana").unwrap();

        let fee = estimate_send(solana, &dummy_tx(solana)).await.unwrap();
        assert_eq!(fee, "0.000005");
        assert_eq!(chains.provider("solana").call_count(), 0);
    }

    #[tokio::test]
    async fn test_evm_claim_uses_gas_limit() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        let fuji = registry.resolve("fuji").unwrap();
        chains
            .provider("fuji")
            .set_gas_price(U256::from(25_000_000_000u64));

        let fee = estimate_claim(fuji, PaymentOption::Manual, 250_000)
            .await
            .unwrap();
        assert_eq!(fee, "0.00625");
    }

    #[tokio::test]
    async fn test_move_claims_use_unit_budgets() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        chains.provider("sui").set_gas_price(U256::from(1_000u64));
        chains.provider("aptos").set_gas_price(U256::from(100u64));

        let sui = estimate_claim(registry.resolve("sui").unwrap(), PaymentOption::Manual, 0)
            .await
            .unwrap();
        let aptos = estimate_claim(registry.resolve("aptos").unwrap(), PaymentOption::Manual, 0)
            .await
            .unwrap();
        assert_eq!(sui, "0.02");
        assert_eq!(aptos, "0.01");
    }

    #[tokio::test]
    async fn test_automatic_claim_is_free() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        for context in registry.contexts() {
            let fee = estimate_claim(context, PaymentOption::Automatic, 250_000)
                .await
                .unwrap();
            assert_eq!(fee, "0.0");
        }
        assert_eq!(chains.total_provider_calls(), 0);
    }

    #[tokio::test]
    async fn test_solana_claim_is_constant() {
        let chains = MockChains::testnet();
        let registry = chains.registry();
        let fee = estimate_claim(registry.resolve(1u16).unwrap(), PaymentOption::Manual, 0)
            .await
            .unwrap();
        assert_eq!(fee, "0.000025");
    }
}
