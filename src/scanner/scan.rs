//! Concurrent cross-chain opportunity scan.

use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info, instrument};

use super::calculator::evaluate_combination;
use super::types::ArbitrageOpportunity;
use crate::agent::RiskParameters;
use crate::chain::{ChainInfo, ChainRegistry};
use crate::error::{OracleError, ScanError};
use crate::metrics;
use crate::oracle::{GasEstimator, PriceOracle};
use crate::utils::with_timeout_retry;

/// Scan every ordered chain pair and shared token for price
/// discrepancies.
///
/// Each (pair, token) combination is evaluated as an independent
/// concurrent task; a failing oracle call skips that combination only.
/// The result is a pure function of the oracle/estimator answers:
/// identical responses yield an identical opportunity set.
#[instrument(skip(registry, price_oracle, gas_estimator, risk), fields(chains = registry.len()))]
pub async fn find_opportunities(
    registry: &ChainRegistry,
    price_oracle: &dyn PriceOracle,
    gas_estimator: &dyn GasEstimator,
    risk: &RiskParameters,
    call_timeout_ms: u64,
) -> Result<Vec<ArbitrageOpportunity>, ScanError> {
    risk.validate().map_err(ScanError::InvalidParameters)?;

    let start = Instant::now();

    let tasks = registry.chain_pairs().flat_map(|(source, target)| {
        registry
            .common_tokens(source, target)
            .into_iter()
            .map(move |token| {
                scan_combination(
                    source,
                    target,
                    token,
                    price_oracle,
                    gas_estimator,
                    risk,
                    call_timeout_ms,
                )
            })
            .collect::<Vec<_>>()
    });

    let results = join_all(tasks).await;
    let combinations = results.len();

    let opportunities: Vec<ArbitrageOpportunity> = results.into_iter().flatten().collect();

    metrics::record_scan_latency(start);
    metrics::inc_opportunities_discovered(opportunities.len() as u64);

    info!(
        combinations,
        found = opportunities.len(),
        "Scan cycle complete"
    );

    Ok(opportunities)
}

/// Evaluate one (source, target, token) combination.
///
/// Oracle failures are isolated here: any unavailable price or gas
/// estimate turns into a skip, never a scan abort.
async fn scan_combination(
    source: &ChainInfo,
    target: &ChainInfo,
    token: &str,
    price_oracle: &dyn PriceOracle,
    gas_estimator: &dyn GasEstimator,
    risk: &RiskParameters,
    call_timeout_ms: u64,
) -> Option<ArbitrageOpportunity> {
    let source_price = match oracle_price(price_oracle, &source.name, token, call_timeout_ms).await
    {
        Ok(price) => price,
        Err(e) => {
            debug!(chain = %source.name, token, error = %e, "Skipping combination");
            metrics::inc_scan_skips();
            return None;
        }
    };

    let target_price = match oracle_price(price_oracle, &target.name, token, call_timeout_ms).await
    {
        Ok(price) => price,
        Err(e) => {
            debug!(chain = %target.name, token, error = %e, "Skipping combination");
            metrics::inc_scan_skips();
            return None;
        }
    };

    let gas_cost = match with_timeout_retry(
        call_timeout_ms,
        |deadline_ms| OracleError::Timeout { deadline_ms },
        || gas_estimator.estimate(source, target, token),
    )
    .await
    {
        Ok(estimate) => estimate,
        Err(e) => {
            debug!(
                source = %source.name,
                target = %target.name,
                token,
                error = %e,
                "Skipping combination, no gas estimate"
            );
            metrics::inc_scan_skips();
            return None;
        }
    };

    evaluate_combination(
        source,
        target,
        token,
        source_price,
        target_price,
        gas_cost,
        risk,
    )
}

/// One price read with the standard timeout/retry discipline.
async fn oracle_price(
    price_oracle: &dyn PriceOracle,
    chain: &str,
    token: &str,
    call_timeout_ms: u64,
) -> Result<rust_decimal::Decimal, OracleError> {
    with_timeout_retry(
        call_timeout_ms,
        |deadline_ms| OracleError::Timeout { deadline_ms },
        || price_oracle.price(chain, token),
    )
    .await
}
