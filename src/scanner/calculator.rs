//! Profitability math for chain-pair/token combinations.
//!
//! Everything in this file is pure: identical inputs always produce
//! identical outputs, which keeps whole scan cycles deterministic.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use super::types::{ArbitrageOpportunity, ArbitrageType};
use crate::agent::RiskParameters;
use crate::chain::ChainInfo;

/// Guard against division by zero in the confidence ratio.
static CONFIDENCE_EPSILON: Lazy<Decimal> = Lazy::new(|| Decimal::new(1, 2)); // 0.01

/// Relative price difference between two quotes:
/// `|p_s - p_t| / min(p_s, p_t)`.
///
/// Returns zero when either price is non-positive; the scan skips such
/// quotes before this point, so the guard only matters for direct
/// callers.
pub fn relative_price_difference(source_price: Decimal, target_price: Decimal) -> Decimal {
    let floor = source_price.min(target_price);
    if floor <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (source_price - target_price).abs() / floor
}

/// Confidence heuristic: `min(1, price_diff / (gas_cost + epsilon))`.
pub fn confidence_score(price_difference: Decimal, gas_cost: Decimal) -> Decimal {
    (price_difference / (gas_cost + *CONFIDENCE_EPSILON)).min(Decimal::ONE)
}

/// Evaluate one chain-pair/token combination against risk parameters.
///
/// Emits an opportunity only when the relative difference clears
/// `min_profit_threshold`, gas stays under `max_gas_price`, and the
/// spread net of gas is positive.
pub fn evaluate_combination(
    source: &ChainInfo,
    target: &ChainInfo,
    token: &str,
    source_price: Decimal,
    target_price: Decimal,
    gas_cost: Decimal,
    risk: &RiskParameters,
) -> Option<ArbitrageOpportunity> {
    let price_difference = relative_price_difference(source_price, target_price);
    let spread = (source_price - target_price).abs();
    let estimated_profit = spread - gas_cost;
    let confidence = confidence_score(price_difference, gas_cost);

    if price_difference <= risk.min_profit_threshold {
        return None;
    }
    if gas_cost >= risk.max_gas_price {
        return None;
    }
    if estimated_profit <= Decimal::ZERO {
        return None;
    }

    Some(ArbitrageOpportunity {
        source_chain: source.name.clone(),
        target_chain: target.name.clone(),
        token: token.to_string(),
        kind: ArbitrageType::CrossChain,
        price_difference,
        estimated_profit,
        gas_cost,
        confidence,
        discovered_at: OffsetDateTime::now_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn chain(name: &str) -> ChainInfo {
        ChainInfo::new(name, dec!(30), "0xbridge", &["T"])
    }

    fn permissive_risk() -> RiskParameters {
        RiskParameters {
            max_position_size: dec!(0.1),
            min_profit_threshold: dec!(0.02),
            max_gas_price: dec!(50),
            confidence_threshold: dec!(0.01),
        }
    }

    #[test]
    fn relative_difference_is_symmetric_and_non_negative() {
        assert_eq!(relative_price_difference(dec!(100), dec!(110)), dec!(0.1));
        assert_eq!(relative_price_difference(dec!(110), dec!(100)), dec!(0.1));
        assert_eq!(relative_price_difference(dec!(100), dec!(100)), dec!(0));
    }

    #[test]
    fn relative_difference_guards_non_positive_prices() {
        assert_eq!(relative_price_difference(dec!(0), dec!(100)), dec!(0));
        assert_eq!(relative_price_difference(dec!(-1), dec!(100)), dec!(0));
    }

    #[test]
    fn confidence_is_capped_at_one() {
        assert_eq!(confidence_score(dec!(5), dec!(0)), dec!(1));
        assert!(confidence_score(dec!(0.1), dec!(2)) < dec!(1));
    }

    #[test]
    fn worked_scenario_matches_expected_values() {
        // price(A,T)=100, price(B,T)=110, gas=2
        let opp = evaluate_combination(
            &chain("A"),
            &chain("B"),
            "T",
            dec!(100),
            dec!(110),
            dec!(2),
            &permissive_risk(),
        )
        .expect("opportunity should be emitted");

        assert_eq!(opp.price_difference, dec!(0.1));
        assert_eq!(opp.estimated_profit, dec!(8));
        assert_eq!(opp.gas_cost, dec!(2));
        // confidence = min(1, 0.10 / 2.01) ~= 0.0497
        assert!(opp.confidence > dec!(0.0497) && opp.confidence < dec!(0.0498));
    }

    #[test]
    fn no_emission_below_profit_threshold() {
        let mut risk = permissive_risk();
        risk.min_profit_threshold = dec!(0.15);

        let opp = evaluate_combination(
            &chain("A"),
            &chain("B"),
            "T",
            dec!(100),
            dec!(110),
            dec!(2),
            &risk,
        );
        assert!(opp.is_none());
    }

    #[test]
    fn no_emission_when_gas_exceeds_cap() {
        let mut risk = permissive_risk();
        risk.max_gas_price = dec!(2);

        // gas == max_gas_price is not strictly below the cap
        let opp = evaluate_combination(
            &chain("A"),
            &chain("B"),
            "T",
            dec!(100),
            dec!(110),
            dec!(2),
            &risk,
        );
        assert!(opp.is_none());
    }

    #[test]
    fn no_emission_when_gas_swallows_spread() {
        let opp = evaluate_combination(
            &chain("A"),
            &chain("B"),
            "T",
            dec!(100),
            dec!(110),
            dec!(12),
            &permissive_risk(),
        );
        assert!(opp.is_none());
    }

    #[test]
    fn emitted_invariants_hold() {
        let opp = evaluate_combination(
            &chain("A"),
            &chain("B"),
            "T",
            dec!(100),
            dec!(104),
            dec!(1),
            &permissive_risk(),
        )
        .expect("opportunity should be emitted");

        assert!(opp.price_difference >= dec!(0));
        assert!(opp.estimated_profit > dec!(0));
        assert!(opp.confidence >= dec!(0) && opp.confidence <= dec!(1));
    }
}
