//! Agent-owned risk and performance state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Per-agent thresholds governing which opportunities are pursued.
///
/// Owned by each agent; mutated only through the coordinator's adaptive
/// risk-control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Maximum position size as a fraction of portfolio (0-1].
    pub max_position_size: Decimal,
    /// Minimum relative price difference to act on.
    pub min_profit_threshold: Decimal,
    /// Maximum acceptable gas cost per trade.
    pub max_gas_price: Decimal,
    /// Minimum opportunity confidence to act on (0-1].
    pub confidence_threshold: Decimal,
}

impl RiskParameters {
    /// Check all fields are positive and fractions stay in range.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_position_size <= Decimal::ZERO || self.max_position_size > Decimal::ONE {
            return Err("max_position_size must be in (0, 1]".to_string());
        }
        if self.min_profit_threshold <= Decimal::ZERO {
            return Err("min_profit_threshold must be positive".to_string());
        }
        if self.max_gas_price <= Decimal::ZERO {
            return Err("max_gas_price must be positive".to_string());
        }
        if self.confidence_threshold <= Decimal::ZERO || self.confidence_threshold > Decimal::ONE {
            return Err("confidence_threshold must be in (0, 1]".to_string());
        }
        Ok(())
    }

    /// Scale both adaptive thresholds by `factor`, clamping each into
    /// `[floor, ceil]` to prevent drift over many control cycles.
    pub fn scale_thresholds(&mut self, factor: Decimal, floor: Decimal, ceil: Decimal) {
        self.min_profit_threshold = (self.min_profit_threshold * factor).clamp(floor, ceil);
        self.confidence_threshold = (self.confidence_threshold * factor).clamp(floor, ceil);
    }
}

/// Trade history owned exclusively by one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentPerformance {
    /// Cumulative realized profit.
    pub total_profit: Decimal,
    /// Number of successful trades.
    pub successful_trades: u64,
    /// Number of failed trades.
    pub failed_trades: u64,
    /// When this record last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}

impl Default for AgentPerformance {
    fn default() -> Self {
        Self {
            total_profit: Decimal::ZERO,
            successful_trades: 0,
            failed_trades: 0,
            last_update: OffsetDateTime::now_utc(),
        }
    }
}

impl AgentPerformance {
    /// Record a successful trade.
    pub fn record_success(&mut self, profit: Decimal) {
        self.total_profit += profit;
        self.successful_trades += 1;
        self.last_update = OffsetDateTime::now_utc();
    }

    /// Record a failed trade.
    pub fn record_failure(&mut self) {
        self.failed_trades += 1;
        self.last_update = OffsetDateTime::now_utc();
    }

    /// Total completed trades, successful or not.
    pub fn total_trades(&self) -> u64 {
        self.successful_trades + self.failed_trades
    }

    /// Fraction of completed trades that succeeded, `None` before the
    /// first completed trade.
    pub fn success_rate(&self) -> Option<Decimal> {
        let total = self.total_trades();
        if total == 0 {
            return None;
        }
        Some(Decimal::from(self.successful_trades) / Decimal::from(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_params() -> RiskParameters {
        RiskParameters {
            max_position_size: dec!(0.1),
            min_profit_threshold: dec!(0.02),
            max_gas_price: dec!(50),
            confidence_threshold: dec!(0.5),
        }
    }

    #[test]
    fn validate_accepts_sane_params() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let mut params = valid_params();
        params.max_position_size = dec!(1.5);
        assert!(params.validate().is_err());

        let mut params = valid_params();
        params.min_profit_threshold = dec!(0);
        assert!(params.validate().is_err());

        let mut params = valid_params();
        params.confidence_threshold = dec!(-0.1);
        assert!(params.validate().is_err());
    }

    #[test]
    fn scale_thresholds_applies_factor() {
        let mut params = valid_params();
        params.scale_thresholds(dec!(1.1), dec!(0.001), dec!(1.0));

        assert_eq!(params.min_profit_threshold, dec!(0.022));
        assert_eq!(params.confidence_threshold, dec!(0.55));
    }

    #[test]
    fn scale_thresholds_clamps_at_bounds() {
        let mut params = valid_params();
        params.confidence_threshold = dec!(0.99);
        params.scale_thresholds(dec!(1.1), dec!(0.001), dec!(1.0));
        assert_eq!(params.confidence_threshold, dec!(1.0));

        let mut params = valid_params();
        params.min_profit_threshold = dec!(0.0011);
        params.scale_thresholds(dec!(0.95), dec!(0.001), dec!(1.0));
        // repeated shrinking cannot cross the floor
        for _ in 0..100 {
            params.scale_thresholds(dec!(0.95), dec!(0.001), dec!(1.0));
        }
        assert!(params.min_profit_threshold >= dec!(0.001));
    }

    #[test]
    fn success_rate_reflects_history() {
        let mut perf = AgentPerformance::default();
        assert_eq!(perf.success_rate(), None);

        perf.record_success(dec!(5));
        perf.record_success(dec!(3));
        perf.record_failure();

        assert_eq!(perf.total_trades(), 3);
        assert_eq!(perf.total_profit, dec!(8));
        let rate = perf.success_rate().unwrap();
        assert!(rate > dec!(0.66) && rate < dec!(0.67));
    }
}
