//! Prometheus metrics for the swarm arbitrage engine.
//!
//! This module provides metrics for:
//! - Scan cycle latency and skip counts
//! - Opportunity lifecycle counters (discovered, shared, assigned,
//!   unassigned, stale)
//! - Trade outcome counters
//! - Risk-control adjustments

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Scan cycle latency metric name.
pub const METRIC_SCAN_LATENCY: &str = "scan_cycle_latency_ms";
/// Trade execution latency metric name.
pub const METRIC_TRADE_LATENCY: &str = "trade_execution_latency_ms";
/// Opportunities discovered counter metric name.
pub const METRIC_OPPORTUNITIES_DISCOVERED: &str = "opportunities_discovered_total";
/// Opportunities retained on the shared board counter metric name.
pub const METRIC_OPPORTUNITIES_SHARED: &str = "opportunities_shared_total";
/// Opportunities assigned to an agent counter metric name.
pub const METRIC_OPPORTUNITIES_ASSIGNED: &str = "opportunities_assigned_total";
/// Opportunities dropped with no viable agent counter metric name.
pub const METRIC_OPPORTUNITIES_UNASSIGNED: &str = "opportunities_unassigned_total";
/// Opportunities dropped as stale counter metric name.
pub const METRIC_OPPORTUNITIES_STALE: &str = "opportunities_stale_total";
/// Scan combinations skipped counter metric name.
pub const METRIC_SCAN_SKIPS: &str = "scan_combinations_skipped_total";
/// Trades succeeded counter metric name.
pub const METRIC_TRADES_SUCCEEDED: &str = "trades_succeeded_total";
/// Trades failed counter metric name.
pub const METRIC_TRADES_FAILED: &str = "trades_failed_total";
/// Risk adjustments counter metric name.
pub const METRIC_RISK_ADJUSTMENTS: &str = "risk_adjustments_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_SCAN_LATENCY,
        "Full opportunity scan cycle latency in milliseconds"
    );
    describe_histogram!(
        METRIC_TRADE_LATENCY,
        "Trade execution latency in milliseconds"
    );

    describe_counter!(
        METRIC_OPPORTUNITIES_DISCOVERED,
        "Total number of arbitrage opportunities discovered"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_SHARED,
        "Total number of opportunities retained on the shared board"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_ASSIGNED,
        "Total number of opportunities assigned to an agent"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_UNASSIGNED,
        "Total number of opportunities dropped with no viable agent"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_STALE,
        "Total number of opportunities dropped as stale at execution time"
    );
    describe_counter!(
        METRIC_SCAN_SKIPS,
        "Total number of scan combinations skipped on oracle failure"
    );
    describe_counter!(METRIC_TRADES_SUCCEEDED, "Total number of successful trades");
    describe_counter!(METRIC_TRADES_FAILED, "Total number of failed trades");
    describe_counter!(
        METRIC_RISK_ADJUSTMENTS,
        "Total number of adaptive risk-control adjustments"
    );

    debug!("Metrics initialized");
}

/// Record scan cycle latency.
pub fn record_scan_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_SCAN_LATENCY).record(latency_ms);
}

/// Record trade execution latency.
pub fn record_trade_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_TRADE_LATENCY).record(latency_ms);
}

/// Increment opportunities discovered by the count found in one cycle.
pub fn inc_opportunities_discovered(count: u64) {
    counter!(METRIC_OPPORTUNITIES_DISCOVERED).increment(count);
}

/// Increment opportunities shared counter.
pub fn inc_opportunities_shared() {
    counter!(METRIC_OPPORTUNITIES_SHARED).increment(1);
}

/// Increment opportunities assigned counter.
pub fn inc_opportunities_assigned() {
    counter!(METRIC_OPPORTUNITIES_ASSIGNED).increment(1);
}

/// Increment opportunities unassigned counter.
pub fn inc_opportunities_unassigned() {
    counter!(METRIC_OPPORTUNITIES_UNASSIGNED).increment(1);
}

/// Increment stale opportunities counter.
pub fn inc_stale_opportunities() {
    counter!(METRIC_OPPORTUNITIES_STALE).increment(1);
}

/// Increment scan skip counter.
pub fn inc_scan_skips() {
    counter!(METRIC_SCAN_SKIPS).increment(1);
}

/// Increment trades succeeded counter.
pub fn inc_trades_succeeded() {
    counter!(METRIC_TRADES_SUCCEEDED).increment(1);
}

/// Increment trades failed counter.
pub fn inc_trades_failed() {
    counter!(METRIC_TRADES_FAILED).increment(1);
}

/// Increment risk adjustments counter, labeled by direction.
pub fn inc_risk_adjustments(direction: &str) {
    counter!(METRIC_RISK_ADJUSTMENTS, "direction" => direction.to_string()).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for a scan cycle.
pub fn timer_scan_cycle() -> LatencyTimer {
    LatencyTimer::new(METRIC_SCAN_LATENCY)
}

/// Create a latency timer for a trade execution.
pub fn timer_trade_execution() -> LatencyTimer {
    LatencyTimer::new(METRIC_TRADE_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("test_metric");
        sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 9.0); // Allow some tolerance
        // Timer will record on drop
    }
}
