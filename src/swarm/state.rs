//! Shared swarm state: opportunity board and performance totals.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::scanner::ArbitrageOpportunity;

/// Swarm-wide mutable state.
///
/// Every mutation goes through the coordinator's single mutex-guarded
/// entry points; nothing here is reachable as a module-level global.
#[derive(Debug)]
pub struct SwarmState {
    /// Best opportunities seen so far, sorted descending by estimated
    /// profit and bounded to `capacity` entries.
    shared_opportunities: Vec<ArbitrageOpportunity>,
    /// Board capacity (top-K).
    capacity: usize,
    /// Swarm-wide successful trade count.
    pub successful_trades: u64,
    /// Swarm-wide failed trade count.
    pub failed_trades: u64,
    /// Swarm-wide realized profit.
    pub total_profit: Decimal,
    /// Opportunities dropped because no agent was viable.
    pub unassigned_opportunities: u64,
    /// Opportunities dropped as stale at execution time.
    pub stale_opportunities: u64,
    /// When the board last changed.
    pub last_opportunity_update: Option<OffsetDateTime>,
    /// Totals at the start of the current risk-control window.
    pub window_marker: (u64, u64),
}

impl SwarmState {
    /// Create empty state with the given board capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared_opportunities: Vec::with_capacity(capacity),
            capacity,
            successful_trades: 0,
            failed_trades: 0,
            total_profit: Decimal::ZERO,
            unassigned_opportunities: 0,
            stale_opportunities: 0,
            last_opportunity_update: None,
            window_marker: (0, 0),
        }
    }

    /// Maximum estimated profit currently tracked on the board.
    pub fn max_tracked_profit(&self) -> Option<Decimal> {
        self.shared_opportunities.first().map(|o| o.estimated_profit)
    }

    /// Retain an opportunity if it beats the current best.
    ///
    /// Returns whether the opportunity was retained. The board only
    /// admits new bests, so the maximum tracked profit never decreases;
    /// the bounded capacity evicts the lowest-profit tail.
    pub fn try_share(&mut self, opportunity: ArbitrageOpportunity) -> bool {
        let admits = match self.max_tracked_profit() {
            None => true,
            Some(max) => opportunity.estimated_profit > max,
        };

        if !admits {
            return false;
        }

        self.shared_opportunities.insert(0, opportunity);
        self.shared_opportunities.truncate(self.capacity);
        self.last_opportunity_update = Some(OffsetDateTime::now_utc());
        true
    }

    /// Current board contents, best first.
    pub fn opportunities(&self) -> &[ArbitrageOpportunity] {
        &self.shared_opportunities
    }

    /// Remove and return the current best opportunity.
    pub fn take_best(&mut self) -> Option<ArbitrageOpportunity> {
        if self.shared_opportunities.is_empty() {
            None
        } else {
            Some(self.shared_opportunities.remove(0))
        }
    }

    /// Snapshot for the ops surface.
    pub fn stats(&self, agents: usize) -> SwarmStats {
        SwarmStats {
            agents,
            shared_opportunities: self.shared_opportunities.len(),
            max_tracked_profit: self.max_tracked_profit(),
            successful_trades: self.successful_trades,
            failed_trades: self.failed_trades,
            total_profit: self.total_profit,
            unassigned_opportunities: self.unassigned_opportunities,
            stale_opportunities: self.stale_opportunities,
            last_opportunity_update: self.last_opportunity_update,
        }
    }
}

/// Read-only snapshot of swarm-wide statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SwarmStats {
    /// Number of registered agents.
    pub agents: usize,
    /// Opportunities currently on the board.
    pub shared_opportunities: usize,
    /// Best estimated profit on the board.
    pub max_tracked_profit: Option<Decimal>,
    /// Swarm-wide successful trade count.
    pub successful_trades: u64,
    /// Swarm-wide failed trade count.
    pub failed_trades: u64,
    /// Swarm-wide realized profit.
    pub total_profit: Decimal,
    /// Opportunities dropped with no viable agent.
    pub unassigned_opportunities: u64,
    /// Opportunities dropped as stale.
    pub stale_opportunities: u64,
    /// When the board last changed.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_opportunity_update: Option<OffsetDateTime>,
}
