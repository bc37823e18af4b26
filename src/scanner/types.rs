//! Opportunity types and lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

/// Kind of arbitrage an opportunity represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrageType {
    /// Same token priced differently on two chains.
    #[strum(serialize = "cross_chain", serialize = "cross-chain")]
    #[default]
    CrossChain,
    /// Same token priced differently on two venues of one chain.
    #[strum(serialize = "cross_dex", serialize = "cross-dex")]
    CrossDex,
}

/// Lifecycle stage of an opportunity.
///
/// `Discovered -> Shared -> Assigned -> ExecutedSuccess | ExecutedFailed`,
/// with `Stale` as the drop path at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStage {
    /// Produced by a scan cycle.
    #[strum(serialize = "discovered")]
    Discovered,
    /// Retained on the shared best-opportunity board.
    #[strum(serialize = "shared")]
    Shared,
    /// Assigned to an agent for execution.
    #[strum(serialize = "assigned")]
    Assigned,
    /// Executed successfully.
    #[strum(serialize = "executed_success")]
    ExecutedSuccess,
    /// Execution attempted and failed.
    #[strum(serialize = "executed_failed")]
    ExecutedFailed,
    /// Dropped after failing re-verification.
    #[strum(serialize = "stale")]
    Stale,
}

impl OpportunityStage {
    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OpportunityStage::ExecutedSuccess
                | OpportunityStage::ExecutedFailed
                | OpportunityStage::Stale
        )
    }
}

/// A detected price discrepancy between two chains.
///
/// Value object: created only by the scanner, consumed but never
/// mutated downstream, discarded once executed or found stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Chain to buy on.
    pub source_chain: String,
    /// Chain to sell on.
    pub target_chain: String,
    /// Token symbol.
    pub token: String,
    /// Kind of arbitrage.
    pub kind: ArbitrageType,
    /// Relative price difference, `|p_s - p_t| / min(p_s, p_t)`.
    pub price_difference: Decimal,
    /// Absolute price spread minus estimated gas cost.
    pub estimated_profit: Decimal,
    /// Estimated gas cost of the round trip.
    pub gas_cost: Decimal,
    /// Heuristic reliability score in [0, 1].
    pub confidence: Decimal,
    /// When the opportunity was discovered.
    #[serde(with = "time::serde::rfc3339")]
    pub discovered_at: OffsetDateTime,
}

impl ArbitrageOpportunity {
    /// Stable identifier derived from route, token, and discovery time.
    pub fn id(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.source_chain,
            self.target_chain,
            self.token,
            self.discovered_at.unix_timestamp()
        )
    }

    /// Price difference expressed as a percentage.
    pub fn profit_percentage(&self) -> Decimal {
        self.price_difference * Decimal::ONE_HUNDRED
    }
}

/// Filter over opportunity lists, as used by outer layers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityFilter {
    /// Restrict to opportunities touching any of these chains.
    #[serde(default)]
    pub chains: Option<Vec<String>>,
    /// Restrict to one arbitrage kind.
    #[serde(default)]
    pub arbitrage_type: Option<ArbitrageType>,
    /// Restrict to one token symbol.
    #[serde(default)]
    pub token: Option<String>,
    /// Minimum profit percentage.
    #[serde(default)]
    pub min_profit_percentage: Option<Decimal>,
}

impl OpportunityFilter {
    /// Whether an opportunity passes this filter.
    pub fn matches(&self, opportunity: &ArbitrageOpportunity) -> bool {
        if let Some(chains) = &self.chains {
            let touches = chains
                .iter()
                .any(|c| *c == opportunity.source_chain || *c == opportunity.target_chain);
            if !touches {
                return false;
            }
        }

        if let Some(kind) = self.arbitrage_type {
            if kind != opportunity.kind {
                return false;
            }
        }

        if let Some(token) = &self.token {
            if *token != opportunity.token {
                return false;
            }
        }

        if let Some(min_pct) = self.min_profit_percentage {
            if opportunity.profit_percentage() < min_pct {
                return false;
            }
        }

        true
    }
}

/// Apply a filter and sort descending by profit percentage.
pub fn filter_opportunities(
    opportunities: Vec<ArbitrageOpportunity>,
    filter: &OpportunityFilter,
) -> Vec<ArbitrageOpportunity> {
    let mut filtered: Vec<ArbitrageOpportunity> = opportunities
        .into_iter()
        .filter(|o| filter.matches(o))
        .collect();

    filtered.sort_by(|a, b| b.profit_percentage().cmp(&a.profit_percentage()));
    filtered
}
