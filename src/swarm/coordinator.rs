//! Swarm coordinator: trade assignment and adaptive risk control.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use strum::Display;
use tracing::{info, instrument, warn};

use super::state::{SwarmState, SwarmStats};
use crate::agent::{Agent, AgentPerformance, RiskParameters, TradeOutcome};
use crate::error::ExecutionError;
use crate::metrics;
use crate::oracle::{PriceOracle, TradeExecutor, TradeLedger, TransactionRecord};
use crate::scanner::{
    filter_opportunities, ArbitrageOpportunity, OpportunityFilter, OpportunityStage,
};

/// Thresholds tighten by this factor when the swarm underperforms.
static TIGHTEN_FACTOR: Lazy<Decimal> = Lazy::new(|| Decimal::new(11, 1)); // 1.1
/// Thresholds loosen by this factor when the swarm overperforms.
static LOOSEN_FACTOR: Lazy<Decimal> = Lazy::new(|| Decimal::new(95, 2)); // 0.95
/// Success rate below which the swarm turns conservative.
static LOW_SUCCESS_RATE: Lazy<Decimal> = Lazy::new(|| Decimal::new(5, 1)); // 0.5
/// Success rate above which the swarm turns aggressive.
static HIGH_SUCCESS_RATE: Lazy<Decimal> = Lazy::new(|| Decimal::new(8, 1)); // 0.8
/// Lower clamp for adaptive thresholds.
static THRESHOLD_FLOOR: Lazy<Decimal> = Lazy::new(|| Decimal::new(1, 3)); // 0.001
/// Upper clamp for adaptive thresholds.
static THRESHOLD_CEIL: Lazy<Decimal> = Lazy::new(|| Decimal::ONE);

/// Weight of the historical success rate in agent scoring.
static SCORE_SUCCESS_WEIGHT: Lazy<Decimal> = Lazy::new(|| Decimal::ONE);
/// Weight of available capacity in agent scoring.
static SCORE_CAPACITY_WEIGHT: Lazy<Decimal> = Lazy::new(|| Decimal::new(5, 1)); // 0.5
/// Neutral success-rate prior for agents with no history.
static SCORE_NEUTRAL_RATE: Lazy<Decimal> = Lazy::new(|| Decimal::new(5, 1)); // 0.5

/// Direction the adaptive control loop moved agent thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RiskAdjustment {
    /// Thresholds multiplied by the tighten factor.
    #[strum(serialize = "tightened")]
    Tightened,
    /// Thresholds multiplied by the loosen factor.
    #[strum(serialize = "loosened")]
    Loosened,
    /// Thresholds left as they were.
    #[strum(serialize = "unchanged")]
    Unchanged,
}

/// Result of assigning one opportunity to an agent.
#[derive(Debug, Clone)]
pub struct TradeAssignment {
    /// Agent the opportunity was assigned to.
    pub agent_id: String,
    /// Opportunity identifier.
    pub opportunity_id: String,
    /// Terminal stage the opportunity reached.
    pub stage: OpportunityStage,
    /// Realized profit when the stage is `ExecutedSuccess`.
    pub profit: Option<Decimal>,
}

/// Score an agent's fitness for one opportunity.
///
/// Pure function of the agent snapshot and the opportunity: the margin
/// by which the opportunity clears the agent's confidence threshold,
/// the agent's historical success rate (neutral prior before any
/// trades), and its capacity. Returns zero when any risk gate fails;
/// zero is below the viability floor.
pub fn evaluate_agent_for_trade(
    risk: &RiskParameters,
    performance: &AgentPerformance,
    opportunity: &ArbitrageOpportunity,
) -> Decimal {
    if opportunity.confidence < risk.confidence_threshold {
        return Decimal::ZERO;
    }
    if opportunity.gas_cost >= risk.max_gas_price {
        return Decimal::ZERO;
    }
    if opportunity.price_difference <= risk.min_profit_threshold {
        return Decimal::ZERO;
    }
    if opportunity.estimated_profit <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let confidence_margin = opportunity.confidence - risk.confidence_threshold;
    let success_rate = performance.success_rate().unwrap_or(*SCORE_NEUTRAL_RATE);

    confidence_margin
        + success_rate * *SCORE_SUCCESS_WEIGHT
        + risk.max_position_size * *SCORE_CAPACITY_WEIGHT
}

/// Owns the shared opportunity board and swarm-wide metrics; selects
/// which agent executes a given opportunity and runs the adaptive
/// risk-control loop.
///
/// All `SwarmState` mutations pass through the single `state` mutex, so
/// concurrent scan cycles cannot lose updates.
pub struct SwarmCoordinator {
    /// Registered agents in registration order.
    agents: Vec<Arc<Agent>>,
    /// Shared swarm state behind the single coordination mutex.
    state: tokio::sync::Mutex<SwarmState>,
    /// Price oracle used for execution-time re-verification.
    price_oracle: Arc<dyn PriceOracle>,
    /// External trade executor.
    executor: Arc<dyn TradeExecutor>,
    /// External transaction ledger.
    ledger: Arc<dyn TradeLedger>,
    /// Per-attempt deadline for collaborator calls.
    call_timeout_ms: u64,
}

impl SwarmCoordinator {
    /// Create a coordinator with no agents registered yet.
    pub fn new(
        board_capacity: usize,
        price_oracle: Arc<dyn PriceOracle>,
        executor: Arc<dyn TradeExecutor>,
        ledger: Arc<dyn TradeLedger>,
        call_timeout_ms: u64,
    ) -> Self {
        Self {
            agents: Vec::new(),
            state: tokio::sync::Mutex::new(SwarmState::new(board_capacity)),
            price_oracle,
            executor,
            ledger,
            call_timeout_ms,
        }
    }

    /// Register an agent. Registration order breaks scoring ties.
    pub fn register_agent(&mut self, agent: Arc<Agent>) {
        info!(agent = %agent.id(), "Agent registered");
        self.agents.push(agent);
    }

    /// Registered agents in registration order.
    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    /// Share an opportunity with the swarm.
    ///
    /// The single write path into the shared board: retained only when
    /// it beats the current best estimated profit.
    #[instrument(skip(self, opportunity), fields(opportunity = %opportunity.id(), profit = %opportunity.estimated_profit))]
    pub async fn share_opportunity(&self, opportunity: ArbitrageOpportunity) -> bool {
        let retained = {
            let mut state = self.state.lock().await;
            state.try_share(opportunity)
        };

        if retained {
            metrics::inc_opportunities_shared();
            info!("Opportunity retained as new best");
        }

        retained
    }

    /// Pop the best opportunity off the shared board.
    pub async fn take_best_opportunity(&self) -> Option<ArbitrageOpportunity> {
        self.state.lock().await.take_best()
    }

    /// Assign an opportunity to the best-scoring agent and execute it.
    ///
    /// Returns `Ok(None)` when no agent clears the viability floor (the
    /// opportunity is dropped and logged as unassigned, not an error).
    /// Scoring is deterministic: agents are evaluated in registration
    /// order and only a strictly greater score displaces the incumbent.
    #[instrument(skip(self, opportunity), fields(opportunity = %opportunity.id()))]
    pub async fn coordinate_trade(
        &self,
        opportunity: &ArbitrageOpportunity,
    ) -> Result<Option<TradeAssignment>, ExecutionError> {
        let mut best: Option<(&Arc<Agent>, Decimal)> = None;

        for agent in &self.agents {
            let score = evaluate_agent_for_trade(
                &agent.risk_params(),
                &agent.performance(),
                opportunity,
            );
            let beats_incumbent = match best {
                None => score > Decimal::ZERO,
                Some((_, best_score)) => score > best_score,
            };
            if beats_incumbent {
                best = Some((agent, score));
            }
        }

        let Some((agent, score)) = best else {
            let mut state = self.state.lock().await;
            state.unassigned_opportunities += 1;
            metrics::inc_opportunities_unassigned();
            info!("No viable agent, opportunity dropped");
            return Ok(None);
        };

        info!(agent = %agent.id(), score = %score, "Opportunity assigned");
        metrics::inc_opportunities_assigned();
        agent.track(opportunity.clone());

        let result = agent
            .execute_trade(
                opportunity,
                self.price_oracle.as_ref(),
                self.executor.as_ref(),
                self.call_timeout_ms,
            )
            .await;

        match result {
            Ok(outcome) => {
                let assignment = TradeAssignment {
                    agent_id: agent.id().to_string(),
                    opportunity_id: opportunity.id(),
                    stage: outcome.stage(),
                    profit: match &outcome {
                        TradeOutcome::Executed { receipt, .. } => Some(receipt.profit),
                        TradeOutcome::Failed { .. } => None,
                    },
                };

                {
                    let mut state = self.state.lock().await;
                    match &outcome {
                        TradeOutcome::Executed { receipt, .. } => {
                            state.successful_trades += 1;
                            state.total_profit += receipt.profit;
                        }
                        TradeOutcome::Failed { .. } => {
                            state.failed_trades += 1;
                        }
                    }
                }

                if let TradeOutcome::Executed { receipt, .. } = &outcome {
                    let record = TransactionRecord {
                        opportunity_id: opportunity.id(),
                        tx_hash: receipt.tx_hash.clone(),
                        executed_at: receipt.executed_at,
                        profit: receipt.profit,
                    };
                    if let Err(e) = self.ledger.record(record).await {
                        warn!(error = %e, "Failed to record transaction with ledger");
                    }
                }

                Ok(Some(assignment))
            }
            Err(ExecutionError::StaleOpportunity {
                recomputed_diff,
                threshold,
            }) => {
                let mut state = self.state.lock().await;
                state.stale_opportunities += 1;
                info!(
                    recomputed = %recomputed_diff,
                    threshold = %threshold,
                    "Assigned opportunity was stale"
                );
                Ok(Some(TradeAssignment {
                    agent_id: agent.id().to_string(),
                    opportunity_id: opportunity.id(),
                    stage: OpportunityStage::Stale,
                    profit: None,
                }))
            }
            Err(e) => Err(e),
        }
    }

    /// Run one step of the adaptive risk-control loop over the trades
    /// completed since the previous step.
    ///
    /// Success rate below 0.5 tightens every agent's thresholds by 1.1;
    /// above 0.8 loosens them by 0.95; in between (or with no completed
    /// trades in the window) nothing changes. Thresholds are clamped to
    /// `[0.001, 1.0]`.
    #[instrument(skip(self))]
    pub async fn update_risk_params(&self) -> RiskAdjustment {
        let (window_successes, window_failures) = {
            let mut state = self.state.lock().await;
            let successes = state.successful_trades - state.window_marker.0;
            let failures = state.failed_trades - state.window_marker.1;
            state.window_marker = (state.successful_trades, state.failed_trades);
            (successes, failures)
        };

        let total = window_successes + window_failures;
        if total == 0 {
            return RiskAdjustment::Unchanged;
        }

        let success_rate = Decimal::from(window_successes) / Decimal::from(total);
        self.adjust_for_success_rate(success_rate)
    }

    /// Apply the multiplicative hysteresis rule for a given success
    /// rate to every registered agent.
    pub fn adjust_for_success_rate(&self, success_rate: Decimal) -> RiskAdjustment {
        let adjustment = if success_rate < *LOW_SUCCESS_RATE {
            RiskAdjustment::Tightened
        } else if success_rate > *HIGH_SUCCESS_RATE {
            RiskAdjustment::Loosened
        } else {
            RiskAdjustment::Unchanged
        };

        let factor = match adjustment {
            RiskAdjustment::Tightened => *TIGHTEN_FACTOR,
            RiskAdjustment::Loosened => *LOOSEN_FACTOR,
            RiskAdjustment::Unchanged => {
                return RiskAdjustment::Unchanged;
            }
        };

        for agent in &self.agents {
            let mut params = agent.risk_params();
            params.scale_thresholds(factor, *THRESHOLD_FLOOR, *THRESHOLD_CEIL);
            agent.set_risk_params(params);
        }

        metrics::inc_risk_adjustments(&adjustment.to_string());
        info!(
            success_rate = %success_rate,
            adjustment = %adjustment,
            agents = self.agents.len(),
            "Risk parameters adjusted"
        );

        adjustment
    }

    /// Filtered view over the shared board, best profit first.
    pub async fn opportunities(&self, filter: &OpportunityFilter) -> Vec<ArbitrageOpportunity> {
        let board = {
            let state = self.state.lock().await;
            state.opportunities().to_vec()
        };
        filter_opportunities(board, filter)
    }

    /// Snapshot of swarm-wide statistics.
    pub async fn stats(&self) -> SwarmStats {
        self.state.lock().await.stats(self.agents.len())
    }
}
