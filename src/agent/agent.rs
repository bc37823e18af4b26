//! Autonomous agent holding risk parameters and an execution slot.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::types::{AgentPerformance, RiskParameters};
use crate::chain::ChainRegistry;
use crate::error::{ExecutionError, OracleError};
use crate::metrics;
use crate::oracle::{PriceOracle, TradeExecutor, TradeReceipt, TradeRequest};
use crate::scanner::calculator::relative_price_difference;
use crate::scanner::{ArbitrageOpportunity, OpportunityStage};
use crate::utils::with_timeout_retry;

/// Maximum opportunities an agent keeps in its local backlog.
pub const BACKLOG_CAPACITY: usize = 16;

/// Outcome of one trade attempt that completed (and therefore changed
/// agent state). Re-verification failures never produce an outcome.
#[derive(Debug, Clone)]
pub enum TradeOutcome {
    /// The executor settled the trade.
    Executed {
        /// Receipt from the executor.
        receipt: TradeReceipt,
        /// Position size actually requested.
        position_size: Decimal,
    },
    /// The executor reported failure.
    Failed {
        /// Failure description.
        reason: String,
    },
}

impl TradeOutcome {
    /// Terminal lifecycle stage this outcome maps to.
    pub fn stage(&self) -> OpportunityStage {
        match self {
            TradeOutcome::Executed { .. } => OpportunityStage::ExecutedSuccess,
            TradeOutcome::Failed { .. } => OpportunityStage::ExecutedFailed,
        }
    }
}

/// One autonomous unit in the swarm.
///
/// Owns its risk parameters and performance record; shares only the
/// read-only chain registry. At most one `execute_trade` call per agent
/// is in flight at a time.
#[derive(Debug)]
pub struct Agent {
    /// Agent identity.
    id: String,
    /// Shared read-only chain registry.
    registry: Arc<ChainRegistry>,
    /// Risk thresholds, written only by the coordinator's control loop.
    risk: RwLock<RiskParameters>,
    /// Trade history, written only inside `execute_trade`.
    performance: Mutex<AgentPerformance>,
    /// Bounded backlog of opportunities this agent is tracking.
    backlog: Mutex<VecDeque<ArbitrageOpportunity>>,
    /// Execution slot serializing `execute_trade` calls.
    slot: tokio::sync::Mutex<()>,
}

impl Agent {
    /// Create a new agent.
    pub fn new(id: impl Into<String>, registry: Arc<ChainRegistry>, risk: RiskParameters) -> Self {
        Self {
            id: id.into(),
            registry,
            risk: RwLock::new(risk),
            performance: Mutex::new(AgentPerformance::default()),
            backlog: Mutex::new(VecDeque::with_capacity(BACKLOG_CAPACITY)),
            slot: tokio::sync::Mutex::new(()),
        }
    }

    /// Agent identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the current risk parameters.
    pub fn risk_params(&self) -> RiskParameters {
        *self.risk.read().expect("risk lock poisoned")
    }

    /// Replace the risk parameters. Coordinator-facing; agents never
    /// call this on themselves.
    pub fn set_risk_params(&self, params: RiskParameters) {
        *self.risk.write().expect("risk lock poisoned") = params;
    }

    /// Snapshot of the performance record.
    pub fn performance(&self) -> AgentPerformance {
        self.performance
            .lock()
            .expect("performance lock poisoned")
            .clone()
    }

    /// Track an opportunity in the local backlog, evicting the oldest
    /// entry once the backlog is full.
    pub fn track(&self, opportunity: ArbitrageOpportunity) {
        let mut backlog = self.backlog.lock().expect("backlog lock poisoned");
        if backlog.len() == BACKLOG_CAPACITY {
            backlog.pop_front();
        }
        backlog.push_back(opportunity);
    }

    /// Number of opportunities currently tracked.
    pub fn backlog_len(&self) -> usize {
        self.backlog.lock().expect("backlog lock poisoned").len()
    }

    /// Execute an opportunity through the external executor.
    ///
    /// Re-verifies the spread with fresh oracle reads first: a spread
    /// that has drifted below `min_profit_threshold` returns
    /// [`ExecutionError::StaleOpportunity`] and leaves all agent state
    /// untouched. Executor failures are recorded as failed trades and
    /// returned as a [`TradeOutcome`], not an error.
    #[instrument(skip(self, opportunity, price_oracle, executor), fields(agent = %self.id, opportunity = %opportunity.id()))]
    pub async fn execute_trade(
        &self,
        opportunity: &ArbitrageOpportunity,
        price_oracle: &dyn PriceOracle,
        executor: &dyn TradeExecutor,
        call_timeout_ms: u64,
    ) -> Result<TradeOutcome, ExecutionError> {
        let _slot = self.slot.lock().await;

        let risk = self.risk_params();

        // Fresh reads guard against price drift between discovery and
        // execution.
        let source_price = self
            .fresh_price(price_oracle, &opportunity.source_chain, &opportunity.token, call_timeout_ms)
            .await?;
        let target_price = self
            .fresh_price(price_oracle, &opportunity.target_chain, &opportunity.token, call_timeout_ms)
            .await?;

        let recomputed_diff = relative_price_difference(source_price, target_price);
        if recomputed_diff < risk.min_profit_threshold {
            info!(
                recomputed = %recomputed_diff,
                threshold = %risk.min_profit_threshold,
                "Opportunity went stale before execution"
            );
            metrics::inc_stale_opportunities();
            return Err(ExecutionError::StaleOpportunity {
                recomputed_diff,
                threshold: risk.min_profit_threshold,
            });
        }

        let position_size = (risk.max_position_size * opportunity.confidence)
            .clamp(Decimal::ZERO, risk.max_position_size);

        let request = self.build_request(opportunity, position_size)?;

        let _timer = metrics::timer_trade_execution();
        let result = with_timeout_retry(
            call_timeout_ms,
            |deadline_ms| ExecutionError::Timeout { deadline_ms },
            || executor.execute(&request),
        )
        .await;

        match result {
            Ok(receipt) => {
                self.performance
                    .lock()
                    .expect("performance lock poisoned")
                    .record_success(receipt.profit);
                metrics::inc_trades_succeeded();

                info!(
                    tx_hash = %receipt.tx_hash,
                    profit = %receipt.profit,
                    position_size = %position_size,
                    "Trade executed"
                );

                Ok(TradeOutcome::Executed {
                    receipt,
                    position_size,
                })
            }
            Err(e) => {
                self.performance
                    .lock()
                    .expect("performance lock poisoned")
                    .record_failure();
                metrics::inc_trades_failed();

                warn!(error = %e, "Trade execution failed");

                Ok(TradeOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// One fresh oracle read with the standard timeout/retry discipline.
    async fn fresh_price(
        &self,
        price_oracle: &dyn PriceOracle,
        chain: &str,
        token: &str,
        call_timeout_ms: u64,
    ) -> Result<Decimal, ExecutionError> {
        with_timeout_retry(
            call_timeout_ms,
            |deadline_ms| OracleError::Timeout { deadline_ms },
            || price_oracle.price(chain, token),
        )
        .await
        .map_err(ExecutionError::ReverificationFailed)
    }

    /// Assemble the executor request from registry metadata.
    fn build_request(
        &self,
        opportunity: &ArbitrageOpportunity,
        position_size: Decimal,
    ) -> Result<TradeRequest, ExecutionError> {
        let source_chain = self
            .registry
            .get(&opportunity.source_chain)
            .ok_or_else(|| {
                ExecutionError::InvalidParams(format!(
                    "unknown source chain {}",
                    opportunity.source_chain
                ))
            })?
            .clone();

        let target_chain = self
            .registry
            .get(&opportunity.target_chain)
            .ok_or_else(|| {
                ExecutionError::InvalidParams(format!(
                    "unknown target chain {}",
                    opportunity.target_chain
                ))
            })?
            .clone();

        Ok(TradeRequest {
            source_chain,
            target_chain,
            token: opportunity.token.clone(),
            amount: position_size,
        })
    }
}
