//! Mock collaborators for unit testing.
//!
//! These doubles stand in for the external oracle, gas estimator,
//! trade executor, and ledger without any network access. Failure modes
//! and latency are injectable so tests can cover timeout and partial
//! failure paths.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::chain::ChainInfo;
use crate::error::{ExecutionError, LedgerError, OracleError};

use super::{
    GasEstimator, PriceOracle, TradeExecutor, TradeLedger, TradeReceipt, TradeRequest,
    TransactionRecord,
};

/// Configuration for mock oracle behavior.
#[derive(Debug, Clone, Default)]
pub struct MockOracleConfig {
    /// Whether every price request fails as unavailable.
    pub fail_all: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock price oracle backed by an in-memory price table.
#[derive(Debug, Clone, Default)]
pub struct MockPriceOracle {
    config: MockOracleConfig,
    /// Prices keyed by (chain, token).
    prices: Arc<DashMap<(String, String), Decimal>>,
    /// Chains whose oracle is down.
    dark_chains: Arc<DashMap<String, ()>>,
    /// Total number of price calls served or failed.
    calls: Arc<AtomicU64>,
}

impl MockPriceOracle {
    /// Create a new mock oracle with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock oracle with custom configuration.
    pub fn with_config(config: MockOracleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the price for a chain/token combination.
    pub fn set_price(&self, chain: &str, token: &str, price: Decimal) {
        self.prices
            .insert((chain.to_string(), token.to_string()), price);
    }

    /// Mark a chain's oracle as unavailable.
    pub fn set_chain_dark(&self, chain: &str) {
        self.dark_chains.insert(chain.to_string(), ());
    }

    /// Restore a previously darkened chain.
    pub fn restore_chain(&self, chain: &str) {
        self.dark_chains.remove(chain);
    }

    /// Number of price calls made so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceOracle for MockPriceOracle {
    async fn price(&self, chain: &str, token: &str) -> Result<Decimal, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_all || self.dark_chains.contains_key(chain) {
            return Err(OracleError::PriceUnavailable {
                chain: chain.to_string(),
                token: token.to_string(),
            });
        }

        self.prices
            .get(&(chain.to_string(), token.to_string()))
            .map(|p| *p)
            .ok_or_else(|| OracleError::PriceUnavailable {
                chain: chain.to_string(),
                token: token.to_string(),
            })
    }
}

/// Mock gas estimator with a flat default and per-route overrides.
#[derive(Debug, Clone)]
pub struct MockGasEstimator {
    /// Estimate returned when no route override matches.
    default_estimate: Decimal,
    /// Overrides keyed by "source->target".
    routes: Arc<DashMap<String, Decimal>>,
    /// Whether every estimate request fails.
    fail_all: bool,
}

impl MockGasEstimator {
    /// Create an estimator returning `default_estimate` for all routes.
    pub fn new(default_estimate: Decimal) -> Self {
        Self {
            default_estimate,
            routes: Arc::new(DashMap::new()),
            fail_all: false,
        }
    }

    /// Create an estimator that fails every request.
    pub fn failing() -> Self {
        Self {
            default_estimate: Decimal::ZERO,
            routes: Arc::new(DashMap::new()),
            fail_all: true,
        }
    }

    /// Override the estimate for one route.
    pub fn set_route(&self, source: &str, target: &str, estimate: Decimal) {
        self.routes
            .insert(format!("{}->{}", source, target), estimate);
    }
}

#[async_trait]
impl GasEstimator for MockGasEstimator {
    async fn estimate(
        &self,
        source: &ChainInfo,
        target: &ChainInfo,
        _token: &str,
    ) -> Result<Decimal, OracleError> {
        if self.fail_all {
            return Err(OracleError::GasUnavailable {
                source_chain: source.name.clone(),
                target_chain: target.name.clone(),
            });
        }

        let key = format!("{}->{}", source.name, target.name);
        Ok(self
            .routes
            .get(&key)
            .map(|e| *e)
            .unwrap_or(self.default_estimate))
    }
}

/// Configuration for mock executor behavior.
#[derive(Debug, Clone, Default)]
pub struct MockExecutorConfig {
    /// Whether executions fail.
    pub fail: bool,
    /// Whether executions are rejected outright.
    pub reject: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
    /// Profit reported per successful execution.
    pub profit_per_trade: Decimal,
    /// Gas reported per successful execution.
    pub gas_per_trade: Decimal,
}

/// Mock trade executor that records every request.
#[derive(Debug, Clone, Default)]
pub struct MockTradeExecutor {
    config: MockExecutorConfig,
    /// All requests seen, in order.
    requests: Arc<Mutex<Vec<TradeRequest>>>,
    /// Monotonic counter for deterministic tx hashes.
    sequence: Arc<AtomicU64>,
}

impl MockTradeExecutor {
    /// Create a mock executor that succeeds with the given profit.
    pub fn succeeding(profit_per_trade: Decimal) -> Self {
        Self {
            config: MockExecutorConfig {
                profit_per_trade,
                gas_per_trade: Decimal::ONE,
                ..Default::default()
            },
            ..Self::default()
        }
    }

    /// Create a mock executor with custom configuration.
    pub fn with_config(config: MockExecutorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a mock executor that fails every execution.
    pub fn failing() -> Self {
        Self::with_config(MockExecutorConfig {
            fail: true,
            ..Default::default()
        })
    }

    /// Number of executions attempted.
    pub fn execution_count(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Snapshot of all requests seen so far.
    pub fn requests(&self) -> Vec<TradeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradeExecutor for MockTradeExecutor {
    async fn execute(&self, request: &TradeRequest) -> Result<TradeReceipt, ExecutionError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.reject {
            return Err(ExecutionError::Rejected {
                reason: "mock rejection".to_string(),
            });
        }

        if self.config.fail {
            return Err(ExecutionError::Failed {
                reason: "mock execution failure".to_string(),
            });
        }

        Ok(TradeReceipt {
            profit: self.config.profit_per_trade,
            gas_used: self.config.gas_per_trade,
            tx_hash: format!("0xmock{:016x}", seq),
            executed_at: OffsetDateTime::now_utc(),
        })
    }
}

/// In-memory ledger double.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: Arc<Mutex<Vec<TransactionRecord>>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded transactions.
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl TradeLedger for InMemoryLedger {
    async fn record(&self, record: TransactionRecord) -> Result<(), LedgerError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}
