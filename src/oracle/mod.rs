//! External collaborator interfaces.
//!
//! The core never talks to chain RPCs, DEX routers, or databases
//! directly. Everything it consumes arrives through the narrow traits in
//! this module, injected at construction time:
//! - [`PriceOracle`]: token price per chain
//! - [`GasEstimator`]: cross-chain trade cost estimate
//! - [`TradeExecutor`]: cross-chain trade execution
//! - [`TradeLedger`]: executed-transaction recording
//!
//! HTTP-backed implementations live in [`client`], test doubles in
//! [`mock`].

pub mod client;
pub mod mock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::chain::ChainInfo;
use crate::error::{ExecutionError, LedgerError, OracleError};

pub use client::{ExecutorClient, LedgerClient, OracleClient};
pub use mock::{
    InMemoryLedger, MockExecutorConfig, MockGasEstimator, MockOracleConfig, MockPriceOracle,
    MockTradeExecutor,
};

/// Price source for a token on a chain.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current price of `token` on `chain`. Always positive on success.
    async fn price(&self, chain: &str, token: &str) -> Result<Decimal, OracleError>;
}

/// Cost estimator for a cross-chain trade.
#[async_trait]
pub trait GasEstimator: Send + Sync {
    /// Estimated total gas cost of moving `token` from `source` to
    /// `target`. Non-negative on success.
    async fn estimate(
        &self,
        source: &ChainInfo,
        target: &ChainInfo,
        token: &str,
    ) -> Result<Decimal, OracleError>;
}

/// Executes a cross-chain trade on behalf of an agent.
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Execute the trade described by `request`.
    async fn execute(&self, request: &TradeRequest) -> Result<TradeReceipt, ExecutionError>;
}

/// Records executed transactions with the external ledger.
#[async_trait]
pub trait TradeLedger: Send + Sync {
    /// Record one executed transaction.
    async fn record(&self, record: TransactionRecord) -> Result<(), LedgerError>;
}

/// Cross-chain trade request handed to the executor.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRequest {
    /// Source chain metadata (name, bridge address).
    pub source_chain: ChainInfo,
    /// Target chain metadata.
    pub target_chain: ChainInfo,
    /// Token symbol being traded.
    pub token: String,
    /// Position size as a fraction of the agent's portfolio.
    pub amount: Decimal,
}

/// Successful trade execution receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeReceipt {
    /// Realized profit (may be negative on adverse fills).
    pub profit: Decimal,
    /// Gas actually spent.
    pub gas_used: Decimal,
    /// Transaction hash reported by the executor.
    pub tx_hash: String,
    /// When the trade settled.
    #[serde(with = "time::serde::rfc3339")]
    pub executed_at: OffsetDateTime,
}

/// Executed transaction as recorded with the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    /// Opportunity the transaction realized.
    pub opportunity_id: String,
    /// Transaction hash.
    pub tx_hash: String,
    /// When the trade settled.
    #[serde(with = "time::serde::rfc3339")]
    pub executed_at: OffsetDateTime,
    /// Realized profit.
    pub profit: Decimal,
}
