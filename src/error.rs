//! Unified error types for the swarm arbitrage engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the swarm arbitrage engine.
#[derive(Error, Debug)]
pub enum SwarmError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Price/gas oracle error.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Opportunity scan error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Trade execution error.
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Transaction ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Price and gas oracle errors.
///
/// A failing oracle call never aborts a scan; the affected chain/token
/// combination is skipped and the rest of the cycle proceeds.
#[derive(Error, Debug)]
pub enum OracleError {
    /// Oracle has no price data for a chain/token combination.
    #[error("price unavailable for {token} on {chain}")]
    PriceUnavailable {
        /// Chain that was queried.
        chain: String,
        /// Token symbol that was queried.
        token: String,
    },

    /// Oracle returned a non-positive price.
    #[error("invalid price {price} for {token} on {chain}")]
    InvalidPrice {
        /// Chain that was queried.
        chain: String,
        /// Token symbol that was queried.
        token: String,
        /// The rejected price.
        price: Decimal,
    },

    /// Gas estimate unavailable for a chain pair.
    #[error("gas estimate unavailable for {source_chain} -> {target_chain}")]
    GasUnavailable {
        /// Source chain name.
        source_chain: String,
        /// Target chain name.
        target_chain: String,
    },

    /// Call exceeded its deadline even after one retry.
    #[error("oracle call timed out after {deadline_ms}ms (one retry)")]
    Timeout {
        /// The per-attempt deadline in milliseconds.
        deadline_ms: u64,
    },

    /// HTTP request failed.
    #[error("oracle http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse oracle response.
    #[error("failed to parse oracle response: {0}")]
    ParseError(String),
}

/// Opportunity scan errors.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Malformed scan request.
    #[error("invalid scan parameters: {0}")]
    InvalidParameters(String),

    /// Referenced chain is not in the registry.
    #[error("unknown chain: {name}")]
    UnknownChain {
        /// The chain name that was not found.
        name: String,
    },
}

/// Trade execution errors.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Re-verification at execution time fell below the profit threshold.
    /// No agent state is mutated when this is returned.
    #[error("stale opportunity: re-verified diff {recomputed_diff} < threshold {threshold}")]
    StaleOpportunity {
        /// Price difference recomputed from fresh oracle reads.
        recomputed_diff: Decimal,
        /// The agent's minimum profit threshold.
        threshold: Decimal,
    },

    /// Fresh oracle reads were unavailable during re-verification.
    /// No agent state is mutated when this is returned.
    #[error("re-verification failed: {0}")]
    ReverificationFailed(#[from] OracleError),

    /// The external executor reported failure. Recorded as a failed
    /// trade, not fatal to the swarm.
    #[error("trade execution failed: {reason}")]
    Failed {
        /// Failure reason from the executor.
        reason: String,
    },

    /// The external executor rejected the request outright.
    #[error("trade rejected: {reason}")]
    Rejected {
        /// Rejection reason from the executor.
        reason: String,
    },

    /// Executor call exceeded its deadline even after one retry.
    #[error("executor call timed out after {deadline_ms}ms (one retry)")]
    Timeout {
        /// The per-attempt deadline in milliseconds.
        deadline_ms: u64,
    },

    /// Malformed execution request.
    #[error("invalid execution parameters: {0}")]
    InvalidParams(String),
}

/// Transaction ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to record an executed transaction.
    #[error("failed to record transaction {opportunity_id}: {reason}")]
    RecordFailed {
        /// Opportunity the transaction belongs to.
        opportunity_id: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, SwarmError>;
