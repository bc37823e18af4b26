//! Autonomous trading agents.
//!
//! This module handles:
//! - Per-agent risk parameters and performance tracking
//! - Trade execution with stale-opportunity re-verification
//! - The per-agent single-execution-slot discipline

pub mod agent;
pub mod types;

pub use agent::{Agent, TradeOutcome, BACKLOG_CAPACITY};
pub use types::{AgentPerformance, RiskParameters};
