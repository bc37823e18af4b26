//! Swarm coordination module.
//!
//! This module handles:
//! - The shared best-opportunity board and swarm-wide totals
//! - Agent-selection scoring and trade assignment
//! - The adaptive risk-control loop

pub mod coordinator;
pub mod state;

pub use coordinator::{evaluate_agent_for_trade, RiskAdjustment, SwarmCoordinator, TradeAssignment};
pub use state::{SwarmState, SwarmStats};
