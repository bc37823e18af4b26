//! Swarm-coordinated cross-chain arbitrage engine.
//!
//! This library discovers price discrepancies for a token between
//! distinct blockchain networks and coordinates a pool of autonomous
//! agents to evaluate, claim, and execute the most profitable
//! discrepancies while adapting its own risk appetite from observed
//! outcomes.
//!
//! # Strategy
//!
//! A token quoted at different prices on two chains is profitable to
//! arbitrage when the spread survives the bridge gas cost:
//!
//! ```text
//! USDC on chain A:  $100.00
//! USDC on chain B:  $110.00
//! ────────────────────────
//! Spread:           $10.00
//! Gas estimate:     $2.00
//! Net profit:       $8.00 per unit ✅
//! ```
//!
//! Every scan cycle fans out over all chain pairs, the best finds land
//! on a shared board, the coordinator assigns them to the fittest
//! agent, and trade outcomes feed a multiplicative risk-control loop
//! that tightens or loosens every agent's thresholds.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`chain`]: Chain registry and metadata
//! - [`oracle`]: External collaborator interfaces (oracle, executor, ledger)
//! - [`scanner`]: Opportunity discovery and filtering
//! - [`agent`]: Autonomous agents with risk parameters
//! - [`swarm`]: Coordinator, shared board, and adaptive risk control
//! - [`api`]: HTTP API for health/status
//! - [`utils`]: Utility functions

pub mod agent;
pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod metrics;
pub mod oracle;
pub mod scanner;
pub mod swarm;
pub mod utils;

pub use config::Config;
pub use error::{Result, SwarmError};
