//! Opportunity scanner module.
//!
//! This module handles:
//! - Opportunity value types and lifecycle
//! - Pure per-combination profitability math
//! - The concurrent cross-chain scan
//! - Opportunity filtering for outer layers

pub mod calculator;
pub mod scan;
pub mod types;

pub use calculator::{confidence_score, evaluate_combination, relative_price_difference};
pub use scan::find_opportunities;
pub use types::{
    filter_opportunities, ArbitrageOpportunity, ArbitrageType, OpportunityFilter, OpportunityStage,
};
