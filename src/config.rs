//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Collaborator Endpoints ===
    /// Base URL of the price/gas oracle service.
    #[serde(default = "default_oracle_url")]
    pub oracle_url: String,

    /// Base URL of the cross-chain trade execution service.
    #[serde(default = "default_executor_url")]
    pub executor_url: String,

    /// Optional chain-metadata feed URL (falls back to built-in chains).
    #[serde(default)]
    pub registry_feed_url: Option<String>,

    // === Swarm Parameters ===
    /// Number of agents in the swarm.
    #[serde(default = "default_agent_count")]
    pub agent_count: usize,

    /// Capacity of the shared best-opportunity board (top-K by profit).
    #[serde(default = "default_board_capacity")]
    pub shared_board_capacity: usize,

    /// Milliseconds between opportunity scan cycles.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,

    /// Run the adaptive risk-control loop every N scan cycles.
    #[serde(default = "default_risk_update_cycles")]
    pub risk_update_cycles: u64,

    // === Initial Risk Parameters (per agent) ===
    /// Maximum position size as a fraction of portfolio (0-1).
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,

    /// Minimum relative price difference to act on (fraction).
    #[serde(default = "default_min_profit_threshold")]
    pub min_profit_threshold: Decimal,

    /// Maximum acceptable gas cost per trade.
    #[serde(default = "default_max_gas_price")]
    pub max_gas_price: Decimal,

    /// Minimum opportunity confidence to act on (0-1).
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: Decimal,

    // === Collaborator Call Discipline ===
    /// Per-attempt deadline for oracle/executor calls in milliseconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,

    /// HTTP connection pool size per host.
    #[serde(default = "default_pool_size")]
    pub http_pool_size: usize,

    // === Operation Modes ===
    /// Simulation mode (mock executor, no real trades).
    #[serde(default = "default_true")]
    pub dry_run: bool,

    // === Server Configuration ===
    /// HTTP server port for health/status endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to expose Prometheus metrics.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_oracle_url() -> String {
    "http://localhost:9100".to_string()
}

fn default_executor_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_agent_count() -> usize {
    4
}

fn default_board_capacity() -> usize {
    32
}

fn default_scan_interval() -> u64 {
    5_000
}

fn default_risk_update_cycles() -> u64 {
    10
}

fn default_max_position_size() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn default_min_profit_threshold() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

fn default_max_gas_price() -> Decimal {
    Decimal::new(50, 0)
}

fn default_confidence_threshold() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

fn default_call_timeout() -> u64 {
    2_000
}

fn default_pool_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8080
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.agent_count == 0 {
            return Err("AGENT_COUNT must be at least 1".to_string());
        }

        if self.shared_board_capacity == 0 {
            return Err("SHARED_BOARD_CAPACITY must be at least 1".to_string());
        }

        if self.max_position_size <= Decimal::ZERO || self.max_position_size > Decimal::ONE {
            return Err("MAX_POSITION_SIZE must be in (0, 1]".to_string());
        }

        if self.min_profit_threshold <= Decimal::ZERO {
            return Err("MIN_PROFIT_THRESHOLD must be positive".to_string());
        }

        if self.max_gas_price <= Decimal::ZERO {
            return Err("MAX_GAS_PRICE must be positive".to_string());
        }

        if self.confidence_threshold <= Decimal::ZERO || self.confidence_threshold > Decimal::ONE {
            return Err("CONFIDENCE_THRESHOLD must be in (0, 1]".to_string());
        }

        if self.call_timeout_ms == 0 {
            return Err("CALL_TIMEOUT_MS must be positive".to_string());
        }

        Ok(())
    }

    /// Initial risk parameters every agent starts from.
    pub fn initial_risk_params(&self) -> crate::agent::RiskParameters {
        crate::agent::RiskParameters {
            max_position_size: self.max_position_size,
            min_profit_threshold: self.min_profit_threshold,
            max_gas_price: self.max_gas_price,
            confidence_threshold: self.confidence_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            oracle_url: default_oracle_url(),
            executor_url: default_executor_url(),
            registry_feed_url: None,
            agent_count: default_agent_count(),
            shared_board_capacity: default_board_capacity(),
            scan_interval_ms: default_scan_interval(),
            risk_update_cycles: default_risk_update_cycles(),
            max_position_size: default_max_position_size(),
            min_profit_threshold: default_min_profit_threshold(),
            max_gas_price: default_max_gas_price(),
            confidence_threshold: default_confidence_threshold(),
            call_timeout_ms: default_call_timeout(),
            http_pool_size: default_pool_size(),
            dry_run: true,
            port: default_port(),
            metrics_enabled: true,
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_max_position_size(), Decimal::new(1, 1));
        assert_eq!(default_min_profit_threshold(), Decimal::new(2, 2));
        assert_eq!(default_agent_count(), 4);
        assert_eq!(default_board_capacity(), 32);
        assert!(default_true());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_agents() {
        let mut config = base_config();
        config.agent_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_position_size_above_one() {
        let mut config = base_config();
        config.max_position_size = Decimal::new(15, 1); // 1.5
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_thresholds() {
        let mut config = base_config();
        config.min_profit_threshold = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.max_gas_price = Decimal::new(-1, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn initial_risk_params_mirror_config() {
        let config = base_config();
        let params = config.initial_risk_params();
        assert_eq!(params.max_position_size, config.max_position_size);
        assert_eq!(params.min_profit_threshold, config.min_profit_threshold);
        assert_eq!(params.max_gas_price, config.max_gas_price);
        assert_eq!(params.confidence_threshold, config.confidence_threshold);
    }
}
