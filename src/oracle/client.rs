//! HTTP-backed collaborator clients.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::chain::ChainInfo;
use crate::config::Config;
use crate::error::{ExecutionError, LedgerError, OracleError};

use super::{
    GasEstimator, PriceOracle, TradeExecutor, TradeLedger, TradeReceipt, TradeRequest,
    TransactionRecord,
};

/// Build the shared HTTP client with low-latency settings.
fn build_http(config: &Config) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(config.call_timeout_ms))
        .connect_timeout(std::time::Duration::from_millis(500))
        .tcp_nodelay(true)
        .tcp_keepalive(std::time::Duration::from_secs(30))
        .pool_max_idle_per_host(config.http_pool_size)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .expect("failed to create HTTP client")
}

/// Price response from the oracle service.
#[derive(Debug, Clone, Deserialize)]
struct PriceResponse {
    /// Price as a decimal string.
    price: Option<String>,
}

/// Gas estimate response from the oracle service.
#[derive(Debug, Clone, Deserialize)]
struct GasResponse {
    /// Estimate as a decimal string.
    estimate: Option<String>,
}

/// HTTP client for the price/gas oracle service.
#[derive(Debug, Clone)]
pub struct OracleClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the oracle service.
    base_url: String,
}

impl OracleClient {
    /// Create a new oracle client from config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: build_http(config),
            base_url: config.oracle_url.clone(),
        }
    }

    /// Get the HTTP client reference.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Get the oracle base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PriceOracle for OracleClient {
    #[instrument(skip(self), fields(chain = %chain, token = %token))]
    async fn price(&self, chain: &str, token: &str) -> Result<Decimal, OracleError> {
        let url = format!("{}/price", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("chain", chain), ("token", token)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(OracleError::PriceUnavailable {
                chain: chain.to_string(),
                token: token.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(OracleError::ParseError(format!(
                "price endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::ParseError(format!("failed to parse price: {}", e)))?;

        let price: Decimal = body
            .price
            .as_deref()
            .ok_or_else(|| OracleError::PriceUnavailable {
                chain: chain.to_string(),
                token: token.to_string(),
            })?
            .parse()
            .map_err(|e| OracleError::ParseError(format!("bad price decimal: {}", e)))?;

        if price <= Decimal::ZERO {
            return Err(OracleError::InvalidPrice {
                chain: chain.to_string(),
                token: token.to_string(),
                price,
            });
        }

        debug!(price = %price, "Retrieved price");
        Ok(price)
    }
}

#[async_trait]
impl GasEstimator for OracleClient {
    #[instrument(skip(self, source, target), fields(source = %source.name, target = %target.name, token = %token))]
    async fn estimate(
        &self,
        source: &ChainInfo,
        target: &ChainInfo,
        token: &str,
    ) -> Result<Decimal, OracleError> {
        let url = format!("{}/gas", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("source", source.name.as_str()),
                ("target", target.name.as_str()),
                ("token", token),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::GasUnavailable {
                source_chain: source.name.clone(),
                target_chain: target.name.clone(),
            });
        }

        let body: GasResponse = response
            .json()
            .await
            .map_err(|e| OracleError::ParseError(format!("failed to parse gas estimate: {}", e)))?;

        let estimate: Decimal = body
            .estimate
            .as_deref()
            .ok_or_else(|| OracleError::GasUnavailable {
                source_chain: source.name.clone(),
                target_chain: target.name.clone(),
            })?
            .parse()
            .map_err(|e| OracleError::ParseError(format!("bad gas decimal: {}", e)))?;

        if estimate < Decimal::ZERO {
            return Err(OracleError::ParseError(format!(
                "negative gas estimate {}",
                estimate
            )));
        }

        debug!(estimate = %estimate, "Retrieved gas estimate");
        Ok(estimate)
    }
}

/// HTTP client for the cross-chain trade execution service.
#[derive(Debug, Clone)]
pub struct ExecutorClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the execution service.
    base_url: String,
}

impl ExecutorClient {
    /// Create a new executor client from config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: build_http(config),
            base_url: config.executor_url.clone(),
        }
    }
}

#[async_trait]
impl TradeExecutor for ExecutorClient {
    #[instrument(skip(self, request), fields(token = %request.token, source = %request.source_chain.name, target = %request.target_chain.name))]
    async fn execute(&self, request: &TradeRequest) -> Result<TradeReceipt, ExecutionError> {
        let url = format!("{}/execute", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ExecutionError::Failed {
                reason: format!("executor request failed: {}", e),
            })?;

        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let reason = response.text().await.unwrap_or_default();
            return Err(ExecutionError::Rejected { reason });
        }

        if !response.status().is_success() {
            return Err(ExecutionError::Failed {
                reason: format!("executor returned HTTP {}", response.status()),
            });
        }

        let receipt: TradeReceipt = response.json().await.map_err(|e| ExecutionError::Failed {
            reason: format!("failed to parse receipt: {}", e),
        })?;

        debug!(tx_hash = %receipt.tx_hash, profit = %receipt.profit, "Trade executed");
        Ok(receipt)
    }
}

/// HTTP client for the external transaction ledger.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the ledger service.
    base_url: String,
}

impl LedgerClient {
    /// Create a new ledger client pointing at the executor service,
    /// which also fronts transaction history.
    pub fn new(config: &Config) -> Self {
        Self {
            http: build_http(config),
            base_url: config.executor_url.clone(),
        }
    }
}

#[async_trait]
impl TradeLedger for LedgerClient {
    #[instrument(skip(self, record), fields(opportunity_id = %record.opportunity_id))]
    async fn record(&self, record: TransactionRecord) -> Result<(), LedgerError> {
        let url = format!("{}/transactions", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| LedgerError::RecordFailed {
                opportunity_id: record.opportunity_id.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LedgerError::RecordFailed {
                opportunity_id: record.opportunity_id,
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            oracle_url: "http://localhost:9100".to_string(),
            executor_url: "http://localhost:9200".to_string(),
            registry_feed_url: None,
            agent_count: 4,
            shared_board_capacity: 32,
            scan_interval_ms: 5_000,
            risk_update_cycles: 10,
            max_position_size: Decimal::new(1, 1),
            min_profit_threshold: Decimal::new(2, 2),
            max_gas_price: Decimal::new(50, 0),
            confidence_threshold: Decimal::new(5, 1),
            call_timeout_ms: 2_000,
            http_pool_size: 10,
            dry_run: true,
            port: 8080,
            metrics_enabled: true,
            metrics_port: 9090,
            rust_log: "info".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn oracle_client_creation_works() {
        let client = OracleClient::new(&test_config());
        assert_eq!(client.base_url(), "http://localhost:9100");
    }
}
