//! Chain metadata types for participating networks.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Static description of one participating chain.
///
/// Immutable to the core; refreshed periodically by an external feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Chain name (e.g., "ethereum").
    pub name: String,
    /// Reference gas price in gwei.
    pub gas_price_gwei: Decimal,
    /// Bridge contract address on this chain.
    pub bridge_address: String,
    /// Token symbols supported on this chain, kept sorted for
    /// deterministic iteration.
    pub supported_tokens: BTreeSet<String>,
}

impl ChainInfo {
    /// Create chain info from a token list.
    pub fn new(
        name: impl Into<String>,
        gas_price_gwei: Decimal,
        bridge_address: impl Into<String>,
        tokens: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            gas_price_gwei,
            bridge_address: bridge_address.into(),
            supported_tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Check whether a token is supported on this chain.
    pub fn supports(&self, token: &str) -> bool {
        self.supported_tokens.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn chain_info_supports_token() {
        let chain = ChainInfo::new("ethereum", dec!(30), "0xbridge", &["WETH", "USDC"]);

        assert!(chain.supports("USDC"));
        assert!(chain.supports("WETH"));
        assert!(!chain.supports("DOGE"));
    }

    #[test]
    fn supported_tokens_iterate_sorted() {
        let chain = ChainInfo::new("polygon", dec!(80), "0xbridge", &["USDT", "MATIC", "USDC"]);

        let tokens: Vec<&str> = chain.supported_tokens.iter().map(String::as_str).collect();
        assert_eq!(tokens, vec!["MATIC", "USDC", "USDT"]);
    }
}
