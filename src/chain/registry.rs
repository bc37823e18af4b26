//! Read-only registry of participating chains.

use serde::Deserialize;
use smallvec::SmallVec;
use tracing::{debug, info, instrument, warn};

use super::types::ChainInfo;
use crate::error::SwarmError;

/// Read-only set of participating chains.
///
/// Registration order is preserved so that scan output is deterministic
/// for a given registry.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: Vec<ChainInfo>,
}

impl ChainRegistry {
    /// Create a registry from a list of chains. Later duplicates of a
    /// chain name are ignored.
    pub fn new(chains: Vec<ChainInfo>) -> Self {
        let mut registry = Self { chains: Vec::new() };
        for chain in chains {
            registry.insert(chain);
        }
        registry
    }

    /// Built-in default chain set used when no metadata feed is
    /// configured or the feed is unreachable.
    pub fn builtin() -> Self {
        use rust_decimal::Decimal;

        Self::new(vec![
            ChainInfo::new(
                "ethereum",
                Decimal::new(30, 0),
                "0x3ee18B2214AFF97000D974cf647E7C347E8fa585",
                &["WETH", "USDC", "USDT", "WBTC", "DAI"],
            ),
            ChainInfo::new(
                "polygon",
                Decimal::new(80, 0),
                "0x5a58505a96D1dbf8dF91cB21B54419FC36e93fdE",
                &["WETH", "USDC", "USDT", "WBTC", "MATIC"],
            ),
            ChainInfo::new(
                "arbitrum",
                Decimal::new(1, 1),
                "0x0b2402144Bb366A632D14B83F244D2e0e21bD39c",
                &["WETH", "USDC", "USDT", "ARB"],
            ),
            ChainInfo::new(
                "optimism",
                Decimal::new(1, 3),
                "0x1a2a1c938CE3eC39b6D47113c7955bAa9DD454F2",
                &["WETH", "USDC", "DAI", "OP"],
            ),
            ChainInfo::new(
                "avalanche",
                Decimal::new(25, 0),
                "0x0e082F06FF657D94310cB8cE8B0D9a04541d8052",
                &["WETH", "USDC", "USDT", "AVAX"],
            ),
        ])
    }

    fn insert(&mut self, chain: ChainInfo) {
        if self.get(&chain.name).is_some() {
            warn!(chain = %chain.name, "Duplicate chain ignored");
            return;
        }
        self.chains.push(chain);
    }

    /// Look up a chain by name.
    pub fn get(&self, name: &str) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.name == name)
    }

    /// All chains in registration order.
    pub fn chains(&self) -> &[ChainInfo] {
        &self.chains
    }

    /// Number of registered chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Every ordered pair of distinct chains, in registration order.
    pub fn chain_pairs(&self) -> impl Iterator<Item = (&ChainInfo, &ChainInfo)> {
        self.chains.iter().flat_map(move |source| {
            self.chains
                .iter()
                .filter(move |target| target.name != source.name)
                .map(move |target| (source, target))
        })
    }

    /// Tokens supported on both chains, in sorted order.
    pub fn common_tokens<'a>(
        &self,
        source: &'a ChainInfo,
        target: &ChainInfo,
    ) -> SmallVec<[&'a str; 8]> {
        source
            .supported_tokens
            .iter()
            .filter(|t| target.supports(t))
            .map(String::as_str)
            .collect()
    }
}

/// Chain entry as served by the metadata feed.
#[derive(Debug, Clone, Deserialize)]
struct ChainFeedEntry {
    /// Chain name.
    name: String,
    /// Reference gas price in gwei.
    #[serde(rename = "gasPriceGwei")]
    gas_price_gwei: rust_decimal::Decimal,
    /// Bridge contract address.
    #[serde(rename = "bridgeAddress")]
    bridge_address: String,
    /// Supported token symbols.
    tokens: Vec<String>,
}

/// Fetch the chain registry from an external metadata feed.
#[instrument(skip(client))]
pub async fn fetch_registry(
    client: &reqwest::Client,
    feed_url: &str,
) -> Result<ChainRegistry, SwarmError> {
    let response = client.get(feed_url).send().await?;

    if !response.status().is_success() {
        return Err(SwarmError::Scan(crate::error::ScanError::InvalidParameters(
            format!("registry feed returned HTTP {}", response.status()),
        )));
    }

    let entries: Vec<ChainFeedEntry> = response.json().await?;
    debug!(count = entries.len(), "Fetched chain feed entries");

    let chains = entries
        .into_iter()
        .map(|e| ChainInfo {
            name: e.name,
            gas_price_gwei: e.gas_price_gwei,
            bridge_address: e.bridge_address,
            supported_tokens: e.tokens.into_iter().collect(),
        })
        .collect();

    let registry = ChainRegistry::new(chains);
    info!(chains = registry.len(), "Chain registry refreshed from feed");
    Ok(registry)
}

/// Load the registry from the configured feed, falling back to the
/// built-in chain set when the feed is absent or unreachable.
pub async fn load_registry(
    client: &reqwest::Client,
    feed_url: Option<&str>,
) -> ChainRegistry {
    match feed_url {
        Some(url) => match fetch_registry(client, url).await {
            Ok(registry) if !registry.is_empty() => registry,
            Ok(_) => {
                warn!("Registry feed returned no chains, using built-in set");
                ChainRegistry::builtin()
            }
            Err(e) => {
                warn!(error = %e, "Registry feed unreachable, using built-in set");
                ChainRegistry::builtin()
            }
        },
        None => ChainRegistry::builtin(),
    }
}
