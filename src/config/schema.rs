//! Configuration schema definitions.
//!
//! This module defines the tunable configuration for a bundler run.
//! All types derive Serde traits for deserialization from config files.
//! Secrets and transfer parameters never live here; see [`crate::config::env`].

use serde::{Deserialize, Serialize};

/// Root configuration for the bundler.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BundlerConfig {
    /// Chain RPC settings.
    pub chain: ChainConfig,

    /// Private relay settings.
    pub relay: RelayConfig,

    /// Gas pricing and limits.
    pub gas: GasConfig,

    /// Workflow timing (target block offset, confirmation polling).
    pub workflow: WorkflowConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL. `{api_key}` is replaced with `ALCHEMY_API_KEY`.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (1 for Ethereum mainnet).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://eth-mainnet.g.alchemy.com/v2/{api_key}".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
        }
    }
}

impl ChainConfig {
    /// Primary RPC URL with the API key substituted in.
    pub fn resolved_rpc_url(&self, api_key: &str) -> String {
        self.rpc_url.replace("{api_key}", api_key)
    }
}

/// Private relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay JSON-RPC endpoint.
    pub url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: "https://relay.flashbots.net".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Where the shared bundle gas price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GasPriceMode {
    /// `BASE_GAS_PRICE` (gwei) times the multiplier, fixed at startup.
    Static,
    /// Node-reported `eth_gasPrice` times the multiplier.
    Live,
}

/// Gas configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Gas price source.
    pub source: GasPriceMode,

    /// Integer multiplier applied to the gas price basis.
    pub price_multiplier: u64,

    /// Gas limit for the funding (plain value) transfer.
    pub funding_gas_limit: u64,

    /// Gas limit for the spender's token transfer.
    pub spender_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            source: GasPriceMode::Static,
            price_multiplier: 3,
            funding_gas_limit: 21_000,
            spender_gas_limit: 100_000,
        }
    }
}

/// Workflow timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Blocks ahead of the current height the bundle targets.
    pub target_block_offset: u64,

    /// Interval between chain height polls while confirming, in milliseconds.
    pub poll_interval_ms: u64,

    /// Extra blocks tolerated past the target before giving up on resolution.
    pub grace_blocks: u64,

    /// Expected block time in seconds, used to bound the confirmation wait.
    pub block_time_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            target_block_offset: 3,
            poll_interval_ms: 2_000,
            grace_blocks: 2,
            block_time_secs: 12,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
