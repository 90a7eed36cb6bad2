//! Secrets and transfer parameters from environment variables.
//!
//! # Security
//! - Private keys are read ONLY from the environment
//! - `Debug` output redacts key material

use alloy::primitives::Address;

use crate::config::loader::ConfigError;

pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
pub const GAS_TANK_PRIVATE_KEY: &str = "GAS_TANK_PRIVATE_KEY";
pub const USER_PRIVATE_KEY: &str = "USER_PRIVATE_KEY";
pub const BASE_GAS_PRICE: &str = "BASE_GAS_PRICE";
pub const TOKEN_ADDRESS: &str = "TOKEN_ADDRESS";
pub const TRANSFER_AMOUNT: &str = "TRANSFER_AMOUNT";
pub const RECIPIENT: &str = "RECIPIENT";

/// Key material for the two participants plus the RPC API key.
#[derive(Clone)]
pub struct Secrets {
    /// RPC provider API key.
    pub api_key: String,
    /// Funding ("gas tank") key, also used to authenticate with the relay.
    pub funding_key: String,
    /// Spender ("user") key that sends the token transfer.
    pub spender_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &"<redacted>")
            .field("funding_key", &"<redacted>")
            .field("spender_key", &"<redacted>")
            .finish()
    }
}

/// What to transfer, to whom, and the gas price basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    /// Base gas price in gwei, as a decimal string (e.g. "12.5").
    pub base_gas_price_gwei: String,
    /// Token contract.
    pub token: Address,
    /// Human-readable amount, scaled by the token's decimals at build time.
    pub amount: String,
    /// Recipient of the token transfer. Parsed when the transfer is built.
    pub recipient: String,
}

/// Everything the process reads from its environment.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub secrets: Secrets,
    pub transfer: TransferParams,
}

impl EnvConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let load = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };

        let secrets = Secrets {
            api_key: load(ALCHEMY_API_KEY)?,
            funding_key: load(GAS_TANK_PRIVATE_KEY)?,
            spender_key: load(USER_PRIVATE_KEY)?,
        };

        let token = load(TOKEN_ADDRESS)?
            .parse::<Address>()
            .map_err(|e| ConfigError::invalid_env(TOKEN_ADDRESS, e))?;

        let transfer = TransferParams {
            base_gas_price_gwei: load(BASE_GAS_PRICE)?,
            token,
            amount: load(TRANSFER_AMOUNT)?,
            recipient: load(RECIPIENT)?,
        };

        Ok(Self { secrets, transfer })
    }
}
