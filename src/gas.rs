//! Gas price sources.
//!
//! A run resolves its gas price exactly once, before building, and uses that
//! one value for every bundle entry. Swapping the source does not touch the
//! workflow's state machine.

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::U256;
use std::future::Future;

use crate::blockchain::ChainReader;
use crate::bundle::builder::fractional_digits;
use crate::config::{GasConfig, GasPriceMode};
use crate::error::{BundlerError, BundlerResult};

/// Decimal places in one gwei.
const GWEI_DECIMALS: usize = 9;

/// Produces the gas price (wei) shared by every entry of a bundle.
pub trait GasPriceSource: Send + Sync {
    fn gas_price(&self) -> impl Future<Output = BundlerResult<u128>> + Send;
}

/// A fixed price: the configured gwei basis times an integer multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGasPrice {
    wei: u128,
}

impl StaticGasPrice {
    pub const fn from_wei(wei: u128) -> Self {
        Self { wei }
    }

    /// Parse a decimal gwei string (e.g. "12.5") and apply `multiplier`.
    pub fn from_gwei(base_gwei: &str, multiplier: u64) -> BundlerResult<Self> {
        if fractional_digits(base_gwei) > GWEI_DECIMALS {
            return Err(BundlerError::Configuration(format!(
                "gas price basis {:?} is finer than 1 wei",
                base_gwei
            )));
        }
        let base = match parse_units(base_gwei.trim(), "gwei") {
            Ok(ParseUnits::U256(value)) => value,
            Ok(ParseUnits::I256(_)) => {
                return Err(BundlerError::Configuration(format!(
                    "gas price basis must not be negative: {}",
                    base_gwei
                )))
            }
            Err(e) => {
                return Err(BundlerError::Configuration(format!(
                    "invalid gas price basis {:?}: {}",
                    base_gwei, e
                )))
            }
        };

        let wei = base
            .checked_mul(U256::from(multiplier))
            .and_then(|v| u128::try_from(v).ok())
            .ok_or_else(|| BundlerError::Configuration("gas price overflows u128".to_string()))?;
        if wei == 0 {
            return Err(BundlerError::Configuration("gas price must be greater than zero".to_string()));
        }

        Ok(Self { wei })
    }

    pub const fn wei(&self) -> u128 {
        self.wei
    }
}

impl GasPriceSource for StaticGasPrice {
    async fn gas_price(&self) -> BundlerResult<u128> {
        Ok(self.wei)
    }
}

/// The node's current `eth_gasPrice` times an integer multiplier.
#[derive(Debug, Clone, Copy)]
pub struct LiveGasPrice<'a, C> {
    chain: &'a C,
    multiplier: u64,
}

impl<'a, C: ChainReader> LiveGasPrice<'a, C> {
    pub const fn new(chain: &'a C, multiplier: u64) -> Self {
        Self { chain, multiplier }
    }
}

impl<C: ChainReader> GasPriceSource for LiveGasPrice<'_, C> {
    async fn gas_price(&self) -> BundlerResult<u128> {
        let base = self.chain.gas_price().await.map_err(BundlerError::ChainRead)?;
        base.checked_mul(self.multiplier as u128)
            .ok_or_else(|| BundlerError::Configuration("gas price overflows u128".to_string()))
    }
}

/// The source selected by [`GasConfig::source`].
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredGasPrice<'a, C> {
    Static(StaticGasPrice),
    Live(LiveGasPrice<'a, C>),
}

impl<'a, C: ChainReader> ConfiguredGasPrice<'a, C> {
    /// Select the source per configuration. The static basis is parsed up front
    /// so a malformed `BASE_GAS_PRICE` fails before any chain access.
    pub fn from_config(config: &GasConfig, base_gwei: &str, chain: &'a C) -> BundlerResult<Self> {
        match config.source {
            GasPriceMode::Static => Ok(Self::Static(StaticGasPrice::from_gwei(
                base_gwei,
                config.price_multiplier,
            )?)),
            GasPriceMode::Live => Ok(Self::Live(LiveGasPrice::new(chain, config.price_multiplier))),
        }
    }
}

impl<C: ChainReader> GasPriceSource for ConfiguredGasPrice<'_, C> {
    async fn gas_price(&self) -> BundlerResult<u128> {
        match self {
            Self::Static(source) => source.gas_price().await,
            Self::Live(source) => source.gas_price().await,
        }
    }
}
