//! Transaction building for the two bundle entries.
//!
//! # Responsibilities
//! - Build the funding transfer that pays for the spender's gas
//! - Build the spender's ERC-20 transfer, scaled by the token's on-chain decimals
//! - Share one gas price across both so the relay orders them into the same block

use alloy::network::TransactionBuilder;
use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::ChainReader;
use crate::bundle::types::TransactionDescriptor;
use crate::config::{GasConfig, TransferParams};
use crate::error::{BundlerError, BundlerResult};

sol! {
    /// The subset of ERC-20 the bundle needs.
    interface IERC20 {
        function decimals() external view returns (uint8);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Builds transaction descriptors at one fixed gas price.
#[derive(Debug, Clone)]
pub struct TxBuilder<'a> {
    gas_price: u128,
    gas: &'a GasConfig,
    transfer: &'a TransferParams,
}

impl<'a> TxBuilder<'a> {
    /// Create a builder. Fails if `gas_price` is zero.
    pub fn new(gas_price: u128, gas: &'a GasConfig, transfer: &'a TransferParams) -> BundlerResult<Self> {
        if gas_price == 0 {
            return Err(BundlerError::Configuration("gas price must be greater than zero".to_string()));
        }
        Ok(Self { gas_price, gas, transfer })
    }

    /// Funding transfer to `recipient` worth exactly the spender transfer's
    /// worst-case gas cost, so the spender needs no prior balance.
    pub fn funding_transfer(&self, recipient: Address) -> TransactionDescriptor {
        let value = U256::from(self.gas.spender_gas_limit) * U256::from(self.gas_price);
        TransactionDescriptor::transfer(recipient, value, self.gas_price, self.gas.funding_gas_limit)
    }

    /// The spender's token transfer to the configured recipient.
    pub async fn spender_transfer<C: ChainReader>(&self, chain: &C) -> BundlerResult<TransactionDescriptor> {
        let token = self.transfer.token;
        let decimals = read_decimals(chain, token).await?;
        let amount = scale_amount(&self.transfer.amount, decimals)?;
        let recipient: Address = self.transfer.recipient.trim().parse().map_err(|e| {
            BundlerError::Encoding(format!("invalid recipient address {:?}: {}", self.transfer.recipient, e))
        })?;

        tracing::debug!(%token, decimals, %amount, %recipient, "Encoding token transfer");

        let input = IERC20::transferCall { to: recipient, amount }.abi_encode();
        Ok(TransactionDescriptor::call(token, input.into(), self.gas_price, self.gas.spender_gas_limit))
    }
}

/// Read `decimals()` from an ERC-20 contract.
pub async fn read_decimals<C: ChainReader>(chain: &C, token: Address) -> BundlerResult<u8> {
    let request = TransactionRequest::default()
        .with_to(token)
        .with_input(IERC20::decimalsCall {}.abi_encode());
    let output = chain.call(request).await.map_err(BundlerError::ChainRead)?;

    IERC20::decimalsCall::abi_decode_returns(&output).map_err(|e| {
        BundlerError::ChainRead(crate::blockchain::BlockchainError::Decode(format!(
            "decimals() of {}: {}",
            token, e
        )))
    })
}

/// Significant digits after the decimal point; trailing zeros don't count.
pub fn fractional_digits(amount: &str) -> usize {
    amount
        .trim()
        .split_once('.')
        .map(|(_, fraction)| fraction.trim_end_matches('0').len())
        .unwrap_or(0)
}

/// Scale a human-readable decimal amount into the token's smallest unit.
///
/// More significant fractional digits than `decimals` is an error, never a
/// silent truncation.
pub fn scale_amount(amount: &str, decimals: u8) -> BundlerResult<U256> {
    if fractional_digits(amount) > decimals as usize {
        return Err(BundlerError::Encoding(format!(
            "transfer amount {:?} has more fractional digits than the token's {} decimals",
            amount, decimals
        )));
    }
    match parse_units(amount.trim(), decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(BundlerError::Encoding(format!(
            "transfer amount must not be negative: {}",
            amount
        ))),
        Err(e) => Err(BundlerError::Encoding(format!("invalid transfer amount {:?}: {}", amount, e))),
    }
}
