//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (offsets, gas limits, timeouts > 0)
//! - Check URLs parse before any network call is attempted
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BundlerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::BundlerConfig;

/// Intrinsic gas cost of a plain value transfer.
pub const MIN_TRANSFER_GAS: u64 = 21_000;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &BundlerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain.rpc_url.trim().is_empty() {
        errors.push(ValidationError::new("chain.rpc_url", "must not be empty"));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }

    if let Err(e) = url::Url::parse(&config.relay.url) {
        errors.push(ValidationError::new("relay.url", format!("invalid URL: {}", e)));
    }
    if config.relay.request_timeout_secs == 0 {
        errors.push(ValidationError::new("relay.request_timeout_secs", "must be greater than 0"));
    }

    if config.gas.price_multiplier == 0 {
        errors.push(ValidationError::new("gas.price_multiplier", "must be at least 1"));
    }
    if config.gas.funding_gas_limit < MIN_TRANSFER_GAS {
        errors.push(ValidationError::new(
            "gas.funding_gas_limit",
            format!("must be at least {}", MIN_TRANSFER_GAS),
        ));
    }
    if config.gas.spender_gas_limit < MIN_TRANSFER_GAS {
        errors.push(ValidationError::new(
            "gas.spender_gas_limit",
            format!("must be at least {}", MIN_TRANSFER_GAS),
        ));
    }

    if config.workflow.target_block_offset == 0 {
        errors.push(ValidationError::new(
            "workflow.target_block_offset",
            "must target a future block",
        ));
    }
    if config.workflow.poll_interval_ms == 0 {
        errors.push(ValidationError::new("workflow.poll_interval_ms", "must be greater than 0"));
    }
    if config.workflow.block_time_secs == 0 {
        errors.push(ValidationError::new("workflow.block_time_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
