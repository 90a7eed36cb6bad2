//! Error taxonomy for a bundle run.

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::ConfigError;

/// Errors that abort a run. Simulation rejection is not one of them.
#[derive(Debug, Error)]
pub enum BundlerError {
    /// Missing or malformed required input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reading chain state failed.
    #[error("chain read failed: {0}")]
    ChainRead(#[source] BlockchainError),

    /// An amount or address could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A key holder could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The relay could not be reached or answered with an error while simulating.
    #[error("relay error: {0}")]
    Relay(String),

    /// The relay rejected the bundle or the submission transport failed.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The target block's resolution was not observed within the allotted time.
    #[error("no resolution for target block {target_block} after {waited_secs} seconds")]
    ConfirmationTimeout { target_block: u64, waited_secs: u64 },
}

impl From<ConfigError> for BundlerError {
    fn from(err: ConfigError) -> Self {
        BundlerError::Configuration(err.to_string())
    }
}

/// Result type for core operations.
pub type BundlerResult<T> = Result<T, BundlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BundlerError::ChainRead(BlockchainError::Timeout(10));
        assert_eq!(err.to_string(), "chain read failed: RPC timeout after 10 seconds");

        let err = BundlerError::ConfirmationTimeout { target_block: 1003, waited_secs: 60 };
        assert!(err.to_string().contains("1003"));
    }

    #[test]
    fn test_config_error_maps_to_configuration() {
        let err: BundlerError = ConfigError::MissingEnv("BASE_GAS_PRICE").into();
        assert!(matches!(err, BundlerError::Configuration(ref msg) if msg.contains("BASE_GAS_PRICE")));
    }
}
