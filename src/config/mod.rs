//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BundlerConfig (validated, immutable)
//!
//! environment variables
//!     → env.rs (secrets + transfer parameters)
//!
//! both are built once in main and passed by reference to every component
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no process-wide mutable state
//! - All fields have defaults so no config file is needed
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{EnvConfig, Secrets, TransferParams};
pub use loader::ConfigError;
pub use schema::BundlerConfig;
pub use schema::ChainConfig;
pub use schema::GasConfig;
pub use schema::GasPriceMode;
pub use schema::ObservabilityConfig;
pub use schema::RelayConfig;
pub use schema::WorkflowConfig;
