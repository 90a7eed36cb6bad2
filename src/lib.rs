//! Private relay bundler library
//!
//! Builds a two-entry bundle (a funding transfer followed by the funded
//! account's token transfer), simulates it against a private relay, and
//! submits it for inclusion in a single target block.

pub mod blockchain;
pub mod bundle;
pub mod config;
pub mod error;
pub mod gas;
pub mod observability;
pub mod relay;
pub mod workflow;

pub use config::schema::BundlerConfig;
pub use error::{BundlerError, BundlerResult};
pub use relay::FlashbotsRelay;
pub use workflow::{BundleWorkflow, RunOutcome, Stage, WorkflowError};
