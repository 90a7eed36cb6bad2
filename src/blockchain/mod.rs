//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private keys, RPC API key)
//!     → wallet.rs (key loading, transaction + message signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → reader.rs (the chain queries the bundle workflow depends on)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or the RPC URL (it embeds the API key)
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod reader;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use reader::ChainReader;
pub use types::{BlockchainError, BlockchainResult, ChainConfig, ChainId, EntryReceipt};
pub use wallet::{KeyHolder, Wallet};
