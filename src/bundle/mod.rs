//! Bundle construction.
//!
//! # Data Flow
//! ```text
//! gas price + transfer params
//!     → builder.rs (funding + token-transfer descriptors)
//!     → assembler.rs (nonce resolution, signing, EIP-2718 encoding)
//!     → Bundle (ordered, immutable)
//! ```

pub mod assembler;
pub mod builder;
pub mod types;

pub use assembler::BundleAssembler;
pub use builder::TxBuilder;
pub use types::{Bundle, SignedEntry, TargetBlock, TransactionDescriptor};
