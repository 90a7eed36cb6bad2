//! Private bundle relay: simulation, submission, and resolution tracking.

pub mod client;
pub mod error;
pub mod types;

pub use client::{FlashbotsRelay, SIGNATURE_HEADER};
pub use error::{RelayError, RelayResult};
pub use types::{
    BundleRelay, EntryTrace, PendingEntry, Resolution, SimulationFailure, SimulationOutcome,
    SimulationReport, SubmissionHandle,
};
