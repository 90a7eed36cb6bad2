//! Workflow controller.
//!
//! # Data Flow
//! ```text
//! Init        → chain height, TargetBlock = height + offset
//! Building    → gas price, funding transfer, spender token transfer
//! Signing     → BundleAssembler [(funding, ..), (spender, ..)]
//! Simulating  → relay.simulate(bundle, target)
//!                 Failure → SimulationRejected (clean exit)
//! Submitting  → relay.submit(bundle, target)
//! Confirming  → relay.await_resolution(handle)
//!                 Included | BlockPassedWithoutInclusion | AccountNonceTooHigh
//! ```
//! Any error along the way ends the run as a [`WorkflowError`] naming the stage.

pub mod controller;
pub mod state;

pub use controller::BundleWorkflow;
pub use state::{RunOutcome, Stage, WorkflowError};
