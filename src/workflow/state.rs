//! Workflow stages and terminal outcomes.

use alloy::primitives::B256;
use thiserror::Error;

use crate::bundle::TargetBlock;
use crate::error::BundlerError;
use crate::relay::{Resolution, SimulationFailure, SimulationReport};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Building,
    Signing,
    Simulating,
    Submitting,
    Confirming,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Building => "building",
            Stage::Signing => "signing",
            Stage::Simulating => "simulating",
            Stage::Submitting => "submitting",
            Stage::Confirming => "confirming",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal failure, tagged with the stage it aborted.
///
/// This is the workflow's `SubmissionFailed` terminal state.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct WorkflowError {
    pub stage: Stage,
    pub source: BundlerError,
}

impl WorkflowError {
    pub const fn new(stage: Stage, source: BundlerError) -> Self {
        Self { stage, source }
    }
}

/// How a run ended without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Submitted and the target block resolved, with or without inclusion.
    Resolved {
        target: TargetBlock,
        bundle_hash: B256,
        resolution: Resolution,
    },
    /// Simulation found a reverting entry; nothing was submitted.
    SimulationRejected {
        target: TargetBlock,
        failure: SimulationFailure,
    },
    /// Dry run: simulation passed and the run stopped before submitting.
    Simulated {
        target: TargetBlock,
        report: SimulationReport,
    },
}

impl RunOutcome {
    pub const fn target(&self) -> TargetBlock {
        match self {
            RunOutcome::Resolved { target, .. }
            | RunOutcome::SimulationRejected { target, .. }
            | RunOutcome::Simulated { target, .. } => *target,
        }
    }
}
