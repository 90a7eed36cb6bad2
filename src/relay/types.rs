//! Relay request/response types and run-level outcomes.

use alloy::primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::blockchain::EntryReceipt;
use crate::bundle::{Bundle, TargetBlock};
use crate::error::BundlerResult;

/// A private submission channel scoped to one target block per request.
pub trait BundleRelay: Send + Sync {
    /// Dry-run `bundle` against current state as if mined in `target`.
    fn simulate(
        &self,
        bundle: &Bundle,
        target: TargetBlock,
    ) -> impl Future<Output = BundlerResult<SimulationOutcome>> + Send;

    /// Submit `bundle` for inclusion in exactly `target`.
    fn submit(
        &self,
        bundle: &Bundle,
        target: TargetBlock,
    ) -> impl Future<Output = BundlerResult<SubmissionHandle>> + Send;

    /// Wait until the handle's target block resolves one way or the other.
    fn await_resolution(
        &self,
        handle: &SubmissionHandle,
    ) -> impl Future<Output = BundlerResult<Resolution>> + Send;
}

/// Per-entry execution trace from a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryTrace {
    pub tx_hash: TxHash,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default)]
    pub from_address: Option<Address>,
    #[serde(default)]
    pub to_address: Option<Address>,
    /// Execution error, e.g. "execution reverted".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Decoded revert reason or raw revert data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert: Option<String>,
}

impl EntryTrace {
    /// The failure reason, if this entry would revert.
    pub fn failure_reason(&self) -> Option<String> {
        match (&self.error, &self.revert) {
            (None, None) => None,
            (Some(error), None) => Some(error.clone()),
            (None, Some(revert)) => Some(revert.clone()),
            (Some(error), Some(revert)) => Some(format!("{}: {}", error, revert)),
        }
    }
}

/// `eth_callBundle` result body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    #[serde(default)]
    pub bundle_hash: Option<B256>,
    #[serde(default)]
    pub total_gas_used: u64,
    /// Decimal wei string as reported by the relay.
    #[serde(default)]
    pub coinbase_diff: Option<String>,
    #[serde(default)]
    pub state_block_number: Option<u64>,
    #[serde(default)]
    pub results: Vec<EntryTrace>,
}

/// The first entry that would revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFailure {
    /// Position of the reverting entry within the bundle.
    pub index: usize,
    pub tx_hash: TxHash,
    pub reason: String,
    pub report: SimulationReport,
}

impl std::fmt::Display for SimulationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry {} ({}) would revert: {}", self.index, self.tx_hash, self.reason)
    }
}

/// Result of a bundle dry-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// Every entry executed.
    Success(SimulationReport),
    /// At least one entry would revert.
    Failure(SimulationFailure),
}

impl SimulationOutcome {
    /// Classify a report by its first reverting entry.
    pub fn from_report(report: SimulationReport) -> Self {
        let first_revert = report
            .results
            .iter()
            .enumerate()
            .find_map(|(index, trace)| trace.failure_reason().map(|reason| (index, trace.tx_hash, reason)));

        match first_revert {
            Some((index, tx_hash, reason)) => {
                SimulationOutcome::Failure(SimulationFailure { index, tx_hash, reason, report })
            }
            None => SimulationOutcome::Success(report),
        }
    }
}

/// What the relay needs to track one submitted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEntry {
    pub tx_hash: TxHash,
    pub signer: Address,
    pub nonce: u64,
}

/// Reference to an in-flight submission, valid only for its target block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionHandle {
    pub bundle_hash: B256,
    pub target_block: TargetBlock,
    pub entries: Vec<PendingEntry>,
}

impl SubmissionHandle {
    pub fn new(bundle_hash: B256, target_block: TargetBlock, bundle: &Bundle) -> Self {
        let entries = bundle
            .entries()
            .iter()
            .map(|e| PendingEntry { tx_hash: e.tx_hash(), signer: e.signer(), nonce: e.nonce() })
            .collect();
        Self { bundle_hash, target_block, entries }
    }
}

/// How a target block resolved. Every variant is a settled outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// All entries were mined; receipts in bundle order.
    Included(Vec<EntryReceipt>),
    /// The target block was mined without the bundle.
    BlockPassedWithoutInclusion,
    /// The target passed and a signer's nonce moved on, so the bundle can
    /// never land as signed.
    AccountNonceTooHigh,
}

impl Resolution {
    pub const fn is_included(&self) -> bool {
        matches!(self, Resolution::Included(_))
    }
}
