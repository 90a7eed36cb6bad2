//! The run controller: build → sign → simulate → gate → submit → confirm.
//!
//! # Design Decisions
//! - The target block and gas price are fixed once, before building
//! - Every fatal error aborts immediately; nothing is retried
//! - A reverting simulation ends the run cleanly without a submit call

use crate::blockchain::{ChainReader, KeyHolder};
use crate::bundle::{Bundle, BundleAssembler, TargetBlock, TransactionDescriptor, TxBuilder};
use crate::config::{BundlerConfig, TransferParams};
use crate::error::{BundlerError, BundlerResult};
use crate::gas::GasPriceSource;
use crate::relay::{BundleRelay, SimulationOutcome};
use crate::workflow::state::{RunOutcome, Stage, WorkflowError};

/// One run over a single target block.
#[derive(Debug)]
pub struct BundleWorkflow<'a, C, R, K, G> {
    config: &'a BundlerConfig,
    transfer: &'a TransferParams,
    chain: &'a C,
    relay: &'a R,
    funding: &'a K,
    spender: &'a K,
    gas: &'a G,
    dry_run: bool,
}

impl<'a, C, R, K, G> BundleWorkflow<'a, C, R, K, G>
where
    C: ChainReader,
    R: BundleRelay,
    K: KeyHolder,
    G: GasPriceSource,
{
    pub fn new(
        config: &'a BundlerConfig,
        transfer: &'a TransferParams,
        chain: &'a C,
        relay: &'a R,
        funding: &'a K,
        spender: &'a K,
        gas: &'a G,
    ) -> Self {
        Self { config, transfer, chain, relay, funding, spender, gas, dry_run: false }
    }

    /// Stop after a successful simulation instead of submitting.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Drive the run to a terminal state.
    pub async fn run(&self) -> Result<RunOutcome, WorkflowError> {
        enter(Stage::Init);
        let target = self.fix_target().await.map_err(at(Stage::Init))?;

        enter(Stage::Building);
        let (funding_tx, spender_tx) = self.build().await.map_err(at(Stage::Building))?;

        enter(Stage::Signing);
        let bundle = self.sign(funding_tx, spender_tx).await.map_err(at(Stage::Signing))?;

        enter(Stage::Simulating);
        let report = match self.relay.simulate(&bundle, target).await.map_err(at(Stage::Simulating))? {
            SimulationOutcome::Failure(failure) => {
                tracing::warn!(
                    target_block = %target,
                    entry = failure.index,
                    tx_hash = %failure.tx_hash,
                    reason = %failure.reason,
                    "Simulation rejected bundle, not submitting"
                );
                return Ok(RunOutcome::SimulationRejected { target, failure });
            }
            SimulationOutcome::Success(report) => report,
        };
        tracing::info!(
            target_block = %target,
            total_gas_used = report.total_gas_used,
            "Simulation succeeded"
        );

        if self.dry_run {
            tracing::info!(target_block = %target, "Dry run, skipping submission");
            return Ok(RunOutcome::Simulated { target, report });
        }

        enter(Stage::Submitting);
        let handle = self.relay.submit(&bundle, target).await.map_err(at(Stage::Submitting))?;
        tracing::info!(
            target_block = %target,
            bundle_hash = %handle.bundle_hash,
            "Bundle submitted"
        );

        enter(Stage::Confirming);
        let resolution = self.relay.await_resolution(&handle).await.map_err(at(Stage::Confirming))?;
        tracing::info!(
            target_block = %target,
            included = resolution.is_included(),
            "Target block resolved"
        );

        Ok(RunOutcome::Resolved { target, bundle_hash: handle.bundle_hash, resolution })
    }

    async fn fix_target(&self) -> BundlerResult<TargetBlock> {
        let height = self.chain.block_number().await.map_err(BundlerError::ChainRead)?;
        let offset = self.config.workflow.target_block_offset;
        let target = TargetBlock::from_height(height, offset).ok_or_else(|| {
            BundlerError::Configuration(format!("target block offset {} overflows height {}", offset, height))
        })?;

        tracing::info!(height, target_block = %target, "Target block fixed");
        Ok(target)
    }

    async fn build(&self) -> BundlerResult<(TransactionDescriptor, TransactionDescriptor)> {
        let gas_price = self.gas.gas_price().await?;
        let builder = TxBuilder::new(gas_price, &self.config.gas, self.transfer)?;

        let funding_tx = builder.funding_transfer(self.spender.address());
        let spender_tx = builder.spender_transfer(self.chain).await?;

        tracing::info!(
            gas_price,
            funding_value = %funding_tx.value(),
            token = %spender_tx.to(),
            "Transactions built"
        );
        Ok((funding_tx, spender_tx))
    }

    async fn sign(&self, funding_tx: TransactionDescriptor, spender_tx: TransactionDescriptor) -> BundlerResult<Bundle> {
        let bundle = BundleAssembler::new(self.chain)
            .assemble(&[(self.funding, funding_tx), (self.spender, spender_tx)])
            .await?;

        for entry in bundle.entries() {
            tracing::info!(signer = %entry.signer(), nonce = entry.nonce(), tx_hash = %entry.tx_hash(), "Bundle entry signed");
        }
        Ok(bundle)
    }
}

fn enter(stage: Stage) {
    tracing::info!(stage = %stage, "Entering stage");
}

fn at(stage: Stage) -> impl FnOnce(BundlerError) -> WorkflowError {
    move |source| {
        tracing::error!(stage = %stage, error = %source, "Run aborted");
        WorkflowError::new(stage, source)
    }
}
