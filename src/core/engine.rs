use crate::core::aggregate;
use crate::core::solver::BatchSolver;
use crate::domain::model::{PortPartition, PortRecord, RedistributionOutcome};
use crate::domain::ports::CostModel;
use crate::utils::error::Result;

/// The redistribution engine: partition the dataset, solve the batched
/// transportation problems, and merge per-port totals back into one table.
///
/// Owns every intermediate for the duration of one call and holds no global
/// state, so concurrent runs on distinct datasets are safe by construction.
/// Performs no file or network I/O.
pub struct RedistributionEngine<'a> {
    solver: BatchSolver<'a>,
}

impl<'a> RedistributionEngine<'a> {
    pub fn new(batch_size: usize, cost_model: &'a dyn CostModel) -> Result<Self> {
        Ok(Self {
            solver: BatchSolver::new(batch_size, cost_model)?,
        })
    }

    pub fn redistribute(&self, records: Vec<PortRecord>) -> Result<RedistributionOutcome> {
        tracing::info!("Partitioning {} ports by disruption status", records.len());
        let partition = PortPartition::from_records(records);
        tracing::info!(
            "Identified {} disrupted ports and {} receivers",
            partition.disrupted.len(),
            partition.receivers.len()
        );

        let report = self.solver.solve(&partition)?;
        if report.failed_batches() > 0 {
            tracing::warn!(
                "{} of {} batches failed to solve; their ports carry no allocation",
                report.failed_batches(),
                report.batches.len()
            );
        }

        let ports = aggregate::summarize(&partition, &report);
        tracing::info!("Completed cargo redistribution for {} ports", ports.len());

        Ok(RedistributionOutcome { ports, report })
    }
}
