use crate::core::problem::TransportationProblem;
use crate::domain::model::{
    AllocationMatrix, BatchOutcome, BatchStatus, PortPartition, RedistributionReport,
};
use crate::domain::ports::CostModel;
use crate::utils::error::{BalanceError, Result};
use good_lp::{default_solver, variable, variables, Expression, Solution, SolverModel, Variable};

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Drives the per-batch linear programs. Batching bounds each solve to
/// `batch_size * receivers` variables; batches are optimized independently,
/// so the combined allocation is feasible per batch but not guaranteed
/// globally cost-optimal.
pub struct BatchSolver<'a> {
    batch_size: usize,
    cost_model: &'a dyn CostModel,
}

impl<'a> BatchSolver<'a> {
    pub fn new(batch_size: usize, cost_model: &'a dyn CostModel) -> Result<Self> {
        if batch_size == 0 {
            return Err(BalanceError::ConfigError {
                message: "batch_size must be at least 1".to_string(),
            });
        }
        Ok(Self {
            batch_size,
            cost_model,
        })
    }

    pub fn solve(&self, partition: &PortPartition) -> Result<RedistributionReport> {
        let disrupted_count = partition.disrupted.len();
        let receiver_count = partition.receivers.len();

        let total_supply = partition.total_supply();
        let total_capacity = partition.total_capacity();
        tracing::info!(
            "Redistributing {} cargo units across {} receiving ports ({} available capacity)",
            total_supply,
            receiver_count,
            total_capacity
        );

        let capacity_shortfall = if total_supply > total_capacity {
            tracing::warn!(
                "Total cargo to redistribute ({}) exceeds available capacity ({}); batches may be infeasible",
                total_supply,
                total_capacity
            );
            Some(total_supply - total_capacity)
        } else {
            None
        };

        let mut allocation = AllocationMatrix::zeroed(disrupted_count, receiver_count);
        let mut batches = Vec::new();

        let mut batch_start = 0;
        while batch_start < disrupted_count {
            let batch_end = (batch_start + self.batch_size).min(disrupted_count);
            let batch = &partition.disrupted[batch_start..batch_end];
            let problem =
                TransportationProblem::build(batch, &partition.receivers, self.cost_model);

            // A failed batch leaves its rows zeroed and never aborts the rest
            // of the run.
            let status = match solve_batch(&problem) {
                Ok(block) => {
                    allocation.write_rows(batch_start, &block);
                    tracing::debug!("Batch {}..{} solved", batch_start, batch_end);
                    BatchStatus::Solved
                }
                Err(message) => {
                    tracing::error!(
                        "Batch covering disrupted ports {}..{} failed to solve: {}",
                        batch_start,
                        batch_end,
                        message
                    );
                    BatchStatus::Failed(message)
                }
            };

            batches.push(BatchOutcome {
                rows: batch_start..batch_end,
                status,
            });
            batch_start = batch_end;
        }

        Ok(RedistributionReport {
            allocation,
            batches,
            capacity_shortfall,
        })
    }
}

/// Solve one batch LP with HiGHS. Returns the row-major allocation block with
/// solver noise clamped at zero, or the failure reason.
fn solve_batch(problem: &TransportationProblem) -> std::result::Result<Vec<f64>, String> {
    if problem.destinations == 0 {
        return Err("no receiving ports with available capacity".to_string());
    }

    let mut vars = variables!();
    let xs: Vec<Variable> = (0..problem.num_vars())
        .map(|_| vars.add(variable().min(0.0)))
        .collect();

    let objective = problem
        .costs
        .iter()
        .zip(&xs)
        .fold(Expression::from(0.0), |acc, (&cost, &x)| acc + cost * x);

    let mut model = vars.minimise(objective).using(default_solver);

    for row in &problem.supply {
        let lhs = row
            .coefficients
            .iter()
            .fold(Expression::from(0.0), |acc, &(col, coeff)| {
                acc + coeff * xs[col]
            });
        model.add_constraint(lhs.eq(row.bound));
    }

    for row in &problem.capacity {
        let lhs = row
            .coefficients
            .iter()
            .fold(Expression::from(0.0), |acc, &(col, coeff)| {
                acc + coeff * xs[col]
            });
        model.add_constraint(lhs.leq(row.bound));
    }

    let solution = model.solve().map_err(|e| e.to_string())?;

    Ok(xs.iter().map(|&x| solution.value(x).max(0.0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PortPartition, PortRecord, ReceiverPort};

    const TOLERANCE: f64 = 1e-6;

    fn disrupted(id: &str, export: f64) -> PortRecord {
        PortRecord {
            export_volume: export,
            disaster_indicator: true,
            ..PortRecord::new(id)
        }
    }

    fn receiver(id: &str, capacity: f64) -> ReceiverPort {
        ReceiverPort {
            record: PortRecord::new(id),
            available_capacity: capacity,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= TOLERANCE * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    fn flat_cost(_: &PortRecord, _: &ReceiverPort) -> f64 {
        1.0
    }

    #[test]
    fn two_port_example_routes_by_cost() {
        let partition = PortPartition {
            disrupted: vec![disrupted("s0", 100.0), disrupted("s1", 50.0)],
            receivers: vec![receiver("d0", 80.0), receiver("d1", 90.0)],
        };

        // s0 favors d0, s1 favors d1.
        let costs = |s: &PortRecord, d: &ReceiverPort| -> f64 {
            match (s.port_id.as_str(), d.record.port_id.as_str()) {
                ("s0", "d0") | ("s1", "d1") => 1.0,
                _ => 2.0,
            }
        };

        let solver = BatchSolver::new(DEFAULT_BATCH_SIZE, &costs).unwrap();
        let report = solver.solve(&partition).unwrap();

        assert!(report.capacity_shortfall.is_none());
        assert_eq!(report.batches.len(), 1);
        assert!(report.batches[0].status.is_solved());

        // Full supply placed.
        let row_sums = report.allocation.row_sums();
        assert_close(row_sums[0], 100.0);
        assert_close(row_sums[1], 50.0);

        // s0 fills d0 to capacity, remainder spills to d1; s1 goes to d1.
        let col_sums = report.allocation.col_sums();
        assert_close(col_sums[0], 80.0);
        assert_close(col_sums[1], 70.0);
        assert_close(report.allocation.get(0, 0), 80.0);
        assert_close(report.allocation.get(0, 1), 20.0);
        assert_close(report.allocation.get(1, 1), 50.0);
    }

    #[test]
    fn capacity_is_respected_and_entries_non_negative() {
        let partition = PortPartition {
            disrupted: vec![
                disrupted("s0", 40.0),
                disrupted("s1", 25.0),
                disrupted("s2", 10.0),
            ],
            receivers: vec![receiver("d0", 30.0), receiver("d1", 50.0)],
        };

        let solver = BatchSolver::new(DEFAULT_BATCH_SIZE, &flat_cost).unwrap();
        let report = solver.solve(&partition).unwrap();

        assert!(report.batches.iter().all(|b| b.status.is_solved()));
        for (col, receiver) in partition.receivers.iter().enumerate() {
            assert!(
                report.allocation.col_sum(col) <= receiver.available_capacity + TOLERANCE,
                "receiver {col} over capacity"
            );
        }
        for row in 0..report.allocation.rows() {
            for col in 0..report.allocation.cols() {
                assert!(report.allocation.get(row, col) >= 0.0);
            }
        }
    }

    #[test]
    fn infeasible_run_warns_and_fails_batch_without_crashing() {
        let partition = PortPartition {
            disrupted: vec![disrupted("s0", 1000.0)],
            receivers: vec![receiver("d0", 10.0)],
        };

        let solver = BatchSolver::new(DEFAULT_BATCH_SIZE, &flat_cost).unwrap();
        let report = solver.solve(&partition).unwrap();

        assert_eq!(report.capacity_shortfall, Some(990.0));
        assert_eq!(report.failed_batches(), 1);
        assert_eq!(report.allocation.row_sum(0), 0.0);
    }

    #[test]
    fn per_port_status_is_independent_of_batch_size() {
        let disrupted_ports = vec![
            disrupted("s0", 10.0),
            disrupted("s1", 20.0),
            disrupted("s2", 30.0),
            disrupted("s3", 40.0),
        ];
        let receivers = vec![receiver("d0", 60.0), receiver("d1", 60.0)];
        let port_count = disrupted_ports.len();

        let mut statuses_by_batch_size = Vec::new();
        for batch_size in [1, DEFAULT_BATCH_SIZE, port_count] {
            let partition = PortPartition {
                disrupted: disrupted_ports.clone(),
                receivers: receivers.clone(),
            };
            let solver = BatchSolver::new(batch_size, &flat_cost).unwrap();
            let report = solver.solve(&partition).unwrap();

            let statuses: Vec<bool> = (0..port_count).map(|i| report.port_solved(i)).collect();
            // Any valid solution conserves each port's supply exactly.
            for (i, port) in partition.disrupted.iter().enumerate() {
                assert_close(report.allocation.row_sum(i), port.export_volume);
            }
            statuses_by_batch_size.push(statuses);
        }

        assert_eq!(statuses_by_batch_size[0], statuses_by_batch_size[1]);
        assert_eq!(statuses_by_batch_size[1], statuses_by_batch_size[2]);
    }

    #[test]
    fn failed_batch_does_not_disturb_other_batches() {
        // batch_size 1 puts the oversized port alone in a failing batch.
        let partition = PortPartition {
            disrupted: vec![disrupted("s0", 1000.0), disrupted("s1", 5.0)],
            receivers: vec![receiver("d0", 10.0)],
        };

        let solver = BatchSolver::new(1, &flat_cost).unwrap();
        let report = solver.solve(&partition).unwrap();

        assert!(!report.port_solved(0));
        assert!(report.port_solved(1));
        assert_eq!(report.allocation.row_sum(0), 0.0);
        assert_close(report.allocation.row_sum(1), 5.0);
    }

    #[test]
    fn no_receivers_fails_every_batch() {
        let partition = PortPartition {
            disrupted: vec![disrupted("s0", 1.0)],
            receivers: vec![],
        };

        let solver = BatchSolver::new(DEFAULT_BATCH_SIZE, &flat_cost).unwrap();
        let report = solver.solve(&partition).unwrap();

        assert_eq!(report.failed_batches(), 1);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(BatchSolver::new(0, &flat_cost).is_err());
    }
}
