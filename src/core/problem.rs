use crate::domain::model::{PortRecord, ReceiverPort};
use crate::domain::ports::CostModel;

/// One constraint row stored sparsely as `(column, coefficient)` pairs.
/// Supply rows carry `n` non-zeros out of `m*n` columns and capacity rows
/// `m`, so dense storage would be almost entirely zeros.
#[derive(Debug, Clone)]
pub struct SparseRow {
    pub coefficients: Vec<(usize, f64)>,
    pub bound: f64,
}

/// Linear program for one batch of `m` disrupted ports shipping to all `n`
/// receivers: minimize `costs . x` subject to the supply equalities and
/// capacity inequalities, with `x >= 0` implicit.
#[derive(Debug, Clone)]
pub struct TransportationProblem {
    pub sources: usize,
    pub destinations: usize,
    /// Row-major cost vector of length `sources * destinations`.
    pub costs: Vec<f64>,
    /// Per source: allocations across all destinations sum to its export volume.
    pub supply: Vec<SparseRow>,
    /// Per destination: allocations from all sources stay within its capacity.
    pub capacity: Vec<SparseRow>,
}

impl TransportationProblem {
    /// Decision variable `x[i,j]` lives at flat index `i * destinations + j`.
    /// The same mapping decodes the solver's result vector.
    pub fn flat_index(&self, source: usize, dest: usize) -> usize {
        source * self.destinations + dest
    }

    pub fn num_vars(&self) -> usize {
        self.sources * self.destinations
    }

    pub fn build(
        batch: &[PortRecord],
        receivers: &[ReceiverPort],
        cost_model: &dyn CostModel,
    ) -> Self {
        let m = batch.len();
        let n = receivers.len();

        let mut costs = Vec::with_capacity(m * n);
        for source in batch {
            for dest in receivers {
                costs.push(cost_model.cost(source, dest));
            }
        }

        // Supply: n contiguous unit coefficients starting at offset i*n.
        let supply = batch
            .iter()
            .enumerate()
            .map(|(i, source)| SparseRow {
                coefficients: (0..n).map(|j| (i * n + j, 1.0)).collect(),
                bound: source.export_volume,
            })
            .collect();

        // Capacity: m unit coefficients at stride n starting at column j.
        let capacity = receivers
            .iter()
            .enumerate()
            .map(|(j, dest)| SparseRow {
                coefficients: (0..m).map(|i| (i * n + j, 1.0)).collect(),
                bound: dest.available_capacity,
            })
            .collect();

        Self {
            sources: m,
            destinations: n,
            costs,
            supply,
            capacity,
        }
    }
}
