use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One row of the merged port dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortRecord {
    pub port_id: String,
    pub port_name: Option<String>,
    pub vessel_count_total: f64,
    pub import_volume: f64,
    pub export_volume: f64,
    pub disaster_indicator: bool,
    /// Binary news-impact flag merged in by the caller (1 = negative impact).
    pub impact_score: Option<u8>,
    /// Cluster id assigned by an external classifier.
    pub resilience_cluster: Option<u32>,
}

impl PortRecord {
    pub fn new(port_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            port_name: None,
            vessel_count_total: 0.0,
            import_volume: 0.0,
            export_volume: 0.0,
            disaster_indicator: false,
            impact_score: None,
            resilience_cluster: None,
        }
    }

    /// Spare throughput this port can absorb: vessel count minus current
    /// import load, floored at zero.
    pub fn available_capacity(&self) -> f64 {
        (self.vessel_count_total - self.import_volume).max(0.0)
    }
}

/// A non-disrupted port together with its derived spare capacity.
#[derive(Debug, Clone)]
pub struct ReceiverPort {
    pub record: PortRecord,
    pub available_capacity: f64,
}

/// Disjoint split of the dataset by `disaster_indicator`, derived once per
/// run and never re-derived mid-computation.
#[derive(Debug, Clone)]
pub struct PortPartition {
    pub disrupted: Vec<PortRecord>,
    pub receivers: Vec<ReceiverPort>,
}

impl PortPartition {
    pub fn from_records(records: impl IntoIterator<Item = PortRecord>) -> Self {
        let mut disrupted = Vec::new();
        let mut receivers = Vec::new();

        for record in records {
            if record.disaster_indicator {
                disrupted.push(record);
            } else {
                let available_capacity = record.available_capacity();
                receivers.push(ReceiverPort {
                    record,
                    available_capacity,
                });
            }
        }

        Self {
            disrupted,
            receivers,
        }
    }

    pub fn total_supply(&self) -> f64 {
        self.disrupted.iter().map(|p| p.export_volume).sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.receivers.iter().map(|r| r.available_capacity).sum()
    }
}

/// One externally produced news-impact entry for a free-text port name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactSignal {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub impact_level: String,
}

impl ImpactSignal {
    pub fn is_negative(&self) -> bool {
        self.impact_level.eq_ignore_ascii_case("negative")
    }
}

/// Dense row-major `disrupted x receivers` matrix of redistributed volumes.
#[derive(Debug, Clone)]
pub struct AllocationMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl AllocationMatrix {
    pub fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Overwrite a contiguous slice of rows starting at `row_start` with a
    /// row-major block. The block length must be a whole number of rows.
    pub fn write_rows(&mut self, row_start: usize, block: &[f64]) {
        debug_assert!(self.cols > 0 && block.len() % self.cols == 0);
        let offset = row_start * self.cols;
        self.data[offset..offset + block.len()].copy_from_slice(block);
    }

    pub fn row_sum(&self, row: usize) -> f64 {
        self.data[row * self.cols..(row + 1) * self.cols].iter().sum()
    }

    pub fn col_sum(&self, col: usize) -> f64 {
        (0..self.rows).map(|i| self.get(i, col)).sum()
    }

    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.row_sum(i)).collect()
    }

    pub fn col_sums(&self) -> Vec<f64> {
        (0..self.cols).map(|j| self.col_sum(j)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Solved,
    Failed(String),
}

impl BatchStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, BatchStatus::Solved)
    }
}

/// Outcome of one independent batch solve, identified by the slice of
/// disrupted-set rows it covered.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub rows: Range<usize>,
    pub status: BatchStatus,
}

/// Structured result of the batched solve: the full allocation matrix plus
/// per-batch outcomes, so callers never have to infer failures from zeros.
#[derive(Debug, Clone)]
pub struct RedistributionReport {
    pub allocation: AllocationMatrix,
    pub batches: Vec<BatchOutcome>,
    /// How far total demand exceeded total capacity, when it did.
    pub capacity_shortfall: Option<f64>,
}

impl RedistributionReport {
    pub fn port_solved(&self, row: usize) -> bool {
        self.batches
            .iter()
            .any(|b| b.rows.contains(&row) && b.status.is_solved())
    }

    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.status.is_solved()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortStatus {
    /// Disrupted port whose batch solved; its full export volume was placed.
    Redistributed,
    /// Disrupted port whose batch failed; no allocation was computed.
    Unplaced,
    /// Non-disrupted port absorbing redistributed cargo.
    Receiver,
}

impl std::fmt::Display for PortStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PortStatus::Redistributed => "redistributed",
            PortStatus::Unplaced => "unplaced",
            PortStatus::Receiver => "receiver",
        };
        f.write_str(s)
    }
}

/// One row of the augmented output table.
#[derive(Debug, Clone)]
pub struct PortSummary {
    pub record: PortRecord,
    pub available_capacity: Option<f64>,
    pub cargo_redistributed: Option<f64>,
    pub cargo_received: Option<f64>,
    pub status: PortStatus,
}

/// Everything `redistribute` hands back: the augmented per-port table
/// (disrupted ports first, then receivers) and the solve report.
#[derive(Debug, Clone)]
pub struct RedistributionOutcome {
    pub ports: Vec<PortSummary>,
    pub report: RedistributionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: &str, vessels: f64, imports: f64, exports: f64, disrupted: bool) -> PortRecord {
        PortRecord {
            vessel_count_total: vessels,
            import_volume: imports,
            export_volume: exports,
            disaster_indicator: disrupted,
            ..PortRecord::new(id)
        }
    }

    #[test]
    fn available_capacity_is_floored_at_zero() {
        assert_eq!(port("p1", 100.0, 30.0, 0.0, false).available_capacity(), 70.0);
        assert_eq!(port("p2", 10.0, 50.0, 0.0, false).available_capacity(), 0.0);
    }

    #[test]
    fn partition_is_disjoint_and_exhaustive() {
        let records = vec![
            port("a", 50.0, 10.0, 5.0, true),
            port("b", 80.0, 20.0, 0.0, false),
            port("c", 30.0, 40.0, 7.0, true),
        ];

        let partition = PortPartition::from_records(records);
        assert_eq!(partition.disrupted.len(), 2);
        assert_eq!(partition.receivers.len(), 1);
        assert_eq!(partition.disrupted[0].port_id, "a");
        assert_eq!(partition.disrupted[1].port_id, "c");
        assert_eq!(partition.receivers[0].available_capacity, 60.0);
        assert_eq!(partition.total_supply(), 12.0);
        assert_eq!(partition.total_capacity(), 60.0);
    }

    #[test]
    fn allocation_matrix_sums() {
        let mut matrix = AllocationMatrix::zeroed(2, 3);
        matrix.write_rows(0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        assert_eq!(matrix.get(1, 2), 6.0);
        assert_eq!(matrix.row_sums(), vec![6.0, 15.0]);
        assert_eq!(matrix.col_sums(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn write_rows_leaves_other_rows_untouched() {
        let mut matrix = AllocationMatrix::zeroed(3, 2);
        matrix.write_rows(1, &[7.0, 8.0]);

        assert_eq!(matrix.row_sum(0), 0.0);
        assert_eq!(matrix.row_sum(1), 15.0);
        assert_eq!(matrix.row_sum(2), 0.0);
    }

    #[test]
    fn report_tracks_per_port_status() {
        let report = RedistributionReport {
            allocation: AllocationMatrix::zeroed(4, 1),
            batches: vec![
                BatchOutcome {
                    rows: 0..2,
                    status: BatchStatus::Solved,
                },
                BatchOutcome {
                    rows: 2..4,
                    status: BatchStatus::Failed("infeasible".into()),
                },
            ],
            capacity_shortfall: None,
        };

        assert!(report.port_solved(1));
        assert!(!report.port_solved(2));
        assert_eq!(report.failed_batches(), 1);
    }

    #[test]
    fn impact_signal_negativity_is_case_insensitive() {
        let signal = ImpactSignal {
            name: "Port of Rotterdam".into(),
            country: None,
            impact_level: "Negative".into(),
        };
        assert!(signal.is_negative());

        let neutral = ImpactSignal {
            name: "Port of Antwerp".into(),
            country: None,
            impact_level: "neutral".into(),
        };
        assert!(!neutral.is_negative());
    }
}
