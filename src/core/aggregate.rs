use crate::domain::model::{
    PortPartition, PortStatus, PortSummary, RedistributionReport,
};

/// Roll the allocation matrix up into per-port totals and merge them back
/// into the partition: disrupted ports get `cargo_redistributed` (row sums),
/// receivers get `cargo_received` (column sums). Output keeps disrupted
/// ports first, then receivers, keyed by `port_id`.
pub fn summarize(partition: &PortPartition, report: &RedistributionReport) -> Vec<PortSummary> {
    let row_sums = report.allocation.row_sums();
    let col_sums = report.allocation.col_sums();

    let mut ports = Vec::with_capacity(partition.disrupted.len() + partition.receivers.len());

    for (row, record) in partition.disrupted.iter().enumerate() {
        let status = if report.port_solved(row) {
            PortStatus::Redistributed
        } else {
            PortStatus::Unplaced
        };
        ports.push(PortSummary {
            record: record.clone(),
            available_capacity: None,
            cargo_redistributed: Some(row_sums[row]),
            cargo_received: None,
            status,
        });
    }

    for (col, receiver) in partition.receivers.iter().enumerate() {
        ports.push(PortSummary {
            record: receiver.record.clone(),
            available_capacity: Some(receiver.available_capacity),
            cargo_redistributed: None,
            cargo_received: Some(col_sums[col]),
            status: PortStatus::Receiver,
        });
    }

    ports
}
