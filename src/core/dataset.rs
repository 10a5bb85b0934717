use crate::domain::model::{ImpactSignal, PortRecord, PortStatus, RedistributionOutcome};
use crate::domain::ports::{Classifier, NameMatcher, Storage};
use crate::utils::error::{BalanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Raw CSV row before per-row validation. Everything is optional here so a
/// single malformed row can be reported with its position instead of failing
/// the whole deserialization opaquely.
#[derive(Debug, Deserialize)]
struct RawPortRow {
    portid: Option<String>,
    vessel_count_total: Option<f64>,
    import: Option<f64>,
    export: Option<f64>,
    disaster_indicator: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PortNameRow {
    portid: String,
    portname: String,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    portid: &'a str,
    portname: Option<&'a str>,
    vessel_count_total: f64,
    import: f64,
    export: f64,
    disaster_indicator: u8,
    impact_score: Option<u8>,
    resilience_cluster: Option<u32>,
    available_capacity: Option<f64>,
    cargo_redistributed: Option<f64>,
    cargo_received: Option<f64>,
    status: PortStatus,
}

/// Load the grouped-ports table, left-join `portname` from the names table
/// by `portid`, and return validated records.
pub fn load_port_dataset<S: Storage>(
    storage: &S,
    grouped_path: &str,
    names_path: &str,
) -> Result<Vec<PortRecord>> {
    let grouped_bytes = storage.read_file(grouped_path)?;
    let names_bytes = storage.read_file(names_path)?;

    let mut records = parse_grouped_ports(&grouped_bytes)?;
    let names = parse_port_names(&names_bytes)?;

    for record in &mut records {
        record.port_name = names.get(&record.port_id).cloned();
    }

    tracing::info!("Loaded and merged {} port rows", records.len());
    Ok(records)
}

fn parse_grouped_ports(bytes: &[u8]) -> Result<Vec<PortRecord>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut records = Vec::new();

    for (index, row) in reader.deserialize::<RawPortRow>().enumerate() {
        let row_number = index + 1;
        let raw = row.map_err(|e| BalanceError::data(row_number, e.to_string()))?;

        let port_id = raw
            .portid
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| BalanceError::data(row_number, "missing required field 'portid'"))?;
        let export_volume = raw.export.ok_or_else(|| {
            BalanceError::data(row_number, "missing or non-numeric required field 'export'")
        })?;
        if export_volume < 0.0 {
            return Err(BalanceError::data(
                row_number,
                format!("negative export volume {export_volume}"),
            ));
        }
        let disaster = raw.disaster_indicator.ok_or_else(|| {
            BalanceError::data(
                row_number,
                "missing or non-numeric required field 'disaster_indicator'",
            )
        })?;

        records.push(PortRecord {
            port_id,
            port_name: None,
            // Capacity inputs missing on a row count as zero capacity rather
            // than failing the dataset.
            vessel_count_total: raw.vessel_count_total.unwrap_or(0.0),
            import_volume: raw.import.unwrap_or(0.0),
            export_volume,
            disaster_indicator: disaster != 0.0,
            impact_score: None,
            resilience_cluster: None,
        });
    }

    Ok(records)
}

fn parse_port_names(bytes: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut names = HashMap::new();

    for row in reader.deserialize::<PortNameRow>() {
        let row = row?;
        names.insert(row.portid, row.portname);
    }

    Ok(names)
}

/// Collapse duplicate `portid` rows, preferring a disrupted row over the
/// first occurrence. First-seen order is preserved.
pub fn dedupe_ports(records: Vec<PortRecord>) -> Vec<PortRecord> {
    let mut order = Vec::new();
    let mut by_id: HashMap<String, PortRecord> = HashMap::new();

    for record in records {
        match by_id.entry(record.port_id.clone()) {
            Entry::Vacant(slot) => {
                order.push(record.port_id.clone());
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.disaster_indicator && !slot.get().disaster_indicator {
                    slot.insert(record);
                }
            }
        }
    }

    order.into_iter().filter_map(|id| by_id.remove(&id)).collect()
}

/// Parse externally produced impact entries (the news-analysis output) from
/// a JSON array.
pub fn load_impact_signals<S: Storage>(storage: &S, path: &str) -> Result<Vec<ImpactSignal>> {
    let bytes = storage.read_file(path)?;
    let signals: Vec<ImpactSignal> = serde_json::from_slice(&bytes)?;
    Ok(signals)
}

/// Resolve each signal's free-text port name against the dataset and fold
/// the results into per-port flags: a port is impacted if any matched signal
/// is negative. Impacted ports are marked disrupted. Returns how many ports
/// were newly flagged.
pub fn apply_impacts(
    records: &mut [PortRecord],
    signals: &[ImpactSignal],
    matcher: &dyn NameMatcher,
) -> usize {
    let mut impact_by_id: HashMap<String, bool> = HashMap::new();

    for signal in signals {
        if let Some(matched) = matcher.best_match(&signal.name, records) {
            let negative = impact_by_id.entry(matched.port_id.clone()).or_insert(false);
            *negative |= signal.is_negative();
        }
    }

    let mut flagged = 0;
    for record in records.iter_mut() {
        if let Some(&negative) = impact_by_id.get(&record.port_id) {
            record.impact_score = Some(u8::from(negative));
            if negative && !record.disaster_indicator {
                record.disaster_indicator = true;
                flagged += 1;
            }
        }
    }

    tracing::info!(
        "Applied {} impact signals; {} ports newly flagged as disrupted",
        signals.len(),
        flagged
    );
    flagged
}

/// Tag every row with the classifier's cluster id.
pub fn tag_clusters(records: &mut [PortRecord], classifier: &dyn Classifier) {
    let clusters = classifier.classify(records);
    for (record, cluster) in records.iter_mut().zip(clusters) {
        record.resilience_cluster = Some(cluster);
    }
}

/// Serialize the augmented port table to CSV.
pub fn write_results<S: Storage>(
    storage: &S,
    path: &str,
    outcome: &RedistributionOutcome,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for port in &outcome.ports {
        writer.serialize(OutputRow {
            portid: &port.record.port_id,
            portname: port.record.port_name.as_deref(),
            vessel_count_total: port.record.vessel_count_total,
            import: port.record.import_volume,
            export: port.record.export_volume,
            disaster_indicator: u8::from(port.record.disaster_indicator),
            impact_score: port.record.impact_score,
            resilience_cluster: port.record.resilience_cluster,
            available_capacity: port.available_capacity,
            cargo_redistributed: port.cargo_redistributed,
            cargo_received: port.cargo_received,
            status: port.status,
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    storage.write_file(path, &bytes)?;
    tracing::info!("Wrote {} result rows to {}", outcome.ports.len(), path);
    Ok(())
}
