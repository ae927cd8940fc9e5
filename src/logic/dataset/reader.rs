use std::path::Path;

use chrono::{DateTime, Utc};

use super::layout::{LogLayout, SETPOINT_SUFFIX, TIME_COLUMN};
use super::DatasetError;
use crate::logic::telemetry::TelemetrySample;

/// Baseline log loaded in memory, rows in file order
#[derive(Debug, Clone)]
pub struct BaselineLog {
    pub layout: LogLayout,
    pub samples: Vec<TelemetrySample>,
    /// Cells that were present but could not be parsed
    pub bad_cells: u64,
}

/// Read the baseline CSV written by `BaselineLogWriter`
///
/// Empty cells are absent values. Unparseable cells are counted and treated
/// as absent; they never fail the whole load.
pub fn read_baseline_log(path: &Path) -> Result<BaselineLog, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let layout = LogLayout::from_header(&header);

    let index_of = |col: &str| header.iter().position(|h| h == col);
    let time_idx = index_of(TIME_COLUMN);
    let signal_idx: Vec<(String, Option<usize>, Option<usize>)> = layout
        .signals
        .iter()
        .map(|s| {
            (
                s.clone(),
                index_of(s.as_str()),
                index_of(format!("{}{}", s, SETPOINT_SUFFIX).as_str()),
            )
        })
        .collect();
    let actuator_idx: Vec<(String, Option<usize>)> = layout
        .actuators
        .iter()
        .map(|a| (a.clone(), index_of(a.as_str())))
        .collect();

    let mut samples = Vec::new();
    let mut bad_cells = 0u64;

    for result in reader.records() {
        let record = result?;
        let mut cell = |idx: Option<usize>| -> Option<f64> {
            let raw = idx.and_then(|i| record.get(i)).map(str::trim).unwrap_or("");
            if raw.is_empty() {
                return None;
            }
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    bad_cells += 1;
                    None
                }
            }
        };

        let timestamp = time_idx
            .and_then(|i| record.get(i))
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default();

        let mut sample = TelemetrySample::new(timestamp);
        for (name, measured_idx, setpoint_idx) in &signal_idx {
            let measured = cell(*measured_idx);
            let setpoint = cell(*setpoint_idx);
            if let (Some(m), Some(sp)) = (measured, setpoint) {
                sample = sample.with_signal(name, m, sp);
            }
        }
        for (name, idx) in &actuator_idx {
            if let Some(v) = cell(*idx) {
                sample = sample.with_actuator(name, v);
            }
        }

        samples.push(sample);
    }

    log::info!("Read {} baseline rows from {:?} (signals: {:?})",
        samples.len(), path, layout.signals);

    Ok(BaselineLog { layout, samples, bad_cells })
}
