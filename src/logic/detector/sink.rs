//! Decision Log Sink
//!
//! Append-only record of every classified sample. The CSV sink buffers
//! writes; `flush` is called once at run teardown.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use super::types::Decision;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for detection decisions
pub trait DecisionSink: Send {
    fn write(&mut self, decision: &Decision) -> Result<(), SinkError>;
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// CSV decision log, one row per sample
///
/// Columns: `time`, then `<S>_error,<S>_deviation,<S>_anomaly` per monitored
/// signal, then `anomaly,fault,faults,outcome,score,reason`. Active fault
/// labels are joined with `;`.
pub struct CsvDecisionLog {
    writer: csv::Writer<BufWriter<File>>,
    signals: Vec<String>,
}

impl CsvDecisionLog {
    /// Create (truncate) the log at `path` and write the header
    pub fn create(path: &Path, signals: Vec<String>) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        writer.write_record(&Self::header(&signals))?;

        log::info!("Decision log: {:?}", path);
        Ok(Self { writer, signals })
    }

    pub fn header(signals: &[String]) -> Vec<String> {
        let mut columns = vec!["time".to_string()];
        for s in signals {
            columns.push(format!("{}_error", s));
            columns.push(format!("{}_deviation", s));
            columns.push(format!("{}_anomaly", s));
        }
        columns.extend(
            ["anomaly", "fault", "faults", "outcome", "score", "reason"]
                .iter()
                .map(|c| c.to_string()),
        );
        columns
    }
}

impl DecisionSink for CsvDecisionLog {
    fn write(&mut self, decision: &Decision) -> Result<(), SinkError> {
        let mut row = Vec::with_capacity(7 + self.signals.len() * 3);
        row.push(decision.timestamp.to_rfc3339());

        for signal in &self.signals {
            match decision.verdict(signal) {
                Some(v) => {
                    row.push(v.error.to_string());
                    row.push(v.deviation.to_string());
                    row.push(v.anomalous.to_string());
                }
                None => row.extend(std::iter::repeat(String::new()).take(3)),
            }
        }

        row.push(decision.anomalous.to_string());
        row.push(decision.fault.to_string());
        row.push(decision.faults.join(";"));
        row.push(decision.outcome.label().to_string());
        row.push(format!("{:.4}", decision.score));
        row.push(decision.reason());

        self.writer.write_record(&row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
