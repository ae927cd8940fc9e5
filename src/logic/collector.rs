//! Baseline Collector
//!
//! Records fault-free telemetry into the baseline CSV log. Samples carrying
//! none of the configured signals are skipped; malformed payloads are logged
//! and skipped. A failed append is counted and never stops the run.

use chrono::Utc;

use crate::logic::dataset::{BaselineLogWriter, DatasetError};
use crate::logic::stream::{Handled, MessageHandler};
use crate::logic::telemetry;

/// Counts reported at the end of a collection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub written: u64,
    pub skipped: u64,
    pub rejected: u64,
    pub write_failures: u64,
}

impl std::fmt::Display for CollectSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "written={} skipped={} rejected={} write_failures={}",
            self.written, self.skipped, self.rejected, self.write_failures)
    }
}

pub struct BaselineCollector {
    writer: BaselineLogWriter,
    faults_key: String,
    summary: CollectSummary,
}

impl BaselineCollector {
    pub fn new(writer: BaselineLogWriter, faults_key: &str) -> Self {
        Self {
            writer,
            faults_key: faults_key.to_string(),
            summary: CollectSummary::default(),
        }
    }

    /// Flush the log and return the final counts
    pub fn finish(mut self) -> Result<CollectSummary, DatasetError> {
        self.writer.flush()?;
        log::info!("Baseline log closed after {} rows this run", self.writer.rows_written());
        Ok(self.summary)
    }
}

impl MessageHandler for BaselineCollector {
    fn handle(&mut self, topic: &str, payload: &[u8]) -> Handled {
        let msg = match telemetry::decode(payload, &self.faults_key, Utc::now()) {
            Ok(msg) => msg,
            Err(e) => {
                self.summary.rejected += 1;
                log::warn!("[{}] Failed to parse payload: {}", topic, e);
                return Handled::Skipped;
            }
        };

        if !msg.sample.has_any_signal(&self.writer.layout().signals) {
            self.summary.skipped += 1;
            log::warn!("Skipping sample (no monitored measurement/set-point pair)");
            return Handled::Skipped;
        }

        if msg.fault_active() {
            log::warn!("Baseline stream reports active faults {:?} - recording anyway", msg.faults);
        }

        if let Err(e) = self.writer.append(&msg.sample) {
            self.summary.write_failures += 1;
            log::error!("Failed to append to baseline log: {}", e);
            return Handled::Skipped;
        }
        self.summary.written += 1;

        let line: Vec<String> = msg
            .sample
            .signals
            .iter()
            .map(|(name, r)| format!("{}={:.2} (SP={:.2}) Err={:+.2}", name, r.measured, r.setpoint, r.control_error()))
            .collect();
        log::info!("Saved #{}: {}", self.summary.written, line.join(" | "));

        Handled::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::{read_baseline_log, LogLayout};
    use serde_json::json;

    fn collector(dir: &std::path::Path) -> BaselineCollector {
        let layout = LogLayout::new(
            vec!["temperature_C".into(), "pH".into(), "rpm".into()],
            vec!["heater_pwm".into()],
        );
        let writer = BaselineLogWriter::open(&dir.join("baseline.csv"), layout).unwrap();
        BaselineCollector::new(writer, "last_active")
    }

    #[test]
    fn test_collect_writes_valid_samples_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = collector(dir.path());

        let good = json!({
            "temperature_C": {"mean": 30.1},
            "pH": {"mean": 5.0},
            "setpoints": {"temperature_C": 30.0, "pH": 5.0},
            "actuators_avg": {"heater_pwm": 0.3}
        });
        let unmonitored = json!({
            "dissolved_o2": {"mean": 7.0},
            "setpoints": {"dissolved_o2": 7.5}
        });

        assert_eq!(c.handle("t", good.to_string().as_bytes()), Handled::Accepted);
        assert_eq!(c.handle("t", unmonitored.to_string().as_bytes()), Handled::Skipped);
        assert_eq!(c.handle("t", b"garbage"), Handled::Skipped);

        let summary = c.finish().unwrap();
        assert_eq!(summary, CollectSummary { written: 1, skipped: 1, rejected: 1, write_failures: 0 });

        let log = read_baseline_log(&dir.path().join("baseline.csv")).unwrap();
        assert_eq!(log.samples.len(), 1);
        assert_eq!(log.samples[0].actuator("heater_pwm"), Some(0.3));
        assert!(log.samples[0].signal("rpm").is_none());
    }
}
