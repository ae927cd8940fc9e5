//! Detector Module - Baseline Residual Anomaly Detection
//!
//! Judges each sample independently against static baseline tolerances and
//! keeps a confusion matrix against the ground-truth fault flag.
//!
//! # Architecture
//! - `types.rs`: `Decision`, `SignalVerdict`, `Outcome`
//! - `matrix.rs`: `ConfusionMatrix`
//! - `sink.rs`: `DecisionSink` trait, CSV decision log
//! - `handler.rs`: glue from raw stream messages to `classify`
//!
//! # Contract
//! `classify` is synchronous and is called once per sample, in arrival
//! order, from a single context. The detector owns all run state.

pub mod types;
pub mod matrix;
pub mod sink;
pub mod handler;

pub use handler::DetectionHandler;
pub use matrix::ConfusionMatrix;
pub use sink::{CsvDecisionLog, DecisionSink};
pub use types::{Decision, Outcome, SignalVerdict};

use crate::logic::baseline::BaselineStats;
use crate::logic::telemetry::{SampleError, TelemetrySample};

/// Compare one sample against the baseline without touching any run state
///
/// Only signals present in both the sample and the statistics are evaluated.
/// Returns the verdicts, the OR of their flags, and the diagnostic score.
pub fn evaluate(stats: &BaselineStats, sample: &TelemetrySample) -> (Vec<SignalVerdict>, bool, f64) {
    let verdicts: Vec<SignalVerdict> = stats
        .signals
        .iter()
        .filter_map(|(name, s)| {
            let error = sample.control_error(name)?;
            Some(SignalVerdict {
                signal: name.clone(),
                error,
                deviation: s.deviation(error),
                tolerance: s.tolerance,
                z_score: s.z_score(error),
                anomalous: s.is_anomalous(error),
            })
        })
        .collect();

    let anomalous = verdicts.iter().any(|v| v.anomalous);
    let score = verdicts.iter().map(|v| v.z_score.abs()).fold(0.0, f64::max);

    (verdicts, anomalous, score)
}

/// Final tallies of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub matrix: ConfusionMatrix,
    /// Malformed samples, never classified
    pub rejected: u64,
    /// Decisions that could not be written to the log
    pub write_failures: u64,
    /// Final flush of the decision log failed
    pub flush_failed: bool,
    /// The baseline had no signals, so nothing was actually monitored
    pub vacuous: bool,
}

impl RunSummary {
    pub fn classified(&self) -> u64 {
        self.matrix.total()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = |v: Option<f64>| v.map(|x| format!("{:.1}%", x * 100.0)).unwrap_or_else(|| "n/a".into());
        write!(
            f,
            "{} | classified={} rejected={} write_failures={} | accuracy={} precision={} recall={}",
            self.matrix,
            self.classified(),
            self.rejected,
            self.write_failures,
            pct(self.matrix.accuracy()),
            pct(self.matrix.precision()),
            pct(self.matrix.recall()),
        )?;
        if self.flush_failed {
            write!(f, " | decision log flush FAILED")?;
        }
        if self.vacuous {
            write!(f, " | EMPTY BASELINE (no signals monitored)")?;
        }
        Ok(())
    }
}

/// Stateful detector for one run
pub struct AnomalyDetector {
    stats: BaselineStats,
    matrix: ConfusionMatrix,
    sink: Box<dyn DecisionSink>,
    rejected: u64,
    write_failures: u64,
}

impl AnomalyDetector {
    pub fn new(stats: BaselineStats, sink: Box<dyn DecisionSink>) -> Self {
        if stats.is_empty() {
            log::warn!(
                "Baseline statistics '{}' contain no signals - every sample will be classified normal. \
                 Check the baseline file.",
                stats.id
            );
        } else {
            log::info!("Detector monitoring {} signals (baseline '{}', k={})",
                stats.signals.len(), stats.id, stats.multiplier);
            for (name, s) in &stats.signals {
                log::info!("  {:<16} mean={:+.4} std={:.4} tol={:.4}", name, s.mean, s.std, s.tolerance);
            }
        }

        Self {
            stats,
            matrix: ConfusionMatrix::new(),
            sink,
            rejected: 0,
            write_failures: 0,
        }
    }

    /// True when the baseline monitors no signal; every sample will be normal
    pub fn is_vacuous(&self) -> bool {
        self.stats.is_empty()
    }

    /// Classify one sample against the baseline and record the outcome
    pub fn classify(&mut self, sample: &TelemetrySample, fault: bool) -> Decision {
        self.classify_labelled(sample, fault, Vec::new())
    }

    /// `classify`, keeping the active fault labels in the decision log
    pub fn classify_labelled(&mut self, sample: &TelemetrySample, fault: bool, faults: Vec<String>) -> Decision {
        let (signals, anomalous, score) = evaluate(&self.stats, sample);
        let outcome = Outcome::from_flags(anomalous, fault);

        let decision = Decision {
            timestamp: sample.timestamp,
            signals,
            anomalous,
            fault,
            faults,
            outcome,
            score,
        };

        self.matrix.record(outcome);

        if let Err(e) = self.sink.write(&decision) {
            self.write_failures += 1;
            log::error!("Failed to write decision to log ({} failures so far): {}", self.write_failures, e);
        }

        if anomalous {
            log::info!("ANOMALY [{}] fault={} score={:.2} | {} | {}",
                outcome, fault, score, decision.reason(), self.matrix);
        } else {
            log::debug!("normal [{}] fault={} score={:.2} | {}", outcome, fault, score, self.matrix);
        }

        decision
    }

    /// Count a sample that could not be decoded; the matrix is untouched
    pub fn reject(&mut self, err: &SampleError) {
        self.rejected += 1;
        log::warn!("Rejected malformed sample ({} so far): {}", self.rejected, err);
    }

    #[cfg(test)]
    pub fn matrix(&self) -> ConfusionMatrix {
        self.matrix
    }

    /// Flush the decision log, then hand back the final counts
    pub fn finish(mut self) -> RunSummary {
        let flush_failed = match self.sink.flush() {
            Ok(()) => false,
            Err(e) => {
                log::error!("Failed to flush decision log: {}", e);
                true
            }
        };

        RunSummary {
            matrix: self.matrix,
            rejected: self.rejected,
            write_failures: self.write_failures,
            flush_failed,
            vacuous: self.is_vacuous(),
        }
    }
}
