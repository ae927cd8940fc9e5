//! Baseline Trainer
//!
//! Single batch aggregation over the fault-free log: per-signal mean and
//! sample σ of control error, tolerance = k * σ (optionally floored).

use std::collections::BTreeMap;

use super::types::{BaselineStats, ChannelStats, RunningStats, SignalStats};
use crate::logic::dataset::BaselineLog;

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// k in tolerance = k * σ
    pub multiplier: f64,
    /// Optional per-signal minimum tolerance
    pub min_tolerance: BTreeMap<String, f64>,
}

impl TrainerConfig {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            min_tolerance: BTreeMap::new(),
        }
    }

    pub fn with_floor(mut self, signal: &str, floor: f64) -> Self {
        self.min_tolerance.insert(signal.to_string(), floor);
        self
    }

    fn tolerance(&self, signal: &str, std: f64) -> f64 {
        let tol = self.multiplier * std;
        match self.min_tolerance.get(signal) {
            Some(floor) => tol.max(*floor),
            None => tol,
        }
    }
}

/// Parse a `SIGNAL=VALUE` floor argument
pub fn parse_floor(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SIGNAL=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing signal name in '{}'", raw));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("tolerance floor must be >= 0, got {}", value));
    }
    Ok((name.to_string(), value))
}

/// Compute baseline statistics from a loaded log
///
/// Signals with no usable rows are left out of the result.
pub fn train(baseline: &BaselineLog, config: &TrainerConfig) -> BaselineStats {
    let mut errors: BTreeMap<&str, RunningStats> = baseline
        .layout
        .signals
        .iter()
        .map(|s| (s.as_str(), RunningStats::default()))
        .collect();
    let mut channels: BTreeMap<&str, RunningStats> = baseline
        .layout
        .actuators
        .iter()
        .map(|a| (a.as_str(), RunningStats::default()))
        .collect();

    for sample in &baseline.samples {
        for (name, acc) in errors.iter_mut() {
            if let Some(err) = sample.control_error(name) {
                acc.push(err);
            }
        }
        for (name, acc) in channels.iter_mut() {
            if let Some(v) = sample.actuator(name) {
                acc.push(v);
            }
        }
    }

    let mut stats = BaselineStats::new(config.multiplier);
    stats.samples = baseline.samples.len() as u64;

    for (name, acc) in &errors {
        let (Some(mean), Some(std)) = (acc.mean(), acc.std()) else {
            log::warn!("Signal '{}' has no baseline samples - it will not be monitored", name);
            continue;
        };

        let tolerance = config.tolerance(name, std);
        if std == 0.0 && tolerance == 0.0 {
            log::warn!("Signal '{}' has zero variance - any deviation will be flagged", name);
        }

        stats = stats.with_signal(
            name,
            SignalStats { samples: acc.count(), ..SignalStats::new(mean, std, tolerance) },
        );
    }

    for (name, acc) in &channels {
        if let (Some(mean), Some(std)) = (acc.mean(), acc.std()) {
            stats.actuators.insert(
                name.to_string(),
                ChannelStats { mean, std, samples: acc.count() },
            );
        }
    }

    stats
}
