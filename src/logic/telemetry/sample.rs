use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measured value and its set-point for one signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub measured: f64,
    pub setpoint: f64,
}

impl SignalReading {
    pub fn new(measured: f64, setpoint: f64) -> Self {
        Self { measured, setpoint }
    }

    /// Control error: measured - set-point
    pub fn control_error(&self) -> f64 {
        self.measured - self.setpoint
    }
}

/// One timestamped observation from the bioreactor
///
/// Signals are keyed by name so new signals need no code change.
/// A signal only appears here when both its measurement and its set-point
/// were present in the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub signals: BTreeMap<String, SignalReading>,
    #[serde(default)]
    pub actuators: BTreeMap<String, f64>,
}

impl TelemetrySample {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            signals: BTreeMap::new(),
            actuators: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and replay
    pub fn with_signal(mut self, name: &str, measured: f64, setpoint: f64) -> Self {
        self.signals.insert(name.to_string(), SignalReading::new(measured, setpoint));
        self
    }

    pub fn with_actuator(mut self, name: &str, value: f64) -> Self {
        self.actuators.insert(name.to_string(), value);
        self
    }

    /// Reading for `name`, or None when the signal was not in the message
    pub fn signal(&self, name: &str) -> Option<&SignalReading> {
        self.signals.get(name)
    }

    pub fn control_error(&self, name: &str) -> Option<f64> {
        self.signal(name).map(SignalReading::control_error)
    }

    pub fn actuator(&self, name: &str) -> Option<f64> {
        self.actuators.get(name).copied()
    }

    pub fn has_any_signal<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.signals.contains_key(n.as_ref()))
    }
}
