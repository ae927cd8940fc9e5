//! Baseline Log Layout
//!
//! Column schema of the baseline CSV:
//!
//! ```text
//! time, <S>, <S>_setpoint, <S>_error, ..., <actuator>, ...
//! ```
//!
//! The trainer rebuilds the layout from the header alone, so any signal `S`
//! with a companion `S_setpoint` column is picked up without code changes.

pub const TIME_COLUMN: &str = "time";
pub const SETPOINT_SUFFIX: &str = "_setpoint";
pub const ERROR_SUFFIX: &str = "_error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLayout {
    pub signals: Vec<String>,
    pub actuators: Vec<String>,
}

impl LogLayout {
    pub fn new(signals: Vec<String>, actuators: Vec<String>) -> Self {
        Self { signals, actuators }
    }

    /// Full header row in column order
    pub fn header(&self) -> Vec<String> {
        let mut columns = vec![TIME_COLUMN.to_string()];
        for signal in &self.signals {
            columns.push(signal.clone());
            columns.push(format!("{}{}", signal, SETPOINT_SUFFIX));
            columns.push(format!("{}{}", signal, ERROR_SUFFIX));
        }
        columns.extend(self.actuators.iter().cloned());
        columns
    }

    /// Rebuild a layout from an existing header
    ///
    /// Every `S` with an `S_setpoint` column is a signal; `*_error` columns are
    /// derived and ignored; anything else besides `time` is an actuator channel.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let names: Vec<&str> = header.iter().map(|h| h.as_ref().trim()).collect();
        let has = |col: &str| names.iter().any(|n| *n == col);

        let mut signals = Vec::new();
        let mut actuators = Vec::new();

        for name in &names {
            if *name == TIME_COLUMN || name.is_empty() {
                continue;
            }
            if has(format!("{}{}", name, SETPOINT_SUFFIX).as_str()) {
                signals.push(name.to_string());
                continue;
            }
            if let Some(base) = name.strip_suffix(SETPOINT_SUFFIX) {
                if has(base) {
                    continue;
                }
            }
            if let Some(base) = name.strip_suffix(ERROR_SUFFIX) {
                if has(base) && has(format!("{}{}", base, SETPOINT_SUFFIX).as_str()) {
                    continue;
                }
            }
            actuators.push(name.to_string());
        }

        Self { signals, actuators }
    }
}
