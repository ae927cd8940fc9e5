//! Simulator Payload Decoding
//!
//! Turns one MQTT summary message into a `TelemetrySample` plus the list of
//! active faults. Expected shape:
//!
//! ```text
//! {
//!   "temperature_C": { "mean": 30.1, ... },
//!   "pH":            { "mean": 5.02, ... },
//!   "rpm":           { "mean": 998.0, ... },
//!   "setpoints":     { "temperature_C": 30.0, "pH": 5.0, "rpm": 1000.0 },
//!   "actuators_avg": { "heater_pwm": 0.4, ... },
//!   "faults":        { "last_active": ["therm_voltage_bias"] }
//! }
//! ```
//!
//! Lookups are optional: a field that is absent yields `None` and the signal is
//! simply not part of the sample. A measurement or set-point that is present
//! but not a number rejects the whole message; a bad actuator value is dropped.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::sample::TelemetrySample;
use crate::constants::{ACTUATORS_KEY, FAULTS_KEY, MEASUREMENT_KEY, SETPOINTS_KEY};

/// Why a message could not be turned into a sample
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{0}' is not numeric")]
    NonNumeric(String),
}

/// A decoded message: the sample and its ground-truth fault labels
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub sample: TelemetrySample,
    pub faults: Vec<String>,
}

impl DecodedMessage {
    /// Ground truth: true when any fault is active
    pub fn fault_active(&self) -> bool {
        !self.faults.is_empty()
    }
}

/// Decode raw bytes received at `received_at`
///
/// `faults_key` selects the field under `faults` that lists active faults.
pub fn decode(
    payload: &[u8],
    faults_key: &str,
    received_at: DateTime<Utc>,
) -> Result<DecodedMessage, SampleError> {
    let value: Value = serde_json::from_slice(payload)?;
    decode_value(&value, faults_key, received_at)
}

pub fn decode_value(
    value: &Value,
    faults_key: &str,
    received_at: DateTime<Utc>,
) -> Result<DecodedMessage, SampleError> {
    let root = value.as_object().ok_or(SampleError::NotAnObject)?;

    let setpoints = match root.get(SETPOINTS_KEY) {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => {
            return Err(SampleError::MissingField(SETPOINTS_KEY.to_string()))
        }
        Some(_) => return Err(SampleError::NonNumeric(SETPOINTS_KEY.to_string())),
    };

    let mut sample = TelemetrySample::new(received_at);

    for (name, raw_setpoint) in setpoints {
        let setpoint = number(raw_setpoint, &format!("{}.{}", SETPOINTS_KEY, name))?;
        let measured = match lookup(value, &[name.as_str(), MEASUREMENT_KEY]) {
            Some(raw) => number(raw, &format!("{}.{}", name, MEASUREMENT_KEY))?,
            None => None,
        };

        if let (Some(measured), Some(setpoint)) = (measured, setpoint) {
            sample = sample.with_signal(name, measured, setpoint);
        }
    }

    // Actuators are diagnostic only: a bad value drops that channel, not the sample
    if let Some(Value::Object(actuators)) = root.get(ACTUATORS_KEY) {
        for (name, raw) in actuators {
            match number(raw, &format!("{}.{}", ACTUATORS_KEY, name)) {
                Ok(Some(v)) => sample = sample.with_actuator(name, v),
                Ok(None) => {}
                Err(e) => log::warn!("Ignoring actuator channel: {}", e),
            }
        }
    }

    let faults = extract_faults(lookup(value, &[FAULTS_KEY, faults_key]));

    Ok(DecodedMessage { sample, faults })
}

/// Walk nested objects, returning None as soon as a key is absent
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |cur, key| cur.as_object()?.get(*key))
}

/// `null` means absent; any other non-number is malformed
fn number(value: &Value, field: &str) -> Result<Option<f64>, SampleError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| SampleError::NonNumeric(field.to_string())),
        _ => Err(SampleError::NonNumeric(field.to_string())),
    }
}

/// Active faults may be a list, a map (values are the labels), a single string or null
fn extract_faults(value: Option<&Value>) -> Vec<String> {
    let label = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).map(label).collect(),
        Some(Value::Object(map)) => map.values().filter(|v| !v.is_null()).map(label).collect(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(other) => vec![label(other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_decode_full_payload() {
        let payload = json!({
            "temperature_C": {"mean": 30.4, "min": 30.0, "max": 30.9},
            "pH": {"mean": 5.1},
            "rpm": {"mean": 990.0},
            "setpoints": {"temperature_C": 30.0, "pH": 5.0, "rpm": 1000.0},
            "actuators_avg": {"heater_pwm": 0.4, "motor_pwm": 0.7},
            "faults": {"last_active": ["therm_voltage_bias"]}
        });

        let msg = decode(payload.to_string().as_bytes(), "last_active", now()).unwrap();

        assert_eq!(msg.sample.signals.len(), 3);
        assert!((msg.sample.control_error("temperature_C").unwrap() - 0.4).abs() < 1e-9);
        assert!((msg.sample.control_error("rpm").unwrap() + 10.0).abs() < 1e-9);
        assert_eq!(msg.sample.actuator("heater_pwm"), Some(0.4));
        assert_eq!(msg.faults, vec!["therm_voltage_bias"]);
        assert!(msg.fault_active());
    }

    #[test]
    fn test_signal_without_measurement_is_absent() {
        let payload = json!({
            "temperature_C": {"mean": 30.4},
            "setpoints": {"temperature_C": 30.0, "pH": 5.0}
        });

        let msg = decode_value(&payload, "last_active", now()).unwrap();
        assert!(msg.sample.signal("temperature_C").is_some());
        assert!(msg.sample.signal("pH").is_none());
        assert!(!msg.fault_active());
    }

    #[test]
    fn test_null_setpoint_is_absent() {
        let payload = json!({
            "pH": {"mean": 5.2},
            "setpoints": {"pH": null}
        });

        let msg = decode_value(&payload, "last_active", now()).unwrap();
        assert!(msg.sample.signals.is_empty());
    }

    #[test]
    fn test_reject_non_numeric_measurement() {
        let payload = json!({
            "pH": {"mean": "five"},
            "setpoints": {"pH": 5.0}
        });

        match decode_value(&payload, "last_active", now()) {
            Err(SampleError::NonNumeric(field)) => assert_eq!(field, "pH.mean"),
            other => panic!("Expected NonNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_actuator_is_dropped_not_rejected() {
        let payload = json!({
            "temperature_C": {"mean": 35.0},
            "setpoints": {"temperature_C": 30.0},
            "actuators_avg": {"heater_pwm": "n/a", "motor_pwm": 0.6},
            "faults": {"last_active": ["heater_stuck"]}
        });

        let msg = decode_value(&payload, "last_active", now()).unwrap();
        assert_eq!(msg.sample.actuator("heater_pwm"), None);
        assert_eq!(msg.sample.actuator("motor_pwm"), Some(0.6));
        assert!((msg.sample.control_error("temperature_C").unwrap() - 5.0).abs() < 1e-9);
        assert!(msg.fault_active());
    }

    #[test]
    fn test_reject_missing_setpoints() {
        let payload = json!({"pH": {"mean": 5.0}});
        assert!(matches!(
            decode_value(&payload, "last_active", now()),
            Err(SampleError::MissingField(_))
        ));
    }

    #[test]
    fn test_reject_invalid_json_and_non_object() {
        assert!(matches!(
            decode(b"{not json", "last_active", now()),
            Err(SampleError::InvalidJson(_))
        ));
        assert!(matches!(
            decode(b"[1, 2, 3]", "last_active", now()),
            Err(SampleError::NotAnObject)
        ));
    }

    #[test]
    fn test_fault_shapes() {
        assert!(extract_faults(None).is_empty());
        assert!(extract_faults(Some(&json!(null))).is_empty());
        assert!(extract_faults(Some(&json!([]))).is_empty());
        assert!(extract_faults(Some(&json!(""))).is_empty());
        assert_eq!(extract_faults(Some(&json!("ph_drift"))), vec!["ph_drift"]);
        assert_eq!(
            extract_faults(Some(&json!({"a": "heater_stuck", "b": null}))),
            vec!["heater_stuck"]
        );
    }

    #[test]
    fn test_custom_faults_key() {
        let payload = json!({
            "setpoints": {},
            "faults": {"last_active": [], "current": ["motor_stall"]}
        });

        assert!(!decode_value(&payload, "last_active", now()).unwrap().fault_active());
        assert!(decode_value(&payload, "current", now()).unwrap().fault_active());
    }

    #[test]
    fn test_lookup_is_optional() {
        let v = json!({"a": {"b": 1}});
        assert_eq!(lookup(&v, &["a", "b"]), Some(&json!(1)));
        assert_eq!(lookup(&v, &["a", "c"]), None);
        assert_eq!(lookup(&v, &["a", "b", "c"]), None);
    }
}
