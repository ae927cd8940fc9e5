//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden through a `BIOREACTOR_*` environment
//! variable (see `logic::config`) or a CLI flag.

/// Default MQTT broker host
pub const DEFAULT_BROKER_HOST: &str = "engf0001.cs.ucl.ac.uk";

/// Default MQTT broker port
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Default MQTT keep-alive (seconds)
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 60;

/// Stream used for live detection runs
/// One of: "nofaults", "single_fault", "three_faults", "variable_setpoints"
pub const DEFAULT_STREAM: &str = "variable_setpoints";

/// Fault-free stream used to collect the baseline
pub const DEFAULT_BASELINE_STREAM: &str = "nofaults";

/// Monitored signals (payload keys), in log column order
pub const DEFAULT_SIGNALS: &[&str] = &["temperature_C", "pH", "rpm"];

/// Actuator channels recorded alongside the signals
pub const DEFAULT_ACTUATORS: &[&str] = &["heater_pwm", "motor_pwm", "acid_pwm", "base_pwm"];

/// z multiplier applied to the baseline σ (3σ covers most normal noise)
pub const DEFAULT_TOLERANCE_MULTIPLIER: f64 = 3.0;

/// Field inside `payload["faults"]` that lists active faults
pub const DEFAULT_FAULTS_KEY: &str = "last_active";

/// Field inside `payload[signal]` that holds the measured value
pub const MEASUREMENT_KEY: &str = "mean";

/// Payload object holding the set-points
pub const SETPOINTS_KEY: &str = "setpoints";

/// Payload object holding actuator averages
pub const ACTUATORS_KEY: &str = "actuators_avg";

/// Payload object holding fault metadata
pub const FAULTS_KEY: &str = "faults";

/// Baseline log file name (collector output, trainer input)
pub const BASELINE_LOG_FILE: &str = "baseline.csv";

/// Baseline statistics file name (trainer output, detector input)
pub const BASELINE_STATS_FILE: &str = "baseline_stats.json";

/// App name
pub const APP_NAME: &str = "bioreactor-monitor";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Read a string variable or fall back to `default`
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse a variable, falling back to `default` when unset or invalid
pub fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a comma separated list, falling back to `default` when unset or empty
pub fn env_list_or(key: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = std::env::var(key)
        .map(|s| split_list(&s))
        .unwrap_or_default();

    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

/// Split "a, b,,c" into ["a", "b", "c"]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" temperature_C, pH,,rpm "), vec!["temperature_C", "pH", "rpm"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_env_fallbacks() {
        assert_eq!(env_or("BIOREACTOR_TEST_UNSET_STRING", "x"), "x");
        assert_eq!(env_parse_or("BIOREACTOR_TEST_UNSET_NUMBER", 7u16), 7);
        assert_eq!(
            env_list_or("BIOREACTOR_TEST_UNSET_LIST", DEFAULT_SIGNALS),
            vec!["temperature_C", "pH", "rpm"]
        );
    }
}
