//! Configuration module

use std::path::PathBuf;

use crate::constants::{self, env_list_or, env_or, env_parse_or};
use crate::logic::stream::topic_for;

/// MQTT broker connection settings
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Broker connection
    pub broker: BrokerConfig,

    /// Directory holding the baseline log, stats file and decision logs
    pub data_dir: PathBuf,

    /// Stream used for detection runs
    pub stream: String,

    /// Fault-free stream used for baseline collection
    pub baseline_stream: String,

    /// Monitored signal keys
    pub signals: Vec<String>,

    /// Actuator channels recorded in the baseline log
    pub actuators: Vec<String>,

    /// Tolerance = multiplier * σ
    pub tolerance_multiplier: f64,

    /// Field under `faults` listing the active faults (ground truth)
    pub faults_key: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default_client_id = format!(
            "{}-{}",
            constants::APP_NAME,
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );

        Self {
            broker: BrokerConfig {
                host: env_or("BIOREACTOR_BROKER_HOST", constants::DEFAULT_BROKER_HOST),
                port: env_parse_or("BIOREACTOR_BROKER_PORT", constants::DEFAULT_BROKER_PORT),
                client_id: env_or("BIOREACTOR_CLIENT_ID", &default_client_id),
                keep_alive_secs: env_parse_or(
                    "BIOREACTOR_KEEP_ALIVE_SECS",
                    constants::DEFAULT_KEEP_ALIVE_SECS,
                ),
            },
            data_dir: PathBuf::from(env_or("BIOREACTOR_DATA_DIR", ".")),
            stream: env_or("BIOREACTOR_STREAM", constants::DEFAULT_STREAM),
            baseline_stream: env_or(
                "BIOREACTOR_BASELINE_STREAM",
                constants::DEFAULT_BASELINE_STREAM,
            ),
            signals: env_list_or("BIOREACTOR_SIGNALS", constants::DEFAULT_SIGNALS),
            actuators: env_list_or("BIOREACTOR_ACTUATORS", constants::DEFAULT_ACTUATORS),
            tolerance_multiplier: env_parse_or(
                "BIOREACTOR_TOLERANCE_MULTIPLIER",
                constants::DEFAULT_TOLERANCE_MULTIPLIER,
            ),
            faults_key: env_or("BIOREACTOR_FAULTS_KEY", constants::DEFAULT_FAULTS_KEY),
        }
    }

    /// Topic carrying the detection stream
    pub fn detection_topic(&self) -> String {
        topic_for(&self.stream)
    }

    /// Topic carrying the fault-free baseline stream
    pub fn baseline_topic(&self) -> String {
        topic_for(&self.baseline_stream)
    }

    pub fn baseline_log_path(&self) -> PathBuf {
        self.data_dir.join(constants::BASELINE_LOG_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join(constants::BASELINE_STATS_FILE)
    }

    /// Decision log for the given stream
    pub fn decision_log_path(&self, stream: &str) -> PathBuf {
        self.data_dir.join(format!("detection_log_{}.csv", sanitize(stream)))
    }

    /// Decision log for an offline replay; never overwrites the live log
    pub fn replay_log_path(&self, stream: &str) -> PathBuf {
        self.data_dir.join(format!("detection_log_{}_replay.csv", sanitize(stream)))
    }
}

/// Keep file names portable whatever the stream name looks like
fn sanitize(stream: &str) -> String {
    stream
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_log_path_varies_by_stream() {
        let mut config = Config::from_env();
        config.data_dir = PathBuf::from("/tmp/runs");

        let a = config.decision_log_path("single_fault");
        let b = config.decision_log_path("three_faults");

        assert_eq!(a, PathBuf::from("/tmp/runs/detection_log_single_fault.csv"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_replay_log_does_not_clobber_live_log() {
        let mut config = Config::from_env();
        config.data_dir = PathBuf::from("/tmp/runs");

        let live = config.decision_log_path("three_faults");
        let replay = config.replay_log_path("three_faults");

        assert_eq!(replay, PathBuf::from("/tmp/runs/detection_log_three_faults_replay.csv"));
        assert_ne!(live, replay);
    }

    #[test]
    fn test_decision_log_path_sanitizes_separators() {
        let config = Config::from_env();
        let path = config.decision_log_path("../etc/passwd");
        assert!(path.ends_with("detection_log____etc_passwd.csv"));
    }

    #[test]
    fn test_topics_follow_stream_names() {
        let mut config = Config::from_env();
        config.stream = "three_faults".into();
        config.baseline_stream = "nofaults".into();

        assert_eq!(config.detection_topic(), "bioreactor_sim/three_faults/telemetry/summary");
        assert_eq!(config.baseline_topic(), "bioreactor_sim/nofaults/telemetry/summary");
    }
}
