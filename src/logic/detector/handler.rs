use chrono::Utc;

use super::{AnomalyDetector, RunSummary};
use crate::logic::stream::{Handled, MessageHandler};
use crate::logic::telemetry;

/// Feeds raw stream messages to the detector
///
/// Ground truth comes from the payload's `faults.<faults_key>` field.
pub struct DetectionHandler {
    detector: AnomalyDetector,
    faults_key: String,
}

impl DetectionHandler {
    pub fn new(detector: AnomalyDetector, faults_key: &str) -> Self {
        Self {
            detector,
            faults_key: faults_key.to_string(),
        }
    }

    pub fn finish(self) -> RunSummary {
        self.detector.finish()
    }
}

impl MessageHandler for DetectionHandler {
    fn handle(&mut self, topic: &str, payload: &[u8]) -> Handled {
        match telemetry::decode(payload, &self.faults_key, Utc::now()) {
            Ok(msg) => {
                let fault = msg.fault_active();
                if fault {
                    log::debug!("[{}] active faults: {:?}", topic, msg.faults);
                }
                self.detector.classify_labelled(&msg.sample, fault, msg.faults);
                Handled::Accepted
            }
            Err(e) => {
                self.detector.reject(&e);
                Handled::Skipped
            }
        }
    }
}
