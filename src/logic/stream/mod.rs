//! Stream Module - Telemetry Transport
//!
//! Delivers simulator messages to a `MessageHandler`, either live from the
//! MQTT broker (`mqtt.rs`) or from a recorded JSON-lines file (`replay.rs`).
//! Handlers are called one message at a time, in arrival order.

pub mod mqtt;
pub mod replay;

use std::time::Duration;

pub use mqtt::run_stream;
pub use replay::replay_file;

/// Topic carrying the summary telemetry of a simulator stream
pub fn topic_for(stream: &str) -> String {
    format!("bioreactor_sim/{}/telemetry/summary", stream)
}

/// What a handler did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Counted towards the run (recorded / classified)
    Accepted,
    /// Dropped (malformed, or nothing usable in it)
    Skipped,
}

/// Receives decoded transport messages
pub trait MessageHandler {
    fn handle(&mut self, topic: &str, payload: &[u8]) -> Handled;
}

/// When to end a run; Ctrl-C always ends a live run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopCondition {
    /// Stop after this many accepted messages
    pub max_samples: Option<u64>,
    /// Stop after this much wall-clock time
    pub duration: Option<Duration>,
}

impl StopCondition {
    pub fn new(max_samples: Option<u64>, duration_secs: Option<u64>) -> Self {
        Self {
            max_samples,
            duration: duration_secs.map(Duration::from_secs),
        }
    }

    pub fn samples_reached(&self, accepted: u64) -> bool {
        self.max_samples.map_or(false, |max| accepted >= max)
    }
}

/// Message counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub received: u64,
    pub accepted: u64,
}

impl StreamStats {
    /// Hand one message to the handler and update the counts
    pub fn dispatch<H: MessageHandler + ?Sized>(&mut self, handler: &mut H, topic: &str, payload: &[u8]) -> Handled {
        self.received += 1;
        let handled = handler.handle(topic, payload);
        if handled == Handled::Accepted {
            self.accepted += 1;
        }
        handled
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EveryOther(u64);

    impl MessageHandler for EveryOther {
        fn handle(&mut self, _topic: &str, _payload: &[u8]) -> Handled {
            self.0 += 1;
            if self.0 % 2 == 0 { Handled::Accepted } else { Handled::Skipped }
        }
    }

    #[test]
    fn test_topic_for() {
        assert_eq!(topic_for("nofaults"), "bioreactor_sim/nofaults/telemetry/summary");
    }

    #[test]
    fn test_stop_condition() {
        let stop = StopCondition::new(Some(3), None);
        assert!(!stop.samples_reached(2));
        assert!(stop.samples_reached(3));
        assert!(!StopCondition::default().samples_reached(u64::MAX));
        assert_eq!(StopCondition::new(None, Some(5)).duration, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_dispatch_counts() {
        let mut handler = EveryOther(0);
        let mut stats = StreamStats::default();
        for _ in 0..5 {
            stats.dispatch(&mut handler, "t", b"{}");
        }
        assert_eq!(stats, StreamStats { received: 5, accepted: 2 });
    }
}
