//! Offline replay of recorded payloads
//!
//! Input is JSON lines: one simulator payload per line, blank lines ignored.
//! Lines are handed over as raw bytes, so a corrupt line is rejected by the
//! handler like any other malformed payload. Only read errors end the replay.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{MessageHandler, StopCondition, StreamError, StreamStats};

/// Feed every line of `path` to `handler` as if it arrived on `topic`
pub fn replay_file<H: MessageHandler + ?Sized>(
    path: &Path,
    topic: &str,
    handler: &mut H,
    stop: StopCondition,
) -> Result<StreamStats, StreamError> {
    let reader = BufReader::new(File::open(path)?);
    let mut stats = StreamStats::default();

    log::info!("Replaying {:?} as {}", path, topic);

    for line in reader.split(b'\n') {
        let line = line?;
        let payload = line.trim_ascii();
        if payload.is_empty() {
            continue;
        }

        stats.dispatch(handler, topic, payload);
        if stop.samples_reached(stats.accepted) {
            log::info!("Sample limit reached ({}) - stopping replay", stats.accepted);
            break;
        }
    }

    log::info!("Replay finished: received={} accepted={}", stats.received, stats.accepted);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::stream::Handled;
    use std::io::Write;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl MessageHandler for Recorder {
        fn handle(&mut self, topic: &str, payload: &[u8]) -> Handled {
            assert_eq!(topic, "bioreactor_sim/test/telemetry/summary");
            self.0.push(String::from_utf8_lossy(payload).into_owned());
            Handled::Accepted
        }
    }

    #[test]
    fn test_replay_skips_blank_lines_and_honours_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"a\": 1}}").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   ").unwrap();
        writeln!(file, "{{\"a\": 2}}").unwrap();
        writeln!(file, "{{\"a\": 3}}").unwrap();
        file.flush().unwrap();

        let mut handler = Recorder::default();
        let stats = replay_file(
            file.path(),
            "bioreactor_sim/test/telemetry/summary",
            &mut handler,
            StopCondition::new(Some(2), None),
        )
        .unwrap();

        assert_eq!(stats, StreamStats { received: 2, accepted: 2 });
        assert_eq!(handler.0, vec!["{\"a\": 1}", "{\"a\": 2}"]);
    }

    #[test]
    fn test_replay_continues_past_non_utf8_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"a\": 1}\n").unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        file.write_all(b"{\"a\": 2}\r\n").unwrap();
        file.flush().unwrap();

        let mut handler = Recorder::default();
        let stats = replay_file(
            file.path(),
            "bioreactor_sim/test/telemetry/summary",
            &mut handler,
            StopCondition::default(),
        )
        .unwrap();

        assert_eq!(stats, StreamStats { received: 3, accepted: 3 });
        assert_eq!(handler.0[2], "{\"a\": 2}");
    }

    #[test]
    fn test_replay_missing_file_is_io_error() {
        let mut handler = Recorder::default();
        let result = replay_file(
            Path::new("/definitely/not/here.jsonl"),
            "t",
            &mut handler,
            StopCondition::default(),
        );
        assert!(matches!(result, Err(StreamError::Io(_))));
    }
}
