use std::fs::{self, File, OpenOptions};
use std::path::Path;

use super::layout::LogLayout;
use super::DatasetError;
use crate::logic::telemetry::TelemetrySample;

/// Append-only CSV writer for the baseline log
pub struct BaselineLogWriter {
    writer: csv::Writer<File>,
    layout: LogLayout,
    rows_written: u64,
}

impl BaselineLogWriter {
    /// Open `path` for appending
    ///
    /// A new or empty file gets the layout header. An existing file must carry
    /// exactly the same header, otherwise rows would land under the wrong columns.
    pub fn open(path: &Path, layout: LogLayout) -> Result<Self, DatasetError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let expected = layout.header();
        let has_content = path.exists() && fs::metadata(path)?.len() > 0;

        if has_content {
            let mut reader = csv::Reader::from_path(path)?;
            let found: Vec<String> = reader.headers()?.iter().map(String::from).collect();
            if found != expected {
                return Err(DatasetError::HeaderMismatch {
                    path: path.to_path_buf(),
                    expected: expected.join(","),
                    found: found.join(","),
                });
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if !has_content {
            writer.write_record(&expected)?;
            writer.flush()?;
        }

        log::info!("Baseline log opened: {:?} ({} signals, {} actuators)",
            path, layout.signals.len(), layout.actuators.len());

        Ok(Self {
            writer,
            layout,
            rows_written: 0,
        })
    }

    /// Append one sample as a row; absent values become empty cells
    pub fn append(&mut self, sample: &TelemetrySample) -> Result<(), DatasetError> {
        let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

        let mut row = Vec::with_capacity(1 + self.layout.signals.len() * 3 + self.layout.actuators.len());
        row.push(sample.timestamp.to_rfc3339());

        for signal in &self.layout.signals {
            let reading = sample.signal(signal);
            row.push(cell(reading.map(|r| r.measured)));
            row.push(cell(reading.map(|r| r.setpoint)));
            row.push(cell(reading.map(|r| r.control_error())));
        }
        for actuator in &self.layout.actuators {
            row.push(cell(sample.actuator(actuator)));
        }

        self.writer.write_record(&row)?;
        // Flush per row: a collection run is usually ended with Ctrl-C
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DatasetError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }
}
