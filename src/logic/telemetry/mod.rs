//! Telemetry Module
//!
//! Bioreactor observations and the decoder for simulator summary messages.
//!
//! ## Structure
//! - `sample.rs` - `TelemetrySample`, `SignalReading` (signal name -> measured/set-point)
//! - `payload.rs` - JSON payload decoding, ground-truth fault extraction

pub mod sample;
pub mod payload;

pub use sample::TelemetrySample;
pub use payload::{decode, SampleError};
