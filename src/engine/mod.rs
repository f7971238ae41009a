//! Engine module
//!
//! Audio capture and transport. Handles cpal input streams and the
//! lock-free sample path from the capture callback to the meter.

pub mod capture_engine;
pub mod level_tap;

pub use capture_engine::{AudioError, CaptureEngine, DeviceInfo, SAMPLE_QUEUE_CAPACITY};
pub use level_tap::LevelTap;
