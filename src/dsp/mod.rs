//! DSP module
//!
//! Signal-side state for the level meter: block amplitude estimation and
//! peak-hold tracking.

pub mod amplitude;
pub mod peak_hold;

pub use amplitude::{root_mean_square, LevelAnalyzer, ANALYSIS_WINDOW, BLOCK_SIZE, DISPLAY_GAIN};
pub use peak_hold::{PeakHold, HOLD_SECS};
