//! Block-based amplitude estimation for the level meter.
//!
//! Each incoming block of samples is reduced to a single displayable level:
//! the RMS of a trailing analysis window, scaled into the meter's visual
//! range. The analyzer also advances the peak-hold marker so the widget can
//! draw both the bar and the peak line from one state object.

use super::peak_hold::PeakHold;

/// Number of samples delivered per processing block.
pub const BLOCK_SIZE: usize = 2048;

/// Number of trailing samples the RMS is computed over.
pub const ANALYSIS_WINDOW: usize = 1024;

/// Fixed scale from RMS to displayed bar height.
// TODO: derive this from a calibration pass against reference material
// instead of a hand-tuned constant.
pub const DISPLAY_GAIN: f32 = 5.0;

/// Root-mean-square of a sample slice. Returns 0.0 for an empty slice.
pub fn root_mean_square(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Converts incoming sample blocks into a displayed amplitude and peak marker.
///
/// Stateless per block except for the peak tracking: feeding the same block
/// twice yields the same amplitude both times.
#[derive(Debug, Clone)]
pub struct LevelAnalyzer {
    /// Level computed for the most recent block.
    amplitude: f32,
    /// Level of the block before it, used by the peak state machine.
    prev_amplitude: f32,
    /// Peak marker state.
    peak: PeakHold,
}

impl LevelAnalyzer {
    /// Creates an analyzer starting from silence.
    pub fn new() -> Self {
        Self::with_initial(0.0)
    }

    /// Creates an analyzer seeded with an initial displayed amplitude.
    pub fn with_initial(amplitude: f32) -> Self {
        Self {
            amplitude,
            prev_amplitude: 0.0,
            peak: PeakHold::Idle,
        }
    }

    /// Processes one block of samples.
    ///
    /// The RMS is taken over the trailing [`ANALYSIS_WINDOW`] samples (the
    /// whole block when it is shorter), scaled by [`DISPLAY_GAIN`], and the
    /// peak-hold state is advanced against the previous block's level. `now`
    /// is the monotonic clock in seconds used for peak expiry.
    pub fn process_block(&mut self, samples: &[f32], now: f64) {
        let window_start = samples.len().saturating_sub(ANALYSIS_WINDOW);
        let window = &samples[window_start..];

        self.amplitude = root_mean_square(window) * DISPLAY_GAIN;
        self.peak.update(self.amplitude, self.prev_amplitude, now);
        self.prev_amplitude = self.amplitude;
    }

    /// The level computed for the most recent block.
    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// The current peak-hold state.
    #[inline]
    pub fn peak(&self) -> &PeakHold {
        &self.peak
    }

    /// The level at which to draw the peak marker, if any.
    #[inline]
    pub fn peak_marker(&self) -> Option<f32> {
        self.peak.marker()
    }
}

impl Default for LevelAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
