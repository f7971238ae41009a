//! Level meter widget with gradient bar and peak-hold marker.
//!
//! Displays the amplitude computed by [`LevelAnalyzer`] as a vertical bar
//! colored by a fixed green-to-red gradient, with a one-pixel marker holding
//! the most recent local maximum. Feed it blocks from the capture engine and
//! show it once per frame.

use eframe::egui::{Color32, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};

use crate::app::theme;
use crate::dsp::LevelAnalyzer;

/// Vertical inset of the meter face inside its rect, in pixels.
const VERTICAL_INSET: f32 = 5.0;

/// Height of one flat-colored strip when approximating the gradient.
const GRADIENT_STRIP: f32 = 2.0;

/// Gradient stops measured bottom-to-top over the full meter height.
const GRADIENT_STOPS: [(f32, Color32); 4] = [
    (0.0, theme::meter::GREEN),
    (0.6, theme::meter::LIGHT_GREEN),
    (0.8, theme::meter::YELLOW),
    (1.0, theme::meter::RED),
];

/// Configuration for the level meter widget.
#[derive(Clone, Debug)]
pub struct MeterConfig {
    /// Width of the meter in pixels.
    pub width: f32,
    /// Height of the meter in pixels.
    pub height: f32,
    /// Border color.
    pub border_color: Color32,
    /// Background color behind the bar.
    pub background_color: Color32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 160.0,
            border_color: theme::meter::BORDER,
            background_color: theme::meter::BACKGROUND,
        }
    }
}

impl MeterConfig {
    /// Creates a tall meter for channel strips.
    pub fn channel_strip() -> Self {
        Self {
            width: 24.0,
            height: 220.0,
            ..Default::default()
        }
    }

    /// Set the dimensions.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the border and background colors.
    pub fn with_colors(mut self, border: Color32, background: Color32) -> Self {
        self.border_color = border;
        self.background_color = background;
        self
    }
}

/// The color of the meter gradient at a normalized height `t` in `[0, 1]`.
///
/// Linear interpolation between the fixed stops; values outside the range
/// clamp to the end stops.
pub fn gradient_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    for pair in GRADIENT_STOPS.windows(2) {
        let (lo_pos, lo_color) = pair[0];
        let (hi_pos, hi_color) = pair[1];
        if t <= hi_pos {
            let span = hi_pos - lo_pos;
            let local = if span > 0.0 { (t - lo_pos) / span } else { 0.0 };
            return interpolate_color(lo_color, hi_color, local);
        }
    }
    GRADIENT_STOPS[GRADIENT_STOPS.len() - 1].1
}

/// Linear blend between two colors.
fn interpolate_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (from.r() as f32 + (to.r() as f32 - from.r() as f32) * t) as u8,
        (from.g() as f32 + (to.g() as f32 - from.g() as f32) * t) as u8,
        (from.b() as f32 + (to.b() as f32 - from.b() as f32) * t) as u8,
        (from.a() as f32 + (to.a() as f32 - from.a() as f32) * t) as u8,
    )
}

/// A level meter driven by blocks of audio samples.
///
/// Owns its analyzer and repaint flag; the host feeds blocks with
/// [`Meter::process_block`] and draws with [`Meter::show`]. Resizes and new
/// blocks coalesce into a single repaint request per frame.
pub struct Meter {
    config: MeterConfig,
    analyzer: LevelAnalyzer,
    needs_repaint: bool,
}

impl Meter {
    /// Creates a meter with the given configuration, starting from silence.
    pub fn new(config: MeterConfig) -> Self {
        Self {
            config,
            analyzer: LevelAnalyzer::new(),
            needs_repaint: true,
        }
    }

    /// Creates a meter seeded with an initial displayed amplitude.
    pub fn with_initial_amplitude(config: MeterConfig, amplitude: f32) -> Self {
        Self {
            config,
            analyzer: LevelAnalyzer::with_initial(amplitude),
            needs_repaint: true,
        }
    }

    /// Feeds one block of samples; `now` is the monotonic clock in seconds.
    pub fn process_block(&mut self, samples: &[f32], now: f64) {
        self.analyzer.process_block(samples, now);
        self.needs_repaint = true;
    }

    /// The level computed for the most recent block.
    pub fn amplitude(&self) -> f32 {
        self.analyzer.amplitude()
    }

    /// The level of the peak marker, if one is currently held.
    pub fn peak_marker(&self) -> Option<f32> {
        self.analyzer.peak_marker()
    }

    /// Resizes the meter width. Does not recompute amplitude.
    pub fn set_width(&mut self, width: f32) {
        self.config.width = width;
        self.needs_repaint = true;
    }

    /// Resizes the meter height. Does not recompute amplitude.
    pub fn set_height(&mut self, height: f32) {
        self.config.height = height;
        self.needs_repaint = true;
    }

    /// Current configuration.
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Takes the pending repaint request, if any.
    ///
    /// Any burst of resizes or incoming blocks since the last call collapses
    /// into one request.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }

    /// Draws the meter.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let size = Vec2::new(self.config.width, self.config.height);
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();

            // Face: background and border, inset vertically.
            let face = Rect::from_min_max(
                Pos2::new(rect.left(), rect.top() + VERTICAL_INSET),
                Pos2::new(rect.right(), rect.bottom() - VERTICAL_INSET),
            );
            painter.rect_filled(face, 0.0, self.config.background_color);
            painter.rect_stroke(face, 0.0, Stroke::new(1.0, self.config.border_color));

            // Bar, bottom-up, as flat-colored strips through the gradient.
            let level = self.analyzer.amplitude().clamp(0.0, 1.0);
            let bar_top = rect.bottom() - rect.height() * level;
            let mut y = rect.bottom();
            while y > bar_top {
                let top = (y - GRADIENT_STRIP).max(bar_top);
                let t = (rect.bottom() - 0.5 * (y + top)) / rect.height();
                painter.rect_filled(
                    Rect::from_min_max(Pos2::new(rect.left(), top), Pos2::new(rect.right(), y)),
                    0.0,
                    gradient_color(t),
                );
                y = top;
            }

            // Peak marker: a one-pixel line at the held level.
            if let Some(peak) = self.analyzer.peak_marker() {
                let peak = peak.clamp(0.0, 1.0);
                let marker_y = rect.bottom() - rect.height() * peak;
                painter.rect_filled(
                    Rect::from_min_size(
                        Pos2::new(rect.left(), marker_y),
                        Vec2::new(rect.width(), 1.0),
                    ),
                    0.0,
                    gradient_color(peak),
                );
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::BLOCK_SIZE;

    #[test]
    fn test_default_config() {
        let config = MeterConfig::default();
        assert_eq!(config.width, 40.0);
        assert_eq!(config.height, 160.0);
        assert_eq!(config.border_color, theme::meter::BORDER);
    }

    #[test]
    fn test_config_builders() {
        let config = MeterConfig::default()
            .with_size(30.0, 200.0)
            .with_colors(Color32::WHITE, Color32::DARK_GRAY);
        assert_eq!(config.width, 30.0);
        assert_eq!(config.height, 200.0);
        assert_eq!(config.border_color, Color32::WHITE);
        assert_eq!(config.background_color, Color32::DARK_GRAY);
    }

    #[test]
    fn test_gradient_color_at_stops() {
        assert_eq!(gradient_color(0.0), theme::meter::GREEN);
        assert_eq!(gradient_color(0.6), theme::meter::LIGHT_GREEN);
        assert_eq!(gradient_color(0.8), theme::meter::YELLOW);
        assert_eq!(gradient_color(1.0), theme::meter::RED);
    }

    #[test]
    fn test_gradient_color_interpolates_between_stops() {
        // Halfway between the 0.0 and 0.6 stops.
        let mid = gradient_color(0.3);
        assert_eq!(mid, Color32::from_rgb(72, 183, 72));
    }

    #[test]
    fn test_gradient_color_clamps_out_of_range() {
        assert_eq!(gradient_color(-1.0), theme::meter::GREEN);
        assert_eq!(gradient_color(2.0), theme::meter::RED);
    }

    #[test]
    fn test_no_marker_before_any_peak() {
        let meter = Meter::new(MeterConfig::default());
        assert_eq!(meter.peak_marker(), None);
    }

    #[test]
    fn test_marker_stays_hidden_while_rising() {
        let mut meter = Meter::new(MeterConfig::default());
        meter.process_block(&vec![0.1; BLOCK_SIZE], 0.0);
        assert_eq!(meter.peak_marker(), None);
    }

    #[test]
    fn test_process_block_requests_repaint() {
        let mut meter = Meter::new(MeterConfig::default());
        meter.take_repaint();
        meter.process_block(&vec![0.1; BLOCK_SIZE], 0.0);
        assert!(meter.take_repaint());
    }

    #[test]
    fn test_resize_burst_coalesces_to_one_repaint() {
        let mut meter = Meter::new(MeterConfig::default());
        meter.take_repaint();

        meter.set_width(50.0);
        meter.set_height(300.0);

        assert!(meter.take_repaint());
        assert!(!meter.take_repaint());
        assert_eq!(meter.config().width, 50.0);
        assert_eq!(meter.config().height, 300.0);
    }

    #[test]
    fn test_resize_does_not_recompute_amplitude() {
        let mut meter = Meter::new(MeterConfig::default());
        meter.process_block(&vec![0.1; BLOCK_SIZE], 0.0);
        let amplitude = meter.amplitude();
        meter.set_height(300.0);
        assert_eq!(meter.amplitude(), amplitude);
    }

    #[test]
    fn test_initial_amplitude_seed() {
        let meter = Meter::with_initial_amplitude(MeterConfig::default(), 0.25);
        assert_eq!(meter.amplitude(), 0.25);
    }
}
