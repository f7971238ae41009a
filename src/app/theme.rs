//! Theme definitions for the widget demo UI
//!
//! Provides the default palettes for the drop-down menu and the level meter,
//! plus styling for the surrounding demo window.

use eframe::egui::{self, Color32, Stroke, Vec2};

/// Drop-down menu colors
pub mod menu {
    use super::Color32;

    /// Closed box and expanded list background
    pub const BACKGROUND: Color32 = Color32::from_rgb(85, 85, 85);

    /// Item and selected-label text
    pub const FONT: Color32 = Color32::from_rgb(187, 187, 187);

    /// Background cover behind the hovered item
    pub const HOVER_BACKGROUND: Color32 = Color32::from_rgb(204, 204, 204);

    /// Text color of the hovered item
    pub const HOVER_FONT: Color32 = Color32::WHITE;
}

/// Level meter colors
pub mod meter {
    use super::Color32;

    /// Meter border
    pub const BORDER: Color32 = Color32::BLACK;

    /// Meter background behind the bar
    pub const BACKGROUND: Color32 = Color32::BLACK;

    /// Gradient stop at the bottom of the scale
    pub const GREEN: Color32 = Color32::from_rgb(0, 128, 0);

    /// Gradient stop at 60% of the scale
    pub const LIGHT_GREEN: Color32 = Color32::from_rgb(144, 238, 144);

    /// Gradient stop at 80% of the scale
    pub const YELLOW: Color32 = Color32::from_rgb(255, 255, 0);

    /// Gradient stop at the top of the scale
    pub const RED: Color32 = Color32::from_rgb(255, 0, 0);
}

/// Text colors for the demo window
pub mod text {
    use super::Color32;

    /// Primary text
    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    /// Secondary text - dimmed
    pub const SECONDARY: Color32 = Color32::from_rgb(160, 160, 175);
}

/// Demo window background
pub const WINDOW_BACKGROUND: Color32 = Color32::from_rgb(38, 38, 42);

/// Apply the demo theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let visuals = &mut style.visuals;
    visuals.dark_mode = true;
    visuals.panel_fill = WINDOW_BACKGROUND;
    visuals.window_fill = WINDOW_BACKGROUND;
    visuals.window_stroke = Stroke::new(1.0, Color32::from_rgb(60, 60, 66));
    visuals.override_text_color = Some(text::PRIMARY);

    style.spacing.item_spacing = Vec2::new(8.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(12.0);

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_stops_are_distinct() {
        assert_ne!(meter::GREEN, meter::LIGHT_GREEN);
        assert_ne!(meter::LIGHT_GREEN, meter::YELLOW);
        assert_ne!(meter::YELLOW, meter::RED);
    }

    #[test]
    fn hovered_item_contrasts_with_its_cover() {
        // The hovered item's text has to stay readable on its highlight.
        assert_ne!(menu::HOVER_FONT, menu::HOVER_BACKGROUND);
        assert_ne!(menu::FONT, menu::BACKGROUND);
    }
}
