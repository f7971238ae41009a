//! Audio Widgets - canvas-drawn drop-down menu and level meter
//!
//! Entry point for the demo application.

use eframe::egui;

use audio_widgets::app::DemoApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 320.0])
            .with_title("Audio Widgets"),
        ..Default::default()
    };

    eframe::run_native(
        "Audio Widgets",
        options,
        Box::new(|_cc| Ok(Box::new(DemoApp::new()))),
    )
}
