//! Demo application wiring the two widgets together.
//!
//! Shows a drop-down menu of capture devices next to a live input level
//! meter. Committing a menu selection switches the capture device through an
//! observer, exactly the way a host page would consume the widgets.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use eframe::egui::{self, RichText};

use super::theme;
use crate::engine::{AudioError, CaptureEngine, LevelTap};
use crate::widgets::{DropMenu, DropMenuConfig, Meter, MeterConfig};

/// Observer key used for the device-switching subscription.
const DEVICE_OBSERVER: &str = "demo-device-switch";

/// Main application state for the widget demo.
pub struct DemoApp {
    /// Capture engine handle.
    engine: Result<CaptureEngine, AudioError>,
    /// Consumer side of the capture transport; absent when the engine
    /// failed to construct.
    tap: Option<LevelTap>,
    /// The level meter widget.
    meter: Meter,
    /// The device selection menu.
    device_menu: DropMenu,
    /// Device index committed by the menu observer, applied next frame.
    pending_device: Rc<RefCell<Option<usize>>>,
    /// Origin of the monotonic clock fed to the peak-hold logic.
    started_at: Instant,
    /// Last audio error message to display.
    error_message: Option<String>,
    /// Whether theme has been applied.
    theme_applied: bool,
}

impl DemoApp {
    /// Create a new demo app and start capturing from the default device.
    pub fn new() -> Self {
        let (mut engine, tap) = match CaptureEngine::new() {
            Ok((engine, tap)) => (Ok(engine), Some(tap)),
            Err(e) => (Err(e), None),
        };

        let mut error_message = match &engine {
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };

        if let Ok(ref mut engine) = engine {
            if let Err(e) = engine.start() {
                error_message = Some(e.to_string());
            }
        }

        let mut device_menu =
            DropMenu::new(DropMenuConfig::default().with_size(240.0, 28.0));
        if let Ok(engine) = &engine {
            let devices = engine.enumerate_devices();
            let default_index = devices.iter().position(|d| d.is_default);
            device_menu.set_items(devices.into_iter().map(|d| d.name).collect());
            if let Some(index) = default_index {
                device_menu.set_value(index);
            }
        }

        let pending_device = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&pending_device);
        device_menu.subscribe(DEVICE_OBSERVER, move |index| {
            *slot.borrow_mut() = Some(index);
        });

        Self {
            engine,
            tap,
            meter: Meter::new(MeterConfig::default().with_size(48.0, 200.0)),
            device_menu,
            pending_device,
            started_at: Instant::now(),
            error_message,
            theme_applied: false,
        }
    }

    /// Apply a device switch committed through the menu.
    fn apply_pending_device(&mut self) {
        let Some(index) = self.pending_device.borrow_mut().take() else {
            return;
        };
        if let Ok(ref mut engine) = self.engine {
            match engine.select_device(index) {
                Ok(()) => {
                    self.error_message = None;
                    if !engine.is_running() {
                        if let Err(e) = engine.start() {
                            self.error_message = Some(e.to_string());
                        }
                    }
                }
                Err(e) => self.error_message = Some(e.to_string()),
            }
        }
    }

    /// Drain captured blocks into the meter.
    fn drain_audio(&mut self) {
        let now = self.started_at.elapsed().as_secs_f64();
        let meter = &mut self.meter;
        if let Some(tap) = self.tap.as_mut() {
            tap.drain_blocks(|block| meter.process_block(block, now));
        }
    }
}

impl Default for DemoApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.apply_pending_device();
        self.drain_audio();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            ui.label(
                RichText::new("AUDIO WIDGETS")
                    .size(18.0)
                    .color(theme::text::PRIMARY)
                    .strong(),
            );
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new("Input device").color(theme::text::SECONDARY));
                    self.device_menu.show(ui);

                    if let Ok(engine) = &self.engine {
                        ui.add_space(8.0);
                        ui.label(
                            RichText::new(format!(
                                "{} Hz, {} ch",
                                engine.sample_rate(),
                                engine.channels()
                            ))
                            .color(theme::text::SECONDARY)
                            .size(11.0),
                        );
                    }
                });

                ui.add_space(24.0);

                ui.vertical(|ui| {
                    ui.label(RichText::new("Level").color(theme::text::SECONDARY));
                    self.meter.show(ui);
                });
            });

            if let Some(message) = &self.error_message {
                ui.add_space(12.0);
                ui.colored_label(egui::Color32::from_rgb(239, 83, 80), message);
            }
        });

        // Coalesced repaint requests from the widgets, plus a steady poll
        // while capture is running so queued blocks keep draining.
        if self.meter.take_repaint() || self.device_menu.take_repaint() {
            ctx.request_repaint();
        }
        if self.engine.as_ref().is_ok_and(|e| e.is_running()) {
            ctx.request_repaint_after(Duration::from_millis(33));
        }
    }
}
