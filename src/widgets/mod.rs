//! Widgets module
//!
//! The two canvas-drawn controls: a drop-down selection menu and an
//! audio level meter.

pub mod drop_menu;
pub mod meter;

pub use drop_menu::{DropMenu, DropMenuConfig, MenuRegion, MenuState, ObserverRegistry};
pub use meter::{Meter, MeterConfig};
