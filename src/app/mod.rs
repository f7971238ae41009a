//! Application module
//!
//! Contains the demo application and theme definitions.

pub mod demo_app;
pub mod theme;

pub use demo_app::DemoApp;
