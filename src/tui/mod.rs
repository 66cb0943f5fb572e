//! Back-office Terminal User Interface (TUI)
//!
//! Screens for browsing and editing suppliers and clients against the
//! remote API.

pub mod app;
pub mod components;
pub mod forms;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::App;
