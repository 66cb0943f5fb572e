//! Reusable TUI components

pub mod entity_table;
pub mod form_view;
pub mod status_display;

pub use entity_table::{render_entity_table, TableColumns};
pub use status_display::{StatusDisplay, StatusMessage, StatusType};
