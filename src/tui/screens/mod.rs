//! Screen modules for the back-office TUI

pub mod entities;
pub mod main_menu;
