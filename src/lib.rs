//! Supplier and client back-office: REST client, import pipeline,
//! UI independent screen state and the terminal front end.

pub mod admin;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod import;
pub mod models;
pub mod notify;
pub mod session;
pub mod tui;
