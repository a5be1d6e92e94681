//! rumbo: terminal client for a personal relocation tracker.
//!
//! All state of record lives behind a REST API; this crate is the screens,
//! the API gateway, and the per-resource response cache between them.

pub mod api;
pub mod app;
pub mod config;
pub mod handler;
pub mod models;
pub mod store;
pub mod tui;
pub mod ui;
