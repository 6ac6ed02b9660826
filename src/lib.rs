//! Courtside library
//!
//! Exposes the loader, caches and TUI pieces so the binary and the integration
//! tests share one module tree.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod loader;
pub mod logging;
pub mod refresh;
pub mod ui;
