//! LevelGuard firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod level;
pub mod pins;
pub mod records;
pub mod watcher;

// The adapters carry both backends; the ESP-IDF halves are gated inside.
pub mod adapters;
pub mod sensors;
