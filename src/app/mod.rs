//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the orchestration for the LevelGuard system:
//! loop timing, settings commands and persistence of the level records.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
