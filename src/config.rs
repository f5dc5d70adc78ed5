//! System configuration parameters
//!
//! All tunable parameters for the LevelGuard system.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Level ladder ---
    /// Ladder scans per level determination
    pub sample_count: u16,
    /// Settle delay after every pin read (milliseconds)
    pub settle_delay_ms: u32,
    /// Consecutive matching cycles before a jump larger than one level is accepted
    pub spike_confirm_cycles: u16,

    // --- Remote watcher ---
    /// HTTP request timeout for the remote state poll (milliseconds)
    pub remote_timeout_ms: u32,

    // --- Timing ---
    /// Interval between ladder checks (milliseconds)
    pub sample_interval_ms: u32,
    /// Interval between remote polls (milliseconds)
    pub watch_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Logging ---
    /// Forward domain events to the serial log
    pub log_events: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Level ladder
            sample_count: 20,
            settle_delay_ms: 20,
            spike_confirm_cycles: 10,

            // Remote watcher
            remote_timeout_ms: 1000,

            // Timing
            sample_interval_ms: 1000,
            watch_interval_ms: 5000,
            telemetry_interval_secs: 60,

            log_events: true,
        }
    }
}
