//! Inbound commands to the application service.
//!
//! These represent settings changes requested by the outside world (serial,
//! MQTT, a provisioning UI) that the [`LevelService`](super::service::LevelService)
//! applies to the sampler and the watcher.

use heapless::String;

use crate::watcher::{DEVICE_NAME_MAX_LEN, URL_MAX_LEN};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Replace the ladder calibration thresholds.
    SetCalibration { min_level: u32, max_level: u32 },

    /// Switch remote watching on or off.
    SetWatcherPower(bool),

    /// Point the watcher at a new remote state URL.
    SetWatcherUrl(String<URL_MAX_LEN>),

    /// Rename the device the watcher controls.
    SetWatcherDeviceName(String<DEVICE_NAME_MAX_LEN>),

    /// Select the outlet the watcher controls (`-1` disables watching).
    SetWatcherOutlet(i32),

    /// Update the irrigation run length and rest interval (seconds).
    SetWateringTimes {
        water_flow_time: i32,
        watering_interval_time: i32,
    },

    /// Stamp the start of an irrigation run with the current time.
    RecordWatering,

    /// Persist calibration and watcher settings immediately.
    SaveAll,
}
