//! Outbound application events.
//!
//! The sampler, the watcher and the [`LevelService`](super::service::LevelService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them.

use crate::error::{RemoteError, SensorError};
use crate::level::{Calibration, WaterLevelState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A ladder check committed a level.
    LevelSampled {
        level: u32,
        state: WaterLevelState,
        level_changed: bool,
        state_changed: bool,
    },

    /// A large jump was held back while its streak builds up.
    SpikeHeld {
        held: u32,
        candidate: u32,
        streak: u32,
    },

    /// A ladder check failed; no state was committed.
    SensorFault(SensorError),

    /// Calibration applied after a load (`from_storage == false` means defaults).
    CalibrationLoaded {
        calibration: Calibration,
        from_storage: bool,
    },

    /// Watcher settings applied after a load.
    WatcherLoaded { power: bool, from_storage: bool },

    /// The watcher skipped its poll (power off, no URL or no outlet).
    WatcherDisabled,

    /// A remote poll completed (failures arrive here as `Error`).
    RemotePolled {
        state: WaterLevelState,
        changed: bool,
    },

    /// A remote poll failed and was folded into `WaterLevelState::Error`.
    RemoteFailed(RemoteError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The service has started.
    Started,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryData {
    pub level: u32,
    pub level_state: WaterLevelState,
    pub calibration: Calibration,
    pub remote_state: WaterLevelState,
    pub watcher_enabled: bool,
    pub time_to_water: bool,
    pub watering_time_over: bool,
}
