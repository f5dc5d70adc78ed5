//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future MQTT adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::SystemConfig;

/// Adapter that logs every [`AppEvent`] to the serial console.
///
/// A disabled sink drops events without formatting them.
pub struct LogEventSink {
    enabled: bool,
}

impl LogEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.log_events)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        if !self.enabled {
            return;
        }
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | level={} ({}) | calib={}..{} | remote={} watch={} | \
                     water_due={} run_over={}",
                    t.level,
                    t.level_state,
                    t.calibration.min_level,
                    t.calibration.max_level,
                    t.remote_state,
                    if t.watcher_enabled { "on" } else { "off" },
                    t.time_to_water,
                    t.watering_time_over,
                );
            }
            AppEvent::LevelSampled {
                level,
                state,
                level_changed,
                state_changed,
            } => {
                if *level_changed || *state_changed {
                    info!("LEVEL | {} -> {}", level, state);
                }
            }
            AppEvent::SpikeHeld {
                held,
                candidate,
                streak,
            } => {
                info!(
                    "SPIKE | holding {} against {} (streak {})",
                    held, candidate, streak
                );
            }
            AppEvent::SensorFault(e) => {
                warn!("FAULT | ladder check failed: {}", e);
            }
            AppEvent::CalibrationLoaded {
                calibration,
                from_storage,
            } => {
                info!(
                    "CALIB | min={} max={} ({})",
                    calibration.min_level,
                    calibration.max_level,
                    if *from_storage { "stored" } else { "defaults" },
                );
            }
            AppEvent::WatcherLoaded {
                power,
                from_storage,
            } => {
                info!(
                    "WATCH | power={} ({})",
                    power,
                    if *from_storage { "stored" } else { "defaults" },
                );
            }
            AppEvent::WatcherDisabled => {}
            AppEvent::RemotePolled { state, changed } => {
                if *changed {
                    info!("REMOTE | state -> {}", state);
                }
            }
            AppEvent::RemoteFailed(e) => {
                warn!("REMOTE | poll failed: {}", e);
            }
            AppEvent::Started => {
                info!("START | level service running");
            }
        }
    }
}
