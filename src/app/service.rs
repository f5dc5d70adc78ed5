//! Application service: the hexagonal core.
//!
//! [`LevelService`] owns the ladder sampler, the remote watcher and the
//! loop timing. It exposes a clean, hardware-agnostic API. All I/O flows
//! through port traits injected at construction or call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  GpioPort + DelayNs ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                         │      LevelService      │
//!  RemoteStatePort ─────▶ │  Sampler · Watcher     │ ◀─▶ StoragePort
//!  TimePort ────────────▶ └────────────────────────┘
//! ```
//!
//! Switching the irrigation outlet is left to the caller; the service only
//! reports [`IrrigationCues`].

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::sensors::LevelSampler;
use crate::watcher::RemoteWatcher;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ConfigError, EventSink, GpioPort, RemoteStatePort, StoragePort, TimePort};

/// Quiet period after the last settings change before auto-save kicks in.
const AUTO_SAVE_DELAY_MS: u64 = 5000;

/// Irrigation timer readout for the caller driving the outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrrigationCues {
    /// The rest interval since the last run has elapsed.
    pub time_to_water: bool,
    /// The current run has exceeded its flow time.
    pub time_over: bool,
}

// ───────────────────────────────────────────────────────────────
// LevelService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct LevelService<G, D, R, T> {
    sampler: LevelSampler<G, D>,
    watcher: RemoteWatcher<R, T>,
    config: SystemConfig,
    last_sample_ms: Option<u64>,
    last_watch_ms: Option<u64>,
    last_telemetry_ms: Option<u64>,
    now_ms: u64,
    tick_count: u64,
    dirty: bool,
    dirty_since_ms: u64,
}

impl<G, D, R, T> LevelService<G, D, R, T>
where
    G: GpioPort,
    D: DelayNs,
    R: RemoteStatePort,
    T: TimePort,
{
    /// Wrap an already-wired sampler and watcher.
    pub fn new(
        sampler: LevelSampler<G, D>,
        watcher: RemoteWatcher<R, T>,
        config: SystemConfig,
    ) -> Self {
        Self {
            sampler,
            watcher,
            config,
            last_sample_ms: None,
            last_watch_ms: None,
            last_telemetry_ms: None,
            now_ms: 0,
            tick_count: 0,
            dirty: false,
            dirty_since_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "LevelService started: {} ladder pins, watcher {}",
            self.sampler.pins().len(),
            if self.watcher.config().is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run whatever is due at `now_ms` (monotonic milliseconds).
    ///
    /// Everything is due on the first tick. A failed ladder check is logged
    /// and retried at the next sample interval.
    pub fn tick(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.tick_count += 1;
        self.now_ms = now_ms;

        if is_due(self.last_sample_ms, now_ms, u64::from(self.config.sample_interval_ms)) {
            self.last_sample_ms = Some(now_ms);
            if let Err(e) = self.sampler.check(sink) {
                warn!("Ladder check failed: {}", e);
            }
        }

        if is_due(self.last_watch_ms, now_ms, u64::from(self.config.watch_interval_ms)) {
            self.last_watch_ms = Some(now_ms);
            self.watcher.watch(sink);
        }

        let telemetry_ms = u64::from(self.config.telemetry_interval_secs) * 1000;
        if is_due(self.last_telemetry_ms, now_ms, telemetry_ms) {
            self.last_telemetry_ms = Some(now_ms);
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a settings command. Everything except `SaveAll` only marks the
    /// service dirty; `SaveAll` writes both records right away.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        storage: &mut impl StoragePort,
    ) -> Result<(), ConfigError> {
        match cmd {
            AppCommand::SetCalibration {
                min_level,
                max_level,
            } => {
                self.sampler.set_calibration(min_level, max_level);
                info!("Calibration set to {}..{}", min_level, max_level);
            }
            AppCommand::SetWatcherPower(power) => {
                self.watcher.set_power(power);
                info!("Watcher power {}", if power { "on" } else { "off" });
            }
            AppCommand::SetWatcherUrl(url) => {
                self.watcher.set_url(&url)?;
                info!("Watcher URL set to {}", url);
            }
            AppCommand::SetWatcherDeviceName(name) => {
                self.watcher.set_device_name(&name)?;
            }
            AppCommand::SetWatcherOutlet(outlet) => {
                self.watcher.set_outlet(outlet);
            }
            AppCommand::SetWateringTimes {
                water_flow_time,
                watering_interval_time,
            } => {
                self.watcher.set_water_flow_time(water_flow_time);
                self.watcher.set_watering_interval_time(watering_interval_time);
            }
            AppCommand::RecordWatering => {
                self.watcher.record_watering();
                info!(
                    "Watering started at {}",
                    self.watcher.last_watering_time()
                );
            }
            AppCommand::SaveAll => {
                return self.save_all(storage);
            }
        }
        self.mark_dirty();
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────

    /// Load calibration and watcher settings.
    ///
    /// Both records are attempted; the first error is returned and the
    /// component that failed keeps its current settings.
    pub fn load_all(
        &mut self,
        storage: &impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        let calibration = self.sampler.load(storage, sink);
        if let Err(e) = calibration {
            warn!("Calibration load failed: {}", e);
        }
        let watcher = self.watcher.load(storage, sink);
        if let Err(e) = watcher {
            warn!("Watcher settings load failed: {}", e);
        }
        calibration.and(watcher)
    }

    /// Persist both records and clear the dirty flag.
    pub fn save_all(&mut self, storage: &mut impl StoragePort) -> Result<(), ConfigError> {
        self.sampler.save(storage)?;
        self.watcher.save(storage)?;
        self.dirty = false;
        info!("Level settings saved");
        Ok(())
    }

    fn mark_dirty(&mut self) {
        if !self.dirty {
            self.dirty = true;
            self.dirty_since_ms = self.now_ms;
        }
    }

    /// Save once settings have been quiet for a few seconds.
    /// Returns `true` if the records were written.
    pub fn auto_save_if_needed(&mut self, storage: &mut impl StoragePort) -> bool {
        if !self.dirty || self.now_ms.saturating_sub(self.dirty_since_ms) < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match self.save_all(storage) {
            Ok(()) => true,
            Err(e) => {
                warn!("Level settings auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before a restart).
    pub fn force_save_if_dirty(&mut self, storage: &mut impl StoragePort) {
        if !self.dirty {
            return;
        }
        if let Err(e) = self.save_all(storage) {
            warn!("Level settings force-save failed: {}", e);
        }
    }

    /// Whether settings have unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn irrigation_cues(&self) -> IrrigationCues {
        IrrigationCues {
            time_to_water: self.watcher.is_time_to_watering(),
            time_over: self.watcher.is_time_over(),
        }
    }

    /// Build a telemetry snapshot. The level reads 0 before the first check.
    pub fn build_telemetry(&self) -> TelemetryData {
        let cues = self.irrigation_cues();
        TelemetryData {
            level: self.sampler.level().unwrap_or(0),
            level_state: self.sampler.state(),
            calibration: self.sampler.calibration(),
            remote_state: self.watcher.state(),
            watcher_enabled: self.watcher.config().is_enabled(),
            time_to_water: cues.time_to_water,
            watering_time_over: cues.time_over,
        }
    }

    pub fn sampler(&self) -> &LevelSampler<G, D> {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut LevelSampler<G, D> {
        &mut self.sampler
    }

    pub fn watcher(&self) -> &RemoteWatcher<R, T> {
        &self.watcher
    }

    pub fn watcher_mut(&mut self) -> &mut RemoteWatcher<R, T> {
        &mut self.watcher
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn is_due(last_ms: Option<u64>, now_ms: u64, interval_ms: u64) -> bool {
    last_ms.is_none_or(|last| now_ms.saturating_sub(last) >= interval_ms)
}
