//! Resistive contact ladder sampler.
//!
//! A vertical row of contacts is wired to pulled-up GPIO inputs; a contact
//! reads active once water bridges it. Each [`LevelSampler::check`] scans the
//! ladder `sample_count` times, takes the majority raw level, holds back
//! implausible jumps until they persist, and classifies the result against
//! the stored [`Calibration`].
//!
//! ## Noise handling
//!
//! | Stage          | Rejects                                   |
//! |----------------|-------------------------------------------|
//! | Settle delay   | contact bounce right after a read         |
//! | Majority vote  | single-sample bridging / oxidation noise  |
//! | Spike guard    | many floating pins read in one snapshot   |

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{ConfigError, EventSink, GpioPort, PinLevel, StoragePort};
use crate::config::SystemConfig;
use crate::error::{PinId, SensorError};
use crate::level::{Calibration, DebounceTracker, WaterLevelState};
use crate::records::{self, CalibrationRecord};

/// Longest ladder the sampler tracks.
pub const MAX_LEVEL_PINS: usize = 64;

/// Storage key used unless the caller picks another one.
pub const DEFAULT_CALIBRATION_KEY: &str = "wl_calib";

/// Sampling constants, normally taken from [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    /// Ladder scans per check.
    pub sample_count: u16,
    /// Delay after every single pin read, for contact settling.
    pub settle_delay_ms: u32,
    /// Cycles a jump of more than one level must persist.
    pub spike_confirm_cycles: u16,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self::from(&SystemConfig::default())
    }
}

impl From<&SystemConfig> for SamplerSettings {
    fn from(config: &SystemConfig) -> Self {
        Self {
            sample_count: config.sample_count,
            settle_delay_ms: config.settle_delay_ms,
            spike_confirm_cycles: config.spike_confirm_cycles,
        }
    }
}

pub struct LevelSampler<G, D> {
    gpio: G,
    delay: D,
    settings: SamplerSettings,
    pins: heapless::Vec<PinId, MAX_LEVEL_PINS>,
    calibration: Calibration,
    storage_key: &'static str,
    level: Option<u32>,
    previous_level: Option<u32>,
    state: WaterLevelState,
    previous_state: WaterLevelState,
    tracker: DebounceTracker,
}

impl<G: GpioPort, D: DelayNs> LevelSampler<G, D> {
    /// Build a sampler with no pins and the uncalibrated sentinel.
    pub fn new(gpio: G, delay: D, settings: SamplerSettings) -> Self {
        Self {
            gpio,
            delay,
            settings,
            pins: heapless::Vec::new(),
            calibration: Calibration::UNCALIBRATED,
            storage_key: DEFAULT_CALIBRATION_KEY,
            level: None,
            previous_level: None,
            state: WaterLevelState::None,
            previous_state: WaterLevelState::None,
            tracker: DebounceTracker::default(),
        }
    }

    /// Build a sampler and configure `pins` (lowest contact first).
    pub fn with_pins(
        gpio: G,
        delay: D,
        settings: SamplerSettings,
        pins: &[PinId],
    ) -> Result<Self, SensorError> {
        let mut sampler = Self::new(gpio, delay, settings);
        sampler.set_pins(pins)?;
        Ok(sampler)
    }

    /// Replace the ladder, configuring every pin as a pulled-up input.
    ///
    /// The first configuration failure is returned as-is; the previous pin
    /// list stays in place.
    pub fn set_pins(&mut self, pins: &[PinId]) -> Result<(), SensorError> {
        let owned = heapless::Vec::<PinId, MAX_LEVEL_PINS>::from_slice(pins)
            .map_err(|()| SensorError::TooManyPins)?;
        for &pin in &owned {
            self.gpio.configure_input_pullup(pin)?;
        }
        self.pins = owned;
        Ok(())
    }

    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    // ── Calibration ───────────────────────────────────────────

    pub fn set_calibration(&mut self, min_level: u32, max_level: u32) {
        self.calibration = Calibration::new(min_level, max_level);
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn set_min_level(&mut self, min_level: u32) {
        self.calibration.min_level = min_level;
    }

    pub fn set_max_level(&mut self, max_level: u32) {
        self.calibration.max_level = max_level;
    }

    pub fn min_level(&self) -> u32 {
        self.calibration.min_level
    }

    pub fn max_level(&self) -> u32 {
        self.calibration.max_level
    }

    // ── Sampling ──────────────────────────────────────────────

    /// Run one sample → vote → spike guard → classify cycle.
    ///
    /// Blocks for up to `sample_count × pins × settle_delay_ms`. A failed
    /// pin read aborts the cycle before any state is touched.
    pub fn check(&mut self, sink: &mut impl EventSink) -> Result<u32, SensorError> {
        let histogram = match self.sample_histogram() {
            Ok(h) => h,
            Err(e) => {
                sink.emit(&AppEvent::SensorFault(e));
                return Err(e);
            }
        };
        let consensus = consensus_level(&histogram[..=self.pins.len()]);

        self.previous_level = self.level;
        self.previous_state = self.state;

        let level = self.reject_spike(consensus, sink);
        self.level = Some(level);
        self.state = self.calibration.classify(level);

        debug!(
            "LevelSampler: consensus={} committed={} state={}",
            consensus, level, self.state
        );
        sink.emit(&AppEvent::LevelSampled {
            level,
            state: self.state,
            level_changed: self.is_level_changed(),
            state_changed: self.is_state_changed(),
        });
        Ok(level)
    }

    /// Latest committed level; `None` until the first check.
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn state(&self) -> WaterLevelState {
        self.state
    }

    pub fn is_level_changed(&self) -> bool {
        self.previous_level != self.level
    }

    pub fn is_state_changed(&self) -> bool {
        self.previous_state != self.state
    }

    /// Current spike-guard progress.
    pub fn debounce_tracker(&self) -> DebounceTracker {
        self.tracker
    }

    /// Count how often each raw level was seen across `sample_count` scans.
    fn sample_histogram(&mut self) -> Result<[u16; MAX_LEVEL_PINS + 1], SensorError> {
        let mut histogram = [0u16; MAX_LEVEL_PINS + 1];
        for _ in 0..self.settings.sample_count {
            let raw = self.scan_once()?;
            histogram[raw] = histogram[raw].saturating_add(1);
        }
        Ok(histogram)
    }

    /// Highest 1-based index of an active contact, or 0 when all are dry.
    fn scan_once(&mut self) -> Result<usize, SensorError> {
        let mut raw = 0;
        for (idx, &pin) in self.pins.iter().enumerate() {
            if self.gpio.read_digital(pin)? == PinLevel::Active {
                raw = idx + 1;
            }
            self.delay.delay_ms(self.settings.settle_delay_ms);
        }
        Ok(raw)
    }

    /// Hold jumps of more than one level until the same consensus has been
    /// seen `spike_confirm_cycles` times in a row.
    fn reject_spike(&mut self, consensus: u32, sink: &mut impl EventSink) -> u32 {
        let Some(previous) = self.previous_level else {
            self.tracker.reset();
            return consensus;
        };
        if previous.abs_diff(consensus) <= 1 {
            self.tracker.reset();
            return consensus;
        }

        let streak = self.tracker.observe(consensus);
        if streak < u32::from(self.settings.spike_confirm_cycles) {
            sink.emit(&AppEvent::SpikeHeld {
                held: previous,
                candidate: consensus,
                streak,
            });
            previous
        } else {
            self.tracker.reset();
            consensus
        }
    }

    // ── Persistence ───────────────────────────────────────────

    /// Storage key for the calibration record (EEPROM-address analogue).
    pub fn set_storage_key(&mut self, key: &'static str) {
        self.storage_key = key;
    }

    /// Load calibration. A missing or never-saved record yields the
    /// uncalibrated sentinel; on error the current calibration is kept.
    pub fn load(
        &mut self,
        storage: &impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        let mut buf = [0u8; records::RECORD_BUF_LEN];
        let record = match records::read_record(storage, self.storage_key, &mut buf)? {
            Some(bytes) => Some(CalibrationRecord::decode(bytes)?),
            None => None,
        };
        let from_storage = record.is_some_and(|r| r.is_saved);
        self.calibration = record.map_or(Calibration::UNCALIBRATED, |r| r.calibration());
        sink.emit(&AppEvent::CalibrationLoaded {
            calibration: self.calibration,
            from_storage,
        });
        Ok(())
    }

    /// Persist the calibration with the saved flag set.
    pub fn save(&self, storage: &mut impl StoragePort) -> Result<(), ConfigError> {
        let record = CalibrationRecord::saved(self.calibration);
        storage.write(records::RECORD_NAMESPACE, self.storage_key, &record.encode())?;
        debug!("LevelSampler: calibration saved under '{}'", self.storage_key);
        Ok(())
    }
}

/// Index of the bucket with the strictly greatest count; ties keep the
/// lowest index.
fn consensus_level(histogram: &[u16]) -> u32 {
    let mut best = 0;
    for (level, &count) in histogram.iter().enumerate() {
        if count > histogram[best] {
            best = level;
        }
    }
    best as u32
}
