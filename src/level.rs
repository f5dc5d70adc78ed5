//! Water level domain types shared by the ladder sampler and the remote watcher.
//!
//! The integer codes of [`WaterLevelState`] are a compatibility contract with
//! remote devices (`SensorState` field) and must not be renumbered.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Qualitative water level classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WaterLevelState {
    /// Nothing sampled or polled yet.
    #[default]
    None = 0,
    Good = 1,
    Flood = 2,
    Lack = 3,
    /// Sensor or communication failure.
    Error = 4,
}

impl WaterLevelState {
    /// Wire code used by remote devices.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Map a remote wire code; anything outside 0..=4 is rejected.
    pub fn from_code(code: i64) -> Result<Self, RemoteError> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Good),
            2 => Ok(Self::Flood),
            3 => Ok(Self::Lack),
            4 => Ok(Self::Error),
            other => Err(RemoteError::UnknownState(other)),
        }
    }
}

impl fmt::Display for WaterLevelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Good => write!(f, "good"),
            Self::Flood => write!(f, "flood"),
            Self::Lack => write!(f, "lack"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Calibration thresholds for a level ladder.
///
/// `min_level <= max_level` is the caller's responsibility. The inverted
/// [`Calibration::UNCALIBRATED`] range makes `Good` unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    pub min_level: u32,
    pub max_level: u32,
}

impl Calibration {
    /// Sentinel used when no calibration has ever been saved.
    pub const UNCALIBRATED: Self = Self {
        min_level: 9999,
        max_level: 0,
    };

    pub const fn new(min_level: u32, max_level: u32) -> Self {
        Self {
            min_level,
            max_level,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.min_level <= self.max_level
    }

    /// Classify a discrete level. Precedence is Lack, then Good, then Flood.
    pub fn classify(&self, level: u32) -> WaterLevelState {
        if level < self.min_level {
            WaterLevelState::Lack
        } else if level < self.max_level {
            WaterLevelState::Good
        } else {
            WaterLevelState::Flood
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::UNCALIBRATED
    }
}

/// Run-length tracker that gates large level jumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceTracker {
    /// Level currently trying to replace the committed one.
    pub candidate: Option<u32>,
    /// Consecutive cycles `candidate` has been the consensus.
    pub streak: u32,
}

impl DebounceTracker {
    /// Record one cycle whose consensus jumped to `level`; returns the streak.
    pub fn observe(&mut self, level: u32) -> u32 {
        if self.candidate == Some(level) {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.candidate = Some(level);
            self.streak = 1;
        }
        self.streak
    }

    pub fn reset(&mut self) {
        self.candidate = None;
        self.streak = 0;
    }
}
