//! Unified error types for the LevelGuard firmware.
//!
//! Every subsystem error converts into the top-level [`Error`], so the host
//! loop handles failures the same way no matter where they came from.
//! All variants are `Copy` so they can be handed to the event sink and
//! stored in telemetry without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

/// GPIO pin identifier as understood by the GPIO adapter.
pub type PinId = i32;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The level ladder could not be configured or read.
    Sensor(SensorError),
    /// The remote level source could not be polled or understood.
    Remote(RemoteError),
    /// Configuration or a persisted record is invalid or unavailable.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Remote(e) => write!(f, "remote: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Level ladder failures. Hardware faults are not self-healing, so these
/// are returned to the caller immediately and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Configuring a pin as a pulled-up input failed.
    GpioConfigFailed(PinId),
    /// Reading a pin level failed.
    GpioReadFailed(PinId),
    /// More pins were supplied than the sampler can track.
    TooManyPins,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioConfigFailed(pin) => write!(f, "GPIO {pin} config failed"),
            Self::GpioReadFailed(pin) => write!(f, "GPIO {pin} read failed"),
            Self::TooManyPins => write!(f, "too many level pins"),
        }
    }
}

impl core::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Remote errors
// ---------------------------------------------------------------------------

/// Remote watcher failures. The watcher folds all of these into
/// `WaterLevelState::Error` instead of aborting its polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection could not be established or the request failed mid-way.
    Transport,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The remote answered with a non-2xx status.
    HttpStatus(u16),
    /// The body was not a JSON object with an integer `SensorState`.
    Decode,
    /// `SensorState` carried an integer outside the known state codes.
    UnknownState(i64),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failed"),
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::Decode => write!(f, "payload decode failed"),
            Self::UnknownState(code) => write!(f, "unknown sensor state {code}"),
        }
    }
}

impl core::error::Error for RemoteError {}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
