//! Fixed-width persisted records.
//!
//! Both records keep the legacy EEPROM block layout so devices that were
//! already in the field read back their calibration unchanged.
//! All integers are little-endian; text fields are NUL-padded UTF-8.
//!
//! ```text
//! Calibration (9 B):   is_saved u8 │ min u32 │ max u32
//!
//! Watcher (170 B):     is_saved u8 │ power u8 │ url [128] │ device_name [20]
//!                      │ outlet i32 │ last_watering_time i64
//!                      │ water_flow_time i32 │ watering_interval_time i32
//! ```

use heapless::String;

use crate::app::ports::{ConfigError, StorageError, StoragePort};
use crate::level::Calibration;
use crate::watcher::{DEVICE_NAME_MAX_LEN, URL_MAX_LEN, WatcherConfig};

/// NVS namespace shared by every level record.
pub const RECORD_NAMESPACE: &str = "levelguard";

/// Scratch buffer size for reads; larger than any record so an oversized
/// blob is detected instead of silently truncated.
pub const RECORD_BUF_LEN: usize = 256;

const URL_FIELD_LEN: usize = URL_MAX_LEN + 1;
const DEVICE_NAME_FIELD_LEN: usize = DEVICE_NAME_MAX_LEN + 1;

/// Read a record blob. `Ok(None)` when the key has never been written.
pub fn read_record<'a>(
    storage: &impl StoragePort,
    key: &str,
    buf: &'a mut [u8; RECORD_BUF_LEN],
) -> Result<Option<&'a [u8]>, ConfigError> {
    match storage.read(RECORD_NAMESPACE, key, buf) {
        Ok(len) => Ok(Some(&buf[..len])),
        Err(StorageError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ───────────────────────────────────────────────────────────────
// Calibration
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRecord {
    pub is_saved: bool,
    pub min_water_level: u32,
    pub max_water_level: u32,
}

impl CalibrationRecord {
    pub const ENCODED_LEN: usize = 9;

    pub fn saved(calibration: Calibration) -> Self {
        Self {
            is_saved: true,
            min_water_level: calibration.min_level,
            max_water_level: calibration.max_level,
        }
    }

    /// Stored thresholds, or the uncalibrated sentinel if never saved.
    pub fn calibration(&self) -> Calibration {
        if self.is_saved {
            Calibration::new(self.min_water_level, self.max_water_level)
        } else {
            Calibration::UNCALIBRATED
        }
    }

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0] = u8::from(self.is_saved);
        out[1..5].copy_from_slice(&self.min_water_level.to_le_bytes());
        out[5..9].copy_from_slice(&self.max_water_level.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(ConfigError::Corrupted);
        }
        let mut r = Reader::new(bytes);
        Ok(Self {
            is_saved: r.flag()?,
            min_water_level: u32::from_le_bytes(r.array()?),
            max_water_level: u32::from_le_bytes(r.array()?),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Watcher
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherRecord {
    pub is_saved: bool,
    pub config: WatcherConfig,
}

impl WatcherRecord {
    pub const ENCODED_LEN: usize = 1 + 1 + URL_FIELD_LEN + DEVICE_NAME_FIELD_LEN + 4 + 8 + 4 + 4;

    pub fn saved(config: &WatcherConfig) -> Self {
        Self {
            is_saved: true,
            config: config.clone(),
        }
    }

    /// Stored settings, or zero values if never saved.
    pub fn into_config(self) -> WatcherConfig {
        if self.is_saved {
            self.config
        } else {
            WatcherConfig::default()
        }
    }

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let c = &self.config;
        let mut out = [0u8; Self::ENCODED_LEN];
        let mut at = 0;
        let mut put = |bytes: &[u8], width: usize| {
            out[at..at + bytes.len()].copy_from_slice(bytes);
            at += width;
        };
        put(&[u8::from(self.is_saved)], 1);
        put(&[u8::from(c.power)], 1);
        put(c.url.as_bytes(), URL_FIELD_LEN);
        put(c.device_name.as_bytes(), DEVICE_NAME_FIELD_LEN);
        put(&c.outlet.to_le_bytes(), 4);
        put(&c.last_watering_time.to_le_bytes(), 8);
        put(&c.water_flow_time.to_le_bytes(), 4);
        put(&c.watering_interval_time.to_le_bytes(), 4);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(ConfigError::Corrupted);
        }
        let mut r = Reader::new(bytes);
        let is_saved = r.flag()?;
        let config = WatcherConfig {
            power: r.flag()?,
            url: r.text::<URL_MAX_LEN, URL_FIELD_LEN>()?,
            device_name: r.text::<DEVICE_NAME_MAX_LEN, DEVICE_NAME_FIELD_LEN>()?,
            outlet: i32::from_le_bytes(r.array()?),
            last_watering_time: i64::from_le_bytes(r.array()?),
            water_flow_time: i32::from_le_bytes(r.array()?),
            watering_interval_time: i32::from_le_bytes(r.array()?),
        };
        Ok(Self { is_saved, config })
    }
}

// ───────────────────────────────────────────────────────────────
// Decoding helpers
// ───────────────────────────────────────────────────────────────

struct Reader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, at: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ConfigError> {
        let field = self
            .bytes
            .get(self.at..self.at + len)
            .ok_or(ConfigError::Corrupted)?;
        self.at += len;
        Ok(field)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ConfigError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn flag(&mut self) -> Result<bool, ConfigError> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ConfigError::Corrupted),
        }
    }

    /// NUL-terminated UTF-8 text inside a `W`-byte field holding at most `N` chars.
    fn text<const N: usize, const W: usize>(&mut self) -> Result<String<N>, ConfigError> {
        let field = self.take(W)?;
        let end = field
            .iter()
            .position(|&b| b == 0)
            .ok_or(ConfigError::Corrupted)?;
        let text = core::str::from_utf8(&field[..end]).map_err(|_| ConfigError::Corrupted)?;
        let mut out = String::new();
        out.push_str(text).map_err(|()| ConfigError::Corrupted)?;
        Ok(out)
    }
}
