//! Remote water level watcher.
//!
//! Polls another device's state document over HTTP and mirrors its
//! `SensorState` as a [`WaterLevelState`]. The remote device already
//! debounces its own readings, so every poll result is taken as-is.
//!
//! Also owns the irrigation timers of the outlet it controls: when the
//! last run started, how long a run lasts, and how long to rest between
//! runs. Switching the outlet itself is left to the caller.
//!
//! ## Poll outcome
//!
//! | Remote answer                          | Candidate state        |
//! |----------------------------------------|------------------------|
//! | transport failure / timeout / non-2xx  | `Error`                |
//! | 2xx, body is not a JSON object         | `Error`                |
//! | 2xx, `SensorState` integer 0..=4       | that state             |
//! | 2xx, `SensorState` anything else       | `Error`                |
//! | 2xx, `SensorState` absent or null      | unchanged              |

use heapless::String;
use log::debug;
use serde_json::{Map, Value};

use crate::app::events::AppEvent;
use crate::app::ports::{ConfigError, EventSink, RemoteStatePort, StoragePort, TimePort};
use crate::config::SystemConfig;
use crate::error::RemoteError;
use crate::level::WaterLevelState;
use crate::records::{self, WatcherRecord};

pub const URL_MAX_LEN: usize = 127;
pub const DEVICE_NAME_MAX_LEN: usize = 19;

/// Outlet value that disables watching.
pub const DISABLED_OUTLET: i32 = -1;

/// Storage key used unless the caller picks another one.
pub const DEFAULT_WATCHER_KEY: &str = "wl_watch";

/// Field in the remote state document carrying the state code.
pub const SENSOR_STATE_FIELD: &str = "SensorState";

const REQUEST_HEADERS: [(&str, &str); 1] = [("Content-Type", "application/json")];

/// Persisted watcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatcherConfig {
    pub power: bool,
    pub url: String<URL_MAX_LEN>,
    pub device_name: String<DEVICE_NAME_MAX_LEN>,
    pub outlet: i32,
    /// Start of the last irrigation run (epoch seconds).
    pub last_watering_time: i64,
    /// Intended length of one run (seconds).
    pub water_flow_time: i32,
    /// Rest between runs (seconds).
    pub watering_interval_time: i32,
}

impl WatcherConfig {
    pub fn is_enabled(&self) -> bool {
        self.power && !self.url.is_empty() && self.outlet != DISABLED_OUTLET
    }
}

pub struct RemoteWatcher<R, T> {
    remote: R,
    clock: T,
    timeout_ms: u32,
    config: WatcherConfig,
    state: WaterLevelState,
    changed: bool,
    storage_key: &'static str,
}

impl<R: RemoteStatePort, T: TimePort> RemoteWatcher<R, T> {
    pub fn new(remote: R, clock: T, system: &SystemConfig) -> Self {
        Self {
            remote,
            clock,
            timeout_ms: system.remote_timeout_ms,
            config: WatcherConfig::default(),
            state: WaterLevelState::None,
            changed: false,
            storage_key: DEFAULT_WATCHER_KEY,
        }
    }

    /// Poll the remote device once.
    ///
    /// A disabled watcher clears the change flag and keeps its last state.
    /// Fetch and decode failures become `WaterLevelState::Error`; the next
    /// call simply tries again.
    pub fn watch(&mut self, sink: &mut impl EventSink) {
        if !self.config.is_enabled() {
            self.changed = false;
            sink.emit(&AppEvent::WatcherDisabled);
            return;
        }

        let candidate = match self.poll_remote() {
            Ok(Some(state)) => state,
            Ok(None) => self.state,
            Err(e) => {
                sink.emit(&AppEvent::RemoteFailed(e));
                WaterLevelState::Error
            }
        };

        self.changed = candidate != self.state;
        if self.changed {
            self.state = candidate;
        }
        sink.emit(&AppEvent::RemotePolled {
            state: self.state,
            changed: self.changed,
        });
    }

    fn poll_remote(&mut self) -> Result<Option<WaterLevelState>, RemoteError> {
        let response = self
            .remote
            .fetch(&self.config.url, &REQUEST_HEADERS, self.timeout_ms)?;
        debug!(
            "RemoteWatcher: {} -> HTTP {} ({} bytes)",
            self.config.url,
            response.status,
            response.body.len()
        );
        if !response.is_success() {
            return Err(RemoteError::HttpStatus(response.status));
        }
        decode_state(&response.body)
    }

    pub fn state(&self) -> WaterLevelState {
        self.state
    }

    /// Whether the last [`watch`](Self::watch) changed the state.
    pub fn is_water_level_changed(&self) -> bool {
        self.changed
    }

    // ── Irrigation timers ─────────────────────────────────────

    /// The current run has lasted longer than `water_flow_time`.
    pub fn is_time_over(&self) -> bool {
        self.secs_since_watering() > i64::from(self.config.water_flow_time)
    }

    /// The rest interval since the last run has elapsed.
    pub fn is_time_to_watering(&self) -> bool {
        self.secs_since_watering() > i64::from(self.config.watering_interval_time)
    }

    /// Stamp the start of an irrigation run.
    pub fn record_watering(&mut self) {
        self.config.last_watering_time = self.clock.now_epoch_secs();
    }

    fn secs_since_watering(&self) -> i64 {
        self.clock
            .now_epoch_secs()
            .saturating_sub(self.config.last_watering_time)
    }

    // ── Config accessors ──────────────────────────────────────

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn power(&self) -> bool {
        self.config.power
    }

    pub fn set_power(&mut self, power: bool) {
        self.config.power = power;
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn set_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.config.url = bounded(url, "url must be at most 127 bytes")?;
        Ok(())
    }

    pub fn device_name(&self) -> &str {
        &self.config.device_name
    }

    pub fn set_device_name(&mut self, device_name: &str) -> Result<(), ConfigError> {
        self.config.device_name = bounded(device_name, "device_name must be at most 19 bytes")?;
        Ok(())
    }

    pub fn outlet(&self) -> i32 {
        self.config.outlet
    }

    pub fn set_outlet(&mut self, outlet: i32) {
        self.config.outlet = outlet;
    }

    pub fn last_watering_time(&self) -> i64 {
        self.config.last_watering_time
    }

    pub fn set_last_watering_time(&mut self, epoch_secs: i64) {
        self.config.last_watering_time = epoch_secs;
    }

    pub fn water_flow_time(&self) -> i32 {
        self.config.water_flow_time
    }

    pub fn set_water_flow_time(&mut self, secs: i32) {
        self.config.water_flow_time = secs;
    }

    pub fn watering_interval_time(&self) -> i32 {
        self.config.watering_interval_time
    }

    pub fn set_watering_interval_time(&mut self, secs: i32) {
        self.config.watering_interval_time = secs;
    }

    // ── Persistence ───────────────────────────────────────────

    pub fn set_storage_key(&mut self, key: &'static str) {
        self.storage_key = key;
    }

    /// Load settings. A missing or never-saved record yields zero values;
    /// on error the current settings are kept. The watched state is not
    /// part of the record and is left alone.
    pub fn load(
        &mut self,
        storage: &impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        let mut buf = [0u8; records::RECORD_BUF_LEN];
        let record = match records::read_record(storage, self.storage_key, &mut buf)? {
            Some(bytes) => Some(WatcherRecord::decode(bytes)?),
            None => None,
        };
        let from_storage = record.as_ref().is_some_and(|r| r.is_saved);
        self.config = record.map_or_else(WatcherConfig::default, WatcherRecord::into_config);
        sink.emit(&AppEvent::WatcherLoaded {
            power: self.config.power,
            from_storage,
        });
        Ok(())
    }

    pub fn save(&self, storage: &mut impl StoragePort) -> Result<(), ConfigError> {
        let record = WatcherRecord::saved(&self.config);
        storage.write(records::RECORD_NAMESPACE, self.storage_key, &record.encode())?;
        debug!("RemoteWatcher: settings saved under '{}'", self.storage_key);
        Ok(())
    }
}

/// Decode a remote state document.
///
/// `Ok(None)` means the document is valid but carries no state.
pub fn decode_state(body: &str) -> Result<Option<WaterLevelState>, RemoteError> {
    let doc: Map<std::string::String, Value> =
        serde_json::from_str(body).map_err(|_| RemoteError::Decode)?;
    match doc.get(SENSOR_STATE_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let code = value.as_i64().ok_or(RemoteError::Decode)?;
            WaterLevelState::from_code(code).map(Some)
        }
    }
}

fn bounded<const N: usize>(text: &str, reason: &'static str) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(text)
        .map_err(|()| ConfigError::ValidationFailed(reason))?;
    Ok(out)
}
