//! Integration tests for calibration and watcher record persistence.

use crate::mock_hw::{
    CountingDelay, ManualClock, MemStorage, MockLadder, RecordingSink, ScriptedRemote,
};

use levelguard::app::events::AppEvent;
use levelguard::app::ports::{ConfigError, StorageError};
use levelguard::config::SystemConfig;
use levelguard::level::Calibration;
use levelguard::records::{CalibrationRecord, RECORD_NAMESPACE, WatcherRecord};
use levelguard::sensors::{LevelSampler, SamplerSettings};
use levelguard::watcher::{DEFAULT_WATCHER_KEY, RemoteWatcher, WatcherConfig};

fn sampler() -> LevelSampler<MockLadder, CountingDelay> {
    LevelSampler::with_pins(
        MockLadder::new(),
        CountingDelay::default(),
        SamplerSettings::default(),
        &[1, 2, 3],
    )
    .unwrap()
}

fn watcher() -> RemoteWatcher<ScriptedRemote, ManualClock> {
    RemoteWatcher::new(
        ScriptedRemote::new(),
        ManualClock::at(1_700_000_000),
        &SystemConfig::default(),
    )
}

// ── Calibration ──────────────────────────────────────────────

#[test]
fn calibration_survives_a_reboot() {
    let mut storage = MemStorage::new();
    let mut s = sampler();
    s.set_calibration(2, 9);
    s.save(&mut storage).unwrap();

    let mut rebooted = sampler();
    let mut sink = RecordingSink::new();
    rebooted.load(&storage, &mut sink).unwrap();
    assert_eq!(rebooted.calibration(), Calibration::new(2, 9));
    assert_eq!(
        sink.events,
        vec![AppEvent::CalibrationLoaded {
            calibration: Calibration::new(2, 9),
            from_storage: true,
        }]
    );
}

#[test]
fn missing_calibration_loads_sentinel() {
    let storage = MemStorage::new();
    let mut s = sampler();
    s.set_calibration(1, 2);
    s.load(&storage, &mut RecordingSink::new()).unwrap();
    assert_eq!(s.calibration(), Calibration::UNCALIBRATED);
}

#[test]
fn unsaved_calibration_record_loads_sentinel() {
    let mut storage = MemStorage::new();
    let record = CalibrationRecord {
        is_saved: false,
        min_water_level: 4,
        max_water_level: 8,
    };
    storage.put_raw(RECORD_NAMESPACE, "wl_calib", &record.encode());

    let mut s = sampler();
    let mut sink = RecordingSink::new();
    s.load(&storage, &mut sink).unwrap();
    assert_eq!(s.calibration(), Calibration::UNCALIBRATED);
    assert!(sink.events.contains(&AppEvent::CalibrationLoaded {
        calibration: Calibration::UNCALIBRATED,
        from_storage: false,
    }));
}

#[test]
fn corrupt_calibration_leaves_current_values() {
    let mut storage = MemStorage::new();
    storage.put_raw(RECORD_NAMESPACE, "wl_calib", &[1, 2, 3]);

    let mut s = sampler();
    s.set_calibration(3, 6);
    assert_eq!(
        s.load(&storage, &mut RecordingSink::new()),
        Err(ConfigError::Corrupted)
    );
    assert_eq!(s.calibration(), Calibration::new(3, 6));
}

#[test]
fn storage_failure_leaves_current_values() {
    let mut storage = MemStorage::new();
    storage.fail_reads = Some(StorageError::IoError);

    let mut s = sampler();
    s.set_calibration(3, 6);
    let mut sink = RecordingSink::new();
    assert_eq!(s.load(&storage, &mut sink), Err(ConfigError::IoError));
    assert_eq!(s.calibration(), Calibration::new(3, 6));
    assert!(sink.events.is_empty());
}

#[test]
fn custom_storage_key_is_honoured() {
    let mut storage = MemStorage::new();
    let mut s = sampler();
    s.set_storage_key("tank_b_calib");
    s.set_calibration(1, 4);
    s.save(&mut storage).unwrap();
    assert!(storage.raw(RECORD_NAMESPACE, "tank_b_calib").is_some());
    assert!(storage.raw(RECORD_NAMESPACE, "wl_calib").is_none());
}

// ── Watcher ──────────────────────────────────────────────────

#[test]
fn watcher_settings_survive_a_reboot() {
    let mut storage = MemStorage::new();
    let mut w = watcher();
    w.set_power(true);
    w.set_url("http://tank.local/state").unwrap();
    w.set_device_name("veg-bed").unwrap();
    w.set_outlet(3);
    w.set_water_flow_time(120);
    w.set_watering_interval_time(43_200);
    w.record_watering();
    w.save(&mut storage).unwrap();

    let raw = storage.raw(RECORD_NAMESPACE, DEFAULT_WATCHER_KEY).unwrap();
    assert_eq!(raw.len(), WatcherRecord::ENCODED_LEN);

    let mut rebooted = watcher();
    rebooted.load(&storage, &mut RecordingSink::new()).unwrap();
    assert_eq!(rebooted.config(), w.config());
    assert_eq!(rebooted.last_watering_time(), 1_700_000_000);
}

#[test]
fn missing_watcher_record_loads_zero_values() {
    let storage = MemStorage::new();
    let mut w = watcher();
    w.set_power(true);
    w.set_outlet(5);
    let mut sink = RecordingSink::new();
    w.load(&storage, &mut sink).unwrap();
    assert_eq!(w.config(), &WatcherConfig::default());
    assert_eq!(
        sink.events,
        vec![AppEvent::WatcherLoaded {
            power: false,
            from_storage: false,
        }]
    );
}

#[test]
fn corrupt_watcher_record_is_not_partially_applied() {
    let mut storage = MemStorage::new();
    let mut good = watcher();
    good.set_power(true);
    good.set_url("http://x/").unwrap();
    good.set_outlet(2);
    good.save(&mut storage).unwrap();

    // Unterminated device name field.
    let mut bytes = storage
        .raw(RECORD_NAMESPACE, DEFAULT_WATCHER_KEY)
        .unwrap()
        .clone();
    bytes[130..150].fill(b'x');
    storage.put_raw(RECORD_NAMESPACE, DEFAULT_WATCHER_KEY, &bytes);

    let mut w = watcher();
    w.set_outlet(7);
    assert_eq!(
        w.load(&storage, &mut RecordingSink::new()),
        Err(ConfigError::Corrupted)
    );
    assert!(!w.power());
    assert_eq!(w.url(), "");
    assert_eq!(w.outlet(), 7);
}

#[test]
fn write_failure_is_reported() {
    let mut storage = MemStorage::new();
    storage.fail_writes = Some(StorageError::Full);
    assert_eq!(watcher().save(&mut storage), Err(ConfigError::StorageFull));
}
