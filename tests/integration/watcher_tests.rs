//! Integration tests for the remote watcher: poll outcomes, the disabled
//! guard and the irrigation timers.

use crate::mock_hw::{ManualClock, RecordingSink, ScriptedRemote};

use levelguard::app::events::AppEvent;
use levelguard::config::SystemConfig;
use levelguard::error::RemoteError;
use levelguard::level::WaterLevelState;
use levelguard::watcher::{DISABLED_OUTLET, RemoteWatcher};

const URL: &str = "http://192.168.1.40/state";

fn watcher() -> (RemoteWatcher<ScriptedRemote, ManualClock>, ScriptedRemote, ManualClock) {
    let remote = ScriptedRemote::new();
    let clock = ManualClock::at(1_700_000_000);
    let mut w = RemoteWatcher::new(remote.clone(), clock.clone(), &SystemConfig::default());
    w.set_power(true);
    w.set_url(URL).unwrap();
    w.set_outlet(1);
    (w, remote, clock)
}

// ── Polling ──────────────────────────────────────────────────

#[test]
fn flood_payload_sets_state_and_change_flag() {
    let (mut w, remote, _) = watcher();
    remote.always_reply(200, r#"{"SensorState":2}"#);

    w.watch(&mut RecordingSink::new());
    assert_eq!(w.state(), WaterLevelState::Flood);
    assert!(w.is_water_level_changed());

    w.watch(&mut RecordingSink::new());
    assert_eq!(w.state(), WaterLevelState::Flood);
    assert!(!w.is_water_level_changed(), "already Flood");
}

#[test]
fn request_carries_url_header_and_timeout() {
    let (mut w, remote, _) = watcher();
    remote.reply(200, "{}");
    w.watch(&mut RecordingSink::new());

    let requests = remote.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, URL);
    assert_eq!(requests[0].timeout_ms, 1000);
    assert_eq!(
        requests[0].headers,
        vec![("Content-Type".to_owned(), "application/json".to_owned())]
    );
}

#[test]
fn every_known_code_maps_to_its_state() {
    let (mut w, remote, _) = watcher();
    let expected = [
        (3, WaterLevelState::Lack),
        (1, WaterLevelState::Good),
        (4, WaterLevelState::Error),
        (0, WaterLevelState::None),
        (2, WaterLevelState::Flood),
    ];
    for (code, state) in expected {
        remote.reply(200, &format!(r#"{{"SensorState":{code}}}"#));
        w.watch(&mut RecordingSink::new());
        assert_eq!(w.state(), state, "code {code}");
        assert!(w.is_water_level_changed());
    }
}

#[test]
fn failures_collapse_to_error() {
    let (mut w, remote, _) = watcher();
    let mut sink = RecordingSink::new();

    remote.fail(RemoteError::Timeout);
    w.watch(&mut sink);
    assert_eq!(w.state(), WaterLevelState::Error);
    assert!(w.is_water_level_changed());

    remote.reply(503, r#"{"SensorState":1}"#);
    w.watch(&mut sink);
    assert_eq!(w.state(), WaterLevelState::Error);
    assert!(!w.is_water_level_changed());

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RemoteFailed(_))),
        2
    );
    assert!(sink
        .events
        .contains(&AppEvent::RemoteFailed(RemoteError::HttpStatus(503))));
}

#[test]
fn bad_payloads_become_error() {
    for body in ["<html>", "[1]", r#"{"SensorState":"1"}"#, r#"{"SensorState":9}"#] {
        let (mut w, remote, _) = watcher();
        remote.reply(200, body);
        w.watch(&mut RecordingSink::new());
        assert_eq!(w.state(), WaterLevelState::Error, "body {body}");
    }
}

#[test]
fn missing_field_keeps_current_state() {
    let (mut w, remote, _) = watcher();
    remote.reply(200, r#"{"SensorState":3}"#);
    remote.reply(200, r#"{"Name":"tank"}"#);

    w.watch(&mut RecordingSink::new());
    w.watch(&mut RecordingSink::new());
    assert_eq!(w.state(), WaterLevelState::Lack);
    assert!(!w.is_water_level_changed());
}

#[test]
fn recovery_after_error_is_immediate() {
    let (mut w, remote, _) = watcher();
    remote.fail(RemoteError::Transport);
    remote.reply(200, r#"{"SensorState":1}"#);

    w.watch(&mut RecordingSink::new());
    w.watch(&mut RecordingSink::new());
    assert_eq!(w.state(), WaterLevelState::Good);
    assert!(w.is_water_level_changed());
}

// ── Disabled guard ───────────────────────────────────────────

#[test]
fn power_off_freezes_state_and_clears_flag() {
    let (mut w, remote, _) = watcher();
    remote.always_reply(200, r#"{"SensorState":2}"#);
    w.watch(&mut RecordingSink::new());
    assert!(w.is_water_level_changed());

    w.set_power(false);
    let mut sink = RecordingSink::new();
    w.watch(&mut sink);
    assert_eq!(w.state(), WaterLevelState::Flood);
    assert!(!w.is_water_level_changed());
    assert_eq!(sink.events, vec![AppEvent::WatcherDisabled]);
    assert_eq!(remote.requests().len(), 1, "no request while disabled");
}

#[test]
fn empty_url_or_disabled_outlet_skips_the_poll() {
    let (mut w, remote, _) = watcher();
    w.set_outlet(DISABLED_OUTLET);
    w.watch(&mut RecordingSink::new());

    w.set_outlet(0);
    w.set_url("").unwrap();
    w.watch(&mut RecordingSink::new());

    assert!(remote.requests().is_empty());
    assert_eq!(w.state(), WaterLevelState::None);
}

#[test]
fn overlong_settings_are_rejected() {
    let (mut w, _, _) = watcher();
    let long_url = format!("http://{}", "a".repeat(121));
    assert!(w.set_url(&long_url).is_err());
    assert_eq!(w.url(), URL, "rejected URL leaves the old one");

    assert!(w.set_device_name("a-very-long-device-name").is_err());
    w.set_device_name("pump-house").unwrap();
    assert_eq!(w.device_name(), "pump-house");
}

// ── Irrigation timers ────────────────────────────────────────

#[test]
fn time_over_is_strictly_greater_than_flow_time() {
    let (mut w, _, clock) = watcher();
    w.set_water_flow_time(300);
    w.record_watering();

    clock.advance(299);
    assert!(!w.is_time_over());
    clock.advance(1);
    assert!(!w.is_time_over(), "exact equality is not over");
    clock.advance(1);
    assert!(w.is_time_over());
}

#[test]
fn time_to_water_mirrors_the_interval() {
    let (mut w, _, clock) = watcher();
    w.set_watering_interval_time(3600);
    w.set_last_watering_time(1_700_000_000);

    clock.set(1_700_003_600);
    assert!(!w.is_time_to_watering());
    clock.set(1_700_003_601);
    assert!(w.is_time_to_watering());
}

#[test]
fn record_watering_stamps_now() {
    let (mut w, _, clock) = watcher();
    clock.set(1_712_345_678);
    w.record_watering();
    assert_eq!(w.last_watering_time(), 1_712_345_678);
}
