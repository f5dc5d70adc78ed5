//! LevelGuard Firmware: Main Entry Point
//!
//! Hexagonal architecture with a fixed-rate polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioAdapter    HttpAdapter     LogEventSink   NvsAdapter      │
//! │  (GpioPort)     (RemoteState)   (EventSink)    (Config+NVS)    │
//! │  SettleDelay    Esp32Time                                      │
//! │  (DelayNs)      (TimePort)                                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              LevelService (pure logic)                 │    │
//! │  │  LevelSampler · RemoteWatcher                          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sntp::EspSntp;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration as WifiCfg, EspWifi};
use log::{info, warn};

use levelguard::adapters::gpio::GpioAdapter;
use levelguard::adapters::http::HttpAdapter;
use levelguard::adapters::log_sink::LogEventSink;
use levelguard::adapters::nvs::NvsAdapter;
use levelguard::adapters::time::{Esp32TimeAdapter, SettleDelay};
use levelguard::app::ports::ConfigPort;
use levelguard::app::service::LevelService;
use levelguard::config::SystemConfig;
use levelguard::pins::{LEVEL_LADDER_PINS, LEVEL_LADDER_TOP};
use levelguard::sensors::{LevelSampler, SamplerSettings};
use levelguard::watcher::RemoteWatcher;

/// Station credentials baked in at build time; leave unset to run offline.
const WIFI_SSID: Option<&str> = option_env!("LEVELGUARD_WIFI_SSID");
const WIFI_PASS: Option<&str> = option_env!("LEVELGUARD_WIFI_PASS");

/// Loop granularity; the service gates its own intervals.
const LOOP_PERIOD_MS: u64 = 100;

type Service = LevelService<GpioAdapter, SettleDelay, HttpAdapter, Esp32TimeAdapter>;

/// Wire the ladder and the watcher, then restore their stored settings.
/// A broken record is logged and skipped; only ladder setup is fatal.
fn build_service(
    config: SystemConfig,
    nvs: &NvsAdapter,
    sink: &mut LogEventSink,
) -> levelguard::error::Result<Service> {
    let sampler = LevelSampler::with_pins(
        GpioAdapter::new(),
        SettleDelay,
        SamplerSettings::from(&config),
        &LEVEL_LADDER_PINS,
    )?;
    let watcher = RemoteWatcher::new(HttpAdapter::new(), Esp32TimeAdapter::new(), &config);
    let mut service = LevelService::new(sampler, watcher, config);
    if let Err(e) = service.load_all(nvs, sink) {
        warn!("Level settings load failed ({}), keeping defaults", e);
    }
    Ok(service)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LevelGuard v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    let mut sink = LogEventSink::from_config(&config);

    // ── 3. Network + wall clock ───────────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let mut esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;
    let _sntp = match (WIFI_SSID, WIFI_PASS) {
        (Some(ssid), Some(pass)) => {
            wifi.set_configuration(&WifiCfg::Client(ClientConfiguration {
                ssid: ssid
                    .try_into()
                    .map_err(|()| anyhow::anyhow!("SSID too long"))?,
                password: pass
                    .try_into()
                    .map_err(|()| anyhow::anyhow!("WiFi password too long"))?,
                ..Default::default()
            }))?;
            wifi.start()?;
            wifi.connect()?;
            wifi.wait_netif_up()?;
            let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
            info!("WiFi connected. IP: {}", ip_info.ip);
            Some(EspSntp::new_default()?)
        }
        _ => {
            warn!("No WiFi credentials built in; remote watching will report errors");
            None
        }
    };

    // ── 4. Domain wiring ──────────────────────────────────────
    let mut service = build_service(config, &nvs, &mut sink)?;
    info!("Ladder: {} contacts (top level {})", LEVEL_LADDER_PINS.len(), LEVEL_LADDER_TOP);

    service.start(&mut sink);

    // ── 5. Main loop ──────────────────────────────────────────
    let uptime = Esp32TimeAdapter::new();
    loop {
        service.tick(uptime.uptime_ms(), &mut sink);
        service.auto_save_if_needed(&mut nvs);
        std::thread::sleep(Duration::from_millis(LOOP_PERIOD_MS));
    }
}
