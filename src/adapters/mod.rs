//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `gpio`         | GpioPort           | ESP32 GPIO inputs        |
//! | `http`         | RemoteStatePort    | ESP-IDF HTTP client      |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! |                | StoragePort        |                          |
//! | `time`         | TimePort           | ESP32 system timer       |
//! |                | DelayNs            | ROM / FreeRTOS delay     |

pub mod gpio;
pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod time;
