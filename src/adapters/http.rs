//! HTTP client adapter for the remote watcher.
//!
//! Implements [`RemoteStatePort`].
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in the
//!   `embedded_svc` blocking client; one connection per poll.
//! - **all other targets**: returns a canned response set with
//!   [`HttpAdapter::sim_set_response`], defaulting to a transport failure.

use log::debug;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{HttpResponse, RemoteStatePort};
use crate::error::RemoteError;

/// Bodies beyond this size are cut off; state documents are tiny.
#[cfg(target_os = "espidf")]
const MAX_BODY_LEN: usize = 1024;

pub struct HttpAdapter {
    #[cfg(not(target_os = "espidf"))]
    canned: Result<HttpResponse, RemoteError>,
}

impl HttpAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            canned: Err(RemoteError::Transport),
        }
    }

    /// Answer every subsequent fetch with `status` and `body`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_response(&mut self, status: u16, body: &str) {
        self.canned = Ok(HttpResponse {
            status,
            body: body.to_owned(),
        });
    }

    /// Fail every subsequent fetch with `error`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_failure(&mut self, error: RemoteError) {
        self.canned = Err(error);
    }
}

impl Default for HttpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStatePort for HttpAdapter {
    #[cfg(target_os = "espidf")]
    fn fetch(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        timeout_ms: u32,
    ) -> Result<HttpResponse, RemoteError> {
        use core::time::Duration;
        use embedded_svc::http::Method;
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Read;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::EspIOError;

        fn classify(e: EspIOError) -> RemoteError {
            if e.0.code() == esp_idf_svc::sys::ESP_ERR_TIMEOUT as i32 {
                RemoteError::Timeout
            } else {
                RemoteError::Transport
            }
        }

        let conn = EspHttpConnection::new(&Configuration {
            timeout: Some(Duration::from_millis(u64::from(timeout_ms))),
            ..Default::default()
        })
        .map_err(|e| {
            warn!("HttpAdapter: connection setup failed: {}", e);
            RemoteError::Transport
        })?;
        let mut client = Client::wrap(conn);

        let request = client
            .request(Method::Get, url, headers)
            .map_err(classify)?;
        let mut response = request.submit().map_err(classify)?;
        let status = response.status();

        let mut body = Vec::with_capacity(256);
        let mut chunk = [0u8; 256];
        loop {
            let n = response.read(&mut chunk).map_err(classify)?;
            if n == 0 {
                break;
            }
            let room = MAX_BODY_LEN - body.len();
            body.extend_from_slice(&chunk[..n.min(room)]);
            if body.len() == MAX_BODY_LEN {
                warn!("HttpAdapter: body truncated at {} bytes", MAX_BODY_LEN);
                break;
            }
        }
        debug!("HttpAdapter: GET {} -> {}", url, status);

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn fetch(
        &mut self,
        url: &str,
        _headers: &[(&str, &str)],
        _timeout_ms: u32,
    ) -> Result<HttpResponse, RemoteError> {
        debug!("HttpAdapter(sim): GET {}", url);
        self.canned.clone()
    }
}
