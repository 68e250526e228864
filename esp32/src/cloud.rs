use std::time::{Duration, Instant};

use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::http::Method;
use embedded_svc::io::Write;
use esp_idf_svc::http::client::EspHttpConnection;

use climate_telemetry_common::TelemetrySink;

use crate::wifi::Wifi;

const TELEMETRY_URL: &str = env!("TELEMETRY_URL");

/// Posts the latest outbound message to an HTTP endpoint.
///
/// Transmission happens during upkeep, at most once per `min_interval` and
/// only when the message changed. A failed post is logged and the next
/// change is sent on a later upkeep; nothing is queued.
pub struct HttpSink {
    wifi: Wifi,
    min_interval: Duration,
    outbound: String,
    last_sent: Option<String>,
    last_post: Option<Instant>,
}

impl HttpSink {
    pub fn new(wifi: Wifi, min_interval: Duration) -> Self {
        Self {
            wifi,
            min_interval,
            outbound: String::new(),
            last_sent: None,
            last_post: None,
        }
    }

    /// Brings the network up.
    pub fn begin(&mut self) -> anyhow::Result<()> {
        crate::wifi::connect(&mut self.wifi)
    }

    fn due(&self) -> bool {
        let changed = !self.outbound.is_empty()
            && self.last_sent.as_deref() != Some(self.outbound.as_str());
        let spaced = self
            .last_post
            .map_or(true, |at| at.elapsed() >= self.min_interval);

        changed && spaced
    }

    fn post(&self) -> anyhow::Result<u16> {
        let connection = EspHttpConnection::new(&Default::default())?;
        let mut client = HttpClient::wrap(connection);

        let content_length = self.outbound.len().to_string();
        let headers = [
            ("content-type", "text/plain"),
            ("content-length", content_length.as_str()),
        ];
        let mut request = client.request(Method::Post, TELEMETRY_URL, &headers)?;
        request.write_all(self.outbound.as_bytes())?;
        request.flush()?;

        let response = request.submit()?;
        Ok(response.status())
    }
}

impl TelemetrySink for HttpSink {
    fn maintain(&mut self) {
        if !self.wifi.is_connected().unwrap_or(false) {
            log::debug!("Wifi down, holding message");
            return;
        }
        if !self.due() {
            return;
        }

        self.last_post = Some(Instant::now());
        match self.post() {
            Ok(status) => {
                log::info!("-> POST {} <- {}", TELEMETRY_URL, status);
                self.last_sent = Some(self.outbound.clone());
            }
            Err(e) => log::error!("Telemetry post failed: {}", e),
        }
    }

    fn set_outbound_message(&mut self, message: &str) {
        self.outbound.clear();
        self.outbound.push_str(message);
    }
}
