use climate_telemetry_common::TelemetrySink;

/// Telemetry sink that "transmits" by writing to the log.
///
/// Like a cloud connection it only sends during upkeep, and only when the
/// outbound message changed since the last transmission.
#[derive(Default)]
pub struct LogSink {
    connected: bool,
    outbound: String,
    last_sent: Option<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the connection up. Upkeep before this does nothing.
    pub fn begin(&mut self) {
        self.connected = true;
        log::info!("Telemetry sink connected");
    }

    fn transmit(&mut self) -> Option<&str> {
        if !self.connected || self.outbound.is_empty() {
            return None;
        }
        if self.last_sent.as_deref() == Some(self.outbound.as_str()) {
            return None;
        }

        self.last_sent = Some(self.outbound.clone());
        self.last_sent.as_deref()
    }
}

impl TelemetrySink for LogSink {
    fn maintain(&mut self) {
        log::trace!("Telemetry sink upkeep");

        if let Some(sent) = self.transmit() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            log::info!("[{}] -> {}", timestamp, sent);
        }
    }

    fn set_outbound_message(&mut self, message: &str) {
        self.outbound.clear();
        self.outbound.push_str(message);
    }
}
