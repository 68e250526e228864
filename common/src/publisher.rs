use std::sync::Arc;
use std::time::Duration;

use crate::schedule::PeriodicTask;
use crate::sink::TelemetrySink;
use crate::state::{bounded_message, Message, SharedState, Snapshot};

/// Placeholder for a field that has not been sampled yet.
const NO_DATA: &str = "--";

/// Formats the telemetry summary, e.g. `Temp: 22.50, Hum: 48.00, Air Quality: 512`.
pub fn format_summary(snapshot: &Snapshot) -> Message {
    let (temperature, humidity) = match snapshot.climate {
        Some(reading) => (
            format!("{:.2}", reading.temperature_celsius),
            format!("{:.2}", reading.humidity_percent),
        ),
        None => (NO_DATA.to_string(), NO_DATA.to_string()),
    };
    let gas = snapshot
        .gas
        .map_or_else(|| NO_DATA.to_string(), |level| level.to_string());

    bounded_message(&format!(
        "Temp: {}, Hum: {}, Air Quality: {}",
        temperature, humidity, gas
    ))
}

/// Snapshots the shared state, services the sink and hands it a fresh summary.
pub struct TelemetryPublisher<K> {
    sink: K,
    state: Arc<SharedState>,
    lock_timeout: Duration,
    last: Snapshot,
}

impl<K: TelemetrySink> TelemetryPublisher<K> {
    pub fn new(sink: K, state: Arc<SharedState>, lock_timeout: Duration) -> Self {
        Self {
            sink,
            state,
            lock_timeout,
            last: Snapshot::default(),
        }
    }

    /// The copy the next summary is built from if the lock stays busy.
    pub fn last_snapshot(&self) -> Snapshot {
        self.last
    }

    /// Runs one publish cycle and returns the message handed to the sink.
    pub fn publish(&mut self) -> Message {
        // Only the copy happens under the lock, the sink is called with the lock released.
        match self.state.snapshot(self.lock_timeout) {
            Ok(snapshot) => self.last = snapshot,
            Err(e) => log::debug!("Reusing previous snapshot: {}", e),
        }

        self.sink.maintain();

        let message = format_summary(&self.last);
        self.sink.set_outbound_message(&message);

        if let Err(e) = self.state.store_message(&message, self.lock_timeout) {
            log::debug!("Outbound message not recorded: {}", e);
        }

        log::info!("Message Sent to Cloud: {}", message);
        message
    }
}

impl<K: TelemetrySink> PeriodicTask for TelemetryPublisher<K> {
    fn name(&self) -> &str {
        "telemetry_publisher"
    }

    fn run_cycle(&mut self) {
        self.publish();
    }
}
