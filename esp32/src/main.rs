mod cloud;
mod dht22;
mod gas;
mod spawner;
mod wifi;

use std::time::Duration;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use climate_telemetry_common::{Agent, AgentConfig};

use cloud::HttpSink;
use dht22::Dht22;
use gas::GasAdc;
use spawner::FreeRtosSpawner;

/// GPIO the DHT22 data line is wired to.
const DHT_PIN: i32 = 4;

/// Shortest spacing between two telemetry posts.
const POST_INTERVAL: Duration = Duration::from_secs(10);

fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;

    let mut sink = HttpSink::new(wifi, POST_INTERVAL);
    // Sampling goes on without a network; the sink holds the message until the link is up.
    if let Err(e) = sink.begin() {
        log::error!("Failed to bring up wifi: {}", e);
    }

    let gas = GasAdc::new(peripherals.adc1, peripherals.pins.gpio34)?;

    let config = AgentConfig {
        gas_channel: GasAdc::CHANNEL,
        ..Default::default()
    };

    let agent = Agent::launch(&config, Dht22::new(DHT_PIN), gas, sink, &FreeRtosSpawner)?;

    agent.idle()
}
