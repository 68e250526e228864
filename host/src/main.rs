mod simulated;
mod sink;

use climate_telemetry_common::{Agent, AgentConfig, StdSpawner};

use simulated::{SimulatedClimateSensor, SimulatedGasInput};
use sink::LogSink;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "TELEMETRY_AGENT_CONFIG";

/// Reads the config file named by `TELEMETRY_AGENT_CONFIG`, or falls back to the defaults.
fn load_config() -> anyhow::Result<AgentConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            log::info!("Loading config from {:?}", path);
            Ok(AgentConfig::load(&path)?)
        }
        None => Ok(AgentConfig::default()),
    }
}

/// A minimal main function that launches the agent against simulated hardware.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;

    let mut sink = LogSink::new();
    sink.begin();

    // Drop every 7th climate read to exercise the invalid reading path.
    let climate_sensor = SimulatedClimateSensor::new(22.5, 48.0).with_dropout_every(7);
    let gas_input = SimulatedGasInput::new(480);

    let agent = Agent::launch(&config, climate_sensor, gas_input, sink, &StdSpawner)?;

    agent.idle()
}
