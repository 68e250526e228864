//! The two sensor sampling tasks.

use std::sync::Arc;
use std::time::Duration;

use crate::lock::LockTimeout;
use crate::schedule::PeriodicTask;
use crate::sensor::{AnalogInput, ClimateReading, ClimateSensor, GasLevel};
use crate::state::SharedState;

/// Why a sampling cycle published nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("sensor returned an invalid reading")]
    InvalidReading,

    #[error(transparent)]
    LockTimeout(#[from] LockTimeout),
}

/// Reads the temperature/humidity sensor and publishes both values together.
pub struct ClimateSampler<S> {
    sensor: S,
    state: Arc<SharedState>,
    lock_timeout: Duration,
}

impl<S: ClimateSensor> ClimateSampler<S> {
    pub fn new(sensor: S, state: Arc<SharedState>, lock_timeout: Duration) -> Self {
        Self {
            sensor,
            state,
            lock_timeout,
        }
    }

    /// Reads once and publishes the pair, all or nothing.
    pub fn sample(&mut self) -> Result<ClimateReading, SampleError> {
        let humidity = self.sensor.read_humidity();
        let temperature = self.sensor.read_temperature();

        let reading =
            ClimateReading::from_raw(temperature, humidity).ok_or(SampleError::InvalidReading)?;
        self.state.publish_climate(reading, self.lock_timeout)?;

        Ok(reading)
    }
}

impl<S: ClimateSensor> PeriodicTask for ClimateSampler<S> {
    fn name(&self) -> &str {
        "climate_sampler"
    }

    fn run_cycle(&mut self) {
        match self.sample() {
            Ok(reading) => log::info!(
                "Humidity: {:.2}, Temperature: {:.2}",
                reading.humidity_percent,
                reading.temperature_celsius
            ),
            Err(SampleError::InvalidReading) => log::error!("Failed to read from DHT sensor!"),
            Err(SampleError::LockTimeout(e)) => log::debug!("Climate reading dropped: {}", e),
        }
    }
}

/// Reads the analog air quality sensor and publishes the raw level.
pub struct GasSampler<A> {
    input: A,
    channel: u8,
    state: Arc<SharedState>,
    lock_timeout: Duration,
}

impl<A: AnalogInput> GasSampler<A> {
    pub fn new(input: A, channel: u8, state: Arc<SharedState>, lock_timeout: Duration) -> Self {
        Self {
            input,
            channel,
            state,
            lock_timeout,
        }
    }

    /// Reads once and publishes the level. A failed conversion publishes nothing.
    pub fn sample(&mut self) -> Result<GasLevel, SampleError> {
        let level = self
            .input
            .read_raw(self.channel)
            .map(GasLevel)
            .ok_or(SampleError::InvalidReading)?;
        self.state.publish_gas(level, self.lock_timeout)?;

        Ok(level)
    }
}

impl<A: AnalogInput> PeriodicTask for GasSampler<A> {
    fn name(&self) -> &str {
        "gas_sampler"
    }

    fn run_cycle(&mut self) {
        match self.sample() {
            Ok(level) => log::info!("Gas Value: {}", level),
            Err(SampleError::InvalidReading) => log::error!("Failed to read from gas sensor!"),
            Err(SampleError::LockTimeout(e)) => log::debug!("Gas reading dropped: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Snapshot;

    const TIMEOUT: Duration = Duration::from_millis(100);

    struct Scripted(Vec<(f32, f32)>);

    impl ClimateSensor for Scripted {
        fn read_humidity(&mut self) -> f32 {
            self.0[0].1
        }

        fn read_temperature(&mut self) -> f32 {
            self.0.remove(0).0
        }
    }

    struct Fixed(Option<u16>);

    impl AnalogInput for Fixed {
        fn read_raw(&mut self, channel: u8) -> Option<u16> {
            assert_eq!(channel, 6);
            self.0
        }
    }

    #[test]
    fn publishes_valid_pair() {
        let state = Arc::new(SharedState::new());
        let mut sampler = ClimateSampler::new(Scripted(vec![(22.5, 48.0)]), state.clone(), TIMEOUT);

        let reading = sampler.sample().unwrap();

        assert_eq!(reading.temperature_celsius, 22.5);
        assert_eq!(state.snapshot(TIMEOUT).unwrap().climate, Some(reading));
    }

    #[test]
    fn invalid_humidity_publishes_nothing() {
        let state = Arc::new(SharedState::new());
        let mut sampler =
            ClimateSampler::new(Scripted(vec![(22.5, f32::NAN)]), state.clone(), TIMEOUT);

        assert_eq!(sampler.sample(), Err(SampleError::InvalidReading));
        assert_eq!(state.snapshot(TIMEOUT).unwrap(), Snapshot::default());
    }

    #[test]
    fn gas_reads_configured_channel() {
        let state = Arc::new(SharedState::new());
        let mut sampler = GasSampler::new(Fixed(Some(812)), 6, state.clone(), TIMEOUT);

        assert_eq!(sampler.sample(), Ok(GasLevel(812)));
        assert_eq!(state.snapshot(TIMEOUT).unwrap().gas, Some(GasLevel(812)));
    }

    #[test]
    fn failed_conversion_keeps_previous_gas_level() {
        let state = Arc::new(SharedState::new());
        let mut sampler = GasSampler::new(Fixed(None), 6, state.clone(), TIMEOUT);

        assert_eq!(sampler.sample(), Err(SampleError::InvalidReading));
        sampler.run_cycle();
        assert_eq!(state.snapshot(TIMEOUT).unwrap().gas, None);

        state.publish_gas(GasLevel(640), TIMEOUT).unwrap();
        assert_eq!(sampler.sample(), Err(SampleError::InvalidReading));
        assert_eq!(state.snapshot(TIMEOUT).unwrap().gas, Some(GasLevel(640)));
    }

    #[test]
    fn run_cycle_survives_every_outcome() {
        let state = Arc::new(SharedState::new());
        let mut sampler = ClimateSampler::new(
            Scripted(vec![(f32::NAN, 10.0), (20.0, 30.0), (21.0, 31.0)]),
            state.clone(),
            Duration::from_millis(5),
        );

        sampler.run_cycle();
        sampler.run_cycle();
        {
            let _held = state.hold(TIMEOUT).unwrap();
            sampler.run_cycle();
        }

        let climate = state.snapshot(TIMEOUT).unwrap().climate.unwrap();
        assert_eq!(climate.temperature_celsius, 20.0);
        assert_eq!(climate.humidity_percent, 30.0);
    }
}
