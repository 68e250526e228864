//! Deterministic stand-ins for the DHT22 and the MQ gas sensor.

use climate_telemetry_common::{AnalogInput, ClimateSensor, GasLevel};

/// Temperature and humidity slowly oscillating around a base value.
pub struct SimulatedClimateSensor {
    base_temperature: f32,
    base_humidity: f32,
    dropout_every: Option<u32>,
    reads: u32,
}

impl SimulatedClimateSensor {
    pub fn new(base_temperature: f32, base_humidity: f32) -> Self {
        Self {
            base_temperature,
            base_humidity,
            dropout_every: None,
            reads: 0,
        }
    }

    /// Makes every `n`-th read report an unavailable temperature, like a DHT22 timeout.
    pub fn with_dropout_every(mut self, n: u32) -> Self {
        self.dropout_every = Some(n).filter(|&n| n > 0);
        self
    }

    fn phase(&self) -> f32 {
        self.reads as f32 * 0.1
    }
}

impl ClimateSensor for SimulatedClimateSensor {
    // Called first in every sampling cycle, so it advances the simulation.
    fn read_humidity(&mut self) -> f32 {
        self.reads = self.reads.wrapping_add(1);
        (self.base_humidity + 5.0 * self.phase().cos()).clamp(0.0, 100.0)
    }

    fn read_temperature(&mut self) -> f32 {
        if matches!(self.dropout_every, Some(n) if self.reads % n == 0) {
            return f32::NAN;
        }
        self.base_temperature + 1.5 * self.phase().sin()
    }
}

/// Raw ADC counts drifting in a triangle wave above a baseline.
pub struct SimulatedGasInput {
    baseline: u16,
    step: u16,
}

impl SimulatedGasInput {
    const SWING: u16 = 120;

    pub fn new(baseline: u16) -> Self {
        Self { baseline, step: 0 }
    }
}

impl AnalogInput for SimulatedGasInput {
    fn read_raw(&mut self, channel: u8) -> Option<u16> {
        log::trace!("Reading ADC channel {}", channel);

        self.step = (self.step + 1) % (2 * Self::SWING);
        let offset = if self.step < Self::SWING {
            self.step
        } else {
            2 * Self::SWING - self.step
        };

        Some(self.baseline.saturating_add(offset).min(GasLevel::ADC_MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climate_stays_near_base() {
        let mut sensor = SimulatedClimateSensor::new(22.5, 48.0);

        for _ in 0..100 {
            let humidity = sensor.read_humidity();
            let temperature = sensor.read_temperature();
            assert!((humidity - 48.0).abs() <= 5.0);
            assert!((temperature - 22.5).abs() <= 1.5);
        }
    }

    #[test]
    fn dropout_hits_every_nth_read() {
        let mut sensor = SimulatedClimateSensor::new(20.0, 50.0).with_dropout_every(3);

        let invalid: Vec<bool> = (0..6)
            .map(|_| {
                sensor.read_humidity();
                sensor.read_temperature().is_nan()
            })
            .collect();

        assert_eq!(invalid, [false, false, true, false, false, true]);
    }

    #[test]
    fn gas_never_exceeds_adc_range() {
        let mut input = SimulatedGasInput::new(4000);

        assert!((0..500).all(|_| input.read_raw(6).is_some_and(|raw| raw <= GasLevel::ADC_MAX)));
    }
}
