//! Sensor values and the driver interfaces the samplers consume.

/// One successful read of the temperature/humidity sensor.
///
/// Both fields come from the same physical read and are always published together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateReading {
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
}

impl ClimateReading {
    /// Builds a reading from raw driver values, rejecting the not-a-number marker in either field.
    pub fn from_raw(temperature_celsius: f32, humidity_percent: f32) -> Option<Self> {
        if temperature_celsius.is_nan() || humidity_percent.is_nan() {
            return None;
        }

        Some(Self {
            temperature_celsius,
            humidity_percent,
        })
    }
}

/// Raw count of the analog air quality sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GasLevel(pub u16);

impl GasLevel {
    /// Largest count of the 12-bit ADC on the reference board.
    pub const ADC_MAX: u16 = 4095;
}

impl core::fmt::Display for GasLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A combined temperature/humidity sensor (DHT22 class).
///
/// To be implemented for each platform. Either method returns `f32::NAN` when
/// the value is unavailable; there is no other error channel.
pub trait ClimateSensor: Send {
    fn read_humidity(&mut self) -> f32;
    fn read_temperature(&mut self) -> f32;
}

/// An analog input channel.
///
/// Returns `None` when the conversion did not complete. Every count that is
/// returned is a valid sample.
pub trait AnalogInput: Send {
    fn read_raw(&mut self, channel: u8) -> Option<u16>;
}
