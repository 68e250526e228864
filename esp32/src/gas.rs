use esp_idf_svc::hal::adc::attenuation::DB_11;
use esp_idf_svc::hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_svc::hal::adc::ADC1;
use esp_idf_svc::hal::gpio::Gpio34;
use esp_idf_svc::sys::EspError;

use climate_telemetry_common::AnalogInput;

/// MQ-series gas sensor on GPIO34 (ADC1 channel 6).
pub struct GasAdc {
    channel: AdcChannelDriver<'static, Gpio34, AdcDriver<'static, ADC1>>,
}

impl GasAdc {
    pub const CHANNEL: u8 = 6;

    pub fn new(adc: ADC1, pin: Gpio34) -> Result<Self, EspError> {
        let driver = AdcDriver::new(adc)?;
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };

        Ok(Self {
            channel: AdcChannelDriver::new(driver, pin, &config)?,
        })
    }
}

impl AnalogInput for GasAdc {
    fn read_raw(&mut self, channel: u8) -> Option<u16> {
        if channel != Self::CHANNEL {
            log::warn!("Gas sensor is wired to channel {}, not {}", Self::CHANNEL, channel);
        }

        self.channel
            .read_raw()
            .map_err(|e| log::warn!("ADC read failed: {}", e))
            .ok()
    }
}
