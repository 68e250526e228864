use climate_telemetry_common::ClimateSensor;

#[derive(Debug)]
pub enum Dht22Error {
    ChecksumError,
    TimeoutError,
}

/// Bit-banged DHT22 on a single GPIO.
///
/// One transfer yields both values. `read_humidity` starts the transfer and
/// `read_temperature` returns the temperature of that same transfer, so the
/// sampler always sees a matching pair.
pub struct Dht22 {
    pin: i32,
    last: Result<(f32, f32), Dht22Error>,
}

impl Dht22 {
    const FRAME_LEN: usize = 5;

    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            last: Err(Dht22Error::TimeoutError),
        }
    }

    /// Waits while the line stays at `state`. Returns the time waited in µs, or `None` past `max_wait`.
    fn wait_while_level(&self, max_wait: u32, state: i32) -> Option<u32> {
        use esp_idf_svc::sys::*;

        let mut u_sec = 0;
        unsafe {
            while gpio_get_level(self.pin) == state {
                u_sec += 1;
                if u_sec > max_wait {
                    return None;
                }
                ets_delay_us(1);
            }
        }

        Some(u_sec)
    }

    /// Runs one transfer and returns `(temperature °C, humidity %)`.
    pub fn read(&self) -> Result<(f32, f32), Dht22Error> {
        use esp_idf_svc::sys::*;

        let mut frame = [0u8; Self::FRAME_LEN];

        unsafe {
            gpio_set_direction(self.pin, GPIO_MODE_DEF_OUTPUT);

            // Start signal: low for 3 ms, then high for 25 µs
            gpio_set_level(self.pin, 0);
            ets_delay_us(3000);
            gpio_set_level(self.pin, 1);
            ets_delay_us(25);

            gpio_set_direction(self.pin, GPIO_MODE_DEF_INPUT);
        }

        // Sensor answers with 80 µs low, 80 µs high
        self.wait_while_level(85, 0).ok_or(Dht22Error::TimeoutError)?;
        self.wait_while_level(85, 1).ok_or(Dht22Error::TimeoutError)?;

        for bit in 0..Self::FRAME_LEN * 8 {
            self.wait_while_level(56, 0).ok_or(Dht22Error::TimeoutError)?;

            // A high phase longer than ~28 µs is a one
            let high = self.wait_while_level(75, 1).ok_or(Dht22Error::TimeoutError)?;
            if high > 40 {
                frame[bit / 8] |= 1 << (7 - bit % 8);
            }
        }

        let checksum = frame[..4].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
        if frame[4] != checksum {
            return Err(Dht22Error::ChecksumError);
        }

        let humidity = u16::from_be_bytes([frame[0], frame[1]]) as f32 / 10.0;

        let mut temperature = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]) as f32 / 10.0;
        if frame[2] & 0x80 != 0 {
            temperature = -temperature;
        }

        Ok((temperature, humidity))
    }
}

impl ClimateSensor for Dht22 {
    fn read_humidity(&mut self) -> f32 {
        self.last = self.read();
        match &self.last {
            Ok((_, humidity)) => *humidity,
            Err(e) => {
                log::warn!("DHT22 transfer failed: {:?}", e);
                f32::NAN
            }
        }
    }

    fn read_temperature(&mut self) -> f32 {
        self.last
            .as_ref()
            .map_or(f32::NAN, |(temperature, _)| *temperature)
    }
}
