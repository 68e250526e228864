use std::time::Duration;

use crate::lock::{BoundedLock, BoundedLockGuard, LockTimeout};
use crate::sensor::{ClimateReading, GasLevel};

/// Usable length of the outbound message, the 256 byte buffer minus its terminator.
pub const MESSAGE_CAPACITY: usize = 255;

/// Latest formatted outbound message.
pub type Message = heapless::String<MESSAGE_CAPACITY>;

/// Copies `text` into a [`Message`], cutting it at the last char boundary that fits.
pub fn bounded_message(text: &str) -> Message {
    let mut end = text.len().min(MESSAGE_CAPACITY);
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    // Cannot fail, `end` is within capacity.
    Message::try_from(&text[..end]).unwrap_or_default()
}

/// Self-consistent copy of the sensor fields, taken under the lock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub climate: Option<ClimateReading>,
    pub gas: Option<GasLevel>,
}

/// The fields behind the lock. Only reachable through [`SharedState`].
#[derive(Default)]
pub struct StateBlock {
    climate: Option<ClimateReading>,
    gas: Option<GasLevel>,
    message: Message,
}

/// Latest sensor values and outbound message, shared by all tasks.
///
/// Each field has a single writer: the climate sampler owns the temperature and
/// humidity pair, the gas sampler owns the gas level and the publisher owns the
/// message. Every accessor waits at most `timeout` for the lock and reports a
/// [`LockTimeout`] instead of blocking further.
#[derive(Default)]
pub struct SharedState {
    block: BoundedLock<StateBlock>,
}

impl SharedState {
    /// Creates the state with no data yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces temperature and humidity in one critical section.
    pub fn publish_climate(
        &self,
        reading: ClimateReading,
        timeout: Duration,
    ) -> Result<(), LockTimeout> {
        self.block
            .with_lock(timeout, |block| block.climate = Some(reading))
    }

    pub fn publish_gas(&self, level: GasLevel, timeout: Duration) -> Result<(), LockTimeout> {
        self.block.with_lock(timeout, |block| block.gas = Some(level))
    }

    /// Copies out the sensor fields.
    pub fn snapshot(&self, timeout: Duration) -> Result<Snapshot, LockTimeout> {
        self.block.with_lock(timeout, |block| Snapshot {
            climate: block.climate,
            gas: block.gas,
        })
    }

    pub fn store_message(&self, message: &Message, timeout: Duration) -> Result<(), LockTimeout> {
        self.block
            .with_lock(timeout, |block| block.message.clone_from(message))
    }

    pub fn message(&self, timeout: Duration) -> Result<Message, LockTimeout> {
        self.block.with_lock(timeout, |block| block.message.clone())
    }

    /// Holds the lock without touching any field until the guard is dropped.
    ///
    /// Used to simulate a stalled holder when exercising the timeout paths.
    #[doc(hidden)]
    pub fn hold(&self, timeout: Duration) -> Option<BoundedLockGuard<'_, StateBlock>> {
        self.block.try_lock_for(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(100);

    #[test]
    fn starts_without_data() {
        let state = SharedState::new();

        assert_eq!(state.snapshot(TIMEOUT), Ok(Snapshot::default()));
        assert_eq!(state.message(TIMEOUT).unwrap().as_str(), "");
    }

    #[test]
    fn fields_are_updated_independently() {
        let state = SharedState::new();
        let reading = ClimateReading {
            temperature_celsius: 22.5,
            humidity_percent: 48.0,
        };

        state.publish_climate(reading, TIMEOUT).unwrap();
        state.publish_gas(GasLevel(300), TIMEOUT).unwrap();
        state.publish_gas(GasLevel(310), TIMEOUT).unwrap();

        assert_eq!(
            state.snapshot(TIMEOUT),
            Ok(Snapshot {
                climate: Some(reading),
                gas: Some(GasLevel(310)),
            })
        );
    }

    #[test]
    fn accessors_time_out_while_held() {
        let state = SharedState::new();
        let short = Duration::from_millis(5);
        let guard = state.hold(short).unwrap();

        assert!(state.publish_gas(GasLevel(1), short).is_err());
        assert!(state.snapshot(short).is_err());
        assert!(state.store_message(&bounded_message("x"), short).is_err());

        drop(guard);
        assert_eq!(state.snapshot(short).unwrap().gas, None);
    }

    #[test]
    fn message_is_truncated_at_char_boundary() {
        let long = "é".repeat(200);
        let message = bounded_message(&long);

        assert!(message.len() <= MESSAGE_CAPACITY);
        assert_eq!(message.len(), 254);
        assert!(message.chars().all(|c| c == 'é'));
    }

    #[test]
    fn short_message_is_copied_verbatim() {
        let state = SharedState::new();
        let message = bounded_message("Temp: 1.00, Hum: 2.00, Air Quality: 3");

        state.store_message(&message, TIMEOUT).unwrap();
        assert_eq!(state.message(TIMEOUT).unwrap(), message);
    }
}
