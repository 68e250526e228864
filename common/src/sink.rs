/// The remote telemetry transport.
///
/// To be implemented for each platform. The sink decides on its own when the
/// latest outbound message actually goes out; the publisher only keeps it
/// serviced and up to date.
pub trait TelemetrySink: Send {
    /// Periodic upkeep, called once per publisher cycle whether or not there is new data.
    fn maintain(&mut self);

    /// Replaces the message the sink transmits next.
    fn set_outbound_message(&mut self, message: &str);
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for Box<S> {
    fn maintain(&mut self) {
        (**self).maintain()
    }

    fn set_outbound_message(&mut self, message: &str) {
        (**self).set_outbound_message(message)
    }
}
