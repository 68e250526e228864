//! Shared core of the climate telemetry agent.
//!
//! Three periodic tasks (two sensor samplers and a telemetry publisher) share a
//! single [`SharedState`] guarded by a [`BoundedLock`]. Every lock attempt waits
//! for a bounded time and the caller skips its work for that cycle when the lock
//! stays busy, so no task can stall the others.
//!
//! Platform specifics (sensor drivers, the telemetry transport and the way
//! threads are created) are injected through the traits in [`sensor`],
//! [`sink`] and [`supervisor`].

pub mod config;
pub mod error;
pub mod lock;
pub mod publisher;
pub mod sampler;
pub mod schedule;
pub mod sensor;
pub mod sink;
pub mod state;
pub mod supervisor;

pub use config::AgentConfig;
pub use error::AgentError;
pub use lock::{BoundedLock, BoundedLockGuard, LockTimeout};
pub use publisher::{format_summary, TelemetryPublisher};
pub use sampler::{ClimateSampler, GasSampler, SampleError};
pub use schedule::{run_periodic, Clock, MonotonicClock, PeriodicTask, Schedule};
pub use sensor::{AnalogInput, ClimateReading, ClimateSensor, GasLevel};
pub use sink::TelemetrySink;
pub use state::{Message, SharedState, Snapshot, MESSAGE_CAPACITY};
pub use supervisor::{Agent, StdSpawner, TaskSpawner, TaskSpec};
