//! One-time startup: create the shared state and launch the periodic tasks.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::publisher::TelemetryPublisher;
use crate::sampler::{ClimateSampler, GasSampler};
use crate::schedule::{run_periodic, MonotonicClock, PeriodicTask, Schedule};
use crate::sensor::{AnalogInput, ClimateSensor};
use crate::sink::TelemetrySink;
use crate::state::SharedState;

/// How a periodic task is scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub period_ms: u64,

    /// Higher runs first. Only honoured by spawners that control priorities.
    pub priority: u8,

    /// Core to pin the task to, if the platform supports pinning.
    pub core: Option<u8>,

    /// Stack size in bytes for platforms with fixed task stacks.
    pub stack_size: usize,
}

impl TaskSpec {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Boxed body of a task; it never returns in practice.
pub type TaskBody = Box<dyn FnOnce() + Send + 'static>;

/// Creates an independently scheduled thread of execution.
///
/// To be implemented for each platform.
pub trait TaskSpawner {
    fn spawn(&self, spec: &TaskSpec, body: TaskBody) -> Result<(), AgentError>;
}

/// Spawns plain named std threads.
///
/// Priority, core and stack size are embedded scheduling hints and are left to
/// the host OS.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdSpawner;

impl TaskSpawner for StdSpawner {
    fn spawn(&self, spec: &TaskSpec, body: TaskBody) -> Result<(), AgentError> {
        log::debug!(
            "Spawning {} (priority {}, core {:?} ignored on host)",
            spec.name,
            spec.priority,
            spec.core
        );

        std::thread::Builder::new()
            .name(spec.name.clone())
            .spawn(body)
            .map(drop)
            .map_err(|source| AgentError::Spawn {
                name: spec.name.clone(),
                source,
            })
    }
}

fn spawn_periodic<T, P>(spawner: &P, spec: &TaskSpec, task: T) -> Result<(), AgentError>
where
    T: PeriodicTask + 'static,
    P: TaskSpawner + ?Sized,
{
    let period = spec.period();
    spawner.spawn(
        spec,
        Box::new(move || {
            run_periodic(task, Schedule::new(MonotonicClock, period));
        }),
    )?;

    log::info!("Started {} every {:?}", spec.name, period);
    Ok(())
}

/// The running agent. Holds the shared state the tasks were launched with.
pub struct Agent {
    state: Arc<SharedState>,
}

impl Agent {
    /// Creates the shared state and launches the two samplers and the publisher.
    ///
    /// Startup stops at the first failure and returns it; tasks that were
    /// already launched keep running.
    pub fn launch<S, A, K, P>(
        config: &AgentConfig,
        climate_sensor: S,
        gas_input: A,
        sink: K,
        spawner: &P,
    ) -> Result<Self, AgentError>
    where
        S: ClimateSensor + 'static,
        A: AnalogInput + 'static,
        K: TelemetrySink + 'static,
        P: TaskSpawner + ?Sized,
    {
        config.validate()?;

        let state = Arc::new(SharedState::new());
        let lock_timeout = config.lock_timeout();

        spawn_periodic(
            spawner,
            &config.climate_task,
            ClimateSampler::new(climate_sensor, state.clone(), lock_timeout),
        )?;
        spawn_periodic(
            spawner,
            &config.gas_task,
            GasSampler::new(gas_input, config.gas_channel, state.clone(), lock_timeout),
        )?;
        spawn_periodic(
            spawner,
            &config.publisher_task,
            TelemetryPublisher::new(sink, state.clone(), lock_timeout),
        )?;

        Ok(Self { state })
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Parks the calling thread for good; all work happens in the tasks.
    pub fn idle(&self) -> ! {
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records the specs it is asked to spawn and fails on the n-th one.
    struct RecordingSpawner {
        spawned: RefCell<Vec<TaskSpec>>,
        fail_at: Option<usize>,
    }

    impl RecordingSpawner {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                spawned: RefCell::new(Vec::new()),
                fail_at,
            }
        }
    }

    impl TaskSpawner for RecordingSpawner {
        fn spawn(&self, spec: &TaskSpec, _body: TaskBody) -> Result<(), AgentError> {
            if self.fail_at == Some(self.spawned.borrow().len()) {
                return Err(AgentError::Spawn {
                    name: spec.name.clone(),
                    source: std::io::Error::other("out of task slots"),
                });
            }
            self.spawned.borrow_mut().push(spec.clone());
            Ok(())
        }
    }

    struct Quiet;

    impl ClimateSensor for Quiet {
        fn read_humidity(&mut self) -> f32 {
            f32::NAN
        }

        fn read_temperature(&mut self) -> f32 {
            f32::NAN
        }
    }

    impl AnalogInput for Quiet {
        fn read_raw(&mut self, _channel: u8) -> Option<u16> {
            None
        }
    }

    impl TelemetrySink for Quiet {
        fn maintain(&mut self) {}

        fn set_outbound_message(&mut self, _message: &str) {}
    }

    #[test]
    fn launches_three_tasks_in_order() {
        let spawner = RecordingSpawner::new(None);
        let config = AgentConfig::default();

        Agent::launch(&config, Quiet, Quiet, Quiet, &spawner).unwrap();

        let names: Vec<_> = spawner
            .spawned
            .borrow()
            .iter()
            .map(|spec| spec.name.clone())
            .collect();
        assert_eq!(
            names,
            ["climate_sampler", "gas_sampler", "telemetry_publisher"]
        );
    }

    #[test]
    fn stops_at_first_spawn_failure() {
        let spawner = RecordingSpawner::new(Some(1));

        let result = Agent::launch(&AgentConfig::default(), Quiet, Quiet, Quiet, &spawner);

        assert!(matches!(result, Err(AgentError::Spawn { ref name, .. }) if name == "gas_sampler"));
        assert_eq!(spawner.spawned.borrow().len(), 1);
    }

    #[test]
    fn invalid_config_launches_nothing() {
        let spawner = RecordingSpawner::new(None);
        let config = AgentConfig {
            lock_timeout_ms: 0,
            ..Default::default()
        };

        assert!(Agent::launch(&config, Quiet, Quiet, Quiet, &spawner).is_err());
        assert!(spawner.spawned.borrow().is_empty());
    }
}
