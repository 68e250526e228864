use esp_idf_svc::hal::cpu::Core;
use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;

use climate_telemetry_common::supervisor::TaskBody;
use climate_telemetry_common::{AgentError, TaskSpawner, TaskSpec};

/// Spawns std threads as FreeRTOS tasks with the priority, core and stack of their spec.
pub struct FreeRtosSpawner;

impl FreeRtosSpawner {
    fn configure(spec: &TaskSpec) -> Result<(), AgentError> {
        // FreeRTOS keeps a pointer to the task name; tasks are spawned once at startup.
        let name: &'static [u8] = Box::leak(format!("{}\0", spec.name).into_bytes().into_boxed_slice());

        let pin_to_core = match spec.core {
            Some(0) => Some(Core::Core0),
            Some(1) => Some(Core::Core1),
            Some(core) => {
                log::warn!("{}: no core {}, leaving it unpinned", spec.name, core);
                None
            }
            None => None,
        };

        ThreadSpawnConfiguration {
            name: Some(name),
            stack_size: spec.stack_size,
            priority: spec.priority,
            pin_to_core,
            ..Default::default()
        }
        .set()
        .map_err(|e| AgentError::Spawn {
            name: spec.name.clone(),
            source: std::io::Error::other(e),
        })
    }
}

impl TaskSpawner for FreeRtosSpawner {
    fn spawn(&self, spec: &TaskSpec, body: TaskBody) -> Result<(), AgentError> {
        Self::configure(spec)?;

        let spawned = std::thread::Builder::new()
            .stack_size(spec.stack_size)
            .spawn(body)
            .map(drop)
            .map_err(|source| AgentError::Spawn {
                name: spec.name.clone(),
                source,
            });

        // Later threads (and the idle main thread) go back to the defaults.
        if let Err(e) = ThreadSpawnConfiguration::default().set() {
            log::warn!("Failed to reset thread spawn configuration: {}", e);
        }

        spawned
    }
}
