//! Startup configuration of the agent.
//!
//! Values are read once before the tasks are launched and stay fixed for the
//! lifetime of the process.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::supervisor::TaskSpec;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Longest wait for the shared state lock before a cycle skips its access.
    pub lock_timeout_ms: u64,

    /// ADC channel of the air quality sensor.
    pub gas_channel: u8,

    pub climate_task: TaskSpec,
    pub gas_task: TaskSpec,
    pub publisher_task: TaskSpec,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 100,
            // GPIO34 on the ESP32 is ADC1 channel 6.
            gas_channel: 6,
            climate_task: TaskSpec {
                name: "climate_sampler".into(),
                period_ms: 2000,
                priority: 2,
                core: Some(1),
                stack_size: 4096,
            },
            gas_task: TaskSpec {
                name: "gas_sampler".into(),
                period_ms: 3000,
                priority: 2,
                core: Some(1),
                stack_size: 4096,
            },
            publisher_task: TaskSpec {
                name: "telemetry_publisher".into(),
                period_ms: 1000,
                priority: 1,
                core: Some(0),
                stack_size: 8192,
            },
        }
    }
}

impl AgentConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn tasks(&self) -> [&TaskSpec; 3] {
        [&self.climate_task, &self.gas_task, &self.publisher_task]
    }

    /// Parses a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, AgentError> {
        let config = serde_json::from_str::<Self>(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that every task has a period and that a lock wait always fits in a cycle.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.lock_timeout_ms == 0 {
            return Err(AgentError::InvalidConfig(
                "lock_timeout_ms must be greater than zero".into(),
            ));
        }

        for task in self.tasks() {
            if task.name.is_empty() {
                return Err(AgentError::InvalidConfig("task name must not be empty".into()));
            }
            if task.period_ms == 0 {
                return Err(AgentError::InvalidConfig(format!(
                    "{}: period_ms must be greater than zero",
                    task.name
                )));
            }
            if self.lock_timeout_ms >= task.period_ms {
                return Err(AgentError::InvalidConfig(format!(
                    "{}: lock timeout of {} ms does not fit in a period of {} ms",
                    task.name, self.lock_timeout_ms, task.period_ms
                )));
            }
        }

        Ok(())
    }
}
