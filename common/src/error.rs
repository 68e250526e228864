/// Errors that stop the agent from starting.
///
/// Per-cycle conditions (invalid readings, lock timeouts) never surface here;
/// they are handled inside the task that hit them.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Failed to spawn task {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),
}
