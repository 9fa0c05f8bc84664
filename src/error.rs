use thiserror::Error;

/// Errors surfaced at the edges of the simulator: configuration loading and
/// CLI wiring. The event loop itself has no unrecoverable error path --
/// resource contention is handled by retry, and an unknown acuity at
/// disposition is a guard-rail, not a propagated error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
