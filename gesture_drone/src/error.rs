//! Error types for startup and the run loop.

use thiserror::Error;

use crate::config::ConfigError;

/// Failure of the one-shot camera + recognizer setup.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("camera error: {0}")]
    Camera(String),

    #[error("gesture model failed to load: {0}")]
    Model(String),

    #[error("cannot replay {path}: {source}")]
    Replay {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: not a recognizer result: {source}")]
    Recording {
        path:   String,
        line:   usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
