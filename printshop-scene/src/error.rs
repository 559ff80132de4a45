//! Errors raised while loading or validating timeline configuration.

use std::path::PathBuf;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    #[error("invalid duration for {phase}: {value} (must be finite and > 0)")]
    InvalidDuration { phase: String, value: f32 },

    #[error("invalid {name}: {value} (must be finite and > 0)")]
    InvalidValue { name: &'static str, value: f32 },

    #[error("item catalog is empty")]
    EmptyCatalog,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("timing config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
