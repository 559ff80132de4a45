//! Error type shared by the audio backends.

pub type AudioResult<T> = Result<T, AudioError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The host has no audio output at all (headless box, no permission, ...).
    #[error("audio unavailable: {0}")]
    Unavailable(String),

    #[error("audio output device not found: {0}")]
    DeviceNotFound(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio backend error: {0}")]
    Backend(String),

    /// The command queue to the audio thread is full; the command was dropped.
    #[error("audio command queue is full")]
    QueueFull,

    #[error("audio context is closed")]
    Closed,
}

impl AudioError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(AudioError::unavailable("x").to_string().starts_with("audio unavailable:"));
        assert!(AudioError::backend("x").to_string().starts_with("audio backend error:"));
        assert_eq!(AudioError::Closed.to_string(), "audio context is closed");
    }
}
