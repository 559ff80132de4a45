use super::{AudioContext, AudioHost};
use crate::error::{AudioError, AudioResult};

/// A host without audio output, e.g. a headless machine or `--no-audio`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullHost;

impl AudioHost for NullHost {
    fn name(&self) -> &str {
        "null"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioContext>> {
        Err(AudioError::unavailable("no audio output configured"))
    }
}
