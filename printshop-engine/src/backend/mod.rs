//! Audio hosts and contexts.
//!
//! An [`AudioHost`] knows how to open an [`AudioContext`]: a running clock plus
//! a master bus that voices are scheduled onto. The synthesizer only talks to
//! these traits, so the same patches play through cpal, render offline into a
//! buffer, or get recorded by tests.
//!
//! - [`NullHost`]      : no audio output at all; `open` always fails
//! - [`OfflineHost`]   : renders into memory, pulled by an [`OfflineTap`]
//! - [`RecordingHost`] : records every scheduled voice for inspection
//! - `CpalHost`        : realtime output (feature `realtime`)

mod null;
mod offline;
mod recording;
#[cfg(feature = "realtime")]
mod realtime;

pub use null::NullHost;
pub use offline::{OfflineContext, OfflineHost, OfflineTap};
pub use recording::{RecordedRelease, RecordedVoice, Recorder, RecordingContext, RecordingHost, RecordingOptions};
#[cfg(feature = "realtime")]
pub use realtime::{list_output_devices, CpalContext, CpalHost};

use crate::error::AudioResult;
use crate::voice::{Voice, VoiceId};

/// Lifecycle of an audio context.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// Opened, but the clock is not running. Must be resumed before use.
    Suspended,
    Running,
    Closed,
}

pub trait AudioHost {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Open a new context. Fails when the host has no usable output.
    fn open(&self) -> AudioResult<Box<dyn AudioContext>>;
}

pub trait AudioContext {
    fn state(&self) -> ContextState;

    fn resume(&mut self) -> AudioResult<()>;

    /// Seconds on the context clock. Voices are scheduled relative to this.
    fn current_time(&self) -> f64;

    fn sample_rate(&self) -> f32;

    fn set_master_gain(&mut self, gain: f32) -> AudioResult<()>;

    /// Hand a voice to the bus. Its id and start time must already be set.
    fn start_voice(&mut self, voice: Voice) -> AudioResult<()>;

    /// Fade voice `id` to silence over `fade` seconds starting at `at`, then stop it.
    fn release_voice(&mut self, id: VoiceId, at: f64, fade: f32) -> AudioResult<()>;

    /// Stop all sound and release the output. Idempotent.
    fn close(&mut self);
}
