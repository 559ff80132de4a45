//! printshop engine: voices, mixer, audio backends and the sound effect synthesizer.
//!
//! Crate layout:
//! - [`graph`]   : `Generator` trait and `Engine<G>` sample clock
//! - [`nodes`]   : oscillators, LFO, noise buffers
//! - [`voice`]   : one scheduled sound (sources → filters → gain envelope)
//! - [`mixer`]   : the master bus every voice is summed into
//! - [`backend`] : audio hosts/contexts (cpal, offline, null, recording)
//! - [`patches`] : the sound effects, as voice builders
//! - [`synth`]   : `Synthesizer`, the fire-and-forget service the scene calls
//!
//! Voices are built on the control thread and handed to the audio side
//! whole; the audio callback never allocates a voice.

pub mod backend;
pub mod error;
pub mod graph;
pub mod mixer;
pub mod nodes;
pub mod patches;
pub mod synth;
pub mod voice;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use backend::{AudioContext, AudioHost, ContextState, NullHost, OfflineHost, OfflineTap, Recorder, RecordingHost, RecordingOptions};
#[cfg(feature = "realtime")]
pub use backend::{list_output_devices, CpalHost};
pub use error::{AudioError, AudioResult};
pub use graph::{Engine, Generator};
pub use mixer::{Mixer, MixerCommand, MASTER_GAIN};
pub use synth::{Synthesizer, DEFAULT_PRINTING_SECONDS, MIN_PRINTING_SECONDS};
pub use voice::{Voice, VoiceId};
