//! The sound effect service used by the scene.
//!
//! Every `play_*` call is fire-and-forget: it builds a fresh voice from a
//! patch and schedules it on the audio context. Nothing is reported back; when
//! audio is unavailable, muted or disposed the call simply does nothing.
//!
//! The context is opened lazily on the first call that actually wants to make
//! a sound, and resumed if the host hands it out suspended.

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, warn};

use crate::backend::{AudioContext, AudioHost, ContextState, NullHost};
use crate::mixer::MASTER_GAIN;
use crate::patches;
use crate::voice::{Voice, VoiceId};

/// Shortest printing sound worth scheduling, seconds.
pub const MIN_PRINTING_SECONDS: f64 = 0.5;

/// Printing sound length when the caller has no better idea, seconds.
pub const DEFAULT_PRINTING_SECONDS: f64 = 3.0;

pub struct Synthesizer {
    host: Box<dyn AudioHost>,
    ctx: Option<Box<dyn AudioContext>>,
    master_gain: f32,
    muted: bool,
    active: bool,
    warned: bool,
    ambient: Option<VoiceId>,
    next_id: u64,
    rng: StdRng,
}

impl Synthesizer {
    pub fn new(host: Box<dyn AudioHost>) -> Self {
        Self {
            host,
            ctx: None,
            master_gain: MASTER_GAIN,
            muted: false,
            active: true,
            warned: false,
            ambient: None,
            next_id: 1,
            rng: StdRng::from_entropy(),
        }
    }

    /// A synthesizer that never makes a sound.
    pub fn silent() -> Self {
        Self::new(Box::new(NullHost))
    }

    /// Realtime output on the default device.
    #[cfg(feature = "realtime")]
    pub fn system() -> Self {
        Self::new(Box::new(crate::backend::CpalHost::new()))
    }

    /// Seed the noise generator, for reproducible renders.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn play_footstep(&mut self) {
        self.schedule(0.0, |sr, rng| patches::footstep(sr, rng));
    }

    pub fn play_whoosh(&mut self) {
        self.schedule(0.0, |sr, _| patches::whoosh(sr));
    }

    /// Machine hum lasting `seconds`. Non-finite or too short values fall
    /// back to [`MIN_PRINTING_SECONDS`].
    pub fn play_printing(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() && seconds >= MIN_PRINTING_SECONDS {
            seconds
        } else {
            MIN_PRINTING_SECONDS
        };
        self.schedule(0.0, |sr, _| patches::printing(sr, seconds));
    }

    /// Three rising notes.
    pub fn play_success(&mut self) {
        for (i, hz) in patches::CHIME_NOTES_HZ.into_iter().enumerate() {
            let offset = patches::CHIME_STAGGER_SECONDS * i as f64;
            self.schedule(offset, |sr, _| patches::chime_note(sr, hz));
        }
    }

    pub fn play_click(&mut self) {
        self.schedule(0.0, |sr, _| patches::click(sr));
    }

    /// Start the background drone. Does nothing if one is already playing.
    pub fn play_ambient(&mut self) {
        if self.ambient.is_some() {
            return;
        }
        self.ambient = self.schedule(0.0, |sr, _| patches::ambient(sr));
    }

    /// Fade the drone out. Does nothing if none is playing.
    pub fn stop_ambient(&mut self) {
        let Some(id) = self.ambient.take() else { return };
        let Some(ctx) = self.ctx.as_mut() else { return };
        let at = ctx.current_time();
        match ctx.release_voice(id, at, patches::AMBIENT_FADE_SECONDS) {
            Ok(()) => debug!(voice = id.0, at, "ambient released"),
            Err(e) => debug!(voice = id.0, error = %e, "ambient release dropped"),
        }
    }

    /// Muting also stops the drone. Voices already playing finish normally.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_ambient();
        }
    }

    #[inline] pub fn is_muted(&self) -> bool { self.muted }
    #[inline] pub fn is_active(&self) -> bool { self.active }
    #[inline] pub fn has_ambient(&self) -> bool { self.ambient.is_some() }
    #[inline] pub fn master_gain(&self) -> f32 { self.master_gain }

    /// Change the shared output level. Applies to the open context, if any,
    /// and to any context opened later.
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain.max(0.0);
        if let Some(ctx) = self.ctx.as_mut() {
            if let Err(e) = ctx.set_master_gain(self.master_gain) {
                debug!(error = %e, "master gain change dropped");
            }
        }
    }

    /// Stop the drone and close the context. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if !self.active {
            return;
        }
        self.stop_ambient();
        if let Some(mut ctx) = self.ctx.take() {
            ctx.close();
        }
        self.active = false;
        debug!(host = self.host.name(), "synthesizer disposed");
    }

    /// Open and wake the context if needed. `false` means: make no sound.
    fn ensure_running(&mut self) -> bool {
        if !self.active || self.muted {
            return false;
        }
        if self.ctx.is_none() {
            match self.host.open() {
                Ok(mut ctx) => {
                    if let Err(e) = ctx.set_master_gain(self.master_gain) {
                        debug!(error = %e, "initial master gain dropped");
                    }
                    debug!(host = self.host.name(), sample_rate = ctx.sample_rate(), "audio context created");
                    self.ctx = Some(ctx);
                }
                Err(e) => {
                    if !self.warned {
                        warn!(host = self.host.name(), error = %e, "audio not supported, sound effects disabled");
                        self.warned = true;
                    }
                    return false;
                }
            }
        }
        let Some(ctx) = self.ctx.as_mut() else { return false };
        match ctx.state() {
            ContextState::Running => true,
            ContextState::Suspended => match ctx.resume() {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "audio context resume failed, effect skipped");
                    false
                }
            },
            ContextState::Closed => {
                // closed underneath us; reopen on the next call
                self.ctx = None;
                false
            }
        }
    }

    fn schedule(&mut self, offset: f64, build: impl FnOnce(f32, &mut StdRng) -> Voice) -> Option<VoiceId> {
        if !self.ensure_running() {
            return None;
        }
        let ctx = self.ctx.as_mut()?;
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        let start = ctx.current_time() + offset;
        let voice = build(ctx.sample_rate(), &mut self.rng).scheduled(id, start);
        let label = voice.label();
        let stop = voice.stop();
        match ctx.start_voice(voice) {
            Ok(()) => {
                debug!(voice = id.0, label, start, stop, "voice scheduled");
                Some(id)
            }
            Err(e) => {
                debug!(voice = id.0, label, error = %e, "voice dropped");
                None
            }
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::silent()
    }
}

impl Drop for Synthesizer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Recorder, RecordingHost, RecordingOptions};

    fn recording(options: RecordingOptions) -> (Synthesizer, Recorder) {
        let (host, rec) = RecordingHost::new(options);
        (Synthesizer::new(Box::new(host)).with_seed(3), rec)
    }

    #[test]
    fn context_is_opened_lazily_with_master_gain() {
        let (mut s, rec) = recording(RecordingOptions::default());
        assert_eq!(rec.open_attempts(), 0);
        s.play_whoosh();
        s.play_whoosh();
        assert_eq!(rec.opens(), 1);
        assert_eq!(rec.master_gain(), Some(MASTER_GAIN));
        assert_eq!(rec.voices().len(), 2);
    }

    #[test]
    fn printing_duration_is_clamped() {
        let (mut s, rec) = recording(RecordingOptions::default());
        s.play_printing(f64::NAN);
        s.play_printing(0.1);
        s.play_printing(2.0);
        let d: Vec<f64> = rec.voices().iter().map(|v| v.stop - v.start).collect();
        assert_eq!(d, vec![0.5, 0.5, 2.0]);
    }

    #[test]
    fn success_notes_are_staggered() {
        let (mut s, rec) = recording(RecordingOptions::default());
        rec.advance(2.0);
        s.play_success();
        let starts: Vec<f64> = rec.voices().iter().map(|v| v.start).collect();
        assert_eq!(starts.len(), 3);
        assert!((starts[1] - 2.1).abs() < 1e-9 && (starts[2] - 2.2).abs() < 1e-9);
        assert!(rec.voices().iter().all(|v| (v.stop - v.start - 0.6).abs() < 1e-6));
    }

    #[test]
    fn suspended_context_is_resumed() {
        let (mut s, rec) = recording(RecordingOptions { start_suspended: true, ..Default::default() });
        s.play_click();
        assert_eq!(rec.resumes(), 1);
        assert_eq!(rec.voices().len(), 1);
    }

    #[test]
    fn failed_resume_skips_the_effect() {
        let (mut s, rec) = recording(RecordingOptions { start_suspended: true, resume_fails: true, ..Default::default() });
        s.play_click();
        s.play_click();
        assert_eq!(rec.resumes(), 2);
        assert!(rec.voices().is_empty());
    }

    #[test]
    fn unavailable_audio_is_a_silent_no_op() {
        let (mut s, rec) = recording(RecordingOptions { unavailable: true, ..Default::default() });
        s.play_footstep();
        s.play_ambient();
        s.stop_ambient();
        s.dispose();
        assert_eq!(rec.open_attempts(), 2);
        assert!(rec.voices().is_empty());
    }

    #[test]
    fn ambient_is_a_singleton_and_fades_on_stop() {
        let (mut s, rec) = recording(RecordingOptions::default());
        s.play_ambient();
        s.play_ambient();
        assert_eq!(rec.voices_labelled("ambient").len(), 1);
        rec.advance(5.0);
        s.stop_ambient();
        s.stop_ambient();
        let amb = &rec.voices_labelled("ambient")[0];
        assert_eq!(amb.stop, 6.0);
        assert_eq!(rec.releases().len(), 1);
        assert!(!s.has_ambient());
    }

    #[test]
    fn dispose_closes_once_and_silences() {
        let (mut s, rec) = recording(RecordingOptions::default());
        s.play_ambient();
        s.dispose();
        s.dispose();
        s.play_whoosh();
        assert_eq!(rec.closes(), 1);
        assert_eq!(rec.releases().len(), 1);
        assert_eq!(rec.voices().len(), 1);
        drop(s);
        assert_eq!(rec.closes(), 1);
    }
}
