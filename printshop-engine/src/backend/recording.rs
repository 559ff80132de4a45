//! A host that renders nothing and remembers everything.
//!
//! The clock is manual: call [`Recorder::advance`] to move it. Every voice
//! handed to a context is cloned into the log, so tests can check labels,
//! schedule and node counts.

use std::cell::RefCell;
use std::rc::Rc;

use super::{AudioContext, AudioHost, ContextState};
use crate::error::{AudioError, AudioResult};
use crate::voice::{Voice, VoiceId};

const RECORDING_SAMPLE_RATE: f32 = 48_000.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingOptions {
    /// Contexts open in the `Suspended` state.
    pub start_suspended: bool,
    /// `resume` always fails.
    pub resume_fails: bool,
    /// `open` always fails, like a host without audio.
    pub unavailable: bool,
}

#[derive(Clone, Debug)]
pub struct RecordedVoice {
    pub id: VoiceId,
    pub label: &'static str,
    pub start: f64,
    pub stop: f64,
    pub node_count: usize,
    pub voice: Voice,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RecordedRelease {
    pub id: VoiceId,
    pub at: f64,
    pub fade: f32,
}

#[derive(Debug, Default)]
struct Log {
    time: f64,
    opens: usize,
    open_attempts: usize,
    resumes: usize,
    closes: usize,
    master_gain: Option<f32>,
    state: Option<ContextState>,
    voices: Vec<RecordedVoice>,
    releases: Vec<RecordedRelease>,
}

#[derive(Clone)]
pub struct RecordingHost {
    options: RecordingOptions,
    log: Rc<RefCell<Log>>,
}

/// Read side of a [`RecordingHost`].
#[derive(Clone)]
pub struct Recorder {
    log: Rc<RefCell<Log>>,
}

impl RecordingHost {
    pub fn new(options: RecordingOptions) -> (Self, Recorder) {
        let log = Rc::new(RefCell::new(Log::default()));
        (Self { options, log: Rc::clone(&log) }, Recorder { log })
    }
}

impl AudioHost for RecordingHost {
    fn name(&self) -> &str {
        "recording"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioContext>> {
        let mut log = self.log.borrow_mut();
        log.open_attempts += 1;
        if self.options.unavailable {
            return Err(AudioError::unavailable("recording host configured without audio"));
        }
        log.opens += 1;
        let state = if self.options.start_suspended { ContextState::Suspended } else { ContextState::Running };
        log.state = Some(state);
        Ok(Box::new(RecordingContext { options: self.options, log: Rc::clone(&self.log), state }))
    }
}

pub struct RecordingContext {
    options: RecordingOptions,
    log: Rc<RefCell<Log>>,
    state: ContextState,
}

impl RecordingContext {
    fn set_state(&mut self, state: ContextState) {
        self.state = state;
        self.log.borrow_mut().state = Some(state);
    }

    fn check_open(&self) -> AudioResult<()> {
        if self.state == ContextState::Closed { Err(AudioError::Closed) } else { Ok(()) }
    }
}

impl AudioContext for RecordingContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> AudioResult<()> {
        self.check_open()?;
        self.log.borrow_mut().resumes += 1;
        if self.options.resume_fails {
            return Err(AudioError::backend("resume refused"));
        }
        self.set_state(ContextState::Running);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.log.borrow().time
    }

    fn sample_rate(&self) -> f32 {
        RECORDING_SAMPLE_RATE
    }

    fn set_master_gain(&mut self, gain: f32) -> AudioResult<()> {
        self.check_open()?;
        self.log.borrow_mut().master_gain = Some(gain);
        Ok(())
    }

    fn start_voice(&mut self, voice: Voice) -> AudioResult<()> {
        self.check_open()?;
        self.log.borrow_mut().voices.push(RecordedVoice {
            id: voice.id(),
            label: voice.label(),
            start: voice.start(),
            stop: voice.stop(),
            node_count: voice.node_count(),
            voice,
        });
        Ok(())
    }

    fn release_voice(&mut self, id: VoiceId, at: f64, fade: f32) -> AudioResult<()> {
        self.check_open()?;
        let mut log = self.log.borrow_mut();
        log.releases.push(RecordedRelease { id, at, fade });
        if let Some(rec) = log.voices.iter_mut().find(|r| r.id == id) {
            rec.voice.release(at, fade);
            rec.stop = rec.voice.stop();
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.state != ContextState::Closed {
            self.log.borrow_mut().closes += 1;
            self.set_state(ContextState::Closed);
        }
    }
}

impl Recorder {
    /// Move the context clock forward.
    pub fn advance(&self, seconds: f64) {
        self.log.borrow_mut().time += seconds.max(0.0);
    }

    pub fn time(&self) -> f64 { self.log.borrow().time }
    pub fn opens(&self) -> usize { self.log.borrow().opens }
    pub fn open_attempts(&self) -> usize { self.log.borrow().open_attempts }
    pub fn resumes(&self) -> usize { self.log.borrow().resumes }
    pub fn closes(&self) -> usize { self.log.borrow().closes }
    pub fn master_gain(&self) -> Option<f32> { self.log.borrow().master_gain }

    /// State of the most recently opened context.
    pub fn state(&self) -> Option<ContextState> { self.log.borrow().state }

    pub fn voices(&self) -> Vec<RecordedVoice> {
        self.log.borrow().voices.clone()
    }

    pub fn voices_labelled(&self, label: &str) -> Vec<RecordedVoice> {
        self.log.borrow().voices.iter().filter(|v| v.label == label).cloned().collect()
    }

    pub fn releases(&self) -> Vec<RecordedRelease> {
        self.log.borrow().releases.clone()
    }

    /// Total audio nodes created across all voices.
    pub fn nodes_created(&self) -> usize {
        self.log.borrow().voices.iter().map(|v| v.node_count).sum()
    }

    /// Voices whose stop time is still ahead of the clock.
    pub fn sounding(&self) -> usize {
        let log = self.log.borrow();
        log.voices.iter().filter(|v| v.start <= log.time && log.time < v.stop).count()
    }

    pub fn clear(&self) {
        let mut log = self.log.borrow_mut();
        log.voices.clear();
        log.releases.clear();
    }
}
