//! Offline rendering: the mixer runs on the caller's thread and the clock only
//! moves when the [`OfflineTap`] pulls samples.

use std::cell::RefCell;
use std::rc::Rc;

use super::{AudioContext, AudioHost, ContextState};
use crate::error::{AudioError, AudioResult};
use crate::graph::Engine;
use crate::mixer::{Mixer, MixerCommand};
use crate::voice::{Voice, VoiceId};

type Bus = Rc<RefCell<Engine<Mixer>>>;

/// Host whose contexts all feed one in-memory bus.
#[derive(Clone)]
pub struct OfflineHost {
    bus: Bus,
}

/// Pulls rendered audio out of the bus shared with an [`OfflineHost`].
#[derive(Clone)]
pub struct OfflineTap {
    bus: Bus,
}

impl OfflineHost {
    /// Create a host rendering at `sr` and the tap that drives its clock.
    pub fn new(sr: f32) -> (Self, OfflineTap) {
        let bus = Rc::new(RefCell::new(Engine::new(Mixer::new(sr), sr)));
        (Self { bus: Rc::clone(&bus) }, OfflineTap { bus })
    }
}

impl AudioHost for OfflineHost {
    fn name(&self) -> &str {
        "offline"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioContext>> {
        Ok(Box::new(OfflineContext { bus: Rc::clone(&self.bus), state: ContextState::Running }))
    }
}

impl OfflineTap {
    /// Render `out.len()` mono samples.
    pub fn render(&self, out: &mut [f32]) {
        let mut bus = self.bus.borrow_mut();
        bus.render_mono(out);
        bus.generator_mut().drop_retired();
    }

    /// Render the next `seconds` of audio as mono samples.
    pub fn render_seconds(&self, seconds: f64) -> Vec<f32> {
        let frames = (seconds.max(0.0) * f64::from(self.sample_rate())).round() as usize;
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    /// Current clock position in seconds.
    pub fn time(&self) -> f64 {
        self.bus.borrow().time()
    }

    pub fn sample_rate(&self) -> f32 {
        self.bus.borrow().sample_rate()
    }

    pub fn active_voices(&self) -> usize {
        self.bus.borrow().generator().active_voices()
    }
}

pub struct OfflineContext {
    bus: Bus,
    state: ContextState,
}

impl OfflineContext {
    fn send(&mut self, cmd: MixerCommand) -> AudioResult<()> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        let mut bus = self.bus.borrow_mut();
        let mixer = bus.generator_mut();
        mixer.apply(cmd);
        mixer.drop_retired();
        Ok(())
    }
}

impl AudioContext for OfflineContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> AudioResult<()> {
        match self.state {
            ContextState::Closed => Err(AudioError::Closed),
            _ => {
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn current_time(&self) -> f64 {
        self.bus.borrow().time()
    }

    fn sample_rate(&self) -> f32 {
        self.bus.borrow().sample_rate()
    }

    fn set_master_gain(&mut self, gain: f32) -> AudioResult<()> {
        self.send(MixerCommand::MasterGain(gain))
    }

    fn start_voice(&mut self, voice: Voice) -> AudioResult<()> {
        self.send(MixerCommand::Start(Box::new(voice)))
    }

    fn release_voice(&mut self, id: VoiceId, at: f64, fade: f32) -> AudioResult<()> {
        self.send(MixerCommand::Release { id, at, fade })
    }

    fn close(&mut self) {
        if self.state != ContextState::Closed {
            let mut bus = self.bus.borrow_mut();
            bus.generator_mut().apply(MixerCommand::Clear);
            bus.generator_mut().drop_retired();
            self.state = ContextState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Wave;
    use crate::voice::{Branch, Source};
    use printshop_core::envelopes::Automation;

    #[test]
    fn tap_drives_the_context_clock() {
        let (host, tap) = OfflineHost::new(1000.0);
        let ctx = host.open().unwrap();
        assert_eq!(ctx.current_time(), 0.0);
        let buf = tap.render_seconds(0.25);
        assert_eq!(buf.len(), 250);
        assert!((ctx.current_time() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn scheduled_voice_sounds_then_leaves() {
        let (host, tap) = OfflineHost::new(1000.0);
        let mut ctx = host.open().unwrap();
        let v = Voice::new("tone", 1000.0)
            .with_branch(Branch::new(Source::osc(Wave::Sine, 100.0)))
            .with_gain(Automation::constant(1.0))
            .lasting(0.1)
            .scheduled(VoiceId(1), 0.05);
        ctx.start_voice(v).unwrap();
        let buf = tap.render_seconds(0.2);
        assert!(buf[..50].iter().all(|s| s.abs() < 1e-6));
        assert!(buf[50..150].iter().any(|s| s.abs() > 0.05));
        assert_eq!(tap.active_voices(), 0);
    }

    #[test]
    fn closed_context_refuses_work() {
        let (host, _tap) = OfflineHost::new(1000.0);
        let mut ctx = host.open().unwrap();
        ctx.close();
        ctx.close();
        assert_eq!(ctx.state(), ContextState::Closed);
        assert_eq!(ctx.set_master_gain(0.5), Err(AudioError::Closed));
        assert_eq!(ctx.resume(), Err(AudioError::Closed));
    }
}
