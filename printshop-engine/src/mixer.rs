//! The shared output bus: every voice is summed here, through one master gain.
//!
//! The mixer is a [`Generator`]; backends wrap it in an [`Engine`](crate::graph::Engine)
//! and feed it [`MixerCommand`]s from the control side. Voice storage is
//! reserved up front, so starting a voice never grows a vector on the audio
//! thread. On a full bus the one-shot ending soonest is replaced; an open-ended
//! drone goes only when nothing else is left.
//!
//! Voices leaving the bus are parked in a preallocated list. The owner collects
//! them with [`Mixer::hand_off_retired`] and frees them off the audio thread.

use printshop_core::envelopes::SlewLimiter;
use printshop_core::filters::DcBlock;

use crate::graph::Generator;
use crate::voice::{Voice, VoiceId};

/// Default master level of the effects bus.
pub const MASTER_GAIN: f32 = 0.3;

/// Default number of simultaneous voices.
pub const DEFAULT_VOICE_CAPACITY: usize = 64;

const MASTER_SMOOTH_MS: f32 = 20.0;
const DC_CUT_HZ: f32 = 10.0;

/// Control messages for the mixer.
#[derive(Debug)]
pub enum MixerCommand {
    Start(Box<Voice>),
    /// Fade voice `id` to silence over `fade` seconds from context time `at`, then stop it.
    Release { id: VoiceId, at: f64, fade: f32 },
    MasterGain(f32),
    /// Drop every voice immediately.
    Clear,
}

#[derive(Debug)]
pub struct Mixer {
    sr: f32,
    voices: Vec<Box<Voice>>,
    retired: Vec<Box<Voice>>,
    capacity: usize,
    master_target: f32,
    master: SlewLimiter,
    dc: DcBlock,
}

impl Mixer {
    pub fn new(sr: f32) -> Self {
        Self::with_capacity(sr, DEFAULT_VOICE_CAPACITY)
    }

    pub fn with_capacity(sr: f32, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut master = SlewLimiter::new(MASTER_SMOOTH_MS, sr);
        master.reset(MASTER_GAIN);
        Self {
            sr,
            voices: Vec::with_capacity(capacity),
            retired: Vec::with_capacity(2 * capacity),
            capacity,
            master_target: MASTER_GAIN,
            master,
            dc: DcBlock::new(DC_CUT_HZ, sr),
        }
    }

    pub fn apply(&mut self, cmd: MixerCommand) {
        match cmd {
            MixerCommand::Start(voice) => self.start(voice),
            MixerCommand::Release { id, at, fade } => {
                if let Some(v) = self.voices.iter_mut().find(|v| v.id() == id) {
                    v.release(at, fade);
                }
            }
            MixerCommand::MasterGain(g) => self.master_target = g.max(0.0),
            MixerCommand::Clear => {
                while let Some(v) = self.voices.pop() {
                    self.retire(v);
                }
            }
        }
    }

    fn start(&mut self, voice: Box<Voice>) {
        if self.voices.len() < self.capacity {
            self.voices.push(voice);
            return;
        }
        if let Some(idx) = self.victim() {
            let old = core::mem::replace(&mut self.voices[idx], voice);
            self.retire(old);
        }
    }

    /// Voice to replace on a full bus: the one-shot that ends soonest, or the
    /// oldest voice when only open-ended ones are left.
    fn victim(&self) -> Option<usize> {
        let ending_soonest = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_open_ended())
            .min_by(|a, b| a.1.stop().total_cmp(&b.1.stop()));
        let oldest = || self.voices.iter().enumerate().min_by(|a, b| a.1.start().total_cmp(&b.1.start()));
        ending_soonest.or_else(oldest).map(|(idx, _)| idx)
    }

    /// Park a voice that left the bus. Past the reserved space it is dropped
    /// in place.
    #[inline]
    fn retire(&mut self, voice: Box<Voice>) {
        if self.retired.len() < self.retired.capacity() {
            self.retired.push(voice);
        }
    }

    /// Pass parked voices to `send` until it refuses one; the refused voice
    /// stays parked for the next call.
    pub fn hand_off_retired(&mut self, mut send: impl FnMut(Box<Voice>) -> Result<(), Box<Voice>>) {
        while let Some(v) = self.retired.pop() {
            if let Err(v) = send(v) {
                self.retired.push(v);
                break;
            }
        }
    }

    /// Free parked voices here.
    pub fn drop_retired(&mut self) {
        self.retired.clear();
    }

    #[inline] pub fn active_voices(&self) -> usize { self.voices.len() }
    #[inline] pub fn retired_voices(&self) -> usize { self.retired.len() }
    #[inline] pub fn master_gain(&self) -> f32 { self.master_target }

    /// Voice `id`, if it is still on the bus.
    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id() == id).map(|v| &**v)
    }
}

impl Generator for Mixer {
    fn reset(&mut self, sr: f32) {
        self.sr = sr.max(1.0);
        self.master.set_time_ms(MASTER_SMOOTH_MS, self.sr);
        self.dc.set_sample_rate(self.sr);
    }

    #[inline]
    fn next(&mut self, t: f64) -> f32 {
        let mut sum = 0.0;
        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].is_finished(t) {
                let done = self.voices.swap_remove(i);
                self.retire(done);
                continue;
            }
            sum += self.voices[i].next(t);
            i += 1;
        }
        let g = self.master.process(self.master_target);
        (self.dc.process(sum) * g).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Wave;
    use crate::voice::{Branch, Source};
    use printshop_core::envelopes::Automation;

    fn tone(id: u64, start: f64, dur: f64) -> Box<Voice> {
        Box::new(
            Voice::new("tone", 1000.0)
                .with_branch(Branch::new(Source::osc(Wave::Square, 50.0)))
                .with_gain(Automation::constant(0.5))
                .lasting(dur)
                .scheduled(VoiceId(id), start),
        )
    }

    #[test]
    fn finished_voices_leave_the_bus() {
        let mut m = Mixer::new(1000.0);
        m.apply(MixerCommand::Start(tone(1, 0.0, 0.01)));
        m.apply(MixerCommand::Start(tone(2, 0.0, 1.0)));
        for i in 0..20 {
            m.next(f64::from(i) / 1000.0);
        }
        assert_eq!(m.active_voices(), 1);
        assert!(m.voice(VoiceId(2)).is_some());
    }

    #[test]
    fn release_targets_the_right_voice() {
        let mut m = Mixer::new(1000.0);
        m.apply(MixerCommand::Start(tone(1, 0.0, f64::INFINITY)));
        m.apply(MixerCommand::Start(tone(2, 0.0, f64::INFINITY)));
        m.apply(MixerCommand::Release { id: VoiceId(1), at: 0.5, fade: 1.0 });
        assert!((m.voice(VoiceId(1)).map(Voice::stop).unwrap() - 1.5).abs() < 1e-9);
        assert!(m.voice(VoiceId(2)).unwrap().is_open_ended());
    }

    #[test]
    fn full_bus_replaces_the_voice_ending_first() {
        let mut m = Mixer::with_capacity(1000.0, 2);
        m.apply(MixerCommand::Start(tone(1, 0.0, 10.0)));
        m.apply(MixerCommand::Start(tone(2, 1.0, 5.0)));
        m.apply(MixerCommand::Start(tone(3, 2.0, 10.0)));
        assert_eq!(m.active_voices(), 2);
        assert!(m.voice(VoiceId(2)).is_none());
        assert!(m.voice(VoiceId(1)).is_some());
        assert!(m.voice(VoiceId(3)).is_some());
        assert_eq!(m.retired_voices(), 1);
    }

    #[test]
    fn drone_survives_a_full_bus() {
        let mut m = Mixer::with_capacity(1000.0, 2);
        m.apply(MixerCommand::Start(tone(1, 0.0, f64::INFINITY)));
        for id in 2..10 {
            m.apply(MixerCommand::Start(tone(id, f64::from(id as u32), 1.0)));
        }
        assert!(m.voice(VoiceId(1)).is_some());
        assert!(m.voice(VoiceId(9)).is_some());
    }

    #[test]
    fn only_drones_left_means_the_oldest_goes() {
        let mut m = Mixer::with_capacity(1000.0, 2);
        m.apply(MixerCommand::Start(tone(1, 0.0, f64::INFINITY)));
        m.apply(MixerCommand::Start(tone(2, 1.0, f64::INFINITY)));
        m.apply(MixerCommand::Start(tone(3, 2.0, 1.0)));
        assert!(m.voice(VoiceId(1)).is_none());
        assert!(m.voice(VoiceId(2)).is_some());
    }

    #[test]
    fn finished_voices_are_handed_back_not_freed() {
        let mut m = Mixer::new(1000.0);
        m.apply(MixerCommand::Start(tone(1, 0.0, 0.01)));
        m.apply(MixerCommand::Start(tone(2, 0.0, 0.01)));
        for i in 0..20 {
            m.next(f64::from(i) / 1000.0);
        }
        assert_eq!(m.active_voices(), 0);
        assert_eq!(m.retired_voices(), 2);

        // a receiver with room for one
        let mut back = Vec::new();
        m.hand_off_retired(|v| if back.is_empty() { back.push(v); Ok(()) } else { Err(v) });
        assert_eq!(back.len(), 1);
        assert_eq!(m.retired_voices(), 1);
        m.drop_retired();
        assert_eq!(m.retired_voices(), 0);
    }

    #[test]
    fn output_is_bounded_and_scaled_by_master() {
        let mut m = Mixer::new(1000.0);
        for id in 0..10 {
            m.apply(MixerCommand::Start(tone(id, 0.0, 1.0)));
        }
        let peak = (0..1000).map(|i| m.next(f64::from(i) / 1000.0).abs()).fold(0.0f32, f32::max);
        assert!(peak <= 1.0);
        m.apply(MixerCommand::Clear);
        assert_eq!(m.active_voices(), 0);
        assert_eq!(m.retired_voices(), 10);
    }
}
