//! Voices: the ephemeral signal graph behind one sound effect.
//!
//! A voice is one or more branches (source → optional filter) summed into a
//! gain envelope, with a start time on the context clock and a duration after
//! which it stops itself. Voices are built on the control thread (see
//! [`patches`](crate::patches)), handed to an audio context, and dropped by the
//! mixer once finished. They are never restarted.

use printshop_core::envelopes::Automation;
use printshop_core::filters::{SvfMode, SvfTpt};

use crate::nodes::{Lfo, NoiseBuffer, Osc, Wave};

/// Identifier handed out by the synthesizer when a voice is scheduled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

/// Frequency modulation by a sine LFO: `freq + lfo * depth_hz`.
#[derive(Copy, Clone, Debug)]
pub struct Fm {
    lfo: Lfo,
    depth_hz: f32,
}

impl Fm {
    pub fn sine(rate_hz: f32, depth_hz: f32) -> Self {
        Self { lfo: Lfo::sine(rate_hz), depth_hz }
    }

    #[inline] pub fn rate_hz(&self) -> f32 { self.lfo.rate() }
    #[inline] pub fn depth_hz(&self) -> f32 { self.depth_hz }
}

#[derive(Clone, Debug)]
pub enum Source {
    Osc { osc: Osc, freq: Automation, fm: Option<Fm> },
    Noise(NoiseBuffer),
}

impl Source {
    /// Oscillator with a fixed frequency.
    pub fn osc(wave: Wave, hz: f32) -> Self {
        Self::sweep(wave, Automation::constant(hz))
    }

    /// Oscillator whose frequency follows `freq`.
    pub fn sweep(wave: Wave, freq: Automation) -> Self {
        Source::Osc { osc: Osc::new(freq.value_at(0.0), wave), freq, fm: None }
    }

    pub fn noise(buffer: NoiseBuffer) -> Self {
        Source::Noise(buffer)
    }

    /// Add frequency modulation. No effect on noise sources.
    pub fn modulated(mut self, with: Fm) -> Self {
        if let Source::Osc { fm, .. } = &mut self {
            *fm = Some(with);
        }
        self
    }

    fn node_count(&self) -> usize {
        match self {
            // the LFO and its depth gain are two nodes
            Source::Osc { fm, .. } => 1 + if fm.is_some() { 2 } else { 0 },
            Source::Noise(_) => 1,
        }
    }

    #[inline]
    fn next(&mut self, local: f32, sr: f32) -> f32 {
        match self {
            Source::Osc { osc, freq, fm } => {
                let mut hz = freq.value_at(local);
                if let Some(fm) = fm {
                    hz += fm.lfo.next_norm(sr) * fm.depth_hz;
                }
                osc.set_freq(hz);
                osc.next(sr)
            }
            Source::Noise(buf) => buf.next(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct FilterStage {
    svf: SvfTpt,
    mode: SvfMode,
}

impl FilterStage {
    pub fn lowpass(cut_hz: f32, q: f32, sr: f32) -> Self {
        Self { svf: SvfTpt::new(cut_hz, q, sr), mode: SvfMode::Lowpass }
    }

    pub fn bandpass(center_hz: f32, q: f32, sr: f32) -> Self {
        Self { svf: SvfTpt::new(center_hz, q, sr), mode: SvfMode::Bandpass }
    }

    #[inline] pub fn mode(&self) -> SvfMode { self.mode }
    #[inline] pub fn cutoff_hz(&self) -> f32 { self.svf.cutoff_hz() }
}

/// Source with an optional filter.
#[derive(Clone, Debug)]
pub struct Branch {
    source: Source,
    filter: Option<FilterStage>,
}

impl Branch {
    pub fn new(source: Source) -> Self {
        Self { source, filter: None }
    }

    pub fn filtered(mut self, filter: FilterStage) -> Self {
        self.filter = Some(filter);
        self
    }

    #[inline] pub fn source(&self) -> &Source { &self.source }
    #[inline] pub fn filter(&self) -> Option<&FilterStage> { self.filter.as_ref() }

    fn node_count(&self) -> usize {
        self.source.node_count() + usize::from(self.filter.is_some())
    }

    #[inline]
    fn next(&mut self, local: f32, sr: f32) -> f32 {
        let x = self.source.next(local, sr);
        match &mut self.filter {
            Some(f) => f.svf.process(x, f.mode),
            None => x,
        }
    }
}

/// One scheduled sound: branches summed into a gain envelope.
#[derive(Clone, Debug)]
pub struct Voice {
    id: VoiceId,
    label: &'static str,
    sr: f32,
    start: f64,
    duration: f64,
    branches: Vec<Branch>,
    gain: Automation,
}

impl Voice {
    /// An empty voice rendered at `sr`. Starts at time 0 and never stops until
    /// [`lasting`](Self::lasting) says otherwise.
    pub fn new(label: &'static str, sr: f32) -> Self {
        Self {
            id: VoiceId(0),
            label,
            sr: sr.max(1.0),
            start: 0.0,
            duration: f64::INFINITY,
            branches: Vec::new(),
            gain: Automation::constant(1.0),
        }
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn with_gain(mut self, gain: Automation) -> Self {
        self.gain = gain;
        self
    }

    /// Stop `seconds` after the start.
    pub fn lasting(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Assign identity and start time on the context clock.
    pub fn scheduled(mut self, id: VoiceId, start: f64) -> Self {
        self.id = id;
        self.start = start;
        self
    }

    #[inline] pub fn id(&self) -> VoiceId { self.id }
    #[inline] pub fn label(&self) -> &'static str { self.label }
    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }
    #[inline] pub fn start(&self) -> f64 { self.start }
    #[inline] pub fn duration(&self) -> f64 { self.duration }
    #[inline] pub fn stop(&self) -> f64 { self.start + self.duration }
    #[inline] pub fn branches(&self) -> &[Branch] { &self.branches }
    #[inline] pub fn gain(&self) -> &Automation { &self.gain }
    #[inline] pub fn is_open_ended(&self) -> bool { self.duration.is_infinite() }

    /// Audio nodes this voice stands for: sources, modulators, filters and the gain stage.
    pub fn node_count(&self) -> usize {
        self.branches.iter().map(Branch::node_count).sum::<usize>() + 1
    }

    #[inline]
    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.stop()
    }

    /// Fade from the current level to silence over `fade` seconds starting at
    /// `at` (context time), then stop.
    pub fn release(&mut self, at: f64, fade: f32) {
        let local = (at - self.start).max(0.0);
        let fade = fade.max(0.0);
        self.gain.hold_and_ramp(local as f32, 0.0, local as f32 + fade);
        self.duration = self.duration.min(local + f64::from(fade));
    }

    /// Sample at context time `t`. Silent before the start and after the stop.
    #[inline]
    pub fn next(&mut self, t: f64) -> f32 {
        if t < self.start || self.is_finished(t) {
            return 0.0;
        }
        let local = (t - self.start) as f32;
        let sr = self.sr;
        let sum: f32 = self.branches.iter_mut().map(|b| b.next(local, sr)).sum();
        sum * self.gain.value_at(local)
    }
}
