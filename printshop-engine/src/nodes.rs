//! Building blocks (nodes) for sound effect voices.
//!
//! These are per-sample components. Oscillators are `Copy` and cheap to move; the
//! noise buffer owns its samples, filled once when the voice is built (never on
//! the audio thread).
//!
//! Contents:
//! - `Wave`, `Osc`     : basic oscillators (Sine/Tri/Saw/Square) with stable phase wrap
//! - `Lfo`             : low-frequency oscillator (same core as `Osc`), for modulation
//! - `NoiseBuffer`     : one-shot playback of a pre-rendered noise burst
//!
//! Notes:
//! - Frequency is **Hz**; methods expect the current **sample rate** when stepping.
//! - These nodes are deliberately simple; the patches wire them together.

use printshop_core::dsp::{fast_sin, wrap_phase01, TAU};
use rand::Rng;

/// Oscillator waveform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wave { Sine, Tri, Saw, Square }

/// Naive (non-bandlimited) waveforms; good enough for short effects and drones.
#[inline]
fn osc_sample(phase01: f32, wave: Wave) -> f32 {
    match wave {
        Wave::Sine   => fast_sin(TAU * phase01),
        Wave::Tri    => 1.0 - 4.0 * (phase01 - 0.5).abs(),
        Wave::Saw    => 2.0 * phase01 - 1.0,
        Wave::Square => if phase01 < 0.5 { 1.0 } else { -1.0 },
    }
}

/// Free-running oscillator.
#[derive(Copy, Clone, Debug)]
pub struct Osc {
    phase: f32,   // [0,1)
    freq:  f32,   // Hz
    wave:  Wave,
}

impl Osc {
    #[inline] pub fn new(freq_hz: f32, wave: Wave) -> Self { Self { phase: 0.0, freq: freq_hz.max(0.0), wave } }
    #[inline] pub fn set_freq(&mut self, hz: f32) { self.freq = hz.max(0.0); }
    #[inline] pub fn freq(&self) -> f32 { self.freq }
    #[inline] pub fn wave(&self) -> Wave { self.wave }

    /// Return the current sample, then advance one sample.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        let s = osc_sample(self.phase, self.wave);
        self.phase = wrap_phase01(self.phase + self.freq / sr);
        s
    }
}

/// Low-frequency oscillator; identical to `Osc` but with convenience constructor.
#[derive(Copy, Clone, Debug)]
pub struct Lfo(Osc);
impl Lfo {
    #[inline] pub fn sine(rate_hz: f32) -> Self { Self(Osc::new(rate_hz, Wave::Sine)) }

    /// Next LFO value in **[-1,1]**.
    #[inline] pub fn next_norm(&mut self, sr: f32) -> f32 { self.0.next(sr) }

    #[inline] pub fn rate(&self) -> f32 { self.0.freq() }
}

/// Pre-rendered mono noise played once from the start; silent after the end.
#[derive(Clone, Debug)]
pub struct NoiseBuffer {
    data: Vec<f32>,
    pos: usize,
}

impl NoiseBuffer {
    /// White noise shaped by `exp(-i / (len * decay))`, `decay` as a fraction of the length.
    pub fn decaying<R: Rng>(len: usize, decay: f32, rng: &mut R) -> Self {
        let tau = (len as f32 * decay).max(f32::MIN_POSITIVE);
        let data = (0..len)
            .map(|i| (rng.gen::<f32>() * 2.0 - 1.0) * (-(i as f32) / tau).exp())
            .collect();
        Self { data, pos: 0 }
    }

    #[inline] pub fn len(&self) -> usize { self.data.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.data.is_empty() }
    #[inline] pub fn samples(&self) -> &[f32] { &self.data }

    #[inline]
    pub fn next(&mut self) -> f32 {
        match self.data.get(self.pos) {
            Some(&s) => {
                self.pos += 1;
                s
            }
            None => 0.0,
        }
    }
}
