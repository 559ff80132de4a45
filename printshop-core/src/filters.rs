//! Filters used by the sound patches and the master bus.
//!
//! - `DcBlock` : one-pole high-pass at a few Hz, run on the master bus
//! - `SvfTpt`  : zero-delay-feedback state-variable filter with low-pass and
//!   band-pass taps, standing in for the biquad stages of the patches

use crate::dsp::{kill_denormals, one_pole_coeff_hz, tpt_g};

/// `y[n] = x[n] - x[n-1] + b * y[n-1]`, with `b = exp(-2π fc / sr)`.
#[derive(Copy, Clone, Debug)]
pub struct OnePoleHP {
    b: f32,
    x1: f32,
    y1: f32,
    fc: f32,
}

impl OnePoleHP {
    pub fn new(cut_hz: f32, sr: f32) -> Self {
        let fc = cut_hz.max(0.0);
        Self { b: one_pole_coeff_hz(fc, sr.max(1.0)), x1: 0.0, y1: 0.0, fc }
    }

    #[inline]
    pub fn set_sample_rate(&mut self, sr: f32) {
        self.b = one_pole_coeff_hz(self.fc, sr.max(1.0));
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = kill_denormals(x - self.x1 + self.b * self.y1);
        self.x1 = x;
        self.y1 = y;
        y
    }
}

#[derive(Copy, Clone, Debug)]
pub struct DcBlock {
    hp: OnePoleHP,
}

impl DcBlock {
    pub fn new(cut_hz: f32, sr: f32) -> Self {
        Self { hp: OnePoleHP::new(cut_hz, sr) }
    }

    #[inline] pub fn set_sample_rate(&mut self, sr: f32) { self.hp.set_sample_rate(sr); }
    #[inline] pub fn process(&mut self, x: f32) -> f32 { self.hp.process(x) }
}

/// Which SVF output a patch listens to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SvfMode {
    Lowpass,
    Bandpass,
}

/// TPT state-variable filter, `g = tan(π fc / sr)` and damping `R = 1 / (2Q)`.
#[derive(Copy, Clone, Debug)]
pub struct SvfTpt {
    cut: f32,
    g: f32,
    r: f32,
    s1: f32,
    s2: f32,
}

impl SvfTpt {
    pub fn new(cut_hz: f32, q: f32, sr: f32) -> Self {
        let cut = cut_hz.max(0.0);
        Self {
            cut,
            g: tpt_g(cut, sr.max(1.0)),
            r: 1.0 / (2.0 * q.max(1e-4)),
            s1: 0.0,
            s2: 0.0,
        }
    }

    #[inline] pub fn cutoff_hz(&self) -> f32 { self.cut }

    /// One sample in, `(lowpass, bandpass)` out.
    #[inline]
    fn taps(&mut self, x: f32) -> (f32, f32) {
        let g = self.g;
        let hp = (x - (2.0 * self.r + g) * self.s1 - self.s2) / (1.0 + 2.0 * self.r * g + g * g);
        let v1 = g * hp;
        let bp = v1 + self.s1;
        self.s1 = kill_denormals(bp + v1);
        let v2 = g * bp;
        let lp = v2 + self.s2;
        self.s2 = kill_denormals(lp + v2);
        (lp, bp)
    }

    #[inline]
    pub fn process(&mut self, x: f32, mode: SvfMode) -> f32 {
        let (lp, bp) = self.taps(x);
        match mode {
            SvfMode::Lowpass => lp,
            SvfMode::Bandpass => bp,
        }
    }

    #[inline] pub fn process_lp(&mut self, x: f32) -> f32 { self.process(x, SvfMode::Lowpass) }
    #[inline] pub fn process_bp(&mut self, x: f32) -> f32 { self.process(x, SvfMode::Bandpass) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn dc_block_removes_offset() {
        let mut dc = DcBlock::new(10.0, SR);
        let mut y = 1.0;
        for _ in 0..(SR as usize) {
            y = dc.process(0.5);
        }
        assert!(y.abs() < 1e-2, "y={y}");
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut svf = SvfTpt::new(800.0, 0.707, SR);
        let mut y = 0.0;
        for _ in 0..(SR as usize) {
            y = svf.process_lp(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "lp dc gain {y}");
    }

    #[test]
    fn bandpass_rejects_dc() {
        let mut svf = SvfTpt::new(400.0, 1.0, SR);
        let mut y = 1.0;
        for _ in 0..(SR as usize) {
            y = svf.process_bp(1.0);
        }
        assert!(y.abs() < 1e-3, "bp leaked {y}");
    }

    #[test]
    fn footstep_lowpass_kills_nyquist() {
        let mut svf = SvfTpt::new(200.0, 0.707, SR);
        let mut peak: f32 = 0.0;
        for i in 0..4800 {
            let y = svf.process_lp(if i % 2 == 0 { 1.0 } else { -1.0 });
            if i > 2400 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.01, "peak={peak}");
    }
}
