//! Math backend and small sample helpers shared by the envelopes, filters
//! and oscillators.
//!
//! The backend is picked at compile time: `micromath` if requested, `libm` under
//! `no-std`, the standard library otherwise. `fast-math` swaps the trig calls for
//! polynomial approximations.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_cos(x: f32) -> f32 { x.cos() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] fn m_tan(x: f32) -> f32 { x.sin() / x.cos() }
        #[inline] fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
        #[inline] fn m_abs(x: f32) -> f32 { x.abs() }
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_cos(x: f32) -> f32 { libm::cosf(x) }
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] fn m_ln(x: f32) -> f32 { libm::logf(x) }
        #[inline] fn m_tan(x: f32) -> f32 { libm::tanf(x) }
        #[inline] fn m_sqrt(x: f32) -> f32 { libm::sqrtf(x) }
        #[inline] fn m_floor(x: f32) -> f32 { libm::floorf(x) }
        #[inline] fn m_abs(x: f32) -> f32 { libm::fabsf(x) }
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_cos(x: f32) -> f32 { x.cos() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] fn m_tan(x: f32) -> f32 { x.tan() }
        #[inline] fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
        #[inline] fn m_abs(x: f32) -> f32 { x.abs() }
    }
}

pub const TAU: f32 = 2.0 * PI;

/// Magnitudes below this are flushed to zero.
pub const EPS_SMALL: f32 = 1.0e-20;

/// Floor reported by [`lin_to_db`] for silence.
pub const SILENCE_DB: f32 = -120.0;

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Wrap phase into [0, 1).
#[inline]
pub fn wrap_phase01(p: f32) -> f32 {
    let w = p - m_floor(p);
    if w >= 1.0 { 0.0 } else { w }
}

#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if m_abs(x) < EPS_SMALL { 0.0 } else { x }
}

/// `20 * log10(lin)`, floored at [`SILENCE_DB`].
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin <= EPS_SMALL { SILENCE_DB } else { (8.685889638065036553_f32 * m_ln(lin)).max(SILENCE_DB) }
}

/// `v0 * (v1 / v0)^t` for `t` in [0, 1].
///
/// Endpoints that cannot carry an exponential curve (zero start, or a sign
/// change) hold the start value, the way browser audio parameters do.
#[inline]
pub fn exp_interp(v0: f32, v1: f32, t: f32) -> f32 {
    if v0 == 0.0 || v0 * v1 <= 0.0 {
        return v0;
    }
    v0 * m_exp(m_ln(v1 / v0) * clamp(t, 0.0, 1.0))
}

/// Sine; a 5th-order odd polynomial after range reduction under `fast-math`
/// (about 1e-3 absolute error).
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            let xr = x - m_floor(x / TAU + 0.5) * TAU;
            let x2 = xr * xr;
            xr * (0.999_979_313_3 + x2 * (-0.166_624_432_0 + x2 * 0.008_308_978_98))
        } else {
            m_sin(x)
        }
    }
}

#[inline]
pub fn fast_cos(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_sin(x + PI * 0.5)
        } else {
            m_cos(x)
        }
    }
}

/// Per-sample smoothing coefficient `exp(-1 / (tau * sr))` for a time
/// constant of `t_ms` milliseconds. Zero or negative times give 1.
#[inline]
pub fn one_pole_coeff_ms(t_ms: f32, sr: f32) -> f32 {
    if t_ms <= 0.0 {
        return 1.0;
    }
    m_exp(-1.0 / (t_ms * 0.001 * sr))
}

/// `exp(-2π fc / sr)`, cutoff kept below Nyquist.
#[inline]
pub fn one_pole_coeff_hz(cut_hz: f32, sr: f32) -> f32 {
    m_exp(-TAU * clamp(cut_hz, 0.0, 0.499 * sr) / sr)
}

/// `tan(π fc / sr)` for the TPT filters, cutoff kept below Nyquist.
#[inline]
pub fn tpt_g(cut_hz: f32, sr: f32) -> f32 {
    let x = PI * clamp(cut_hz, 0.0, 0.499 * sr) / sr;
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_sin(x) / fast_cos(x)
        } else {
            m_tan(x)
        }
    }
}

/// Exponentially smoothed RMS level. `alpha` in [0, 1] is the per-sample
/// weight of the new square, e.g. `1.0 - one_pole_coeff_ms(50.0, sr)`.
#[derive(Copy, Clone, Debug)]
pub struct Rms {
    pub alpha: f32,
    mean_square: f32,
}

impl Rms {
    #[inline]
    pub fn new(alpha: f32) -> Self {
        Self { alpha, mean_square: 0.0 }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.mean_square = 0.0;
    }

    /// Feed one sample, return the level after it.
    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        self.mean_square += self.alpha * (x * x - self.mean_square);
        self.value()
    }

    #[inline]
    pub fn value(&self) -> f32 {
        m_sqrt(self.mean_square)
    }
}
