//! Envelope generators and parameter automation.
//!
//! Provided:
//! - `Automation`  : breakpoint timeline for a parameter (step / linear / exponential
//!   segments), evaluated at arbitrary times. Drives gain envelopes and frequency sweeps.
//! - `SlewLimiter` : one-pole slew/smoother for arbitrary control signals
//!
//! All types are `no_std` friendly and avoid heap allocations.

use crate::dsp::{clamp, exp_interp, lerp, one_pole_coeff_ms};

// --------------------------------- Automation ------------------------------------

/// Maximum number of breakpoints an [`Automation`] can hold.
pub const MAX_BREAKPOINTS: usize = 8;

/// How a breakpoint is approached from the previous one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Hold the previous value, jump at the breakpoint time.
    Step,
    /// Straight line from the previous breakpoint.
    Linear,
    /// Geometric curve from the previous breakpoint. Holds instead when either
    /// endpoint is zero or the signs differ.
    Exponential,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Breakpoint {
    /// Seconds, relative to the owner's start.
    pub time: f32,
    pub value: f32,
    pub segment: Segment,
}

impl Breakpoint {
    const EMPTY: Self = Self { time: 0.0, value: 0.0, segment: Segment::Step };
}

/// Breakpoint timeline for a single parameter.
///
/// Breakpoints are kept in non-decreasing time order; a breakpoint pushed with
/// an earlier time than the last one is moved to the last time. Pushing into a
/// full timeline is ignored and reported through the return value of [`push`](Self::push).
#[derive(Copy, Clone, Debug)]
pub struct Automation {
    initial: f32,
    points: [Breakpoint; MAX_BREAKPOINTS],
    len: usize,
}

impl Automation {
    /// A parameter that stays at `value` until a breakpoint says otherwise.
    #[inline]
    pub const fn constant(value: f32) -> Self {
        Self { initial: value, points: [Breakpoint::EMPTY; MAX_BREAKPOINTS], len: 0 }
    }

    /// Append a breakpoint. Returns `false` if the timeline is full.
    pub fn push(&mut self, mut bp: Breakpoint) -> bool {
        if self.len == MAX_BREAKPOINTS {
            return false;
        }
        let last = self.last_time();
        if !(bp.time >= last) {
            bp.time = last;
        }
        self.points[self.len] = bp;
        self.len += 1;
        true
    }

    /// Builder: jump to `value` at `time`.
    #[inline]
    pub fn set_at(mut self, value: f32, time: f32) -> Self {
        self.push(Breakpoint { time, value, segment: Segment::Step });
        self
    }

    /// Builder: ramp linearly to `value`, arriving at `time`.
    #[inline]
    pub fn linear_to(mut self, value: f32, time: f32) -> Self {
        self.push(Breakpoint { time, value, segment: Segment::Linear });
        self
    }

    /// Builder: ramp exponentially to `value`, arriving at `time`.
    #[inline]
    pub fn exp_to(mut self, value: f32, time: f32) -> Self {
        self.push(Breakpoint { time, value, segment: Segment::Exponential });
        self
    }

    #[inline]
    pub fn breakpoints(&self) -> &[Breakpoint] { &self.points[..self.len] }

    #[inline]
    pub fn initial(&self) -> f32 { self.initial }

    /// Time of the last breakpoint (0 when there are none).
    #[inline]
    pub fn last_time(&self) -> f32 {
        if self.len == 0 { 0.0 } else { self.points[self.len - 1].time }
    }

    /// Value at `t` seconds.
    pub fn value_at(&self, t: f32) -> f32 {
        let mut prev_t = 0.0;
        let mut prev_v = self.initial;
        for bp in self.breakpoints() {
            if t < bp.time {
                let span = bp.time - prev_t;
                let frac = if span > 0.0 { clamp((t - prev_t) / span, 0.0, 1.0) } else { 1.0 };
                return match bp.segment {
                    Segment::Step => prev_v,
                    Segment::Linear => lerp(prev_v, bp.value, frac),
                    Segment::Exponential => exp_interp(prev_v, bp.value, frac),
                };
            }
            prev_t = bp.time;
            prev_v = bp.value;
        }
        prev_v
    }

    /// Freeze the current value at `at`, then ramp linearly to `target` by `end`.
    ///
    /// Breakpoints before `at` are discarded, so the timeline must only be
    /// evaluated at times `>= at` afterwards.
    pub fn hold_and_ramp(&mut self, at: f32, target: f32, end: f32) {
        let held = self.value_at(at);
        self.initial = held;
        self.len = 0;
        self.push(Breakpoint { time: at, value: held, segment: Segment::Step });
        self.push(Breakpoint { time: end.max(at), value: target, segment: Segment::Linear });
    }
}

impl Default for Automation {
    fn default() -> Self { Self::constant(0.0) }
}

// -------------------------------- Slew Limiter -----------------------------------

/// One-pole slew/smoother: `y += (x - y) * (1 - a)`
///
/// Use `alpha = one_pole_coeff_ms(t_ms, sr)`.
#[derive(Copy, Clone, Debug)]
pub struct SlewLimiter {
    alpha: f32,
    y:     f32,
}

impl SlewLimiter {
    #[inline]
    pub fn new(t_ms: f32, sr: f32) -> Self {
        Self { alpha: one_pole_coeff_ms(t_ms, sr), y: 0.0 }
    }

    #[inline]
    pub fn set_time_ms(&mut self, t_ms: f32, sr: f32) {
        self.alpha = one_pole_coeff_ms(t_ms, sr);
    }

    #[inline]
    pub fn reset(&mut self, y0: f32) { self.y = y0; }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.y += (x - self.y) * (1.0 - self.alpha);
        self.y
    }

    #[inline]
    pub fn value(&self) -> f32 { self.y }
}

// ------------------------------------ Tests --------------------------------------
