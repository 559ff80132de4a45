#![cfg_attr(not(feature = "std"), no_std)]
//! printshop core: no_std-ready DSP primitives with optional fast-math.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm` for math
//! - `micromath`: use `micromath` instead of `libm` in `no_std` builds
//! - `fast-math`: enable approximations (polys/rationals) for trig
//!
//! Modules
//! - [`dsp`]       : math backend, ramps, fast trig, dB, RMS meter
//! - [`envelopes`] : breakpoint parameter automation, slew limiter
//! - [`filters`]   : DC blocker, low-pass/band-pass TPT SVF
//!
//! Design
//! - No heap allocations; pure sample-by-sample primitives
//! - Clear separation between math helpers and filter/envelope building blocks

pub mod dsp;
pub mod envelopes;
pub mod filters;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{
        clamp, exp_interp, kill_denormals, lerp, lin_to_db, one_pole_coeff_hz, one_pole_coeff_ms,
        tpt_g, wrap_phase01, Rms, SILENCE_DB, TAU,
    };
    pub use crate::envelopes::{Automation, Breakpoint, Segment, SlewLimiter, MAX_BREAKPOINTS};
    pub use crate::filters::{DcBlock, OnePoleHP, SvfMode, SvfTpt};
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        assert!(lin_to_db(1.0).abs() < 1e-4);
        let env = Automation::constant(0.0).linear_to(1.0, 1.0);
        assert!(env.value_at(0.5) > 0.0);
        let mut svf = SvfTpt::new(1000.0, 0.707, 48000.0);
        let _ = svf.process_lp(0.1);
    }
}
