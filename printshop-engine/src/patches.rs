//! Sound effect patches.
//!
//! Each function builds one unscheduled [`Voice`] at the given sample rate.
//! Times inside the envelopes are relative to the voice start; the
//! synthesizer decides when that is.

use printshop_core::envelopes::Automation;
use rand::Rng;

use crate::nodes::{NoiseBuffer, Wave};
use crate::voice::{Branch, FilterStage, Fm, Source, Voice};

/// Ambient drone fade-out on stop, seconds.
pub const AMBIENT_FADE_SECONDS: f32 = 1.0;

/// Success chime: C5, E5, G5.
pub const CHIME_NOTES_HZ: [f32; 3] = [523.25, 659.25, 783.99];

/// Delay between chime notes, seconds.
pub const CHIME_STAGGER_SECONDS: f64 = 0.1;

const FOOTSTEP_SECONDS: f32 = 0.05;
const WHOOSH_SECONDS: f32 = 0.3;
const CHIME_SECONDS: f32 = 0.6;
const CLICK_SECONDS: f32 = 0.05;

/// Short decaying noise burst through a dark low-pass.
pub fn footstep<R: Rng>(sr: f32, rng: &mut R) -> Voice {
    let len = (sr * FOOTSTEP_SECONDS) as usize;
    Voice::new("footstep", sr)
        .with_branch(
            Branch::new(Source::noise(NoiseBuffer::decaying(len, 0.15, rng)))
                .filtered(FilterStage::lowpass(200.0, 0.707, sr)),
        )
        .with_gain(Automation::constant(0.4).set_at(0.4, 0.0).exp_to(0.01, FOOTSTEP_SECONDS))
        .lasting(f64::from(FOOTSTEP_SECONDS))
}

/// Falling sine sweep.
pub fn whoosh(sr: f32) -> Voice {
    let freq = Automation::constant(800.0).set_at(800.0, 0.0).exp_to(200.0, WHOOSH_SECONDS);
    Voice::new("whoosh", sr)
        .with_branch(Branch::new(Source::sweep(Wave::Sine, freq)))
        .with_gain(
            Automation::constant(0.0)
                .set_at(0.0, 0.0)
                .linear_to(0.2, 0.05)
                .exp_to(0.01, WHOOSH_SECONDS),
        )
        .lasting(f64::from(WHOOSH_SECONDS))
}

/// Machine hum: low-passed saw plus a wobbling band-passed square, `seconds` long.
///
/// `seconds` should be at least 0.3 for the release ramp to fit; the
/// synthesizer clamps it before calling.
pub fn printing(sr: f32, seconds: f64) -> Voice {
    let d = seconds as f32;
    Voice::new("printing", sr)
        .with_branch(
            Branch::new(Source::osc(Wave::Saw, 120.0)).filtered(FilterStage::lowpass(800.0, 0.707, sr)),
        )
        .with_branch(
            Branch::new(Source::osc(Wave::Square, 240.0).modulated(Fm::sine(5.0, 10.0)))
                .filtered(FilterStage::bandpass(400.0, 1.0, sr)),
        )
        .with_gain(
            Automation::constant(0.0)
                .set_at(0.0, 0.0)
                .linear_to(0.15, 0.2)
                .set_at(0.15, d - 0.3)
                .linear_to(0.0, d),
        )
        .lasting(seconds)
}

/// One bell-like note of the success chime.
pub fn chime_note(sr: f32, hz: f32) -> Voice {
    Voice::new("chime", sr)
        .with_branch(Branch::new(Source::osc(Wave::Sine, hz)))
        .with_gain(
            Automation::constant(0.0)
                .set_at(0.0, 0.0)
                .linear_to(0.15, 0.02)
                .exp_to(0.01, CHIME_SECONDS),
        )
        .lasting(f64::from(CHIME_SECONDS))
}

/// UI click: fast falling square blip.
pub fn click(sr: f32) -> Voice {
    let freq = Automation::constant(800.0).set_at(800.0, 0.0).exp_to(80.0, CLICK_SECONDS);
    Voice::new("click", sr)
        .with_branch(Branch::new(Source::sweep(Wave::Square, freq)))
        .with_gain(Automation::constant(0.2).set_at(0.2, 0.0).exp_to(0.01, CLICK_SECONDS))
        .lasting(f64::from(CLICK_SECONDS))
}

/// Low triangle drone fading in over two seconds. Runs until released.
pub fn ambient(sr: f32) -> Voice {
    Voice::new("ambient", sr)
        .with_branch(
            Branch::new(Source::osc(Wave::Tri, 80.0)).filtered(FilterStage::lowpass(150.0, 0.707, sr)),
        )
        .with_gain(Automation::constant(0.0).set_at(0.0, 0.0).linear_to(0.03, 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const SR: f32 = 48_000.0;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn printing_envelope_is_a_trapezoid() {
        let v = printing(SR, 2.0);
        assert_eq!(v.duration(), 2.0);
        assert_eq!(v.node_count(), 7);
        let g = v.gain();
        assert!(close(g.value_at(0.0), 0.0));
        assert!(close(g.value_at(0.2), 0.15));
        assert!(close(g.value_at(1.7), 0.15));
        assert!(close(g.value_at(2.0), 0.0));
    }

    #[test]
    fn footstep_is_short_and_decays() {
        let mut rng = StdRng::seed_from_u64(1);
        let v = footstep(SR, &mut rng);
        assert_eq!(v.duration(), f64::from(FOOTSTEP_SECONDS));
        assert_eq!(v.node_count(), 3);
        assert!(close(v.gain().value_at(0.0), 0.4));
        assert!(close(v.gain().value_at(0.05), 0.01));
    }

    #[test]
    fn whoosh_attack_then_exponential_tail() {
        let v = whoosh(SR);
        let g = v.gain();
        assert!(close(g.value_at(0.025), 0.1));
        assert!(close(g.value_at(0.05), 0.2));
        assert!(g.value_at(0.2) < 0.2 && g.value_at(0.2) > 0.01);
    }

    #[test]
    fn ambient_is_open_ended() {
        let v = ambient(SR);
        assert!(v.is_open_ended());
        assert!(close(v.gain().value_at(1.0), 0.015));
        assert!(close(v.gain().value_at(5.0), 0.03));
    }

    #[test]
    fn chime_and_click_stop_on_time() {
        assert_eq!(chime_note(SR, CHIME_NOTES_HZ[0]).duration(), f64::from(CHIME_SECONDS));
        assert_eq!(click(SR).duration(), f64::from(CLICK_SECONDS));
        assert_eq!(click(SR).node_count(), 2);
    }
}
