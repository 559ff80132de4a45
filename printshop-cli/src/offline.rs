//! Offline rendering of whole storyboard cycles to a WAV file.
//!
//! The timeline ticks at `--fps`; between ticks the mixer renders exactly one
//! frame's worth of samples, so sound cues land where they would live.

use anyhow::{ensure, Context, Result};
use printshop_core::dsp::{lin_to_db, one_pole_coeff_ms, Rms};
use printshop_engine::{OfflineHost, Synthesizer};
use printshop_scene::Timeline;
use tracing::{debug, info};

use crate::{load_config, RenderArgs};

/// Let the last sounds ring out after the final cycle.
const TAIL_SECONDS: f64 = 1.0;

pub fn run(args: &RenderArgs) -> Result<()> {
    ensure!(args.scene.fps.is_finite() && args.scene.fps > 0.0, "--fps must be positive");
    ensure!(args.sample_rate >= 8_000, "--sample-rate must be at least 8000");
    let config = load_config(args.scene.timing.as_deref())?;

    let sr = args.sample_rate as f32;
    let (host, tap) = OfflineHost::new(sr);
    let synth = Synthesizer::new(Box::new(host)).with_seed(args.seed);
    let mut timeline = Timeline::new(config, synth)?;
    timeline.set_muted(args.scene.muted);
    if args.scene.ambient {
        timeline.synthesizer_mut().play_ambient();
    }

    let block = (sr / args.scene.fps).round().max(1.0) as usize;
    let dt = block as f32 / sr;
    let seconds = f64::from(timeline.cycle_seconds()) * f64::from(args.cycles);
    let total = (seconds * f64::from(sr)).ceil() as usize;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.out, spec)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut meter = Meter::new(sr);
    let mut buf = vec![0.0f32; block];
    let mut written = 0usize;
    while written < total {
        if let Some(phase) = timeline.tick(dt) {
            debug!(%phase, at = tap.time(), "phase");
        }
        tap.render(&mut buf);
        for &s in &buf {
            writer.write_sample(to_i16(s))?;
            meter.push(s);
        }
        written += buf.len();
    }

    // stop the drone, then render its fade and any ringing voices
    timeline.synthesizer_mut().stop_ambient();
    for s in tap.render_seconds(TAIL_SECONDS) {
        writer.write_sample(to_i16(s))?;
        meter.push(s);
        written += 1;
    }
    timeline.dispose();
    writer.finalize().context("finalizing WAV")?;

    info!(
        path = %args.out.display(),
        seconds = written as f64 / f64::from(sr),
        cycles = args.cycles,
        peak_db = lin_to_db(meter.peak),
        rms_db = lin_to_db(meter.loudest_rms),
        "rendered"
    );
    Ok(())
}

#[inline]
fn to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

/// Peak and loudest 50 ms RMS of the render.
struct Meter {
    rms: Rms,
    peak: f32,
    loudest_rms: f32,
}

impl Meter {
    fn new(sr: f32) -> Self {
        Self { rms: Rms::new(1.0 - one_pole_coeff_ms(50.0, sr)), peak: 0.0, loudest_rms: 0.0 }
    }

    fn push(&mut self, s: f32) {
        self.peak = self.peak.max(s.abs());
        self.loudest_rms = self.loudest_rms.max(self.rms.tick(s));
    }
}
