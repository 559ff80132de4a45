//! Realtime synthesis graph core.
//!
//! This module defines the minimal `Generator` trait and a lightweight `Engine<G>`
//! wrapper that owns a generator (the voice mixer), tracks sample rate and the
//! running sample clock, and produces one **mono** sample at a time.
//!
//! Design goals
//! - No dynamic allocations per sample
//! - The engine clock *is* the audio context clock: voices are scheduled in
//!   seconds on it and the generator receives the time of every sample
//! - Generic over the generator type, so tests can swap in simple sources

/// Anything that can generate one sample at a time.
pub trait Generator {
    /// Called when the engine is (re)initialized or when the sample rate changes.
    fn reset(&mut self, sr: f32);

    /// Generate the mono sample that plays at `t` seconds on the engine clock.
    fn next(&mut self, t: f64) -> f32;
}

/// Lightweight engine that owns a generator and the sample clock.
///
/// The audio callback calls `next()` (or one of the block renderers) for every
/// output frame. The clock only advances while samples are being pulled, so a
/// paused stream also pauses time, like a suspended browser audio context.
pub struct Engine<G: Generator> {
    sr: f32,
    frames: u64,
    gen: G,
}

impl<G: Generator> Engine<G> {
    /// Construct with an already-configured generator. We immediately `reset`
    /// the generator to communicate the sample rate.
    #[inline]
    pub fn new(mut gen: G, sr: f32) -> Self {
        let sr = sr.max(1.0);
        gen.reset(sr);
        Self { sr, frames: 0, gen }
    }

    /// Produce **one** mono sample and advance the clock by one frame.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let t = self.time();
        self.frames += 1;
        self.gen.next(t)
    }

    /// Fill a mono buffer.
    pub fn render_mono(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            *s = self.next();
        }
    }

    /// Fill an interleaved buffer with `channels` channels, duplicating the mono
    /// signal. Returns the number of frames rendered.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) -> usize {
        if channels == 0 {
            return 0;
        }
        let mut frames = 0;
        for frame in out.chunks_exact_mut(channels) {
            let s = self.next();
            frame.fill(s);
            frames += 1;
        }
        frames
    }

    /// Change the sample rate, keeping the clock's notion of elapsed seconds.
    pub fn set_sample_rate(&mut self, sr: f32) {
        let sr = sr.max(1.0);
        if sr == self.sr {
            return;
        }
        let t = self.time();
        self.sr = sr;
        self.frames = (t * f64::from(sr)).round() as u64;
        self.gen.reset(sr);
    }

    /// Return the engine’s current sample rate.
    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Frames rendered since this engine was created.
    #[inline] pub fn frames(&self) -> u64 { self.frames }

    /// Seconds on the engine clock (time of the next sample to be rendered).
    #[inline] pub fn time(&self) -> f64 { self.frames as f64 / f64::from(self.sr) }

    /// Get a mutable reference to the inner generator for commands and tweaks.
    #[inline]
    pub fn generator_mut(&mut self) -> &mut G { &mut self.gen }

    #[inline]
    pub fn generator(&self) -> &G { &self.gen }
}
