//! The timeline: advances phases as frame time accumulates and fires the
//! entry effects of each phase it enters.

use printshop_engine::Synthesizer;
use tracing::{debug, trace, warn};

use crate::catalog::CatalogEntry;
use crate::config::{TimelineConfig, MIN_FOOTSTEP_INTERVAL};
use crate::error::SceneResult;
use crate::motion::{Motion, Rates};
use crate::phase::{EntryEffect, Phase};
use crate::render::Renderer;
use crate::state::{derive_visual_state, SceneState};
use crate::timers::{Cue, CueQueue};

/// Slack when comparing accumulated frame time against a phase duration.
pub const PHASE_EPSILON: f64 = 1e-6;

pub struct Timeline {
    durations: [f32; Phase::COUNT],
    rates: Rates,
    footstep_interval: f32,
    footstep_span: f32,
    catalog: Vec<CatalogEntry>,

    phase: Phase,
    elapsed: f64,
    clock: f64,
    item_index: usize,
    motion: Motion,
    cues: CueQueue,
    synth: Synthesizer,
    disposed: bool,
}

impl Timeline {
    /// Start in `idle` with the first catalog item.
    pub fn new(config: TimelineConfig, synth: Synthesizer) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config, synth))
    }

    /// Default timing and catalog.
    pub fn with_defaults(synth: Synthesizer) -> Self {
        Self::from_valid(TimelineConfig::default(), synth)
    }

    fn from_valid(config: TimelineConfig, synth: Synthesizer) -> Self {
        if config.footstep_interval < MIN_FOOTSTEP_INTERVAL {
            warn!(
                requested = config.footstep_interval,
                used = MIN_FOOTSTEP_INTERVAL,
                "footstep interval too short, clamped"
            );
        }
        Self {
            durations: config.phase_durations(),
            rates: Rates { customer: config.customer_rate, object: config.object_rate },
            footstep_interval: config.footstep_period(),
            footstep_span: config.footstep_span,
            catalog: config.catalog,
            phase: Phase::Idle,
            elapsed: 0.0,
            clock: 0.0,
            item_index: 0,
            motion: Motion::offstage(),
            cues: CueQueue::new(),
            synth,
            disposed: false,
        }
    }

    #[inline] pub fn phase(&self) -> Phase { self.phase }
    #[inline] pub fn phase_elapsed(&self) -> f64 { self.elapsed }
    #[inline] pub fn clock(&self) -> f64 { self.clock }
    #[inline] pub fn item_index(&self) -> usize { self.item_index }
    #[inline] pub fn item(&self) -> &CatalogEntry { &self.catalog[self.item_index] }
    #[inline] pub fn motion(&self) -> &Motion { &self.motion }
    #[inline] pub fn duration(&self, phase: Phase) -> f32 { self.durations[phase.index()] }
    #[inline] pub fn pending_cues(&self) -> usize { self.cues.len() }
    #[inline] pub fn is_disposed(&self) -> bool { self.disposed }

    pub fn cycle_seconds(&self) -> f32 {
        self.durations.iter().sum()
    }

    pub fn synthesizer(&self) -> &Synthesizer { &self.synth }
    pub fn synthesizer_mut(&mut self) -> &mut Synthesizer { &mut self.synth }

    /// Advance by `dt` seconds. Returns the phase entered, if any; at most one
    /// transition happens per call. Negative or non-finite `dt` counts as zero.
    pub fn tick(&mut self, dt: f32) -> Option<Phase> {
        if self.disposed {
            return None;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.clock += f64::from(dt);
        self.elapsed += f64::from(dt);

        let mut entered = None;
        if self.elapsed >= f64::from(self.duration(self.phase)) - PHASE_EPSILON {
            let left = self.phase;
            let next = left.next();
            debug!(from = %left, to = %next, clock = self.clock, "phase transition");
            self.phase = next;
            self.elapsed = 0.0;
            self.motion.settle(left);
            self.enter(next);
            entered = Some(next);
        }

        for cue in self.cues.drain_due(self.clock) {
            self.fire(cue);
        }

        self.motion.step(self.phase, dt, self.rates, self.clock);
        entered
    }

    /// Tick, then hand the new state to `renderer`.
    pub fn frame(&mut self, dt: f32, renderer: &mut impl Renderer) -> Option<Phase> {
        let entered = self.tick(dt);
        renderer.draw(&self.render_state());
        entered
    }

    pub fn render_state(&self) -> SceneState {
        derive_visual_state(
            self.phase,
            self.elapsed as f32,
            self.clock,
            self.item(),
            self.item_index,
            &self.motion,
        )
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.synth.set_muted(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.synth.is_muted()
    }

    /// Cancel pending cues and shut the audio down. Later ticks do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cues.cancel_all();
        self.synth.dispose();
        self.disposed = true;
        debug!(clock = self.clock, "timeline disposed");
    }

    fn enter(&mut self, phase: Phase) {
        for &effect in phase.entry_effects() {
            trace!(phase = %phase, ?effect, "entry effect");
            match effect {
                EntryEffect::ResetPositions => self.motion.reset_positions(),
                EntryEffect::Footsteps => self.cues.schedule_repeating(
                    self.clock,
                    self.footstep_interval,
                    self.footstep_span,
                    Cue::Footstep,
                ),
                EntryEffect::Whoosh => self.synth.play_whoosh(),
                EntryEffect::PrintingSound => {
                    self.synth.play_printing(f64::from(self.duration(Phase::Printing)));
                }
                EntryEffect::SuccessChime => self.synth.play_success(),
                EntryEffect::AdvanceItem => {
                    self.item_index = (self.item_index + 1) % self.catalog.len();
                    debug!(item = self.item().kind.name(), index = self.item_index, "next item");
                }
            }
        }
    }

    fn fire(&mut self, cue: Cue) {
        match cue {
            Cue::Footstep => self.synth.play_footstep(),
        }
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        self.dispose();
    }
}
