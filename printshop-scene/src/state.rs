//! Per-frame snapshot handed to renderers.

use glam::Vec2;
use serde::Serialize;

use crate::catalog::{CatalogEntry, Rgb};
use crate::motion::Motion;
use crate::phase::Phase;

/// Spotlight intensity over the machine while printing.
pub const PRINT_SPOTLIGHT: f32 = 1.5;
/// Glow of a freshly printed object.
pub const PRINTED_EMISSIVE: f32 = 0.2;
/// Resting glow of the machine screen.
pub const SCREEN_GLOW_BASE: f32 = 0.3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct PrintEffects {
    pub spotlight: f32,
    pub particles: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneState {
    pub phase: Phase,
    /// Seconds spent in the current phase.
    pub phase_elapsed: f32,
    /// Seconds since the timeline started.
    pub clock: f64,
    pub item: CatalogEntry,
    pub item_index: usize,
    pub customer_x: f32,
    pub object_position: Vec2,
    pub is_printed: bool,
    pub is_happy: bool,
    pub customer_visible: bool,
    pub object_visible: bool,
    pub object_color: Rgb,
    pub object_emissive: f32,
    pub shirt_color: Rgb,
    pub print_effects: PrintEffects,
    pub craftsman_working: bool,
    /// Extra craftsman arm rotation while working, radians.
    pub craftsman_arm: f32,
    /// Customer and craftsman idle body sway, radians.
    pub body_sway: (f32, f32),
    pub leg_swing: f32,
    pub object_spin: f32,
    pub roller_angle: f32,
    pub screen_glow: f32,
}

/// Build the snapshot for `phase`. Pure: same inputs, same state.
pub fn derive_visual_state(
    phase: Phase,
    phase_elapsed: f32,
    clock: f64,
    item: &CatalogEntry,
    item_index: usize,
    motion: &Motion,
) -> SceneState {
    let printed = phase.is_printed();
    let visible = phase.actors_visible();
    let print_effects = if phase.print_effects() {
        PrintEffects { spotlight: PRINT_SPOTLIGHT, particles: true }
    } else {
        PrintEffects::default()
    };
    let wave = |hz: f64, amp: f32| (clock * hz).sin() as f32 * amp;

    SceneState {
        phase,
        phase_elapsed,
        clock,
        item: *item,
        item_index,
        customer_x: motion.customer_x,
        object_position: motion.object,
        is_printed: printed,
        is_happy: phase.is_happy(),
        customer_visible: visible,
        object_visible: visible,
        object_color: item.color(printed),
        object_emissive: if printed { PRINTED_EMISSIVE } else { 0.0 },
        shirt_color: item.shirt_color,
        print_effects,
        craftsman_working: phase.craftsman_working(),
        craftsman_arm: if phase.craftsman_working() { wave(3.0, 0.2) } else { 0.0 },
        body_sway: (wave(2.0, 0.03), wave(1.5, 0.02)),
        leg_swing: motion.leg_swing,
        object_spin: motion.object_spin,
        roller_angle: motion.roller_angle,
        screen_glow: if phase.print_effects() { SCREEN_GLOW_BASE + wave(10.0, 0.2) } else { SCREEN_GLOW_BASE },
    }
}
