//! Smoothed positions and pose angles.
//!
//! Everything moves by exponential approach: each frame covers a fraction
//! `min(dt * rate, 1)` of the remaining distance, so values converge on their
//! target without overshoot regardless of frame rate hiccups.

use core::f32::consts::TAU;

use glam::Vec2;

use crate::phase::Phase;

/// Where customer and object wait off screen.
pub const OFFSTAGE_X: f32 = -6.0;
/// Customer's spot at the counter.
pub const COUNTER_X: f32 = -2.0;
/// Customer walks out to here.
pub const EXIT_X: f32 = 6.0;
/// Object position when the craftsman takes it.
pub const HANDOFF_X: f32 = 0.0;
/// Object height while carried.
pub const CARRY_HEIGHT: f32 = 0.7;
/// Object position on the machine bed.
pub const MACHINE_BED: Vec2 = Vec2::new(3.0, 1.0);

const LEG_SETTLE_RATE: f32 = 5.0;
const WALK_CYCLE_HZ: f64 = 10.0;
const WALK_AMPLITUDE: f32 = 0.5;
const SPIN_RATE: f32 = 0.5;
const ROLLER_RATE: f32 = 5.0;

/// `value` moved towards `target` by `min(dt * rate, 1)` of the gap.
#[inline]
pub fn approach(value: f32, target: f32, dt: f32, rate: f32) -> f32 {
    value + (target - value) * (dt * rate).clamp(0.0, 1.0)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rates {
    pub customer: f32,
    pub object: f32,
}

impl Default for Rates {
    fn default() -> Self {
        Self { customer: 2.0, object: 3.0 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Motion {
    pub customer_x: f32,
    pub object: Vec2,
    /// Leg angle of the walk cycle, radians.
    pub leg_swing: f32,
    /// Object rotation about the vertical axis, radians in `[0, TAU)`.
    pub object_spin: f32,
    /// Machine roller angle, radians in `[0, TAU)`.
    pub roller_angle: f32,
}

impl Default for Motion {
    fn default() -> Self {
        Self::offstage()
    }
}

impl Motion {
    pub fn offstage() -> Self {
        Self {
            customer_x: OFFSTAGE_X,
            object: Vec2::new(OFFSTAGE_X, CARRY_HEIGHT),
            leg_swing: 0.0,
            object_spin: 0.0,
            roller_angle: 0.0,
        }
    }

    /// Put customer and object back offstage. Pose angles are kept.
    pub fn reset_positions(&mut self) {
        self.customer_x = OFFSTAGE_X;
        self.object = Vec2::new(OFFSTAGE_X, CARRY_HEIGHT);
    }

    /// Snap onto the targets of the phase that just ended.
    pub fn settle(&mut self, left: Phase) {
        match left {
            Phase::CustomerEntering => {
                self.customer_x = COUNTER_X;
                self.object.x = COUNTER_X;
            }
            Phase::Handoff => self.object.x = HANDOFF_X,
            Phase::ToMachine => self.object = MACHINE_BED,
            // the craftsman lifts the print off the bed at the handoff spot
            Phase::Printed => self.object = Vec2::new(HANDOFF_X, CARRY_HEIGHT),
            Phase::FromMachine => self.object = Vec2::new(self.customer_x, CARRY_HEIGHT),
            _ => {}
        }
    }

    /// Advance one frame of `dt` seconds in `phase`. `clock` is the total
    /// scene time, used by the walk cycle.
    pub fn step(&mut self, phase: Phase, dt: f32, rates: Rates, clock: f64) {
        match phase {
            Phase::CustomerEntering => self.customer_x = approach(self.customer_x, COUNTER_X, dt, rates.customer),
            Phase::CustomerLeaving => self.customer_x = approach(self.customer_x, EXIT_X, dt, rates.customer),
            _ => {}
        }

        let t = (dt * rates.object).clamp(0.0, 1.0);
        match phase {
            // carried by the customer
            Phase::CustomerEntering | Phase::CustomerLeaving => self.object.x = self.customer_x,
            Phase::Handoff => self.object.x = approach(self.object.x, HANDOFF_X, dt, rates.object),
            Phase::ToMachine => self.object = self.object.lerp(MACHINE_BED, t),
            Phase::FromMachine | Phase::ToCustomer => {
                self.object = self.object.lerp(Vec2::new(self.customer_x, CARRY_HEIGHT), t);
            }
            _ => {}
        }

        self.leg_swing = if phase.is_walking() {
            (clock * WALK_CYCLE_HZ).sin() as f32 * WALK_AMPLITUDE
        } else {
            approach(self.leg_swing, 0.0, dt, LEG_SETTLE_RATE)
        };

        if phase.actors_visible() {
            self.object_spin = (self.object_spin + dt * SPIN_RATE).rem_euclid(TAU);
        }
        if phase.print_effects() {
            self.roller_angle = (self.roller_angle + dt * ROLLER_RATE).rem_euclid(TAU);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approach_never_overshoots() {
        let mut x = OFFSTAGE_X;
        let mut prev_gap = (COUNTER_X - x).abs();
        for _ in 0..200 {
            x = approach(x, COUNTER_X, 1.0 / 60.0, 2.0);
            let gap = (COUNTER_X - x).abs();
            assert!(gap <= prev_gap);
            assert!(x <= COUNTER_X);
            prev_gap = gap;
        }
        assert!(prev_gap < 0.1);
    }

    #[test]
    fn huge_step_lands_exactly_on_target() {
        assert_eq!(approach(-6.0, -2.0, 10.0, 2.0), -2.0);
        assert_eq!(approach(1.0, 5.0, -1.0, 2.0), 1.0);
    }

    #[test]
    fn object_rides_with_the_customer() {
        let mut m = Motion::offstage();
        m.step(Phase::CustomerEntering, 0.1, Rates::default(), 0.0);
        assert!(m.customer_x > OFFSTAGE_X);
        assert_eq!(m.object.x, m.customer_x);
        assert_eq!(m.object.y, CARRY_HEIGHT);
    }

    #[test]
    fn to_machine_rises_onto_the_bed() {
        let mut m = Motion::offstage();
        m.object = Vec2::new(HANDOFF_X, CARRY_HEIGHT);
        for _ in 0..120 {
            m.step(Phase::ToMachine, 1.0 / 60.0, Rates::default(), 0.0);
        }
        assert!(m.object.distance(MACHINE_BED) < 0.01);
        m.settle(Phase::ToMachine);
        assert_eq!(m.object, MACHINE_BED);
    }

    #[test]
    fn print_is_lifted_to_the_handoff_spot() {
        let mut m = Motion::offstage();
        m.settle(Phase::ToMachine);
        m.settle(Phase::Printing);
        assert_eq!(m.object, MACHINE_BED);
        m.settle(Phase::Printed);
        assert_eq!(m.object, Vec2::new(HANDOFF_X, CARRY_HEIGHT));
    }

    #[test]
    fn legs_settle_when_not_walking() {
        let mut m = Motion::offstage();
        m.leg_swing = 0.5;
        for _ in 0..120 {
            m.step(Phase::CustomerWaiting, 1.0 / 60.0, Rates::default(), 0.0);
        }
        assert!(m.leg_swing.abs() < 1e-3);
    }

    #[test]
    fn spin_only_while_visible() {
        let mut m = Motion::offstage();
        m.step(Phase::Idle, 1.0, Rates::default(), 0.0);
        assert_eq!(m.object_spin, 0.0);
        m.step(Phase::Handoff, 1.0, Rates::default(), 0.0);
        assert!((m.object_spin - 0.5).abs() < 1e-6);
    }
}
