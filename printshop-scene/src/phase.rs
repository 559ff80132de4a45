//! Storyboard phases and what happens when each one begins.
//!
//! The cycle is fixed: every phase has exactly one successor and the last one
//! wraps to [`Phase::Idle`]. Durations, successors and entry effects are plain
//! data so the controller stays a small interpreter over them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    CustomerEntering,
    CustomerWaiting,
    Handoff,
    ToMachine,
    Printing,
    Printed,
    FromMachine,
    ToCustomer,
    CustomerHappy,
    CustomerLeaving,
}

/// Side effects run once when a phase is entered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryEffect {
    /// Send customer and object back offstage.
    ResetPositions,
    /// Footstep cadence while the customer walks.
    Footsteps,
    Whoosh,
    /// Machine sound lasting the printing phase.
    PrintingSound,
    SuccessChime,
    /// Move on to the next catalog item.
    AdvanceItem,
}

impl Phase {
    pub const COUNT: usize = 11;

    /// Every phase in cycle order.
    pub const ALL: [Phase; Self::COUNT] = [
        Phase::Idle,
        Phase::CustomerEntering,
        Phase::CustomerWaiting,
        Phase::Handoff,
        Phase::ToMachine,
        Phase::Printing,
        Phase::Printed,
        Phase::FromMachine,
        Phase::ToCustomer,
        Phase::CustomerHappy,
        Phase::CustomerLeaving,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn next(self) -> Phase {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::CustomerEntering => "customer-entering",
            Phase::CustomerWaiting => "customer-waiting",
            Phase::Handoff => "handoff",
            Phase::ToMachine => "to-machine",
            Phase::Printing => "printing",
            Phase::Printed => "printed",
            Phase::FromMachine => "from-machine",
            Phase::ToCustomer => "to-customer",
            Phase::CustomerHappy => "customer-happy",
            Phase::CustomerLeaving => "customer-leaving",
        }
    }

    /// Nominal length in seconds.
    pub const fn default_duration(self) -> f32 {
        match self {
            Phase::Idle => 1.0,
            Phase::CustomerEntering | Phase::CustomerLeaving => 1.5,
            Phase::CustomerWaiting | Phase::Printed => 0.5,
            Phase::Handoff
            | Phase::ToMachine
            | Phase::FromMachine
            | Phase::ToCustomer
            | Phase::CustomerHappy => 0.8,
            Phase::Printing => 2.0,
        }
    }

    pub const fn entry_effects(self) -> &'static [EntryEffect] {
        use EntryEffect::*;
        match self {
            Phase::Idle => &[ResetPositions, AdvanceItem],
            Phase::CustomerEntering => &[ResetPositions, Footsteps],
            Phase::CustomerWaiting | Phase::Printed => &[],
            Phase::Handoff | Phase::ToMachine | Phase::FromMachine | Phase::ToCustomer => &[Whoosh],
            Phase::Printing => &[PrintingSound],
            Phase::CustomerHappy => &[SuccessChime],
            Phase::CustomerLeaving => &[Footsteps],
        }
    }

    // ---- flags, pure functions of the phase ----

    #[inline]
    pub const fn actors_visible(self) -> bool {
        !matches!(self, Phase::Idle)
    }

    #[inline]
    pub const fn is_printed(self) -> bool {
        self.index() >= Phase::Printed.index()
    }

    #[inline]
    pub const fn is_happy(self) -> bool {
        matches!(self, Phase::CustomerHappy | Phase::CustomerLeaving)
    }

    #[inline]
    pub const fn print_effects(self) -> bool {
        matches!(self, Phase::Printing)
    }

    #[inline]
    pub const fn craftsman_working(self) -> bool {
        self.index() >= Phase::Handoff.index() && self.index() <= Phase::FromMachine.index()
    }

    /// Customer is walking on or off stage.
    #[inline]
    pub const fn is_walking(self) -> bool {
        matches!(self, Phase::CustomerEntering | Phase::CustomerLeaving)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| SceneError::UnknownPhase(s.to_string()))
    }
}
