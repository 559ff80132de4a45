//! printshop scene: the phase-driven storyboard of the print shop.
//!
//! Crate layout:
//! - [`phase`]      : the phase cycle, durations and entry effects as data
//! - [`catalog`]    : items and their colors
//! - [`config`]     : JSON-loadable timing and catalog
//! - [`motion`]     : exponential-approach smoothing of positions and poses
//! - [`timers`]     : deferred cues (footstep cadence) on the scene clock
//! - [`state`]      : the per-frame `SceneState` snapshot
//! - [`controller`] : `Timeline`, which ties the above to the synthesizer
//! - [`render`]     : the `Renderer` seam
//!
//! The timeline is single-threaded: the frame loop calls `tick` and then draws
//! `render_state()`. Sounds are fire-and-forget calls into
//! [`printshop_engine::Synthesizer`]; nothing flows back from audio.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod motion;
pub mod phase;
pub mod render;
pub mod state;
pub mod timers;

pub use catalog::{CatalogEntry, ItemKind, Rgb};
pub use config::TimelineConfig;
pub use controller::Timeline;
pub use error::{SceneError, SceneResult};
pub use phase::{EntryEffect, Phase};
pub use render::{FrameLog, Renderer};
pub use state::{derive_visual_state, SceneState};
