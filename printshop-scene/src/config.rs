//! Timeline timing and catalog, loadable from JSON.
//!
//! Every field is optional in the file; whatever is missing keeps its
//! default. Phase durations are keyed by phase name:
//!
//! ```json
//! { "durations": { "printing": 3.0, "idle": 0.5 }, "object_rate": 4.0 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{default_catalog, CatalogEntry};
use crate::error::{SceneError, SceneResult};
use crate::phase::Phase;

/// Shortest gap between footsteps, the length of one footstep sound.
pub const MIN_FOOTSTEP_INTERVAL: f32 = 0.05;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Phase name → seconds. Phases not listed use their default duration.
    pub durations: BTreeMap<String, f32>,
    /// Customer approach rate, 1/s.
    pub customer_rate: f32,
    /// Object approach rate, 1/s.
    pub object_rate: f32,
    /// Seconds between footsteps. Shorter gaps than [`MIN_FOOTSTEP_INTERVAL`]
    /// are played at that minimum.
    pub footstep_interval: f32,
    /// No new footstep starts later than this into a walk, seconds.
    pub footstep_span: f32,
    pub catalog: Vec<CatalogEntry>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            durations: BTreeMap::new(),
            customer_rate: 2.0,
            object_rate: 3.0,
            footstep_interval: 0.3,
            footstep_span: 1.4,
            catalog: default_catalog(),
        }
    }
}

fn positive(name: &'static str, value: f32) -> SceneResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidValue { name, value })
    }
}

impl TimelineConfig {
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| SceneError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> SceneResult<()> {
        for (name, &value) in &self.durations {
            let phase: Phase = name.parse()?;
            if !(value.is_finite() && value > 0.0) {
                return Err(SceneError::InvalidDuration { phase: phase.name().to_string(), value });
            }
        }
        positive("customer_rate", self.customer_rate)?;
        positive("object_rate", self.object_rate)?;
        positive("footstep_interval", self.footstep_interval)?;
        if !(self.footstep_span.is_finite() && self.footstep_span >= 0.0) {
            return Err(SceneError::InvalidValue { name: "footstep_span", value: self.footstep_span });
        }
        if self.catalog.is_empty() {
            return Err(SceneError::EmptyCatalog);
        }
        Ok(())
    }

    /// Gap between footsteps as played.
    pub fn footstep_period(&self) -> f32 {
        self.footstep_interval.max(MIN_FOOTSTEP_INTERVAL)
    }

    /// Duration of `phase` in seconds.
    pub fn duration(&self, phase: Phase) -> f32 {
        self.durations.get(phase.name()).copied().unwrap_or(phase.default_duration())
    }

    /// All durations in cycle order.
    pub fn phase_durations(&self) -> [f32; Phase::COUNT] {
        Phase::ALL.map(|p| self.duration(p))
    }

    pub fn cycle_seconds(&self) -> f32 {
        self.phase_durations().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TimelineConfig::default();
        cfg.validate().unwrap();
        assert!((cfg.cycle_seconds() - 11.0).abs() < 1e-5);
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let cfg = TimelineConfig::from_json_str(r#"{ "durations": { "printing": 3.0 }, "object_rate": 4 }"#).unwrap();
        assert_eq!(cfg.duration(Phase::Printing), 3.0);
        assert_eq!(cfg.duration(Phase::Idle), 1.0);
        assert_eq!(cfg.object_rate, 4.0);
        assert_eq!(cfg.customer_rate, 2.0);
        assert_eq!(cfg.catalog.len(), 4);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            TimelineConfig::from_json_str(r#"{ "durations": { "nap": 1.0 } }"#),
            Err(SceneError::UnknownPhase(_))
        ));
        assert!(matches!(
            TimelineConfig::from_json_str(r#"{ "durations": { "idle": 0 } }"#),
            Err(SceneError::InvalidDuration { .. })
        ));
        assert!(matches!(TimelineConfig::from_json_str(r#"{ "catalog": [] }"#), Err(SceneError::EmptyCatalog)));
        assert!(matches!(TimelineConfig::from_json_str("{"), Err(SceneError::Json(_))));
    }

    #[test]
    fn tiny_footstep_interval_is_raised_to_one_step() {
        let cfg = TimelineConfig::from_json_str(r#"{ "footstep_interval": 0.000001 }"#).unwrap();
        assert_eq!(cfg.footstep_period(), MIN_FOOTSTEP_INTERVAL);
        assert_eq!(TimelineConfig::default().footstep_period(), 0.3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TimelineConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
