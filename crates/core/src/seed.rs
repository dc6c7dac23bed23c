//! Reproducible record of a headless simulation run.
//!
//! A [`Seed`] captures everything needed to replay a run bit-for-bit: grid
//! and view dimensions, parameter overrides, PRNG seed, tick count, timestep
//! and the name of the scripted input scenario.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Reproducible record of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub scenario: String,
    pub width: usize,
    pub height: usize,
    pub view_width: f32,
    pub view_height: f32,
    pub params: serde_json::Value,
    pub seed: u64,
    pub steps: usize,
    pub dt: f32,
}

impl Seed {
    /// Default fixed timestep (one 60 Hz frame).
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    /// Creates a seed with empty params, zero steps, the default timestep and
    /// a view matching the grid one pixel per cell.
    pub fn new(scenario: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            width,
            height,
            view_width: width as f32,
            view_height: height as f32,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            steps: 0,
            dt: Self::DEFAULT_DT,
        }
    }

    /// Validates grid dimensions (non-zero, non-overflowing), view size
    /// (positive, finite) and timestep (non-negative, finite).
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(SimError::InvalidDimensions)?;
        let view_ok = |v: f32| v.is_finite() && v > 0.0;
        if !view_ok(self.view_width) || !view_ok(self.view_height) {
            return Err(SimError::InvalidView {
                width: self.view_width,
                height: self.view_height,
            });
        }
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(SimError::InvalidTimestep(self.dt));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_seed_with_defaults() {
        let s = Seed::new("swipe", 128, 96, 42);
        assert_eq!(s.scenario, "swipe");
        assert_eq!((s.width, s.height), (128, 96));
        assert_eq!((s.view_width, s.view_height), (128.0, 96.0));
        assert_eq!(s.steps, 0);
        assert_eq!(s.params, serde_json::json!({}));
        assert!((s.dt - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn json_round_trip_with_custom_params() {
        let mut s = Seed::new("rain", 64, 64, 99);
        s.params = serde_json::json!({"damping": 0.99, "max_particles": 64});
        s.steps = 600;
        s.view_width = 390.0;
        s.view_height = 844.0;
        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn json_contains_expected_keys() {
        let v = serde_json::to_value(Seed::new("tap", 8, 8, 1)).unwrap();
        for key in ["scenario", "width", "height", "view_width", "view_height", "params", "seed", "steps", "dt"] {
            assert!(v.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn validate_succeeds_for_valid_seed() {
        assert!(Seed::new("tap", 64, 64, 42).validate().is_ok());
    }

    #[test]
    fn validate_fails_for_zero_or_overflowing_dimensions() {
        assert!(Seed::new("tap", 0, 64, 42).validate().is_err());
        assert!(Seed::new("tap", 64, 0, 42).validate().is_err());
        assert!(Seed::new("tap", usize::MAX, 2, 42).validate().is_err());
    }

    #[test]
    fn validate_fails_for_degenerate_view() {
        let mut s = Seed::new("tap", 64, 64, 42);
        s.view_height = 0.0;
        assert!(matches!(s.validate(), Err(SimError::InvalidView { .. })));
    }

    #[test]
    fn validate_fails_for_negative_dt() {
        let mut s = Seed::new("tap", 64, 64, 42);
        s.dt = -0.01;
        assert!(matches!(s.validate(), Err(SimError::InvalidTimestep(_))));
    }
}
