//! Device motion as simulation forcing.
//!
//! Tilt is a persistent lateral bias fed into every velocity pass. A shake is
//! a one-off event that becomes a burst of broad isotropic impulses at random
//! positions on the next tick.

use crate::config::SimConfig;
use glam::{Vec2, Vec3};
use ripple_core::Xorshift64;

/// Shake impulses use this fraction of `magnitude * shake_impulse_scale`.
const SHAKE_STRENGTH_FACTOR: f32 = 0.3;
const SHAKE_BASE_COUNT: usize = 3;
/// Extra impulses per unit of shake magnitude.
const SHAKE_COUNT_PER_MAGNITUDE: f32 = 2.0;
const SHAKE_RADIUS_MIN: f32 = 80.0;
const SHAKE_RADIUS_MAX: f32 = 120.0;
/// Upper bound on impulses from one shake, whatever its magnitude.
pub const MAX_SHAKE_IMPULSES: usize = 16;

/// One impulse of a shake burst, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeImpulse {
    pub position: Vec2,
    pub strength: f32,
    pub radius: f32,
}

/// Holds the latest gravity reading and the shakes waiting for the next tick.
#[derive(Debug, Clone, Default)]
pub struct MotionForcing {
    gravity: Vec3,
    pending_shakes: Vec<f32>,
}

impl MotionForcing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the device gravity vector. Stays in effect until the next call.
    pub fn set_tilt_bias(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Lateral acceleration for this tick, in texels/s².
    ///
    /// Device y points up while grid y points down, hence the sign flip.
    pub fn tilt_bias(&self, config: &SimConfig) -> Vec2 {
        Vec2::new(self.gravity.x, -self.gravity.y) * config.tilt_bias_scale
    }

    /// Queues a shake of the given magnitude for the next tick.
    ///
    /// Non-positive and non-finite magnitudes are ignored. Returns whether
    /// the shake was queued.
    pub fn on_shake(&mut self, magnitude: f32) -> bool {
        if !magnitude.is_finite() || magnitude <= 0.0 {
            tracing::debug!(magnitude, "ignoring shake");
            return false;
        }
        self.pending_shakes.push(magnitude);
        true
    }

    pub fn pending_shakes(&self) -> usize {
        self.pending_shakes.len()
    }

    /// Turns every pending shake into its impulse burst and clears the queue.
    pub fn drain_shakes(
        &mut self,
        dimensions: (usize, usize),
        config: &SimConfig,
        rng: &mut Xorshift64,
    ) -> Vec<ShakeImpulse> {
        let mut impulses = Vec::new();
        for magnitude in self.pending_shakes.drain(..) {
            let burst = shake_burst(magnitude, dimensions, config, rng);
            tracing::debug!(magnitude, impulses = burst.len(), "shake burst");
            impulses.extend(burst);
        }
        impulses
    }

    /// Drops shakes that have not been applied yet. Tilt is left alone.
    pub fn clear_shakes(&mut self) {
        self.pending_shakes.clear();
    }
}

/// Impulses produced by a single shake of `magnitude` on a `(w, h)` grid.
///
/// The count grows with magnitude up to [`MAX_SHAKE_IMPULSES`].
pub fn shake_burst(
    magnitude: f32,
    (width, height): (usize, usize),
    config: &SimConfig,
    rng: &mut Xorshift64,
) -> Vec<ShakeImpulse> {
    let extra = (magnitude * SHAKE_COUNT_PER_MAGNITUDE).floor() as usize;
    let count = SHAKE_BASE_COUNT
        .saturating_add(extra)
        .min(MAX_SHAKE_IMPULSES);
    let strength = magnitude * config.shake_impulse_scale * SHAKE_STRENGTH_FACTOR;
    (0..count)
        .map(|_| ShakeImpulse {
            position: Vec2::new(
                rng.range_f32(0.0, width as f32),
                rng.range_f32(0.0, height as f32),
            ),
            strength,
            radius: rng.range_f32(SHAKE_RADIUS_MIN, SHAKE_RADIUS_MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_bias_flips_y_and_scales() {
        let mut m = MotionForcing::new();
        m.set_tilt_bias(Vec3::new(0.5, 0.25, -0.8));
        let cfg = SimConfig {
            tilt_bias_scale: 10.0,
            ..SimConfig::default()
        };
        assert_eq!(m.tilt_bias(&cfg), Vec2::new(5.0, -2.5));
    }

    #[test]
    fn tilt_bias_tracks_config_changes() {
        let mut m = MotionForcing::new();
        m.set_tilt_bias(Vec3::new(1.0, 0.0, 0.0));
        let mut cfg = SimConfig::default();
        let before = m.tilt_bias(&cfg);
        cfg.tilt_bias_scale *= 2.0;
        assert_eq!(m.tilt_bias(&cfg), before * 2.0);
    }

    #[test]
    fn level_device_has_no_bias() {
        let mut m = MotionForcing::new();
        m.set_tilt_bias(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(m.tilt_bias(&SimConfig::default()), Vec2::ZERO);
    }

    #[test]
    fn invalid_shakes_are_ignored() {
        let mut m = MotionForcing::new();
        assert!(!m.on_shake(0.0));
        assert!(!m.on_shake(-1.0));
        assert!(!m.on_shake(f32::NAN));
        assert!(!m.on_shake(f32::INFINITY));
        assert_eq!(m.pending_shakes(), 0);
    }

    #[test]
    fn shake_burst_count_and_strength() {
        let mut rng = Xorshift64::new(7);
        let cfg = SimConfig::default();
        let burst = shake_burst(1.6, (200, 100), &cfg, &mut rng);
        // 3 + floor(3.2)
        assert_eq!(burst.len(), 6);
        for imp in &burst {
            assert!((imp.strength - 1.6 * cfg.shake_impulse_scale * 0.3).abs() < 1e-6);
            assert!((80.0..=120.0).contains(&imp.radius));
            assert!((0.0..=200.0).contains(&imp.position.x));
            assert!((0.0..=100.0).contains(&imp.position.y));
        }
    }

    #[test]
    fn violent_shake_burst_is_capped() {
        let cfg = SimConfig::default();
        let mut rng = Xorshift64::new(3);
        assert_eq!(shake_burst(1e6, (64, 64), &cfg, &mut rng).len(), MAX_SHAKE_IMPULSES);
        assert_eq!(shake_burst(1e20, (64, 64), &cfg, &mut rng).len(), MAX_SHAKE_IMPULSES);
        // 3 + floor(12.0) is still under the cap
        assert_eq!(shake_burst(6.0, (64, 64), &cfg, &mut rng).len(), 15);
    }

    #[test]
    fn drain_consumes_every_pending_shake() {
        let mut m = MotionForcing::new();
        let mut rng = Xorshift64::new(1);
        m.on_shake(0.2);
        m.on_shake(1.0);
        let impulses = m.drain_shakes((64, 64), &SimConfig::default(), &mut rng);
        assert_eq!(impulses.len(), 3 + 5);
        assert_eq!(m.pending_shakes(), 0);
        assert!(m
            .drain_shakes((64, 64), &SimConfig::default(), &mut rng)
            .is_empty());
    }

    #[test]
    fn same_seed_gives_same_burst() {
        let cfg = SimConfig::default();
        let a = shake_burst(2.0, (64, 64), &cfg, &mut Xorshift64::new(99));
        let b = shake_burst(2.0, (64, 64), &cfg, &mut Xorshift64::new(99));
        assert_eq!(a, b);
    }

    #[test]
    fn clear_shakes_keeps_tilt() {
        let mut m = MotionForcing::new();
        m.set_tilt_bias(Vec3::X);
        m.on_shake(1.0);
        m.clear_shakes();
        assert_eq!(m.gravity(), Vec3::X);
        assert_eq!(m.pending_shakes(), 0);
    }
}
