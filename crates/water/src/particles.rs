//! Ballistic splash particles and their landings.
//!
//! Strong touches throw a spray of particles into the air. They fly in view
//! pixel space (y grows downward) under gravity and drag. A particle that
//! falls back through the water line while still alive is a landing; the
//! surface turns each landing into a small ripple, closing the loop between
//! the spray and the field.

use crate::config::SimConfig;
use glam::Vec2;
use ripple_core::Xorshift64;
use serde::Serialize;
use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

/// Downward acceleration in view px/s².
pub const GRAVITY: f32 = 980.0;
/// Per-tick velocity retention.
pub const DRAG: f32 = 0.98;
/// Water line as a fraction of view height.
pub const LANDING_LINE: f32 = 0.9;
/// Below this fraction of view height a particle is gone for good.
pub const OFFSCREEN_LINE: f32 = 1.2;
/// A particle must have more life than this left to land.
pub const MIN_LANDING_LIFETIME: f32 = 0.1;
/// Feedback impulse strength per px/s of landing speed.
pub const FEEDBACK_PER_SPEED: f32 = 0.0002;
/// Feedback impulse radius in texels.
pub const FEEDBACK_RADIUS: f32 = 3.0;

const PARTICLES_PER_INTENSITY: f32 = 20.0;
const MAX_SPAWN: usize = 30;
const LAUNCH_SPEED_MIN: f32 = 150.0;
const LAUNCH_SPEED_MAX: f32 = 350.0;
/// Directions shorter than this do not bias the launch.
const MIN_DIRECTION: f32 = 1e-3;
const DIRECTION_BIAS: f32 = 0.5;

/// A single particle, in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplashParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining life in (0, 1].
    pub lifetime: f32,
    pub size: f32,
}

/// A particle that hit the water this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landing {
    /// View pixels.
    pub position: Vec2,
    /// Speed at impact, px/s.
    pub speed: f32,
}

impl Landing {
    /// Strength of the ripple this landing feeds back into the field.
    pub fn feedback_strength(&self, config: &SimConfig) -> f32 {
        self.speed * FEEDBACK_PER_SPEED * config.particle_feedback_strength
    }
}

/// Live particles, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: VecDeque<SplashParticle>,
    evicted: u64,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SplashParticle> + '_ {
        self.particles.iter()
    }

    /// Particles evicted for budget since construction or the last clear.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Removes every particle and zeroes the eviction count.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.evicted = 0;
    }

    /// Throws a spray from `position` sized by `intensity`.
    ///
    /// Launch angles fan ±60° around straight up; a non-negligible
    /// `direction` drags the spray along with the swipe. Returns how many
    /// particles were spawned.
    pub fn spawn(
        &mut self,
        position: Vec2,
        direction: Vec2,
        intensity: f32,
        config: &SimConfig,
        rng: &mut Xorshift64,
    ) -> usize {
        let count = spawn_count(intensity);
        let bias = direction.length() > MIN_DIRECTION;
        for _ in 0..count {
            let angle = -FRAC_PI_2 + rng.range_f32(-FRAC_PI_3, FRAC_PI_3);
            let speed = rng.range_f32(LAUNCH_SPEED_MIN, LAUNCH_SPEED_MAX);
            let mut velocity = Vec2::from_angle(angle) * speed;
            if bias {
                velocity += direction * speed * DIRECTION_BIAS;
            }
            self.particles.push_back(SplashParticle {
                position,
                velocity,
                lifetime: 1.0,
                size: rng.range_f32(config.particle_size_min, config.particle_size_max),
            });
        }
        self.enforce_budget(config.max_particles);
        count
    }

    /// Integrates every particle by `dt` and returns this tick's landings.
    ///
    /// `view` is the view size in pixels. Landed, expired and off-screen
    /// particles are removed.
    pub fn update(&mut self, dt: f32, view: Vec2, config: &SimConfig) -> Vec<Landing> {
        let water_line = view.y * LANDING_LINE;
        let offscreen = view.y * OFFSCREEN_LINE;
        let mut landings = Vec::new();

        self.particles.retain_mut(|p| {
            let prev_y = p.position.y;
            p.velocity.y += GRAVITY * dt;
            p.velocity *= DRAG;
            p.position += p.velocity * dt;
            p.lifetime -= dt / config.particle_lifetime;

            let crossed = prev_y < water_line && p.position.y >= water_line && p.velocity.y > 0.0;
            if crossed && p.lifetime > MIN_LANDING_LIFETIME {
                landings.push(Landing {
                    position: p.position,
                    speed: p.velocity.length(),
                });
                return false;
            }
            p.lifetime > 0.0 && p.position.y <= offscreen
        });

        self.enforce_budget(config.max_particles);
        landings
    }

    fn enforce_budget(&mut self, max: usize) {
        let excess = self.particles.len().saturating_sub(max);
        if excess == 0 {
            return;
        }
        self.particles.drain(..excess);
        self.evicted += excess as u64;
        tracing::debug!(excess, max, "evicted oldest particles");
    }
}

/// Particles spawned for a splash of `intensity`.
pub fn spawn_count(intensity: f32) -> usize {
    if intensity.is_nan() || intensity <= 0.0 {
        return 0;
    }
    ((intensity * PARTICLES_PER_INTENSITY).floor() as usize).min(MAX_SPAWN)
}
