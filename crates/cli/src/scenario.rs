//! Scripted input for headless runs.
//!
//! Each scenario feeds the surface the kind of input a user or device would:
//! taps, a continuous swipe, raindrops, shakes or a slowly rocking tilt. All
//! randomness comes from a PRNG seeded from the run's seed and all touch
//! timestamps from a synthetic clock, so a [`Seed`] replays exactly.

use crate::error::CliError;
use clap::ValueEnum;
use glam::{Vec2, Vec3};
use ripple_core::{Seed, SimError, Xorshift64};
use ripple_water::{cap_dt, WaterSurface, MAX_DT};
use std::time::{Duration, Instant};

/// Keeps scenario randomness independent of the surface's own stream.
const SCENARIO_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Ticks between taps.
const TAP_INTERVAL: usize = 30;
/// Ticks for one full swipe across the view.
const SWIPE_PERIOD: usize = 120;
const RAIN_CHANCE: f32 = 0.25;
const RAIN_STRENGTH: f32 = 0.3;
const RAIN_RADIUS: f32 = 4.0;
const SHAKE_INTERVAL: usize = 90;
const SHAKE_MAGNITUDE: f32 = 1.5;
/// Radians per tick of the rocking tilt.
const TILT_RATE: f32 = 0.02;

/// Input script for a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Single taps at random spots.
    Tap,
    /// One finger sweeping back and forth.
    Swipe,
    /// Random small drops straight onto the surface.
    Rain,
    /// Periodic device shakes.
    Shake,
    /// Device slowly rocking left and right.
    Tilt,
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Tap => "tap",
            Scenario::Swipe => "swipe",
            Scenario::Rain => "rain",
            Scenario::Shake => "shake",
            Scenario::Tilt => "tilt",
        }
    }

    /// Parses a scenario name as stored in a [`Seed`].
    pub fn from_name(name: &str) -> Result<Self, CliError> {
        Scenario::from_str(name, true)
            .map_err(|_| CliError::Input(format!("unknown scenario: {name}")))
    }
}

/// Drives one scenario against a surface, tick by tick.
#[derive(Debug)]
pub struct ScenarioDriver {
    scenario: Scenario,
    rng: Xorshift64,
}

impl ScenarioDriver {
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        Self {
            scenario,
            rng: Xorshift64::new(seed ^ SCENARIO_SEED_SALT),
        }
    }

    /// Feeds this tick's input. `now` is the tick's synthetic time.
    pub fn apply(
        &mut self,
        surface: &mut WaterSurface,
        tick: usize,
        now: Instant,
        view: Vec2,
    ) -> Result<(), SimError> {
        match self.scenario {
            Scenario::Tap => {
                if tick % TAP_INTERVAL == 0 {
                    let p = Vec2::new(
                        self.rng.range_f32(0.1, 0.9) * view.x,
                        self.rng.range_f32(0.1, 0.9) * view.y,
                    );
                    surface.submit_touch_at(p, now, 1.0);
                }
            }
            Scenario::Swipe => {
                let phase = (tick % SWIPE_PERIOD) as f32 / SWIPE_PERIOD as f32;
                let sweep = 0.5 - 0.4 * (phase * std::f32::consts::TAU).cos();
                let p = Vec2::new(sweep * view.x, 0.5 * view.y);
                surface.submit_touch_at(p, now, 0.8);
            }
            Scenario::Rain => {
                if self.rng.next_f32() < RAIN_CHANCE {
                    let (w, h) = surface.dimensions();
                    let p = Vec2::new(
                        self.rng.range_f32(0.0, w as f32),
                        self.rng.range_f32(0.0, h as f32),
                    );
                    surface.add_drop(p, RAIN_STRENGTH, RAIN_RADIUS)?;
                }
            }
            Scenario::Shake => {
                if tick % SHAKE_INTERVAL == 0 {
                    surface.on_shake(SHAKE_MAGNITUDE);
                }
            }
            Scenario::Tilt => {
                let angle = (tick as f32 * TILT_RATE).sin() * 0.5;
                surface.set_tilt_bias(Vec3::new(angle.sin(), 0.0, -angle.cos()));
            }
        }
        Ok(())
    }
}

/// Builds a surface from `seed` and runs its scenario for `seed.steps` ticks.
pub fn run_seed(seed: &Seed) -> Result<WaterSurface, CliError> {
    seed.validate()?;
    let scenario = Scenario::from_name(&seed.scenario)?;
    let mut surface = WaterSurface::from_json(seed.width, seed.height, seed.seed, &seed.params)?;
    let mut driver = ScenarioDriver::new(scenario, seed.seed);

    let view = Vec2::new(seed.view_width, seed.view_height);
    let dt = cap_dt(seed.dt, MAX_DT);
    if dt != seed.dt {
        tracing::warn!(requested = seed.dt, used = dt, "timestep capped");
    }

    let base = Instant::now();
    for tick in 0..seed.steps {
        let now = base + Duration::from_secs_f32(dt * tick as f32);
        driver.apply(&mut surface, tick, now, view)?;
        surface.advance_at(now, dt, view)?;
    }
    tracing::info!(
        scenario = scenario.name(),
        steps = seed.steps,
        "scenario complete"
    );
    Ok(surface)
}
