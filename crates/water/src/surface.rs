//! The water surface: one caller-owned object that wires every stage together.
//!
//! A tick runs, in order:
//!
//! 1. drain the touch queue and coalesce it into at most one impulse
//!    (isotropic or directional), spawning a splash if it is strong enough;
//! 2. apply pending shake bursts;
//! 3. integrate velocity then height, and swap;
//! 4. move splash particles and feed each landing back as a small ripple;
//! 5. optionally repair non-finite cells;
//! 6. rebuild normals and foam.
//!
//! Touches arrive in view pixels; impulses work in texels. The view size is
//! passed to every tick so the mapping follows window resizes.

use crate::config::SimConfig;
use crate::derived::update_derived;
use crate::impulse::ImpulseApplicator;
use crate::integrator::{Integrator, MAX_DT};
use crate::motion::MotionForcing;
use crate::particles::{Landing, ParticleSystem, SplashParticle, FEEDBACK_RADIUS};
use crate::store::{FieldStore, Slot};
use crate::touch::{CoalescedTouch, TouchCoalescer, TouchEvent, TouchQueue};
use glam::{Vec2, Vec3};
use ripple_core::{NormalGrid, ScalarGrid, SimError, Simulation, VectorGrid, Xorshift64};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Allowance over [`MAX_DT`] before an oversized step is reported.
const DT_SLACK: f32 = 1e-4;

/// Summary of the surface after the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceStats {
    pub tick: u64,
    pub max_height: f32,
    pub mean_abs_height: f32,
    pub max_speed: f32,
    pub particles: usize,
    pub impulses_total: u64,
    pub impulses_last_tick: u64,
    pub landings_last_tick: usize,
    pub particles_evicted: u64,
    pub cells_repaired: u64,
}

/// An interactive shallow-water surface.
#[derive(Debug)]
pub struct WaterSurface {
    store: FieldStore,
    integrator: Integrator,
    impulses: ImpulseApplicator,
    queue: TouchQueue,
    coalescer: TouchCoalescer,
    motion: MotionForcing,
    particles: ParticleSystem,
    config: SimConfig,
    seed: u64,
    rng: Xorshift64,
    tick: u64,
    last_touch: Option<CoalescedTouch>,
    last_landings: Vec<Landing>,
    cells_repaired: u64,
}

impl WaterSurface {
    /// Creates a still surface of `width × height` texels.
    ///
    /// `seed` drives shake positions and splash spray. Returns
    /// `SimError::InvalidDimensions` if either dimension is zero.
    pub fn new(width: usize, height: usize, seed: u64, config: SimConfig) -> Result<Self, SimError> {
        let store = FieldStore::new(width, height)?;
        let integrator = Integrator::new(width, height)?;
        tracing::info!(width, height, seed, "water surface created");
        Ok(Self {
            store,
            integrator,
            impulses: ImpulseApplicator::new(),
            queue: TouchQueue::new(),
            coalescer: TouchCoalescer::default(),
            motion: MotionForcing::new(),
            particles: ParticleSystem::new(),
            config,
            seed,
            rng: Xorshift64::new(seed),
            tick: 0,
            last_touch: None,
            last_landings: Vec::new(),
            cells_repaired: 0,
        })
    }

    /// Creates a surface from a JSON params object, defaulting missing keys.
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, SimError> {
        Self::new(width, height, seed, SimConfig::from_json(params))
    }

    // ---- Input ----

    /// Queues a touch sampled now. `position` is in view pixels.
    pub fn submit_touch(&self, position: Vec2, force: f32) {
        self.submit_touch_at(position, Instant::now(), force);
    }

    /// Queues a touch with an explicit timestamp.
    pub fn submit_touch_at(&self, position: Vec2, timestamp: Instant, force: f32) {
        self.queue.submit(TouchEvent {
            position,
            timestamp,
            force,
        });
    }

    /// A handle input threads can submit through.
    pub fn touch_queue(&self) -> TouchQueue {
        self.queue.clone()
    }

    /// Sets the device gravity vector that tilts the water.
    pub fn set_tilt_bias(&mut self, gravity: Vec3) {
        self.motion.set_tilt_bias(gravity);
    }

    /// Queues a shake for the next tick. Returns whether it was accepted.
    pub fn on_shake(&mut self, magnitude: f32) -> bool {
        self.motion.on_shake(magnitude)
    }

    /// Drops a Gaussian bump straight onto the current height, in texels.
    ///
    /// Bypasses touch coalescing; meant for scripted rain and tests.
    pub fn add_drop(&mut self, position: Vec2, strength: f32, radius: f32) -> Result<(), SimError> {
        self.impulses
            .apply_isotropic(&mut self.store, position, strength, radius)
    }

    // ---- Driver ----

    /// Runs one tick of `dt` seconds for a view of `view` pixels.
    pub fn advance(&mut self, dt: f32, view: Vec2) -> Result<(), SimError> {
        self.advance_at(Instant::now(), dt, view)
    }

    /// Runs one tick with `now` as the touch-window reference time.
    ///
    /// Returns `SimError::InvalidTimestep` for a negative or non-finite `dt`
    /// and `SimError::InvalidView` for a non-positive view. Neither consumes
    /// queued input.
    pub fn advance_at(&mut self, now: Instant, dt: f32, view: Vec2) -> Result<(), SimError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidTimestep(dt));
        }
        if !(view.is_finite() && view.x > 0.0 && view.y > 0.0) {
            return Err(SimError::InvalidView {
                width: view.x,
                height: view.y,
            });
        }
        if dt > MAX_DT + DT_SLACK {
            tracing::warn!(dt, max = MAX_DT, "timestep above stability cap, caller should cap dt");
        }

        let config = self.config.clone();
        self.impulses.mark();
        let to_grid = self.grid_size() / view;

        self.apply_touch(now, &config, to_grid)?;
        self.apply_shakes(&config)?;

        let tilt = self.motion.tilt_bias(&config);
        self.integrator.step(&mut self.store, &config, tilt, dt)?;

        self.last_landings = self.particles.update(dt, view, &config);
        for landing in &self.last_landings {
            let texel = landing.position * to_grid;
            if !self.contains(texel) {
                continue;
            }
            self.impulses.apply_isotropic(
                &mut self.store,
                texel,
                landing.feedback_strength(&config),
                FEEDBACK_RADIUS,
            )?;
        }

        if config.finite_guard {
            let repaired = self.store.repair_non_finite();
            if repaired > 0 {
                tracing::warn!(repaired, tick = self.tick, "zeroed non-finite cells");
                self.cells_repaired += repaired as u64;
            }
        }

        update_derived(&mut self.store, &config);
        self.tick += 1;

        tracing::trace!(
            tick = self.tick,
            impulses = self.impulses.since_mark(),
            particles = self.particles.len(),
            landings = self.last_landings.len(),
            "tick"
        );
        Ok(())
    }

    fn apply_touch(&mut self, now: Instant, config: &SimConfig, to_grid: Vec2) -> Result<(), SimError> {
        let events = self.queue.drain();
        self.last_touch = self.coalescer.coalesce(events, now, config);
        let Some(touch) = self.last_touch else {
            return Ok(());
        };

        let texel = touch.position * to_grid;
        match touch.direction {
            Some(direction) => self.impulses.apply_anisotropic(
                &mut self.store,
                texel,
                // non-square views stretch directions
                (direction * to_grid).normalize_or_zero(),
                touch.strength,
                config.impulse_radius,
                config.anisotropy_factor,
            )?,
            None => self.impulses.apply_isotropic(
                &mut self.store,
                texel,
                touch.strength,
                config.impulse_radius,
            )?,
        }

        if touch.strength > config.splash_threshold {
            let spawned = self.particles.spawn(
                touch.position,
                touch.direction.unwrap_or(Vec2::ZERO),
                touch.strength,
                config,
                &mut self.rng,
            );
            tracing::debug!(spawned, strength = touch.strength, "splash");
        }
        Ok(())
    }

    fn apply_shakes(&mut self, config: &SimConfig) -> Result<(), SimError> {
        let dims = self.store.dimensions();
        for shake in self.motion.drain_shakes(dims, config, &mut self.rng) {
            self.impulses
                .apply_isotropic(&mut self.store, shake.position, shake.strength, shake.radius)?;
        }
        Ok(())
    }

    fn grid_size(&self) -> Vec2 {
        let (w, h) = self.store.dimensions();
        Vec2::new(w as f32, h as f32)
    }

    fn contains(&self, texel: Vec2) -> bool {
        let size = self.grid_size();
        texel.x >= 0.0 && texel.y >= 0.0 && texel.x < size.x && texel.y < size.y
    }

    // ---- Output ----

    /// `(width, height)` in texels.
    pub fn dimensions(&self) -> (usize, usize) {
        self.store.dimensions()
    }

    /// Current height grid.
    pub fn height(&self) -> &ScalarGrid {
        self.store.height(Slot::Current)
    }

    /// Current velocity grid.
    pub fn velocity(&self) -> &VectorGrid {
        self.store.velocity(Slot::Current)
    }

    pub fn normals(&self) -> &NormalGrid {
        self.store.normals()
    }

    pub fn foam(&self) -> &ScalarGrid {
        self.store.foam()
    }

    /// Live splash particles, oldest first.
    pub fn particles(&self) -> impl Iterator<Item = &SplashParticle> + '_ {
        self.particles.iter()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// The coalesced touch applied on the last tick, if any.
    pub fn last_touch(&self) -> Option<&CoalescedTouch> {
        self.last_touch.as_ref()
    }

    /// Particles that landed on the last tick, in view pixels.
    pub fn last_landings(&self) -> &[Landing] {
        &self.last_landings
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    /// True when every grid holds only finite values.
    pub fn is_finite(&self) -> bool {
        self.store.all_finite()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> SurfaceStats {
        let height = self.height();
        SurfaceStats {
            tick: self.tick,
            max_height: height.max_abs(),
            mean_abs_height: height.mean_abs(),
            max_speed: self.velocity().max_length(),
            particles: self.particles.len(),
            impulses_total: self.impulses.total(),
            impulses_last_tick: self.impulses.since_mark(),
            landings_last_tick: self.last_landings.len(),
            particles_evicted: self.particles.evicted(),
            cells_repaired: self.cells_repaired,
        }
    }

    // ---- Config ----

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Mutable parameters; changes take effect at the next tick.
    pub fn config_mut(&mut self) -> &mut SimConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: SimConfig) {
        self.config = config;
    }

    /// Returns the surface to still water with the original seed.
    ///
    /// Tilt and parameters are kept; everything in flight is dropped and
    /// the counters reported by [`Self::stats`] start again from zero.
    pub fn reset(&mut self) {
        self.store.clear();
        self.particles.clear();
        self.queue.clear();
        self.motion.clear_shakes();
        self.coalescer.reset();
        self.impulses = ImpulseApplicator::new();
        self.rng = Xorshift64::new(self.seed);
        self.tick = 0;
        self.cells_repaired = 0;
        self.last_touch = None;
        self.last_landings.clear();
        tracing::info!(seed = self.seed, "water surface reset");
    }
}

impl Simulation for WaterSurface {
    fn advance(&mut self, dt: f32, view: Vec2) -> Result<(), SimError> {
        WaterSurface::advance(self, dt, view)
    }

    fn height(&self) -> &ScalarGrid {
        WaterSurface::height(self)
    }

    fn params(&self) -> Value {
        self.config.to_json()
    }

    fn param_schema(&self) -> Value {
        SimConfig::schema()
    }

    fn velocity(&self) -> Option<&VectorGrid> {
        Some(WaterSurface::velocity(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MAX_SHAKE_IMPULSES;
    use serde_json::json;
    use std::time::Duration;

    const DT: f32 = 1.0 / 60.0;

    fn surface(w: usize, h: usize) -> WaterSurface {
        WaterSurface::new(w, h, 42, SimConfig::default()).unwrap()
    }

    fn view_of(s: &WaterSurface) -> Vec2 {
        let (w, h) = s.dimensions();
        Vec2::new(w as f32, h as f32)
    }

    /// Advances on a synthetic clock, one tick per `DT`.
    fn run(s: &mut WaterSurface, base: Instant, ticks: usize, view: Vec2) {
        for i in 0..ticks {
            let now = base + Duration::from_secs_f32(DT * i as f32);
            s.advance_at(now, DT, view).unwrap();
        }
    }

    // ---- Construction ----

    #[test]
    fn new_surface_is_still() {
        let s = surface(32, 16);
        assert_eq!(s.dimensions(), (32, 16));
        assert_eq!(s.height().max_abs(), 0.0);
        assert_eq!(s.particle_count(), 0);
        assert_eq!(s.tick(), 0);
    }

    #[test]
    fn new_with_zero_dimension_fails() {
        assert!(matches!(
            WaterSurface::new(0, 16, 1, SimConfig::default()),
            Err(SimError::InvalidDimensions)
        ));
    }

    #[test]
    fn from_json_reads_params() {
        let s = WaterSurface::from_json(16, 16, 1, &json!({"wave_speed": 25.0})).unwrap();
        assert_eq!(s.config().wave_speed, 25.0);
        assert_eq!(s.config().damping, SimConfig::default().damping);
    }

    // ---- Driver validation ----

    #[test]
    fn advance_rejects_bad_timestep() {
        let mut s = surface(8, 8);
        let view = view_of(&s);
        assert!(matches!(
            s.advance(-0.01, view),
            Err(SimError::InvalidTimestep(_))
        ));
        assert!(matches!(
            s.advance(f32::NAN, view),
            Err(SimError::InvalidTimestep(_))
        ));
        assert_eq!(s.tick(), 0);
    }

    #[test]
    fn advance_rejects_bad_view_without_consuming_touches() {
        let mut s = surface(8, 8);
        s.submit_touch(Vec2::new(4.0, 4.0), 1.0);
        assert!(matches!(
            s.advance(DT, Vec2::new(0.0, 8.0)),
            Err(SimError::InvalidView { .. })
        ));
        assert_eq!(s.touch_queue().len(), 1);
    }

    #[test]
    fn zero_dt_is_a_valid_tick() {
        let mut s = surface(8, 8);
        let view = view_of(&s);
        s.advance(0.0, view).unwrap();
        assert_eq!(s.tick(), 1);
    }

    // ---- Concrete scenario ----

    #[test]
    fn single_drop_spreads_after_one_tick() {
        let mut s = surface(64, 64);
        s.add_drop(Vec2::new(32.0, 32.0), 1.0, 10.0).unwrap();
        assert!((s.height().get(32, 32) - 1.0).abs() < 1e-6);
        s.advance_at(Instant::now(), 0.016, Vec2::new(64.0, 64.0))
            .unwrap();
        let centre = s.height().get(32, 32);
        assert!(centre.is_finite());
        assert!(centre > 0.0 && centre < 1.0, "centre {centre}");
        for (x, y) in [(31, 32), (33, 32), (32, 31), (32, 33)] {
            assert!(s.height().get(x, y) != 0.0, "({x}, {y}) untouched");
        }
    }

    // ---- Damping monotonicity ----

    #[test]
    fn origin_energy_does_not_grow() {
        let mut s = surface(128, 128);
        s.add_drop(Vec2::new(64.0, 64.0), 1.0, 10.0).unwrap();
        let view = view_of(&s);
        let mut samples = Vec::new();
        for _ in 0..90 {
            s.advance_at(Instant::now(), DT, view).unwrap();
            samples.push(s.height().get(64, 64).abs());
        }
        let windows: Vec<f32> = samples[10..90]
            .chunks(20)
            .map(|w| w.iter().copied().fold(0.0, f32::max))
            .collect();
        for pair in windows.windows(2) {
            assert!(pair[1] <= pair[0], "window max grew: {windows:?}");
        }
    }

    // ---- Finiteness ----

    #[test]
    fn stays_finite_for_a_thousand_ticks_of_abuse() {
        let mut s = surface(32, 32);
        s.set_tilt_bias(Vec3::new(0.6, -0.7, -0.4));
        let view = Vec2::new(320.0, 320.0);
        let base = Instant::now();
        for i in 0..1000u32 {
            let now = base + Duration::from_secs_f32(DT * i as f32);
            if i % 100 == 0 {
                s.on_shake(2.0);
            }
            if i % 7 == 0 {
                let angle = i as f32 * 0.37;
                let p = Vec2::new(160.0, 160.0) + Vec2::from_angle(angle) * 120.0;
                s.submit_touch_at(p, now, 1.0);
            }
            s.advance_at(now, DT, view).unwrap();
            assert!(s.is_finite(), "non-finite field at tick {i}");
            assert!(s
                .particles()
                .all(|p| p.position.is_finite() && p.velocity.is_finite()));
        }
        assert!(s.stats().impulses_total > 100);
    }

    // ---- Boundary reflection ----

    #[test]
    fn wall_reflects_a_weaker_wave() {
        // Heights at the drop origin over ticks 25..60.
        fn origin_trace(size: usize, origin: (usize, usize)) -> (f32, Vec<f32>) {
            let mut s = surface(size, size);
            let (x, y) = origin;
            s.add_drop(Vec2::new(x as f32, y as f32), 1.0, 6.0).unwrap();
            let peak = s.height().get(x, y);
            let view = view_of(&s);
            let mut trace = Vec::new();
            for t in 0..60 {
                s.advance_at(Instant::now(), DT, view).unwrap();
                if t >= 25 {
                    trace.push(s.height().get(x, y));
                }
            }
            (peak, trace)
        }

        let (peak, near_wall) = origin_trace(64, (16, 32));
        let (_, open_water) = origin_trace(160, (80, 80));

        let difference: f32 = near_wall
            .iter()
            .zip(&open_water)
            .map(|(a, b)| (a - b).abs())
            .sum();
        let open_disturbance: f32 = open_water.iter().map(|h| h.abs()).sum();
        assert!(
            difference > 0.5 * open_disturbance,
            "wall changed nothing: {difference} vs {open_disturbance}"
        );

        let returned = near_wall.iter().fold(0.0f32, |m, h| m.max(h.abs()));
        assert!(returned > 1e-3, "no reflection reached the origin");
        assert!(returned < peak);
    }

    // ---- Touch coalescing ----

    #[test]
    fn burst_of_touches_becomes_one_impulse() {
        let mut s = surface(64, 64);
        let base = Instant::now();
        for i in 0..8u64 {
            let jitter = i as f32 * 0.1;
            s.submit_touch_at(
                Vec2::new(30.0 + jitter, 30.0 - jitter),
                base + Duration::from_millis(i),
                1.0,
            );
        }
        let view = view_of(&s);
        s.advance_at(base + Duration::from_millis(10), DT, view)
            .unwrap();
        assert_eq!(s.stats().impulses_last_tick, 1);
        assert!(s.last_touch().is_some());
        assert!(s.touch_queue().is_empty());
    }

    #[test]
    fn stale_touches_produce_no_impulse() {
        let mut s = surface(32, 32);
        let base = Instant::now();
        s.submit_touch_at(Vec2::new(10.0, 10.0), base, 1.0);
        let view = view_of(&s);
        s.advance_at(base + Duration::from_millis(50), DT, view)
            .unwrap();
        assert_eq!(s.stats().impulses_last_tick, 0);
        assert!(s.touch_queue().is_empty());
    }

    #[test]
    fn touches_from_another_thread_are_applied() {
        let mut s = surface(32, 32);
        let queue = s.touch_queue();
        let now = Instant::now();
        std::thread::spawn(move || {
            queue.submit(TouchEvent {
                position: Vec2::new(16.0, 16.0),
                timestamp: now,
                force: 1.0,
            });
        })
        .join()
        .unwrap();
        let view = view_of(&s);
        s.advance_at(now, DT, view).unwrap();
        assert_eq!(s.stats().impulses_last_tick, 1);
    }

    #[test]
    fn touch_position_maps_from_view_to_grid() {
        let mut s = surface(64, 32);
        let now = Instant::now();
        // view is 10x larger than the grid
        s.submit_touch_at(Vec2::new(200.0, 100.0), now, 1.0);
        s.advance_at(now, 0.0, Vec2::new(640.0, 320.0)).unwrap();
        let h = s.height();
        assert!(h.get(20, 10) > 0.0);
        assert!(h.get(20, 10) >= h.get(24, 10));
        assert_eq!(h.get(60, 28), 0.0);
    }

    // ---- Directional impulse ----

    #[test]
    fn fast_swipe_leaves_elongated_footprint() {
        let mut s = surface(128, 128);
        let view = view_of(&s);
        let base = Instant::now();
        s.submit_touch_at(Vec2::new(64.0, 20.0), base, 1.0);
        s.advance_at(base, 0.001, view).unwrap();
        assert!(s.last_touch().unwrap().direction.is_none());

        let later = base + Duration::from_millis(16);
        s.submit_touch_at(Vec2::new(64.0, 64.0), later, 1.0);
        s.advance_at(later, 0.001, view).unwrap();
        let touch = *s.last_touch().unwrap();
        let dir = touch.direction.expect("fast swipe should be directional");
        assert!((dir - Vec2::Y).length() < 1e-5);

        let h = s.height();
        let threshold = 0.02;
        let along = (52..=76).filter(|&y| h.get(64, y) > threshold).count();
        let across = (52..=76).filter(|&x| h.get(x, 64) > threshold).count();
        assert!(across * 2 < along, "along {along}, across {across}");
        // directional touches also push the water
        assert!(s.velocity().get(64, 64).y > 0.0);
    }

    // ---- Motion ----

    #[test]
    fn shake_applies_burst_on_next_tick() {
        let mut s = surface(64, 64);
        assert!(s.on_shake(1.0));
        assert!(!s.on_shake(-1.0));
        let view = view_of(&s);
        s.advance(DT, view).unwrap();
        assert_eq!(s.stats().impulses_last_tick, 5);
        assert!(s.height().max_abs() > 0.0);
        s.advance(DT, view).unwrap();
        assert_eq!(s.stats().impulses_last_tick, 0);
    }

    #[test]
    fn violent_shake_stays_bounded() {
        let mut s = surface(16, 16);
        assert!(s.on_shake(1e20));
        s.advance(DT, view_of(&s)).unwrap();
        assert_eq!(s.stats().impulses_last_tick, MAX_SHAKE_IMPULSES as u64);
    }

    #[test]
    fn tilt_drives_flow_downhill() {
        let mut s = surface(64, 64);
        s.set_tilt_bias(Vec3::new(1.0, 0.0, 0.0));
        let view = view_of(&s);
        run(&mut s, Instant::now(), 5, view);
        assert!(s.velocity().get(32, 32).x > 0.0);
        // water piles up against the right wall
        assert!(s.height().get(63, 32) > s.height().get(0, 32));
    }

    #[test]
    fn config_changes_apply_next_tick() {
        let mut s = surface(64, 64);
        s.set_tilt_bias(Vec3::new(1.0, 0.0, 0.0));
        s.config_mut().tilt_bias_scale = 0.0;
        let view = view_of(&s);
        s.advance(DT, view).unwrap();
        assert_eq!(s.velocity().max_length(), 0.0);
        s.set_config(SimConfig::default());
        s.advance(DT, view).unwrap();
        assert!(s.velocity().max_length() > 0.0);
    }

    // ---- Particles ----

    #[test]
    fn strong_touch_spawns_splash() {
        let mut s = surface(64, 64);
        let now = Instant::now();
        s.submit_touch_at(Vec2::new(320.0, 300.0), now, 1.0);
        s.advance_at(now, DT, Vec2::new(640.0, 640.0)).unwrap();
        // impulse_strength 0.6 > splash_threshold 0.5
        assert_eq!(s.particle_count(), 12);
    }

    #[test]
    fn weak_touch_spawns_nothing() {
        let mut s = surface(64, 64);
        let now = Instant::now();
        s.submit_touch_at(Vec2::new(320.0, 300.0), now, 0.5);
        s.advance_at(now, DT, Vec2::new(640.0, 640.0)).unwrap();
        assert_eq!(s.particle_count(), 0);
        assert_eq!(s.stats().impulses_last_tick, 1);
    }

    #[test]
    fn particle_budget_is_never_exceeded() {
        let cfg = SimConfig {
            max_particles: 20,
            ..SimConfig::default()
        };
        let mut s = WaterSurface::new(64, 64, 9, cfg).unwrap();
        let view = Vec2::new(640.0, 640.0);
        let base = Instant::now();
        for i in 0..240u32 {
            let now = base + Duration::from_secs_f32(DT * i as f32);
            // alternate far apart so nothing is debounced
            let x = if i % 2 == 0 { 100.0 } else { 500.0 };
            s.submit_touch_at(Vec2::new(x, 300.0), now, 1.0);
            s.advance_at(now, DT, view).unwrap();
            assert!(s.particle_count() <= 20, "tick {i}: {}", s.particle_count());
        }
        assert!(s.stats().particles_evicted > 0);
    }

    #[test]
    fn landing_raises_water_where_it_lands() {
        let with_feedback = SimConfig::default();
        let without_feedback = SimConfig {
            particle_feedback_strength: 0.0,
            ..SimConfig::default()
        };
        let mut a = WaterSurface::new(64, 64, 5, with_feedback).unwrap();
        let mut b = WaterSurface::new(64, 64, 5, without_feedback).unwrap();
        let view = Vec2::new(640.0, 640.0);
        let base = Instant::now();
        a.submit_touch_at(Vec2::new(320.0, 540.0), base, 1.0);
        b.submit_touch_at(Vec2::new(320.0, 540.0), base, 1.0);

        for i in 0..120u32 {
            let now = base + Duration::from_secs_f32(DT * i as f32);
            a.advance_at(now, DT, view).unwrap();
            b.advance_at(now, DT, view).unwrap();
            if a.last_landings().is_empty() {
                assert_eq!(a.height(), b.height());
                continue;
            }
            for landing in a.last_landings() {
                let texel = (landing.position * Vec2::new(0.1, 0.1)).round();
                let (x, y) = ((texel.x as usize).min(63), (texel.y as usize).min(63));
                assert!(
                    a.height().get(x, y) > b.height().get(x, y),
                    "landing at {texel:?} left no ripple"
                );
            }
            return;
        }
        panic!("no particle landed");
    }

    // ---- Reset and stats ----

    #[test]
    fn reset_returns_to_still_water() {
        let mut s = surface(32, 32);
        s.set_tilt_bias(Vec3::X);
        s.add_drop(Vec2::new(16.0, 16.0), 1.0, 6.0).unwrap();
        s.submit_touch(Vec2::new(5.0, 5.0), 1.0);
        s.on_shake(1.0);
        let view = view_of(&s);
        s.advance(DT, view).unwrap();
        s.submit_touch(Vec2::new(5.0, 5.0), 1.0);
        s.on_shake(1.0);
        s.reset();
        assert_eq!(s.tick(), 0);
        assert_eq!(s.height().max_abs(), 0.0);
        assert_eq!(s.velocity().max_length(), 0.0);
        assert_eq!(s.particle_count(), 0);
        assert!(s.touch_queue().is_empty());
        assert!(s.last_touch().is_none());
        let stats = s.stats();
        assert_eq!(stats.impulses_total, 0);
        assert_eq!(stats.cells_repaired, 0);
        assert_eq!(stats.particles_evicted, 0);
        s.set_tilt_bias(Vec3::ZERO);
        s.advance(DT, view).unwrap();
        assert_eq!(s.stats().impulses_last_tick, 0);
    }

    #[test]
    fn reset_clears_repair_and_eviction_counters() {
        let config = SimConfig {
            finite_guard: true,
            max_particles: 4,
            ..SimConfig::default()
        };
        let mut s = WaterSurface::new(32, 32, 5, config).unwrap();
        let view = Vec2::new(320.0, 320.0);
        s.add_drop(Vec2::new(8.0, 8.0), f32::NAN, 3.0).unwrap();
        s.submit_touch(Vec2::new(160.0, 160.0), 2.0);
        s.advance(DT, view).unwrap();
        let before = s.stats();
        assert!(before.cells_repaired > 0);
        assert!(before.particles_evicted > 0);

        s.reset();
        let after = s.stats();
        assert_eq!(after.tick, 0);
        assert_eq!(after.impulses_total, 0);
        assert_eq!(after.cells_repaired, 0);
        assert_eq!(after.particles_evicted, 0);
    }

    #[test]
    fn same_seed_same_run() {
        let drive = |s: &mut WaterSurface| {
            s.on_shake(1.5);
            let view = view_of(s);
            run(s, Instant::now(), 20, view);
        };
        let mut a = surface(32, 32);
        let mut b = surface(32, 32);
        drive(&mut a);
        drive(&mut b);
        assert_eq!(a.height(), b.height());
    }

    #[test]
    fn stats_serialize_to_json() {
        let mut s = surface(16, 16);
        s.add_drop(Vec2::new(8.0, 8.0), 0.5, 4.0).unwrap();
        let view = view_of(&s);
        s.advance(DT, view).unwrap();
        let stats = s.stats();
        assert_eq!(stats.tick, 1);
        assert_eq!(stats.impulses_total, 1);
        let v = serde_json::to_value(stats).unwrap();
        assert_eq!(v["tick"], 1);
        assert!(v["max_height"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn finite_guard_repairs_poisoned_cells() {
        let cfg = SimConfig {
            finite_guard: true,
            ..SimConfig::default()
        };
        let mut s = WaterSurface::new(16, 16, 1, cfg).unwrap();
        s.add_drop(Vec2::new(8.0, 8.0), f32::NAN, 2.0).unwrap();
        let view = view_of(&s);
        s.advance(DT, view).unwrap();
        assert!(s.is_finite());
        assert!(s.stats().cells_repaired > 0);
    }

    #[test]
    fn without_guard_nan_is_left_alone() {
        let mut s = surface(16, 16);
        s.add_drop(Vec2::new(8.0, 8.0), f32::NAN, 2.0).unwrap();
        let view = view_of(&s);
        s.advance(DT, view).unwrap();
        assert!(!s.is_finite());
    }

    #[test]
    fn works_as_a_boxed_simulation() {
        let mut sim: Box<dyn Simulation> = Box::new(surface(16, 16));
        sim.advance(DT, Vec2::new(16.0, 16.0)).unwrap();
        assert!(sim.velocity().is_some());
        assert_eq!(sim.height().dimensions(), (16, 16));
        assert_eq!(sim.params(), SimConfig::default().to_json());
        assert!(sim.param_schema().get("wave_speed").is_some());
    }
}
