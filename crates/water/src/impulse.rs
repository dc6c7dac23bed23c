//! Gaussian disturbances injected into the current height and velocity buffers.
//!
//! Every impulse is a Gaussian bump with `sigma = radius / 3`, evaluated at
//! cell centres (integer coordinates) around a sub-cell position and cut off
//! hard at `radius`. Only the bounding box of the footprint, clipped to the
//! grid, is visited, so an impulse never writes outside the grid and its cost
//! is bounded by the radius.

use crate::store::FieldStore;
use glam::Vec2;
use ripple_core::SimError;

/// Applies impulses to a [`FieldStore`] and counts them.
#[derive(Debug, Clone, Default)]
pub struct ImpulseApplicator {
    total: u64,
    since_mark: u64,
}

/// Inclusive cell range covered by `[center - radius, center + radius]`,
/// clipped to `[0, len)`. `None` when the footprint misses the grid.
fn clipped_span(center: f32, radius: f32, len: usize) -> Option<(usize, usize)> {
    let lo = (center - radius).floor().max(0.0);
    let hi = (center + radius).ceil().min(len as f32 - 1.0);
    if hi < lo {
        return None;
    }
    Some((lo as usize, hi as usize))
}

fn check_radius(radius: f32) -> Result<(), SimError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidRadius(radius))
    }
}

impl ImpulseApplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a radially symmetric Gaussian bump to the current height buffer:
    /// `h += strength * exp(-d² / (2 (radius/3)²))` for every cell with `d <= radius`.
    ///
    /// Returns `SimError::InvalidRadius` for a non-positive or non-finite radius.
    pub fn apply_isotropic(
        &mut self,
        store: &mut FieldStore,
        position: Vec2,
        strength: f32,
        radius: f32,
    ) -> Result<(), SimError> {
        check_radius(radius)?;
        self.record();
        let height = store.height_mut();
        let (w, h) = height.dimensions();
        let (Some((x0, x1)), Some((y0, y1))) = (
            clipped_span(position.x, radius, w),
            clipped_span(position.y, radius, h),
        ) else {
            return Ok(());
        };
        let sigma = radius / 3.0;
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
        let radius_sq = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d_sq = (Vec2::new(x as f32, y as f32) - position).length_squared();
                if d_sq > radius_sq {
                    continue;
                }
                let idx = height.index(x, y);
                height.data_mut()[idx] += strength * (-d_sq * inv_two_sigma_sq).exp();
            }
        }
        Ok(())
    }

    /// Adds a Gaussian elongated along `direction` and pushes flow along it.
    ///
    /// Distance is measured in the frame aligned with `direction`, with the
    /// perpendicular coordinate scaled by `1 + anisotropy`, so the footprint
    /// is `1 / (1 + anisotropy)` as wide across the motion as along it. Each
    /// affected cell also gains `direction * strength * weight * 0.5` of
    /// velocity. A zero direction degrades to [`Self::apply_isotropic`].
    pub fn apply_anisotropic(
        &mut self,
        store: &mut FieldStore,
        position: Vec2,
        direction: Vec2,
        strength: f32,
        radius: f32,
        anisotropy: f32,
    ) -> Result<(), SimError> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO {
            return self.apply_isotropic(store, position, strength, radius);
        }
        check_radius(radius)?;
        self.record();
        let perp = dir.perp();
        let squeeze = 1.0 + anisotropy;
        let (height, velocity) = store.current_mut();
        let (w, h) = height.dimensions();
        let (Some((x0, x1)), Some((y0, y1))) = (
            clipped_span(position.x, radius, w),
            clipped_span(position.y, radius, h),
        ) else {
            return Ok(());
        };
        let sigma = radius / 3.0;
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
        let radius_sq = radius * radius;
        let push = dir * strength * 0.5;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let offset = Vec2::new(x as f32, y as f32) - position;
                let along = offset.dot(dir);
                let across = offset.dot(perp) * squeeze;
                let d_sq = along * along + across * across;
                if d_sq > radius_sq {
                    continue;
                }
                let weight = (-d_sq * inv_two_sigma_sq).exp();
                let idx = height.index(x, y);
                height.data_mut()[idx] += strength * weight;
                velocity.data_mut()[idx] += push * weight;
            }
        }
        Ok(())
    }

    /// Impulses applied since construction.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Impulses applied since the last [`Self::mark`].
    pub fn since_mark(&self) -> u64 {
        self.since_mark
    }

    /// Starts a new counting window (called at the start of each tick).
    pub fn mark(&mut self) {
        self.since_mark = 0;
    }

    fn record(&mut self) {
        self.total += 1;
        self.since_mark += 1;
    }
}
