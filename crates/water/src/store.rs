//! Double-buffered height and velocity grids plus the derived output grids.
//!
//! Each simulated field is a [`PingPong`] of two grids: the current buffer is
//! what impulses add to and what rendering reads, the next buffer is what the
//! integrator writes. Both fields swap together once per tick, after both
//! integrator passes, so a reader never observes a half-updated tick.
//!
//! The normal and foam grids are single-buffered: they are recomputed in full
//! from the current buffers and never feed back into the simulation.

use glam::{Vec2, Vec3};
use ripple_core::{NormalGrid, PingPong, ScalarGrid, SimError, VectorGrid};

/// Which simulated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Height,
    Velocity,
}

/// Which buffer of a double-buffered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The buffer readers see.
    Current,
    /// The buffer the integrator is writing.
    Next,
}

/// Owner of every grid of one water surface. Dimensions never change.
#[derive(Debug, Clone)]
pub struct FieldStore {
    height: PingPong<ScalarGrid>,
    velocity: PingPong<VectorGrid>,
    normals: NormalGrid,
    foam: ScalarGrid,
}

impl FieldStore {
    /// Creates a store with every grid zeroed (normals point straight up).
    ///
    /// Returns `SimError::InvalidDimensions` for a zero dimension.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        Self::from_grids(
            ScalarGrid::new(width, height)?,
            VectorGrid::new(width, height)?,
        )
    }

    /// Creates a store whose current buffers start from the given grids.
    ///
    /// Returns `SimError::DimensionMismatch` if the grids differ in shape.
    pub fn from_grids(height: ScalarGrid, velocity: VectorGrid) -> Result<Self, SimError> {
        if !height.same_shape(&velocity) {
            return Err(SimError::DimensionMismatch {
                lhs_w: height.width(),
                lhs_h: height.height(),
                rhs_w: velocity.width(),
                rhs_h: velocity.height(),
            });
        }
        let (w, h) = height.dimensions();
        let mut height_pair = PingPong::from_initial(height);
        height_pair.next_mut().clear();
        let mut velocity_pair = PingPong::from_initial(velocity);
        velocity_pair.next_mut().clear();
        Ok(Self {
            height: height_pair,
            velocity: velocity_pair,
            normals: NormalGrid::filled(w, h, Vec3::Z)?,
            foam: ScalarGrid::new(w, h)?,
        })
    }

    /// `(width, height)` in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        self.height.current().dimensions()
    }

    /// A height buffer.
    pub fn height(&self, slot: Slot) -> &ScalarGrid {
        match slot {
            Slot::Current => self.height.current(),
            Slot::Next => self.height.next(),
        }
    }

    /// A velocity buffer.
    pub fn velocity(&self, slot: Slot) -> &VectorGrid {
        match slot {
            Slot::Current => self.velocity.current(),
            Slot::Next => self.velocity.next(),
        }
    }

    /// Mutable current height, for additive impulses.
    pub fn height_mut(&mut self) -> &mut ScalarGrid {
        self.height.current_mut()
    }

    /// Mutable current height and velocity together, for directional impulses.
    pub fn current_mut(&mut self) -> (&mut ScalarGrid, &mut VectorGrid) {
        (self.height.current_mut(), self.velocity.current_mut())
    }

    /// Buffers for the velocity pass: current height, current velocity, next velocity.
    pub(crate) fn velocity_pass(&mut self) -> (&ScalarGrid, &VectorGrid, &mut VectorGrid) {
        let (v_cur, v_next) = self.velocity.split_mut();
        (self.height.current(), v_cur, v_next)
    }

    /// Buffers for the height pass: current height, freshly written next
    /// velocity, next height.
    pub(crate) fn height_pass(&mut self) -> (&ScalarGrid, &VectorGrid, &mut ScalarGrid) {
        let (h_cur, h_next) = self.height.split_mut();
        (h_cur, self.velocity.next(), h_next)
    }

    /// Flips one field's buffers.
    pub fn swap(&mut self, kind: FieldKind) {
        match kind {
            FieldKind::Height => self.height.swap(),
            FieldKind::Velocity => self.velocity.swap(),
        }
    }

    /// Flips both fields. This is the tick boundary.
    pub fn swap_all(&mut self) {
        self.height.swap();
        self.velocity.swap();
    }

    /// Derived surface normals (unit vectors, z up).
    pub fn normals(&self) -> &NormalGrid {
        &self.normals
    }

    /// Derived foam coverage in [0, 1].
    pub fn foam(&self) -> &ScalarGrid {
        &self.foam
    }

    /// Inputs and outputs of derived-field generation.
    pub(crate) fn derived_mut(
        &mut self,
    ) -> (&ScalarGrid, &VectorGrid, &mut NormalGrid, &mut ScalarGrid) {
        (
            self.height.current(),
            self.velocity.current(),
            &mut self.normals,
            &mut self.foam,
        )
    }

    /// Zeroes every buffer and resets normals to straight up.
    pub fn clear(&mut self) {
        for grid in self.height.buffers_mut() {
            grid.clear();
        }
        for grid in self.velocity.buffers_mut() {
            grid.fill(Vec2::ZERO);
        }
        self.normals.fill(Vec3::Z);
        self.foam.clear();
    }

    /// Zeroes non-finite cells in both buffers of both fields; returns the
    /// number repaired.
    pub(crate) fn repair_non_finite(&mut self) -> usize {
        let heights: usize = self
            .height
            .buffers_mut()
            .iter_mut()
            .map(|g| g.zero_non_finite())
            .sum();
        let velocities: usize = self
            .velocity
            .buffers_mut()
            .iter_mut()
            .map(|g| g.zero_non_finite())
            .sum();
        heights + velocities
    }

    /// True when every cell of every grid is finite.
    pub fn all_finite(&self) -> bool {
        self.height.current().all_finite()
            && self.height.next().all_finite()
            && self.velocity.current().all_finite()
            && self.velocity.next().all_finite()
            && self.normals.all_finite()
            && self.foam.all_finite()
    }
}
