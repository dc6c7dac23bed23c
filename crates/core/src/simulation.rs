//! The `Simulation` trait implemented by per-frame surface simulations.
//!
//! The trait is object-safe so drivers (the headless CLI, a render loop) can
//! hold a `Box<dyn Simulation>` without knowing the concrete type.

use crate::error::SimError;
use crate::grid::{ScalarGrid, VectorGrid};
use glam::Vec2;
use serde_json::Value;

/// A surface simulation advanced once per rendered frame.
pub trait Simulation {
    /// Advance the simulation by `dt` seconds for a view of `view` pixels.
    ///
    /// `dt` must already be capped by the caller; implementations do not
    /// sub-step.
    fn advance(&mut self, dt: f32, view: Vec2) -> Result<(), SimError>;

    /// The current (post-swap) height grid.
    fn height(&self) -> &ScalarGrid;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Optional current velocity grid. `None` for height-only simulations.
    fn velocity(&self) -> Option<&VectorGrid> {
        None
    }
}
