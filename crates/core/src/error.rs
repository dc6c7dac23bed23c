//! Error types for the ripple simulation core.

use thiserror::Error;

/// Errors produced by simulation operations.
///
/// Every variant describes a precondition violation by the caller. None of
/// them are retried.
#[derive(Debug, Error)]
pub enum SimError {
    /// Width or height was zero (or their product overflowed) when creating a grid.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Two grids had incompatible dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A checked cell access was outside the grid.
    #[error("index ({x}, {y}) out of bounds for grid of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// An impulse radius was zero, negative, or not finite.
    #[error("invalid impulse radius: {0} (must be positive and finite)")]
    InvalidRadius(f32),

    /// A timestep was negative or not finite.
    #[error("invalid timestep: {0} (must be non-negative and finite)")]
    InvalidTimestep(f32),

    /// The view (screen) dimensions passed to a tick were not positive.
    #[error("invalid view size: {width} x {height}")]
    InvalidView { width: f32, height: f32 },

    /// Writing or encoding an output artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}
