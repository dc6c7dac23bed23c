//! Fixed-size two-dimensional grids with row-major storage.
//!
//! A [`Grid`] stores `width * height` cells of any `Copy` type. Values are
//! unbounded (heights are signed displacements, velocities are vectors) and
//! nothing is clamped on write.
//!
//! Two addressing modes are provided:
//! - [`Grid::get`] / [`Grid::set`] take in-range `usize` coordinates and panic
//!   otherwise. Out-of-range access is a programming error.
//! - [`Grid::get_clamped`] takes signed coordinates and replicates the edge
//!   cells, which is what finite-difference stencils use to produce
//!   reflecting (rather than wrapping) boundaries.

use crate::error::SimError;
use glam::{Vec2, Vec3};

/// A 2D grid of `T` with fixed dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Scalar grid, used for height and foam.
pub type ScalarGrid = Grid<f32>;
/// Horizontal flow grid.
pub type VectorGrid = Grid<Vec2>;
/// Surface normal grid.
pub type NormalGrid = Grid<Vec3>;

fn checked_len(width: usize, height: usize) -> Result<usize, SimError> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(SimError::InvalidDimensions)
}

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid filled with `T::default()` (zero for numeric and glam types).
    ///
    /// Returns `SimError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        Self::filled(width, height, T::default())
    }

    /// Resets every cell to `T::default()`.
    pub fn clear(&mut self) {
        self.fill(T::default());
    }
}

impl<T: Copy> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, SimError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a grid from a pre-built row-major vector, validating that
    /// `data.len() == width * height`.
    #[cfg(test)]
    fn from_data(width: usize, height: usize, data: Vec<T>) -> Result<Self, SimError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(SimError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// True when `other` has the same width and height.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Flat row-major index of an in-range cell.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "index ({x}, {y}) out of bounds for grid of size ({}, {})",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Value at an in-range cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    /// Overwrites an in-range cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Checked read returning `SimError::OutOfBounds` instead of panicking.
    pub fn try_get(&self, x: usize, y: usize) -> Result<T, SimError> {
        if x >= self.width || y >= self.height {
            return Err(SimError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.data[y * self.width + x])
    }

    /// Value at `(x, y)` with coordinates clamped into the grid, so cells
    /// past an edge read the edge cell itself.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        let xi = x.clamp(0, self.width as isize - 1) as usize;
        let yi = y.clamp(0, self.height as isize - 1) as usize;
        self.data[yi * self.width + xi]
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

/// Cell types whose finiteness can be checked.
pub trait Finite: Copy + Default {
    fn is_finite_value(&self) -> bool;
}

impl Finite for f32 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl Finite for Vec2 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl Finite for Vec3 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl<T: Finite> Grid<T> {
    /// True when no cell holds NaN or an infinity.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(Finite::is_finite_value)
    }

    /// Replaces every non-finite cell with `T::default()` and returns how
    /// many cells were replaced.
    pub fn zero_non_finite(&mut self) -> usize {
        let mut repaired = 0;
        for v in self.data.iter_mut().filter(|v| !v.is_finite_value()) {
            *v = T::default();
            repaired += 1;
        }
        repaired
    }
}

impl Grid<f32> {
    /// Largest absolute cell value (0 for an all-zero grid).
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0_f32, |m, v| m.max(v.abs()))
    }

    /// Mean of absolute cell values.
    pub fn mean_abs(&self) -> f32 {
        self.data.iter().map(|v| v.abs()).sum::<f32>() / self.data.len() as f32
    }
}

impl Grid<Vec2> {
    /// Largest vector length across the grid.
    pub fn max_length(&self) -> f32 {
        self.data.iter().fold(0.0_f32, |m, v| m.max(v.length()))
    }
}
