// src/vector_field.rs

use crate::error::{PlotError, Result};
use crate::grid::Grid2D;

/// One frame of the magnetisation field on a 2D lattice.
/// Each site stores (mx, my, mz).
#[derive(Debug, Clone)]
pub struct VectorField2D {
    pub grid: Grid2D,
    pub data: Vec<[f64; 3]>,
}

impl VectorField2D {
    /// Create a new field on the given grid, initialised along +z.
    pub fn new(grid: Grid2D) -> Self {
        let n = grid.n_sites();
        Self {
            grid,
            data: vec![[0.0, 0.0, 1.0]; n],
        }
    }

    /// Wrap existing per-site data; the length must match the grid.
    pub fn from_data(grid: Grid2D, data: Vec<[f64; 3]>) -> Result<Self> {
        if data.len() != grid.n_sites() {
            return Err(PlotError::LengthMismatch {
                got: data.len(),
                expected: grid.n_sites(),
            });
        }
        Ok(Self { grid, data })
    }

    /// Set all sites to the same magnetisation (mx, my, mz).
    pub fn set_uniform(&mut self, mx: f64, my: f64, mz: f64) {
        for cell in &mut self.data {
            *cell = [mx, my, mz];
        }
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        self.grid.idx(row, col)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> [f64; 3] {
        self.data[self.idx(row, col)]
    }

    /// Row-major plane of component `k` (0 = x, 1 = y, 2 = z).
    pub fn component(&self, k: usize) -> Vec<f64> {
        self.data.iter().map(|v| v[k]).collect()
    }

    /// Same field with the grid spacing replaced (unit conversion only).
    pub fn rescaled(mut self, lattice: f64) -> Self {
        self.grid = self.grid.with_lattice(lattice);
        self
    }
}
