// src/grid.rs

/// Square 2D lattice of `rows × cols` sites with spacing `lattice`.
///
/// Sites are stored row-major: site (row, col) lives at `row * cols + col`.
/// Row 0 is drawn at the bottom of the figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid2D {
    pub rows: usize,
    pub cols: usize,
    pub lattice: f64,
}

impl Grid2D {
    pub fn new(rows: usize, cols: usize, lattice: f64) -> Self {
        Self { rows, cols, lattice }
    }

    /// Total number of sites.
    pub fn n_sites(&self) -> usize {
        self.rows * self.cols
    }

    /// Convert (row, col) indices to a flat index into a 1D array.
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Same grid with a different spacing (e.g. metres -> nanometres).
    pub fn with_lattice(&self, lattice: f64) -> Self {
        Self { lattice, ..*self }
    }

    /// Physical centre of site (row, col): (col * a, row * a).
    #[inline]
    pub fn site_xy(&self, row: usize, col: usize) -> (f64, f64) {
        (col as f64 * self.lattice, row as f64 * self.lattice)
    }

    /// Image extent (min_x, max_x, min_y, max_y) so that every site is a
    /// full cell of width `lattice` centred on its position.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let a = self.lattice;
        let half = 0.5 * a;
        (
            -half,
            (self.cols as f64 - 1.0) * a + half,
            -half,
            (self.rows as f64 - 1.0) * a + half,
        )
    }

    /// cols / rows.
    pub fn aspect(&self) -> f64 {
        self.cols as f64 / self.rows as f64
    }
}
