// src/positions.rs

use crate::grid::Grid2D;
use crate::vector_field::VectorField2D;

/// Subsampled coordinate grid used for arrow placement.
///
/// - `col_idx` / `row_idx`: the kept site indices along each axis
/// - `x` / `y`: physical positions of every kept site, row-major over the subsampled grid
/// - `fac_x` / `fac_y`: arrow scale; a unit in-plane vector spans one subsampled cell
#[derive(Debug, Clone)]
pub struct Positions {
    pub col_idx: Vec<usize>,
    pub row_idx: Vec<usize>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub fac_x: f64,
    pub fac_y: f64,
}

impl Positions {
    pub fn new(grid: &Grid2D, reduce_factor: usize) -> Self {
        let step = reduce_factor.max(1);
        let col_idx: Vec<usize> = (0..grid.cols).step_by(step).collect();
        let row_idx: Vec<usize> = (0..grid.rows).step_by(step).collect();

        let mut x = Vec::with_capacity(col_idx.len() * row_idx.len());
        let mut y = Vec::with_capacity(col_idx.len() * row_idx.len());
        for &r in &row_idx {
            for &c in &col_idx {
                let (px, py) = grid.site_xy(r, c);
                x.push(px);
                y.push(py);
            }
        }

        let fac = step as f64 * grid.lattice;
        Self {
            col_idx,
            row_idx,
            x,
            y,
            fac_x: fac,
            fac_y: fac,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// In-plane components (mx, my) at the kept sites, same order as `x`/`y`.
    pub fn sample_in_plane(&self, field: &VectorField2D) -> Vec<(f64, f64)> {
        let mut out = Vec::with_capacity(self.len());
        for &r in &self.row_idx {
            for &c in &self.col_idx {
                let v = field.get(r, c);
                out.push((v[0], v[1]));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_selects_every_nth_site() {
        let grid = Grid2D::new(5, 7, 2.0);
        let p = Positions::new(&grid, 3);
        assert_eq!(p.col_idx, vec![0, 3, 6]);
        assert_eq!(p.row_idx, vec![0, 3]);
        assert_eq!(p.len(), 6);
        assert_eq!(p.fac_x, 6.0);
        // second row of the meshgrid starts at row 3
        assert_eq!((p.x[3], p.y[3]), (0.0, 6.0));
        assert_eq!((p.x[5], p.y[5]), (12.0, 6.0));
    }

    #[test]
    fn zero_reduce_factor_keeps_every_site() {
        let grid = Grid2D::new(2, 2, 1.0);
        let p = Positions::new(&grid, 0);
        assert_eq!(p.len(), 4);
        assert_eq!(p.fac_y, 1.0);
    }

    #[test]
    fn in_plane_samples_follow_coordinates() {
        let grid = Grid2D::new(2, 3, 1.0);
        let data = (0..6).map(|i| [i as f64, -(i as f64), 0.0]).collect();
        let m = VectorField2D::from_data(grid, data).unwrap();
        let p = Positions::new(&grid, 2);
        assert_eq!(p.sample_in_plane(&m), vec![(0.0, 0.0), (2.0, -2.0)]);
    }
}
