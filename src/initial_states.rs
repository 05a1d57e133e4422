// src/initial_states.rs
//
// Synthetic magnetisation states for demo snapshots and tests.
//
// Positions are measured in the grid's own units from site centres
// (site (row, col) sits at (col * a, row * a)).

use crate::vector_field::VectorField2D;

#[inline]
fn normalize(v: [f64; 3]) -> [f64; 3] {
    let n2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
    if n2 == 0.0 {
        return [0.0, 0.0, 1.0];
    }
    let inv = 1.0 / n2.sqrt();
    [v[0] * inv, v[1] * inv, v[2] * inv]
}

/// Add a small random tilt to every site (useful to make arrows less regular).
pub fn add_noise(m: &mut VectorField2D, noise: f64, seed: u64) {
    if noise <= 0.0 {
        return;
    }
    let mut rng = XorShift64::new(seed);
    for v in &mut m.data {
        let dx = noise * (rng.next_f64() * 2.0 - 1.0);
        let dy = noise * (rng.next_f64() * 2.0 - 1.0);
        let dz = noise * (rng.next_f64() * 2.0 - 1.0);
        *v = normalize([v[0] + dx, v[1] + dy, v[2] + dz]);
    }
}

/// Imprint a skyrmion on top of the current state (sites outside ~r0 + 4Δ are untouched).
///
/// Profile:
///   θ(r) = 2 * atan( exp( (r0 - r)/Δ ) )
///   m_z  = p * cosθ
///   m_xy = sinθ * (cosφ, sinφ) with φ = atan2(y,x) + helicity
///
/// - `core_polarity` p = +1 puts the core along -z in a +z background.
/// - `helicity` 0 = Néel (radial), π/2 = Bloch (tangential).
pub fn init_skyrmion(
    m: &mut VectorField2D,
    center: (f64, f64),
    r0: f64,
    delta: f64,
    helicity: f64,
    core_polarity: f64,
) {
    let grid = m.grid;
    let (cx, cy) = center;
    let p = core_polarity.signum();
    let inv_delta = 1.0 / delta.max(1e-30);
    let reach = r0 + 4.0 * delta;

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (x, y) = grid.site_xy(row, col);
            let dx = x - cx;
            let dy = y - cy;
            let r = dx.hypot(dy);
            if r > reach {
                continue;
            }

            let theta = 2.0 * ((r0 - r) * inv_delta).exp().atan();
            let (st, ct) = theta.sin_cos();

            let phi = dy.atan2(dx) + helicity;
            let id = grid.idx(row, col);
            m.data[id] = normalize([st * phi.cos(), st * phi.sin(), p * ct]);
        }
    }
}

/// Sites (row, col) whose centre lies within half a lattice spacing of the circle
/// of radius `r` around `center`.
pub fn ring_sites(m: &VectorField2D, center: (f64, f64), r: f64) -> Vec<(usize, usize)> {
    let grid = m.grid;
    let half = 0.5 * grid.lattice;
    let mut out = Vec::new();
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (x, y) = grid.site_xy(row, col);
            if ((x - center.0).hypot(y - center.1) - r).abs() <= half {
                out.push((row, col));
            }
        }
    }
    out
}

// Small deterministic RNG (no extra deps)
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        let s = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        // top 53 bits -> [0,1)
        let u = self.next_u64() >> 11;
        (u as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2D;

    #[test]
    fn skyrmion_core_is_reversed_and_background_untouched() {
        let grid = Grid2D::new(32, 32, 1.0);
        let mut m = VectorField2D::new(grid);
        let c = (15.0, 15.0);
        init_skyrmion(&mut m, c, 6.0, 1.0, 0.0, 1.0);

        assert!(m.get(15, 15)[2] < -0.99);
        assert_eq!(m.get(0, 0), [0.0, 0.0, 1.0]);

        // Néel: in-plane component points radially at the wall
        let v = m.get(15, 21);
        assert!(v[0] > 0.9, "expected radial +x at the wall, got {:?}", v);
        for v in &m.data {
            let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((n - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn noise_keeps_unit_length_and_is_deterministic() {
        let grid = Grid2D::new(4, 4, 1.0);
        let mut a = VectorField2D::new(grid);
        let mut b = VectorField2D::new(grid);
        add_noise(&mut a, 0.1, 7);
        add_noise(&mut b, 0.1, 7);
        assert_eq!(a.data, b.data);
        assert!(a.data.iter().any(|v| v[0] != 0.0));
        for v in &a.data {
            let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((n - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ring_contains_axis_points() {
        let grid = Grid2D::new(21, 21, 1.0);
        let m = VectorField2D::new(grid);
        let ring = ring_sites(&m, (10.0, 10.0), 5.0);
        assert!(ring.contains(&(10, 15)));
        assert!(ring.contains(&(5, 10)));
        assert!(!ring.contains(&(10, 10)));
    }
}
