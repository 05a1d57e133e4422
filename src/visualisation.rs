// src/visualisation.rs
//
// Figure composition: m_z heat map + colorbar, optional quiver arrows and
// optional square site markers. Geometry is computed up front (LatticeFigure::build)
// so the plotters pass in `save_png` only draws.

use std::path::Path;

use plotters::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::colormap::{ColorMap, VMAX, VMIN};
use crate::config::{Interpolation, PlotConfig};
use crate::error::{PlotError, Result};
use crate::grid::Grid2D;
use crate::positions::Positions;
use crate::snapshot::ensure_parent_dir;
use crate::vector_field::VectorField2D;

/// Axes rectangle as figure fractions: left, bottom, width, height.
const AXES_RECT: [f64; 4] = [0.12, 0.12, 0.75, 0.83];
/// Colorbar width relative to the axes width, and its gap in inches.
const CBAR_FRACTION: f64 = 0.05;
const CBAR_PAD_IN: f64 = 0.05;
/// Sub-cells per site edge for bilinear interpolation.
const BILINEAR_SUB: usize = 4;
const COLORBAR_STEPS: usize = 256;
/// Arrow shaft width as a fraction of the axes width.
const ARROW_WIDTH: f64 = 0.0013;
const HEAD_LENGTH: f64 = 0.3;
const HEAD_ANGLE_DEG: f64 = 25.0;
const MIN_FIGURE_PX: u32 = 16;
/// Largest edge the bitmap backend is asked to allocate.
const MAX_FIGURE_PX: u32 = 20_000;

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

/// Figure size (inches) for a lattice with `aspect = cols / rows`.
/// Wide lattices stretch the width, tall lattices stretch the height.
pub fn figure_size_inches(aspect: f64, width: f64, height: f64) -> (f64, f64) {
    let h = height * AXES_RECT[2] / AXES_RECT[3];
    if aspect >= 1.0 {
        (width * aspect, h)
    } else {
        (width, h / aspect)
    }
}

fn pt_to_px(pt: f64, dpi: u32) -> f64 {
    pt * dpi as f64 / 72.0
}

/// Pixel layout of the figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureLayout {
    pub width: u32,
    pub height: u32,
    /// Space left of the axes (y tick labels and description).
    pub left: u32,
    /// Space below the axes (x tick labels and description).
    pub bottom: u32,
    pub top: u32,
    pub axes_w: u32,
    pub axes_h: u32,
    pub cbar_pad: u32,
    pub cbar_w: u32,
    pub dpi: u32,
}

impl FigureLayout {
    pub fn new(grid: &Grid2D, width_in: f64, height_in: f64, dpi: u32) -> Result<Self> {
        let (w_in, h_in) = figure_size_inches(grid.aspect(), width_in, height_in);
        let (w_px, h_px) = ((w_in * dpi as f64).round(), (h_in * dpi as f64).round());
        // NaN fails both comparisons and is caught here too
        if !(w_px <= MAX_FIGURE_PX as f64 && h_px <= MAX_FIGURE_PX as f64) {
            return Err(PlotError::Config(format!(
                "figure of {}x{} px exceeds the {} px limit; lower --dpi or the figure size",
                w_px, h_px, MAX_FIGURE_PX
            )));
        }
        let width = w_px as u32;
        let height = h_px as u32;
        if width < MIN_FIGURE_PX || height < MIN_FIGURE_PX {
            return Err(PlotError::Config(format!(
                "figure of {}x{} px is too small to draw",
                width, height
            )));
        }

        let frac = |f: f64, total: u32| (f * total as f64).round() as u32;
        let left = frac(AXES_RECT[0], width);
        let bottom = frac(AXES_RECT[1], height);
        let axes_w = frac(AXES_RECT[2], width);
        let axes_h = frac(AXES_RECT[3], height);
        let top = height.saturating_sub(bottom + axes_h);

        Ok(Self {
            width,
            height,
            left,
            bottom,
            top,
            axes_w,
            axes_h,
            cbar_pad: (CBAR_PAD_IN * dpi as f64).round() as u32,
            cbar_w: frac(CBAR_FRACTION, axes_w).max(1),
            dpi,
        })
    }

    /// Width of the strip right of the axes that holds the colorbar.
    pub fn colorbar_strip(&self) -> u32 {
        self.width.saturating_sub(self.left + self.axes_w)
    }
}

/// One filled rectangle of the heat map, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub lo: (f64, f64),
    pub hi: (f64, f64),
    pub color: RGBColor,
}

/// Quiver arrow with its midpoint on the site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub tail: (f64, f64),
    pub tip: (f64, f64),
    pub head: [(f64, f64); 2],
}

#[derive(Debug, Clone)]
pub struct MarkerLayer {
    pub label: String,
    pub color: RGBColor,
    pub squares: Vec<[(f64, f64); 2]>,
}

impl MarkerLayer {
    /// Squares of side `lattice` centred on each point.
    pub fn new(label: &str, points: &[(f64, f64)], lattice: f64, color: RGBColor) -> Self {
        let h = 0.5 * lattice;
        let squares = points
            .iter()
            .map(|&(x, y)| [(x - h, y - h), (x + h, y + h)])
            .collect();
        Self {
            label: label.to_string(),
            color,
            squares,
        }
    }
}

/// Bilinear sample at fractional site coordinates (u = col, v = row),
/// clamped to the outermost site centres.
fn sample_bilinear(field: &VectorField2D, u: f64, v: f64) -> [f64; 3] {
    let g = &field.grid;
    let u = u.clamp(0.0, (g.cols - 1) as f64);
    let v = v.clamp(0.0, (g.rows - 1) as f64);
    let c0 = u.floor() as usize;
    let r0 = v.floor() as usize;
    let c1 = (c0 + 1).min(g.cols - 1);
    let r1 = (r0 + 1).min(g.rows - 1);
    let tu = u - c0 as f64;
    let tv = v - r0 as f64;

    let a = field.get(r0, c0);
    let b = field.get(r0, c1);
    let c = field.get(r1, c0);
    let d = field.get(r1, c1);

    let mut out = [0.0; 3];
    for k in 0..3 {
        let bottom = a[k] * (1.0 - tu) + b[k] * tu;
        let top = c[k] * (1.0 - tu) + d[k] * tu;
        out[k] = bottom * (1.0 - tv) + top * tv;
    }
    out
}

/// Heat-map rectangles for the field, origin lower (row 0 at the bottom).
pub fn heatmap_cells(field: &VectorField2D, cmap: ColorMap, interpolation: Interpolation) -> Vec<Cell> {
    let g = field.grid;
    let a = g.lattice;

    match interpolation {
        Interpolation::None | Interpolation::Nearest => (0..g.n_sites())
            .map(|id| {
                let (row, col) = (id / g.cols, id % g.cols);
                let (x, y) = g.site_xy(row, col);
                Cell {
                    lo: (x - 0.5 * a, y - 0.5 * a),
                    hi: (x + 0.5 * a, y + 0.5 * a),
                    color: cmap.site_color(field.data[id]),
                }
            })
            .collect(),
        Interpolation::Bilinear => {
            let n = BILINEAR_SUB;
            let sub_cols = g.cols * n;
            let sub = a / n as f64;
            (0..g.rows * n * sub_cols)
                .into_par_iter()
                .map(|k| {
                    let (sr, sc) = (k / sub_cols, k % sub_cols);
                    // sub-cell centre in site units
                    let u = (sc as f64 + 0.5) / n as f64 - 0.5;
                    let v = (sr as f64 + 0.5) / n as f64 - 0.5;
                    let m = sample_bilinear(field, u, v);
                    let x0 = sc as f64 * sub - 0.5 * a;
                    let y0 = sr as f64 * sub - 0.5 * a;
                    Cell {
                        lo: (x0, y0),
                        hi: (x0 + sub, y0 + sub),
                        color: cmap.site_color(m),
                    }
                })
                .collect()
        }
    }
}

/// Arrows for the in-plane components at the subsampled sites.
/// Vectors are scaled by (fac_x, fac_y); zero-length vectors are skipped.
pub fn quiver_arrows(positions: &Positions, field: &VectorField2D) -> Vec<Arrow> {
    let (sin, cos) = HEAD_ANGLE_DEG.to_radians().sin_cos();
    positions
        .x
        .iter()
        .zip(&positions.y)
        .zip(positions.sample_in_plane(field))
        .filter_map(|((&x, &y), (mx, my))| {
            let dx = mx * positions.fac_x;
            let dy = my * positions.fac_y;
            let len = dx.hypot(dy);
            if !len.is_finite() || len < 1e-12 {
                return None;
            }
            let tail = (x - 0.5 * dx, y - 0.5 * dy);
            let tip = (x + 0.5 * dx, y + 0.5 * dy);

            // unit vector pointing back along the shaft, rotated by ±angle
            let (bx, by) = (-dx / len, -dy / len);
            let hl = HEAD_LENGTH * len;
            let left = (bx * cos - by * sin, bx * sin + by * cos);
            let right = (bx * cos + by * sin, -bx * sin + by * cos);
            Some(Arrow {
                tail,
                tip,
                head: [
                    (tip.0 + hl * left.0, tip.1 + hl * left.1),
                    (tip.0 + hl * right.0, tip.1 + hl * right.1),
                ],
            })
        })
        .collect()
}

/// Everything needed to draw one figure, in display units (nm).
#[derive(Debug, Clone)]
pub struct LatticeFigure {
    pub layout: FigureLayout,
    pub extent: (f64, f64, f64, f64),
    pub cells: Vec<Cell>,
    pub arrows: Vec<Arrow>,
    pub markers: Vec<MarkerLayer>,
    pub colormap: ColorMap,
    pub font: &'static str,
}

impl LatticeFigure {
    /// `field` must already be in display units; markers are drawn in the given order.
    pub fn build(field: &VectorField2D, cfg: &PlotConfig, markers: Vec<MarkerLayer>) -> Result<Self> {
        let grid = field.grid;
        let layout = FigureLayout::new(&grid, cfg.width, cfg.height, cfg.dpi)?;
        let cells = heatmap_cells(field, cfg.colormap, cfg.interpolation);

        let arrows = if cfg.arrows {
            let positions = Positions::new(&grid, cfg.reduce_factor);
            quiver_arrows(&positions, field)
        } else {
            Vec::new()
        };

        debug!(
            width = layout.width,
            height = layout.height,
            cells = cells.len(),
            arrows = arrows.len(),
            "figure geometry ready"
        );

        Ok(Self {
            layout,
            extent: grid.extent(),
            cells,
            arrows,
            markers,
            colormap: cfg.colormap,
            font: cfg.font_family(),
        })
    }

    /// Draw the figure into a PNG at `path`, creating parent directories.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path).map_err(|e| PlotError::io(path, e))?;

        let l = &self.layout;
        let (x0, x1, y0, y1) = self.extent;
        let label_px = pt_to_px(8.0, l.dpi);
        let desc_px = pt_to_px(10.0, l.dpi);

        let root = BitMapBackend::new(path, (l.width, l.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (main_area, bar_area) = root.split_horizontally(l.left + l.axes_w);

        let mut chart = ChartBuilder::on(&main_area)
            .margin_top(l.top)
            .x_label_area_size(l.bottom)
            .y_label_area_size(l.left)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("x(nm)")
            .y_desc("y(nm)")
            .x_labels(5)
            .y_labels(5)
            .label_style((self.font, label_px))
            .axis_desc_style((self.font, desc_px))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                self.cells
                    .iter()
                    .map(|c| Rectangle::new([c.lo, c.hi], c.color.filled())),
            )
            .map_err(render_err)?;

        if !self.arrows.is_empty() {
            let sw = ((ARROW_WIDTH * l.axes_w as f64).round() as u32).max(1);
            chart
                .draw_series(
                    self.arrows
                        .iter()
                        .map(|a| PathElement::new(vec![a.tail, a.tip], BLACK.stroke_width(sw))),
                )
                .map_err(render_err)?;
            chart
                .draw_series(self.arrows.iter().map(|a| {
                    PathElement::new(vec![a.head[0], a.tip, a.head[1]], BLACK.stroke_width(sw))
                }))
                .map_err(render_err)?;
        }

        for layer in &self.markers {
            debug!(overlay = %layer.label, markers = layer.squares.len(), "drawing markers");
            chart
                .draw_series(
                    layer
                        .squares
                        .iter()
                        .map(|s| Rectangle::new(*s, layer.color.filled())),
                )
                .map_err(render_err)?;
        }

        // colorbar: a thin strip right of the axes, ticks at -1, 0, 1
        let strip = l.colorbar_strip();
        let bar_labels = strip.saturating_sub(l.cbar_pad + l.cbar_w);
        let mut bar = ChartBuilder::on(&bar_area)
            .margin_top(l.top)
            .margin_bottom(l.bottom)
            .margin_left(l.cbar_pad)
            .right_y_label_area_size(bar_labels)
            .build_cartesian_2d(0.0..1.0, VMIN..VMAX)
            .map_err(render_err)?;

        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(3)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .y_desc("m_z")
            .label_style((self.font, label_px))
            .axis_desc_style((self.font, desc_px))
            .draw()
            .map_err(render_err)?;

        let dv = (VMAX - VMIN) / COLORBAR_STEPS as f64;
        let cmap = self.colormap;
        bar.draw_series((0..COLORBAR_STEPS).map(|k| {
            let lo = VMIN + k as f64 * dv;
            Rectangle::new(
                [(0.0, lo), (1.0, lo + dv)],
                cmap.bar_color(lo + 0.5 * dv).filled(),
            )
        }))
        .map_err(render_err)?;

        bar.plotting_area()
            .draw(&Rectangle::new([(0.0, VMIN), (1.0, VMAX)], BLACK.stroke_width(1)))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        info!(path = %path.display(), width = l.width, height = l.height, "figure saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform(rows: usize, cols: usize, a: f64, m: [f64; 3]) -> VectorField2D {
        VectorField2D::from_data(Grid2D::new(rows, cols, a), vec![m; rows * cols]).unwrap()
    }

    #[test]
    fn figure_follows_lattice_aspect() {
        let (w, h) = figure_size_inches(1.0, 3.5, 3.0);
        assert_relative_eq!(w, 3.5);
        assert_relative_eq!(h, 3.0 * 0.75 / 0.83);

        let (w, _) = figure_size_inches(2.0, 3.5, 3.0);
        assert_relative_eq!(w, 7.0);

        let (w, h) = figure_size_inches(0.5, 3.5, 3.0);
        assert_relative_eq!(w, 3.5);
        assert_relative_eq!(h, 3.0 * 0.75 / 0.83 / 0.5);
    }

    #[test]
    fn layout_places_axes_by_figure_fractions() {
        let grid = Grid2D::new(10, 10, 1.0);
        let l = FigureLayout::new(&grid, 4.0, 4.0 * 0.83 / 0.75, 100).unwrap();
        assert_eq!((l.width, l.height), (400, 400));
        assert_eq!((l.left, l.bottom), (48, 48));
        assert_eq!((l.axes_w, l.axes_h), (300, 332));
        assert_eq!(l.top, 20);
        assert_eq!(l.cbar_pad, 5);
        assert_eq!(l.cbar_w, 15);
        assert_eq!(l.colorbar_strip(), 52);
    }

    #[test]
    fn tiny_figures_are_rejected() {
        let grid = Grid2D::new(10, 10, 1.0);
        assert!(matches!(
            FigureLayout::new(&grid, 0.1, 0.1, 10),
            Err(PlotError::Config(_))
        ));
    }

    #[test]
    fn huge_figures_are_rejected() {
        // aspect 1e7 stretches the width far past any sane bitmap
        let grid = Grid2D::new(1, 10_000_000, 1.0);
        assert!(matches!(
            FigureLayout::new(&grid, 4.0, 4.0, 100),
            Err(PlotError::Config(_))
        ));

        let grid = Grid2D::new(10, 10, 1.0);
        assert!(matches!(
            FigureLayout::new(&grid, 4.0, 4.0, u32::MAX),
            Err(PlotError::Config(_))
        ));
        assert!(FigureLayout::new(&grid, 4.0, 4.0, 300).is_ok());
    }

    #[test]
    fn nearest_cells_cover_the_extent() {
        let m = uniform(2, 3, 0.5, [0.0, 0.0, 1.0]);
        let cells = heatmap_cells(&m, ColorMap::Bwr, Interpolation::Nearest);
        assert_eq!(cells.len(), 6);
        let (x0, x1, y0, y1) = m.grid.extent();
        assert_eq!(cells[0].lo, (x0, y0));
        assert_eq!(cells[5].hi, (x1, y1));
        assert!(cells.iter().all(|c| c.color == RGBColor(255, 0, 0)));
    }

    #[test]
    fn bilinear_blends_between_site_centres() {
        let grid = Grid2D::new(1, 2, 1.0);
        let m = VectorField2D::from_data(grid, vec![[0.0, 0.0, -1.0], [0.0, 0.0, 1.0]]).unwrap();

        assert_eq!(sample_bilinear(&m, 0.5, 0.0)[2], 0.0);
        // clamped outside the outermost centres
        assert_eq!(sample_bilinear(&m, -0.4, 0.0)[2], -1.0);
        assert_eq!(sample_bilinear(&m, 1.4, 3.0)[2], 1.0);

        let cells = heatmap_cells(&m, ColorMap::Bwr, Interpolation::Bilinear);
        assert_eq!(cells.len(), 2 * BILINEAR_SUB * BILINEAR_SUB);
        // outermost sub-cells keep the site colour, inner ones are blended
        assert_eq!(cells[0].color, RGBColor(0, 0, 255));
        assert_eq!(cells[2 * BILINEAR_SUB - 1].color, RGBColor(255, 0, 0));
        assert_ne!(cells[BILINEAR_SUB].color, RGBColor(255, 0, 0));
        assert_relative_eq!(cells[0].lo.0, -0.5);
        assert_relative_eq!(cells[0].hi.0, -0.25);
    }

    #[test]
    fn arrows_pivot_on_the_site() {
        let m = uniform(4, 4, 1.0, [1.0, 0.0, 0.0]);
        let p = Positions::new(&m.grid, 2);
        let arrows = quiver_arrows(&p, &m);
        assert_eq!(arrows.len(), 4);

        let a = arrows[0];
        assert_relative_eq!(a.tail.0, -1.0);
        assert_relative_eq!(a.tip.0, 1.0);
        assert_relative_eq!(a.tail.1, 0.0);
        // head barbs sit behind the tip, symmetric about the shaft
        for h in a.head {
            assert!(h.0 < a.tip.0);
        }
        assert_relative_eq!(a.head[0].1, -a.head[1].1, epsilon = 1e-12);
    }

    #[test]
    fn out_of_plane_sites_get_no_arrow() {
        let m = uniform(3, 3, 1.0, [0.0, 0.0, 1.0]);
        let p = Positions::new(&m.grid, 1);
        assert!(quiver_arrows(&p, &m).is_empty());
    }

    #[test]
    fn markers_are_one_lattice_cell_wide() {
        let layer = MarkerLayer::new("pin", &[(2.0, 4.0)], 1.0, RGBColor(0, 0, 0));
        assert_eq!(layer.squares, vec![[(1.5, 3.5), (2.5, 4.5)]]);
    }

    #[test]
    fn build_respects_arrow_flag() {
        let m = uniform(4, 8, 0.5, [0.0, 1.0, 0.0]);
        let mut cfg = PlotConfig::default();
        let fig = LatticeFigure::build(&m, &cfg, Vec::new()).unwrap();
        assert!(fig.arrows.is_empty());
        assert_eq!(fig.cells.len(), 32);
        assert_eq!(fig.font, "sans-serif");

        cfg.arrows = true;
        cfg.reduce_factor = 2;
        cfg.latex = true;
        let fig = LatticeFigure::build(&m, &cfg, Vec::new()).unwrap();
        assert_eq!(fig.arrows.len(), 8);
        assert_eq!(fig.font, "serif");
        assert!(fig.layout.width > fig.layout.height);
    }
}
