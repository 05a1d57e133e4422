// src/plot.rs
//
// The whole run: snapshot -> frame -> display units -> overlays -> figure.

use tracing::info;

use crate::colormap::parse_color;
use crate::config::PlotConfig;
use crate::error::Result;
use crate::overlay::load_overlay_or_empty;
use crate::snapshot::read_lattice_binary;
use crate::visualisation::{LatticeFigure, MarkerLayer};

/// Metres per display unit (nm).
pub const NM: f64 = 1.0e-9;

/// Load the snapshot and overlays and lay out the figure without drawing it.
pub fn prepare_figure(cfg: &PlotConfig) -> Result<LatticeFigure> {
    cfg.validate()?;

    let snapshot = read_lattice_binary(&cfg.input)?;
    let lattice_nm = snapshot.lattice / NM;
    info!(
        rows = snapshot.rows,
        cols = snapshot.cols,
        lattice_nm,
        frames = snapshot.frame_count(cfg.frame_offset),
        "loaded {}",
        cfg.input.display()
    );

    let field = snapshot
        .frame(cfg.frame, cfg.frame_offset)?
        .rescaled(lattice_nm);

    // anisotropy first so pinned sites are drawn on top
    let mut markers = Vec::new();
    if cfg.ani {
        let points = load_overlay_or_empty("anisotropy", &cfg.ani_input, &cfg.ani_sep, cfg.ani_skip, lattice_nm);
        markers.push(MarkerLayer::new("anisotropy", &points, lattice_nm, parse_color(&cfg.ani_color)?));
    }
    if cfg.pin {
        let points = load_overlay_or_empty("pinning", &cfg.pin_input, &cfg.pin_sep, cfg.pin_skip, lattice_nm);
        markers.push(MarkerLayer::new("pinning", &points, lattice_nm, parse_color(&cfg.pin_color)?));
    }

    LatticeFigure::build(&field, cfg, markers)
}

/// Prepare and save the figure to `cfg.output`.
pub fn plot_lattice(cfg: &PlotConfig) -> Result<()> {
    let figure = prepare_figure(cfg)?;
    figure.save_png(&cfg.output)
}
