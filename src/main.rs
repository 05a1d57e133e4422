// src/main.rs
//
// Render one frame of a binary lattice snapshot to a PNG.
//
// Examples:
//
//   cargo run --release -- -i output/end.bin -o imgs/end_lattice.png
//       -> m_z heat map with colorbar
//
//   cargo run --release -- --arrows --reduce-factor 2 --pin --pin-input input/pins.txt
//       -> plus in-plane arrows and pinned-site markers
//
// Set RUST_LOG=debug for geometry details.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use lattice_plot::config::PlotConfig;
use lattice_plot::plot::plot_lattice;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cfg = PlotConfig::parse();
    cfg.log();

    plot_lattice(&cfg).with_context(|| {
        format!(
            "failed to plot {} into {}",
            cfg.input.display(),
            cfg.output.display()
        )
    })
}
