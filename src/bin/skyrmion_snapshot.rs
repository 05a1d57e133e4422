// -----------------------------------------------------------------------------
// Demo snapshot: skyrmion in a +z background
//
// Writes a binary lattice snapshot (plus optional marker tables) so the
// renderer can be tried without a simulation run.
//
// Run:
//   cargo run --release --bin skyrmion_snapshot -- --frames 8 \
//       --pin-table input/pinning.txt --ani-table input/anisotropy.txt
//
// Then:
//   cargo run --release -- -i output/end.bin --arrows --pin --ani --frame 3
//
// Frames:
//   helicity advances by 2π/frames per frame (Néel -> Bloch -> ...), so each
//   frame has a different in-plane texture with the same m_z.
//
// Output:
//   output/end.bin
// -----------------------------------------------------------------------------

use std::f64::consts::PI;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use lattice_plot::grid::Grid2D;
use lattice_plot::initial_states::{add_noise, init_skyrmion, ring_sites};
use lattice_plot::snapshot::{ensure_parent_dir, write_lattice_binary};
use lattice_plot::vector_field::VectorField2D;

/// Write a demo lattice snapshot containing a skyrmion
#[derive(Parser, Debug)]
#[command(name = "skyrmion_snapshot")]
struct Args {
    #[arg(short, long, default_value = "./output/end.bin")]
    output: PathBuf,

    #[arg(long, default_value_t = 64)]
    rows: usize,

    #[arg(long, default_value_t = 64)]
    cols: usize,

    /// Lattice spacing (m)
    #[arg(long, default_value_t = 0.5e-9)]
    lattice: f64,

    /// Skyrmion radius (sites)
    #[arg(long, default_value_t = 12.0)]
    radius: f64,

    /// Domain wall width (sites)
    #[arg(long, default_value_t = 2.0)]
    wall: f64,

    /// +1: core along -z, -1: core along +z (background follows)
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    polarity: f64,

    #[arg(long, default_value_t = 1)]
    frames: usize,

    /// Random tilt amplitude added to every site
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Also write the sites on the skyrmion wall as a pinning table
    #[arg(long)]
    pin_table: Option<PathBuf>,

    /// Also write vertical anisotropy stripes (every other of 4) as a table
    #[arg(long)]
    ani_table: Option<PathBuf>,
}

fn write_table(path: &Path, sites: &[(usize, usize)]) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let mut f = BufWriter::new(File::create(path)?);
    for &(row, col) in sites {
        writeln!(f, "{}\t{}", row, col)?;
    }
    f.flush()
}

fn stripe_sites(rows: usize, cols: usize, n_stripes: usize) -> Vec<(usize, usize)> {
    let width = (cols / n_stripes).max(1);
    let mut out = Vec::new();
    for stripe in (0..n_stripes).step_by(2) {
        let start = stripe * width;
        let end = ((stripe + 1) * width).min(cols);
        for row in 0..rows {
            for col in start..end {
                out.push((row, col));
            }
        }
    }
    out
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();
    anyhow::ensure!(args.rows > 0 && args.cols > 0, "rows and cols must be positive");
    anyhow::ensure!(args.lattice > 0.0, "lattice spacing must be positive");

    // work in site units, store metres in the header
    let site_grid = Grid2D::new(args.rows, args.cols, 1.0);
    let center = (
        0.5 * (args.cols as f64 - 1.0),
        0.5 * (args.rows as f64 - 1.0),
    );

    let n_frames = args.frames.max(1);
    let mut frames = Vec::with_capacity(n_frames);
    for k in 0..n_frames {
        let mut m = VectorField2D::new(site_grid);
        if args.polarity < 0.0 {
            m.set_uniform(0.0, 0.0, -1.0);
        }
        let helicity = 2.0 * PI * k as f64 / n_frames as f64;
        init_skyrmion(&mut m, center, args.radius, args.wall, helicity, args.polarity);
        add_noise(&mut m, args.noise, args.seed.wrapping_add(k as u64));
        frames.push(m);
    }

    let grid = site_grid.with_lattice(args.lattice);
    write_lattice_binary(&args.output, &grid, &frames)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        rows = args.rows,
        cols = args.cols,
        frames = n_frames,
        "snapshot written"
    );

    if let Some(path) = &args.pin_table {
        let sites = ring_sites(&frames[0], center, args.radius);
        write_table(path, &sites).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), sites = sites.len(), "pinning table written");
    }

    if let Some(path) = &args.ani_table {
        let sites = stripe_sites(args.rows, args.cols, 4);
        write_table(path, &sites).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), sites = sites.len(), "anisotropy table written");
    }

    Ok(())
}
