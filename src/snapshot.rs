// src/snapshot.rs
//
// Binary lattice snapshots as dumped by the simulator.
//
// Layout (little endian):
//   i32 rows | i32 cols | f64 lattice (m) | frames...
// Each frame is rows*cols sites of three f64 (x, y, z), row-major.
// Frame 0 starts right after the 16-byte header unless an explicit offset is given.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PlotError, Result};
use crate::grid::Grid2D;
use crate::vector_field::VectorField2D;

pub const HEADER_BYTES: usize = 16;
const SITE_BYTES: usize = 3 * 8;

/// Header plus raw buffer of a snapshot file, read once.
#[derive(Debug, Clone)]
pub struct LatticeSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Lattice spacing in metres.
    pub lattice: f64,
    /// The whole file, header included.
    pub data: Vec<u8>,
    frame_bytes: usize,
}

fn le_f64(bytes: &[u8]) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bytes[..8]);
    f64::from_le_bytes(b)
}

fn le_i32(bytes: &[u8]) -> i32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[..4]);
    i32::from_le_bytes(b)
}

pub fn read_lattice_binary(path: &Path) -> Result<LatticeSnapshot> {
    let data = std::fs::read(path).map_err(|e| PlotError::io(path, e))?;
    LatticeSnapshot::from_bytes(data, path)
}

impl LatticeSnapshot {
    pub fn from_bytes(data: Vec<u8>, origin: &Path) -> Result<Self> {
        if data.len() < HEADER_BYTES {
            return Err(PlotError::TruncatedHeader {
                path: origin.to_path_buf(),
                len: data.len(),
            });
        }

        let rows = le_i32(&data[0..4]);
        let cols = le_i32(&data[4..8]);
        let lattice = le_f64(&data[8..16]);

        if rows <= 0 || cols <= 0 {
            return Err(PlotError::InvalidDimensions {
                rows: rows as i64,
                cols: cols as i64,
            });
        }
        if !lattice.is_finite() || lattice <= 0.0 {
            return Err(PlotError::InvalidLattice(lattice));
        }

        let frame_bytes = (rows as usize)
            .checked_mul(cols as usize)
            .and_then(|n| n.checked_mul(SITE_BYTES))
            .ok_or(PlotError::InvalidDimensions {
                rows: rows as i64,
                cols: cols as i64,
            })?;

        debug!(rows, cols, lattice, bytes = data.len(), "read lattice header");

        Ok(Self {
            rows: rows as usize,
            cols: cols as usize,
            lattice,
            data,
            frame_bytes,
        })
    }

    pub fn grid(&self) -> Grid2D {
        Grid2D::new(self.rows, self.cols, self.lattice)
    }

    /// Bytes occupied by one frame.
    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Number of complete frames stored after `offset`.
    pub fn frame_count(&self, offset: usize) -> usize {
        if offset > self.data.len() {
            return 0;
        }
        (self.data.len() - offset) / self.frame_bytes()
    }

    /// Extract frame `index`, with frame 0 starting at byte `offset`.
    pub fn frame(&self, index: usize, offset: usize) -> Result<VectorField2D> {
        if offset > self.data.len() {
            return Err(PlotError::OffsetOutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        let available = self.frame_count(offset);
        if index >= available {
            return Err(PlotError::FrameOutOfRange { index, available });
        }

        let stride = self.frame_bytes();
        let start = offset + index * stride;
        let bytes = &self.data[start..start + stride];

        let data = bytes
            .chunks_exact(SITE_BYTES)
            .map(|site| [le_f64(&site[0..8]), le_f64(&site[8..16]), le_f64(&site[16..24])])
            .collect();

        VectorField2D::from_data(self.grid(), data)
    }
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write a snapshot with the header followed by every frame in order.
pub fn write_lattice_binary(path: &Path, grid: &Grid2D, frames: &[VectorField2D]) -> Result<()> {
    for m in frames {
        if m.data.len() != grid.n_sites() {
            return Err(PlotError::LengthMismatch {
                got: m.data.len(),
                expected: grid.n_sites(),
            });
        }
    }

    let to_io = |e: std::io::Error| PlotError::io(PathBuf::from(path), e);
    ensure_parent_dir(path).map_err(to_io)?;

    let mut f = BufWriter::new(File::create(path).map_err(to_io)?);
    f.write_all(&(grid.rows as i32).to_le_bytes()).map_err(to_io)?;
    f.write_all(&(grid.cols as i32).to_le_bytes()).map_err(to_io)?;
    f.write_all(&grid.lattice.to_le_bytes()).map_err(to_io)?;

    for m in frames {
        for v in &m.data {
            f.write_all(&v[0].to_le_bytes()).map_err(to_io)?;
            f.write_all(&v[1].to_le_bytes()).map_err(to_io)?;
            f.write_all(&v[2].to_le_bytes()).map_err(to_io)?;
        }
    }
    f.flush().map_err(to_io)?;
    Ok(())
}
