// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: file is {len} bytes, shorter than the 16-byte lattice header")]
    TruncatedHeader { path: PathBuf, len: usize },

    #[error("invalid lattice dimensions {rows}x{cols}")]
    InvalidDimensions { rows: i64, cols: i64 },

    #[error("invalid lattice spacing {0}")]
    InvalidLattice(f64),

    #[error("frame offset {offset} lies beyond the {len}-byte buffer")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("frame {index} requested but only {available} complete frame(s) present")]
    FrameOutOfRange { index: usize, available: usize },

    #[error("field has {got} sites, expected {expected} (rows*cols)")]
    LengthMismatch { got: usize, expected: usize },

    #[error("{path}:{line}: {message}")]
    Table {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("unknown colour '{0}' (expected a name such as 'black' or #rrggbb)")]
    UnknownColor(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("rendering failed: {0}")]
    Render(String),
}

impl PlotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
