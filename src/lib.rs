// src/lib.rs

pub mod colormap;
pub mod config;
pub mod error;
pub mod grid;
pub mod initial_states;
pub mod overlay;
pub mod plot;
pub mod positions;
pub mod snapshot;
pub mod vector_field;
pub mod visualisation;

pub use error::{PlotError, Result};
