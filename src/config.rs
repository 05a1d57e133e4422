// src/config.rs

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::colormap::{parse_color, ColorMap};
use crate::error::{PlotError, Result};
use crate::snapshot::HEADER_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// one flat cell per site
    None,
    /// same as `none`
    Nearest,
    /// bilinear between site centres
    Bilinear,
}

/// Render the m_z heat map of a binary lattice snapshot, with optional
/// in-plane arrows and pinning / anisotropy site markers.
#[derive(Parser, Debug, Clone, Serialize)]
#[command(name = "lattice-plot", version)]
pub struct PlotConfig {
    /// Binary lattice snapshot
    #[arg(short, long, default_value = "./output/end.bin")]
    pub input: PathBuf,

    /// Output image (PNG)
    #[arg(short, long, default_value = "./imgs/end_lattice.png")]
    pub output: PathBuf,

    /// Frame index inside the snapshot
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Byte offset at which frame 0 starts
    #[arg(long, default_value_t = HEADER_BYTES)]
    pub frame_offset: usize,

    /// Figure width (inches)
    #[arg(long, default_value_t = 3.5)]
    pub width: f64,

    /// Figure height (inches)
    #[arg(long, default_value_t = 3.0)]
    pub height: f64,

    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    #[arg(long, value_enum, default_value_t = Interpolation::None)]
    pub interpolation: Interpolation,

    #[arg(long, value_enum, default_value_t = ColorMap::Bwr)]
    pub colormap: ColorMap,

    /// Draw the in-plane magnetisation as arrows
    #[arg(long)]
    pub arrows: bool,

    /// Keep one arrow every N sites along each axis
    #[arg(long, default_value_t = 4)]
    pub reduce_factor: usize,

    /// Use serif typesetting for labels
    #[arg(long)]
    pub latex: bool,

    /// Overlay anisotropy sites
    #[arg(long)]
    pub ani: bool,

    #[arg(long, default_value = "./input/anisotropy.txt")]
    pub ani_input: PathBuf,

    #[arg(long, default_value = "\\t")]
    pub ani_sep: String,

    #[arg(long, default_value_t = 0)]
    pub ani_skip: usize,

    #[arg(long, default_value = "gray")]
    pub ani_color: String,

    /// Overlay pinned sites
    #[arg(long)]
    pub pin: bool,

    #[arg(long, default_value = "./input/pinning.txt")]
    pub pin_input: PathBuf,

    #[arg(long, default_value = "\\t")]
    pub pin_sep: String,

    #[arg(long, default_value_t = 0)]
    pub pin_skip: usize,

    #[arg(long, default_value = "black")]
    pub pin_color: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self::parse_from(["lattice-plot"])
    }
}

impl PlotConfig {
    /// Reject sizes and colours that cannot produce a figure.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(PlotError::Config(format!("width must be positive, got {}", self.width)));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(PlotError::Config(format!("height must be positive, got {}", self.height)));
        }
        if self.dpi == 0 {
            return Err(PlotError::Config("dpi must be positive".to_string()));
        }
        if self.ani {
            parse_color(&self.ani_color)?;
        }
        if self.pin {
            parse_color(&self.pin_color)?;
        }
        Ok(())
    }

    pub fn font_family(&self) -> &'static str {
        if self.latex {
            "serif"
        } else {
            "sans-serif"
        }
    }

    /// Log the resolved configuration.
    pub fn log(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => info!("configuration:\n{}", json),
            Err(e) => info!(error = %e, "configuration: {:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_cli() {
        let c = PlotConfig::default();
        assert_eq!(c.input, PathBuf::from("./output/end.bin"));
        assert_eq!(c.output, PathBuf::from("./imgs/end_lattice.png"));
        assert_eq!(c.frame_offset, 16);
        assert_eq!(c.reduce_factor, 4);
        assert_eq!(c.interpolation, Interpolation::None);
        assert_eq!(c.colormap, ColorMap::Bwr);
        assert_eq!(c.ani_sep, "\\t");
        assert!(!c.arrows && !c.ani && !c.pin && !c.latex);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn flags_parse() {
        let c = PlotConfig::parse_from([
            "lattice-plot",
            "-i",
            "run/frames.bin",
            "--frame",
            "3",
            "--arrows",
            "--reduce-factor",
            "2",
            "--interpolation",
            "bilinear",
            "--colormap",
            "hsl",
            "--pin",
            "--pin-sep",
            ",",
            "--pin-color",
            "#ff0000",
        ]);
        assert_eq!(c.input, PathBuf::from("run/frames.bin"));
        assert_eq!(c.frame, 3);
        assert!(c.arrows && c.pin);
        assert_eq!(c.reduce_factor, 2);
        assert_eq!(c.interpolation, Interpolation::Bilinear);
        assert_eq!(c.colormap, ColorMap::Hsl);
        assert_eq!(c.pin_sep, ",");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut c = PlotConfig::default();
        c.width = 0.0;
        assert!(matches!(c.validate(), Err(PlotError::Config(_))));

        let mut c = PlotConfig::default();
        c.pin = true;
        c.pin_color = "not-a-colour".to_string();
        assert!(matches!(c.validate(), Err(PlotError::UnknownColor(_))));

        // colours of disabled overlays are not checked
        let mut c = PlotConfig::default();
        c.ani_color = "not-a-colour".to_string();
        assert!(c.validate().is_ok());
    }

    #[test]
    fn configuration_serialises_to_json() {
        let json = serde_json::to_value(PlotConfig::default()).unwrap();
        assert_eq!(json["colormap"], "bwr");
        assert_eq!(json["interpolation"], "none");
        assert_eq!(json["dpi"], 300);
    }
}
