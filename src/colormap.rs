// src/colormap.rs

use clap::ValueEnum;
use plotters::style::RGBColor;
use serde::Serialize;

use crate::error::{PlotError, Result};

/// Colour range of the m_z heat map.
pub const VMIN: f64 = -1.0;
pub const VMAX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    /// m_z on a blue–white–red scale
    Bwr,
    /// hue from the in-plane angle, lightness from m_z
    Hsl,
}

impl ColorMap {
    /// Colour of one site given its full vector.
    pub fn site_color(self, m: [f64; 3]) -> RGBColor {
        match self {
            Self::Bwr => bwr(m[2]),
            Self::Hsl => hsl_vector(m),
        }
    }

    /// Colour of the colorbar at value `v` in [VMIN, VMAX].
    /// For HSL the bar shows the lightness axis at zero in-plane angle.
    pub fn bar_color(self, v: f64) -> RGBColor {
        match self {
            Self::Bwr => bwr(v),
            Self::Hsl => {
                let s = (1.0 - v * v).max(0.0).sqrt();
                hsl_vector([s, 0.0, v])
            }
        }
    }
}

/// Map m_z in [-1, 1] to a blue–white–red colour.
/// -1 -> blue, 0 -> white, +1 -> red. Out-of-range values are clamped,
/// non-finite ones are drawn white.
pub fn bwr(mz: f64) -> RGBColor {
    if !mz.is_finite() {
        return RGBColor(255, 255, 255);
    }
    let x = ((mz - VMIN) / (VMAX - VMIN)).clamp(0.0, 1.0);

    // x=0 -> (0,0,255), x=0.5 -> (255,255,255), x=1 -> (255,0,0)
    let r = (255.0 * (2.0 * x).min(1.0)).round() as u8;
    let b = (255.0 * (2.0 * (1.0 - x)).min(1.0)).round() as u8;
    let g = (255.0 * (1.0 - 2.0 * (x - 0.5).abs())).clamp(0.0, 255.0).round() as u8;

    RGBColor(r, g, b)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGBColor {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - 0.5 * c;
    let to_u8 = |v: f64| (255.0 * (v + m)).clamp(0.0, 255.0).round() as u8;
    RGBColor(to_u8(r1), to_u8(g1), to_u8(b1))
}

/// Hue from atan2(my, mx), lightness (mz + 1) / 2, full saturation.
pub fn hsl_vector(m: [f64; 3]) -> RGBColor {
    if !m.iter().all(|v| v.is_finite()) {
        return RGBColor(255, 255, 255);
    }
    let hue = m[1].atan2(m[0]).to_degrees();
    let light = ((m[2] - VMIN) / (VMAX - VMIN)).clamp(0.0, 1.0);
    hsl_to_rgb(hue, 1.0, light)
}

/// Parse a colour name or `#rrggbb`.
pub fn parse_color(s: &str) -> Result<RGBColor> {
    let t = s.trim().to_ascii_lowercase();
    if let Some(hex) = t.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                return Ok(RGBColor(r, g, b));
            }
        }
        return Err(PlotError::UnknownColor(s.to_string()));
    }

    let c = match t.as_str() {
        "black" | "k" => RGBColor(0, 0, 0),
        "white" | "w" => RGBColor(255, 255, 255),
        "red" | "r" => RGBColor(255, 0, 0),
        "green" | "g" => RGBColor(0, 128, 0),
        "blue" | "b" => RGBColor(0, 0, 255),
        "yellow" | "y" => RGBColor(255, 255, 0),
        "cyan" | "c" => RGBColor(0, 255, 255),
        "magenta" | "m" => RGBColor(255, 0, 255),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "brown" => RGBColor(165, 42, 42),
        _ => return Err(PlotError::UnknownColor(s.to_string())),
    };
    Ok(c)
}
