// src/overlay.rs
//
// Marker tables for pinned / anisotropy sites.
// Each data line holds a row and a column (column 0 and 1), in lattice units.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{PlotError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Separator {
    Whitespace,
    Literal(String),
}

impl Separator {
    fn parse(sep: &str) -> Self {
        match sep {
            "" | " " | "\\s+" | "whitespace" => Self::Whitespace,
            "\\t" | "\\\\t" | "tab" => Self::Literal("\t".to_string()),
            other => Self::Literal(other.to_string()),
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Self::Whitespace => line.split_whitespace().collect(),
            Self::Literal(s) => line.split(s.as_str()).map(str::trim).collect(),
        }
    }
}

/// Parse table text into physical (x, y) marker positions.
///
/// `origin` is only used for error messages.
pub fn parse_overlay_table(
    text: &str,
    sep: &str,
    skip: usize,
    lattice: f64,
    origin: &Path,
) -> Result<Vec<(f64, f64)>> {
    let sep = Separator::parse(sep);
    let mut points = Vec::new();

    for (n, line) in text.lines().enumerate().skip(skip) {
        if line.trim().is_empty() {
            continue;
        }
        let fields = sep.split(line);
        if fields.len() < 2 {
            return Err(PlotError::Table {
                path: origin.to_path_buf(),
                line: n + 1,
                message: format!("expected at least 2 columns, found {}", fields.len()),
            });
        }

        let parse = |s: &str| -> Result<f64> {
            s.parse::<f64>().map_err(|_| PlotError::Table {
                path: origin.to_path_buf(),
                line: n + 1,
                message: format!("'{}' is not a number", s),
            })
        };
        let row = parse(fields[0])?;
        let col = parse(fields[1])?;

        points.push((col * lattice, row * lattice));
    }

    Ok(points)
}

pub fn read_overlay_table(
    path: &Path,
    sep: &str,
    skip: usize,
    lattice: f64,
) -> Result<Vec<(f64, f64)>> {
    let text = std::fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
    parse_overlay_table(&text, sep, skip, lattice, path)
}

/// Like [`read_overlay_table`], but a broken table only costs its markers.
pub fn load_overlay_or_empty(
    label: &str,
    path: &Path,
    sep: &str,
    skip: usize,
    lattice: f64,
) -> Vec<(f64, f64)> {
    match read_overlay_table(path, sep, skip, lattice) {
        Ok(points) => {
            debug!(overlay = label, markers = points.len(), "loaded overlay table");
            points
        }
        Err(e) => {
            warn!(overlay = label, error = %e, "could not load overlay table, drawing no markers");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_are_swapped_into_xy() {
        let pts = parse_overlay_table("1\t2\n3\t4\n", "\t", 0, 0.5, Path::new("t")).unwrap();
        assert_eq!(pts, vec![(1.0, 0.5), (2.0, 1.5)]);
    }

    #[test]
    fn header_lines_are_skipped_and_blank_lines_ignored() {
        let text = "row,col\n\n2,3\n  \n4,5,extra\n";
        let pts = parse_overlay_table(text, ",", 1, 1.0, Path::new("t")).unwrap();
        assert_eq!(pts, vec![(3.0, 2.0), (5.0, 4.0)]);
    }

    #[test]
    fn whitespace_separator_collapses_runs() {
        let pts = parse_overlay_table("  7    8  \n", "\\s+", 0, 2.0, Path::new("t")).unwrap();
        assert_eq!(pts, vec![(16.0, 14.0)]);
    }

    #[test]
    fn separator_aliases() {
        for sep in [" ", "whitespace", ""] {
            let pts = parse_overlay_table("7 \t 8\n", sep, 0, 1.0, Path::new("t")).unwrap();
            assert_eq!(pts, vec![(8.0, 7.0)], "separator {sep:?}");
        }
        // escaped tab as it arrives from a shell, and the spelled-out name
        for sep in ["\\t", "\\\\t", "tab"] {
            let pts = parse_overlay_table("7\t8\n", sep, 0, 1.0, Path::new("t")).unwrap();
            assert_eq!(pts, vec![(8.0, 7.0)], "separator {sep:?}");
        }
        // a literal separator does not split on tabs
        assert!(parse_overlay_table("7\t8\n", ";", 0, 1.0, Path::new("t")).is_err());
    }

    #[test]
    fn bad_field_reports_line_number() {
        let err = parse_overlay_table("1,2\n3,x\n", ",", 0, 1.0, Path::new("pins.txt")).unwrap_err();
        match err {
            PlotError::Table { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("'x'"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_falls_back_to_no_markers() {
        let pts = load_overlay_or_empty("pin", Path::new("/nonexistent/pins.txt"), "\t", 0, 1.0);
        assert!(pts.is_empty());
    }
}
