//! Chart descriptions handed to the renderers.
//!
//! `build_chart` turns a table slice into a `ChartSpec` value: title, unit
//! label, axis mode, one line per column, and a source note. Renderers
//! (`ascii`, `svg`, and the TUI widget) only ever read a `ChartSpec`; nothing
//! here holds mutable figure state.
//!
//! Undefined cells split a line into segments instead of being drawn as zero.

use chrono::{Datelike, NaiveDate};

use crate::domain::{AxisMode, TimeTable};
use crate::error::AppError;

pub mod ascii;
pub mod svg;

/// Attribution printed under every chart.
pub const SOURCE_NOTE: &str = "source: BLS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LineColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Column position → line color.
///
/// Looked up by explicit slot so the mapping survives any reordering of this
/// table's source; positions past the end wrap around.
pub const PALETTE: [(usize, LineColor); 15] = [
    (0, LineColor::rgb(0xe9, 0x75, 0x10)),
    (1, LineColor::rgb(0x11, 0x1a, 0x39)),
    (2, LineColor::rgb(0x0d, 0x69, 0x86)),
    (3, LineColor::rgb(0xff, 0x50, 0x03)),
    (4, LineColor::rgb(0x19, 0x53, 0x85)),
    (5, LineColor::rgb(0xfe, 0xad, 0x67)),
    (6, LineColor::rgb(0x26, 0x6a, 0x7c)),
    (7, LineColor::rgb(0x3f, 0x6a, 0x73)),
    (8, LineColor::rgb(0x58, 0x6b, 0x69)),
    (9, LineColor::rgb(0x71, 0x6c, 0x5f)),
    (10, LineColor::rgb(0x8b, 0x6c, 0x56)),
    (11, LineColor::rgb(0xa4, 0x6d, 0x4c)),
    (12, LineColor::rgb(0xbd, 0x6e, 0x42)),
    (13, LineColor::rgb(0xd6, 0x6e, 0x39)),
    (14, LineColor::rgb(0xef, 0x6f, 0x2f)),
];

pub fn color_for(position: usize) -> LineColor {
    let slot = position % PALETTE.len();
    PALETTE
        .iter()
        .find(|(p, _)| *p == slot)
        .map(|(_, c)| *c)
        .unwrap_or(PALETTE[0].1)
}

/// One plotted column.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: String,
    pub color: LineColor,
    /// Contiguous runs of `(x, y)` with x in fractional years.
    pub segments: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub unit_label: String,
    pub mode: AxisMode,
    pub lines: Vec<ChartLine>,
    pub source: &'static str,
    /// Visible x-window; `None` shows all data.
    pub x_range: Option<[f64; 2]>,
}

/// `2024-07-01` → `2024.5`.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0
}

/// Describe a line chart of `columns` (in that order) from `table`.
pub fn build_chart(
    table: &TimeTable,
    columns: &[&str],
    title: impl Into<String>,
    unit_label: impl Into<String>,
    mode: AxisMode,
) -> Result<ChartSpec, AppError> {
    let slice = table.select(columns)?;
    let xs: Vec<f64> = slice.dates().iter().map(|d| date_to_x(*d)).collect();

    let lines = slice
        .columns()
        .iter()
        .enumerate()
        .map(|(pos, col)| {
            let mut segments = Vec::new();
            let mut current = Vec::new();
            for (x, v) in xs.iter().zip(&col.values) {
                match v {
                    Some(y) => current.push((*x, *y)),
                    None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                    None => {}
                }
            }
            if !current.is_empty() {
                segments.push(current);
            }
            ChartLine {
                label: col.label.clone(),
                color: color_for(pos),
                segments,
            }
        })
        .collect();

    Ok(ChartSpec {
        title: title.into(),
        unit_label: unit_label.into(),
        mode,
        lines,
        source: SOURCE_NOTE,
        x_range: None,
    })
}

impl ChartSpec {
    /// Restrict the visible window to the trailing `years` before `end`.
    pub fn with_trailing_years(mut self, end: NaiveDate, years: u32) -> Self {
        let x1 = date_to_x(end);
        self.x_range = Some([x1 - years as f64, x1]);
        self
    }

    /// Segments clipped to the visible window.
    pub fn visible_segments(&self, line: &ChartLine) -> Vec<Vec<(f64, f64)>> {
        let Some([x0, x1]) = self.x_range else {
            return line.segments.clone();
        };
        line.segments
            .iter()
            .map(|seg| seg.iter().copied().filter(|(x, _)| *x >= x0 && *x <= x1).collect::<Vec<_>>())
            .filter(|seg| !seg.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| self.visible_segments(l).is_empty())
    }

    /// Data bounds over the visible points, y padded by 5%.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for line in &self.lines {
            for seg in self.visible_segments(line) {
                for (x, y) in seg {
                    x_min = x_min.min(x);
                    x_max = x_max.max(x);
                    y_min = y_min.min(y);
                    y_max = y_max.max(y);
                }
            }
        }
        if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
            return None;
        }
        if let Some(range) = self.x_range {
            x_min = range[0];
            x_max = range[1];
        }
        if x_max <= x_min {
            x_min -= 0.5;
            x_max += 0.5;
        }
        if y_max <= y_min {
            y_min -= 0.5_f64.max(y_min.abs() * 0.05);
            y_max += 0.5_f64.max(y_max.abs() * 0.05);
        }
        let pad = (y_max - y_min) * 0.05;
        Some(([x_min, x_max], [y_min - pad, y_max + pad]))
    }

    /// Format a value-axis tick according to the axis mode.
    pub fn format_y(&self, v: f64) -> String {
        format_value(v, self.mode)
    }
}

pub fn format_value(v: f64, mode: AxisMode) -> String {
    match mode {
        AxisMode::Plain => format!("{v:.2}"),
        AxisMode::Percent => format!("{:.2}%", v * 100.0),
    }
}

/// `2024.5` → `2024-07`.
pub fn format_x(x: f64) -> String {
    let months = (x * 12.0).round() as i64;
    format!("{}-{:02}", months.div_euclid(12), months.rem_euclid(12) + 1)
}
