//! Shared domain types.
//!
//! `TimeTable` is the one tabular shape in the crate: the snapshot, the
//! year-over-year table and the annualized table are all `TimeTable`s. A cell
//! is `Option<f64>`; `None` means "no value" (missing observation or
//! insufficient history) and is never replaced by zero or NaN.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};

use crate::error::AppError;

/// One named column of a `TimeTable`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Number of defined cells.
    pub fn defined(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Number of `None` cells before the first defined value.
    pub fn leading_undefined(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }
}

/// Date-indexed table with one column per series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl TimeTable {
    /// Build a table; dates must be strictly ascending and every column must
    /// have one cell per date.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self, AppError> {
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AppError::parse(format!(
                "Dates must be strictly ascending ({} followed by {}).",
                w[0], w[1]
            )));
        }
        for col in &columns {
            if col.values.len() != dates.len() {
                return Err(AppError::parse(format!(
                    "Column '{}' has {} cells for {} dates.",
                    col.label,
                    col.values.len(),
                    dates.len()
                )));
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Total number of defined cells across all columns.
    pub fn defined_cells(&self) -> usize {
        self.columns.iter().map(Column::defined).sum()
    }

    /// Cells of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<Option<f64>>> {
        if idx >= self.dates.len() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[idx]).collect())
    }

    /// Column-pair (or any subset) slice, in the order requested.
    pub fn select(&self, labels: &[&str]) -> Result<TimeTable, AppError> {
        let mut columns = Vec::with_capacity(labels.len());
        for &label in labels {
            let col = self
                .column(label)
                .ok_or_else(|| AppError::config(format!("Unknown column '{label}'.")))?;
            columns.push(col.clone());
        }
        Ok(TimeTable {
            dates: self.dates.clone(),
            columns,
        })
    }

    /// Apply a per-column transform that preserves length.
    pub fn map_columns<F>(&self, mut f: F) -> TimeTable
    where
        F: FnMut(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = f(&c.values);
                debug_assert_eq!(values.len(), c.values.len());
                Column::new(c.label.clone(), values)
            })
            .collect();
        TimeTable {
            dates: self.dates.clone(),
            columns,
        }
    }

    /// Check the monthly, gap-free cadence the rolling transforms assume.
    pub fn require_monthly(&self) -> Result<(), AppError> {
        for (i, date) in self.dates.iter().enumerate() {
            if date.day() != 1 {
                return Err(AppError::precondition(format!(
                    "Row {i} ({date}) is not a first-of-month date."
                )));
            }
        }
        for w in self.dates.windows(2) {
            if next_month(w[0]) != Some(w[1]) {
                return Err(AppError::precondition(format!(
                    "Monthly cadence broken between {} and {}.",
                    w[0], w[1]
                )));
            }
        }
        Ok(())
    }
}

/// First day of the month following `date`.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
}

/// How a chart's value axis is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisMode {
    /// Raw index values.
    Plain,
    /// Fractions shown as percentages (0.034 -> "3.40%").
    Percent,
}

/// Default BLS public API v2 endpoint.
pub const BLS_API_URL: &str = "https://api.bls.gov/publicAPI/v2/timeseries/data/";

/// Widest `[start_year, end_year]` span the API serves in one request.
pub const MAX_YEARS_PER_REQUEST: i32 = 20;

/// Settings for the acquisition run (`cpi fetch`).
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub api_key: String,
    pub api_url: String,
    pub start_year: i32,
    pub end_year: i32,
    pub snapshot_path: PathBuf,
    pub timeout: Duration,
}

impl AcquireConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::config("BLS API key is empty."));
        }
        if self.start_year > self.end_year {
            return Err(AppError::config(format!(
                "Start year {} is after end year {}.",
                self.start_year, self.end_year
            )));
        }
        if !(1000..=9999).contains(&self.start_year) || !(1000..=9999).contains(&self.end_year) {
            return Err(AppError::config("Years must have four digits."));
        }
        if self.end_year - self.start_year + 1 > MAX_YEARS_PER_REQUEST {
            return Err(AppError::config(format!(
                "BLS serves at most {MAX_YEARS_PER_REQUEST} years per request ({}..{} asked).",
                self.start_year, self.end_year
            )));
        }
        if self.timeout.is_zero() {
            return Err(AppError::config("Request timeout must be > 0."));
        }
        Ok(())
    }
}

/// Settings shared by the presentation front-ends.
#[derive(Debug, Clone)]
pub struct PresentConfig {
    pub snapshot_path: PathBuf,
    /// Visible trailing window (years) for the annualized charts.
    pub window_years: u32,
}
