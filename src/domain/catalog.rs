//! Canonical CPI series catalog.
//!
//! The catalog is the single source of truth for which BLS series are fetched,
//! in which order their columns appear, and what they are called. Column order
//! drives both the snapshot layout and chart color assignment, so it is fixed
//! here rather than taken from the API response.

use std::collections::HashSet;

use crate::error::AppError;

/// Headline CPI ("All items"); every dashboard panel compares against it.
pub const HEADLINE_LABEL: &str = "All items";

/// Seasonally adjusted CPI-U category series, in canonical order.
pub const CPI_SERIES: [(&str, &str); 10] = [
    ("CUSR0000SA0", HEADLINE_LABEL),
    ("CUSR0000SA0L1E", "All items less food and energy"),
    ("CUSR0000SAF1", "Food"),
    ("CUSR0000SA0E", "Energy"),
    ("CUSR0000SAA", "Apparel"),
    ("CUSR0000SAE", "Education and communication"),
    ("CUSR0000SAG", "Other goods and services"),
    ("CUSR0000SAM", "Medical care"),
    ("CUSR0000SAR", "Recreation"),
    ("CUSR0000SAT", "Transportation"),
];

/// One API series and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesDef {
    pub id: String,
    pub label: String,
}

/// Ordered, one-to-one mapping between series identifiers and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCatalog {
    series: Vec<SeriesDef>,
}

impl SeriesCatalog {
    /// Build a catalog, rejecting empty entries and duplicate ids or labels.
    pub fn new<I, S, L>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let series: Vec<SeriesDef> = pairs
            .into_iter()
            .map(|(id, label)| SeriesDef {
                id: id.into(),
                label: label.into(),
            })
            .collect();

        if series.is_empty() {
            return Err(AppError::config("Series catalog is empty."));
        }

        let mut ids = HashSet::new();
        let mut labels = HashSet::new();
        for def in &series {
            if def.id.trim().is_empty() || def.label.trim().is_empty() {
                return Err(AppError::config("Series catalog contains an empty id or label."));
            }
            if !ids.insert(def.id.as_str()) {
                return Err(AppError::config(format!("Duplicate series id in catalog: {}", def.id)));
            }
            if !labels.insert(def.label.as_str()) {
                return Err(AppError::config(format!(
                    "Duplicate series label in catalog: {}",
                    def.label
                )));
            }
        }

        Ok(Self { series })
    }

    /// The ten CPI categories shown on the dashboard.
    pub fn cpi() -> Self {
        Self {
            series: CPI_SERIES
                .iter()
                .map(|&(id, label)| SeriesDef {
                    id: id.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesDef> {
        self.series.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    /// Canonical column position of a series id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.series.iter().position(|s| s.id == id)
    }

    pub fn label_for(&self, id: &str) -> Option<&str> {
        self.series
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.label.as_str())
    }
}
