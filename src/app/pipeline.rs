//! Shared pipeline logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the two stages:
//! - fetch: BLS request -> long rows -> wide table -> snapshot file
//! - present: snapshot file -> derived tables -> panels of chart descriptions
//!
//! The CLI report, the SVG export and the TUI then only differ in how they
//! draw a `Dashboard`.

use tracing::info;

use crate::chart::{ChartSpec, build_chart};
use crate::data::{SeriesSource, flatten, pivot};
use crate::domain::{AcquireConfig, AxisMode, HEADLINE_LABEL, PresentConfig, SeriesCatalog, TimeTable};
use crate::error::AppError;
use crate::io::{read_snapshot, write_snapshot};
use crate::transform::{
    CorrelationMatrix, LatestRow, correlation_matrix, latest_complete_row, rolling_annualized, year_over_year,
};

pub const YOY_UNIT: &str = "Inflation by year";
pub const ANNUALIZED_UNIT: &str = "Inflation 3 months annualized";

/// Outcome of a successful fetch run.
#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub observations: usize,
    pub table: TimeTable,
}

/// Fetch, reshape and persist the snapshot.
///
/// Nothing is written unless every step succeeds.
pub fn run_fetch(
    config: &AcquireConfig,
    catalog: &SeriesCatalog,
    source: &dyn SeriesSource,
) -> Result<FetchSummary, AppError> {
    config.validate()?;

    let response = source.fetch(&catalog.ids(), config.start_year, config.end_year)?;

    let rows = flatten(&response)?;
    let table = pivot(&rows, catalog)?;
    info!(
        observations = rows.len(),
        months = table.len(),
        first = ?table.dates().first(),
        last = ?table.dates().last(),
        "reshaped BLS response"
    );

    write_snapshot(&config.snapshot_path, &table)?;

    Ok(FetchSummary {
        observations: rows.len(),
        table,
    })
}

/// One comparison on the dashboard: headline vs. one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub columns: [String; 2],
}

/// Headline-vs-category panels, one per non-headline column, in column order.
pub fn dashboard_panels(labels: &[&str]) -> Vec<Panel> {
    if !labels.contains(&HEADLINE_LABEL) {
        return Vec::new();
    }
    labels
        .iter()
        .filter(|&&l| l != HEADLINE_LABEL)
        .map(|&l| Panel {
            title: format!("Inflation {HEADLINE_LABEL} vs {l}"),
            columns: [HEADLINE_LABEL.to_string(), l.to_string()],
        })
        .collect()
}

/// Everything the presentation front-ends draw.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub snapshot: TimeTable,
    pub yoy: TimeTable,
    pub annualized: TimeTable,
    pub latest: Option<LatestRow>,
    pub correlation: CorrelationMatrix,
    pub panels: Vec<Panel>,
    pub window_years: u32,
}

/// Load the snapshot and compute the derived tables.
pub fn load_dashboard(config: &PresentConfig) -> Result<Dashboard, AppError> {
    let snapshot = read_snapshot(&config.snapshot_path)?;
    build_dashboard(snapshot, config.window_years)
}

pub fn build_dashboard(snapshot: TimeTable, window_years: u32) -> Result<Dashboard, AppError> {
    if snapshot.is_empty() {
        return Err(AppError::precondition("Snapshot has no rows."));
    }

    let yoy = year_over_year(&snapshot)?;
    let annualized = rolling_annualized(&snapshot)?;
    let latest = latest_complete_row(&yoy);
    let correlation = correlation_matrix(&yoy);
    let panels = dashboard_panels(&snapshot.labels());

    info!(
        rows = snapshot.len(),
        columns = snapshot.columns().len(),
        panels = panels.len(),
        latest = ?latest.as_ref().map(|l| l.date),
        "dashboard computed"
    );

    Ok(Dashboard {
        snapshot,
        yoy,
        annualized,
        latest,
        correlation,
        panels,
        window_years,
    })
}

impl Dashboard {
    /// Year-over-year and 3-month annualized charts for one panel.
    pub fn panel_charts(&self, panel: &Panel) -> Result<(ChartSpec, ChartSpec), AppError> {
        let cols = [panel.columns[0].as_str(), panel.columns[1].as_str()];
        let yoy = build_chart(&self.yoy, &cols, panel.title.clone(), YOY_UNIT, AxisMode::Percent)?;
        let mut annualized = build_chart(
            &self.annualized,
            &cols,
            panel.title.clone(),
            ANNUALIZED_UNIT,
            AxisMode::Percent,
        )?;
        if let Some(&end) = self.annualized.dates().last() {
            annualized = annualized.with_trailing_years(end, self.window_years);
        }
        Ok((yoy, annualized))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::bls::{BlsResponse, parse_response};
    use crate::domain::{BLS_API_URL, Column, next_month};
    use crate::error::ErrorKind;

    struct FailingSource;

    impl SeriesSource for FailingSource {
        fn fetch(&self, _: &[&str], _: i32, _: i32) -> Result<BlsResponse, AppError> {
            Err(AppError::fetch("BLS request failed with status 500 Internal Server Error."))
        }
    }

    struct CannedSource {
        body: String,
        calls: Cell<usize>,
    }

    impl SeriesSource for CannedSource {
        fn fetch(&self, ids: &[&str], start: i32, end: i32) -> Result<BlsResponse, AppError> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(ids, &["A", "B"]);
            assert!(start <= end);
            parse_response(&self.body)
        }
    }

    fn config(path: std::path::PathBuf) -> AcquireConfig {
        AcquireConfig {
            api_key: "test-key".to_string(),
            api_url: BLS_API_URL.to_string(),
            start_year: 2022,
            end_year: 2023,
            snapshot_path: path,
            timeout: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn fetch_failure_leaves_existing_snapshot_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        std::fs::write(&path, "date,A\n2023-01-01,1\n").unwrap();

        let catalog = SeriesCatalog::new([("A", "Alpha")]).unwrap();
        let err = run_fetch(&config(path.clone()), &catalog, &FailingSource).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "date,A\n2023-01-01,1\n");
    }

    #[test]
    fn fetch_failure_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        let catalog = SeriesCatalog::new([("A", "Alpha")]).unwrap();
        assert!(run_fetch(&config(path.clone()), &catalog, &FailingSource).is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn parse_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        let source = CannedSource {
            body: r#"{"status":"REQUEST_SUCCEEDED","message":[],"Results":{"series":[
                {"seriesID":"A","data":[{"year":"2023","period":"M13","value":"1"}]}]}}"#
                .to_string(),
            calls: Cell::new(0),
        };
        let catalog = SeriesCatalog::new([("A", "Alpha"), ("B", "Beta")]).unwrap();
        let err = run_fetch(&config(path.clone()), &catalog, &source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(!path.exists());
    }

    #[test]
    fn successful_fetch_writes_labelled_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.csv");
        let source = CannedSource {
            body: r#"{"status":"REQUEST_SUCCEEDED","message":[],"Results":{"series":[
                {"seriesID":"B","data":[{"year":"2023","period":"M02","value":"5"},{"year":"2023","period":"M01","value":"4"}]},
                {"seriesID":"A","data":[{"year":"2023","period":"M02","value":"2"},{"year":"2023","period":"M01","value":"1"}]}
            ]}}"#
                .to_string(),
            calls: Cell::new(0),
        };
        let catalog = SeriesCatalog::new([("A", "Alpha"), ("B", "Beta")]).unwrap();

        let summary = run_fetch(&config(path.clone()), &catalog, &source).unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(summary.observations, 4);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "date,Alpha,Beta\n2023-01-01,1,4\n2023-02-01,2,5\n"
        );
    }

    #[test]
    fn invalid_year_range_is_rejected_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path().join("db.csv"));
        cfg.start_year = 2024;
        cfg.end_year = 2020;
        let source = CannedSource {
            body: String::new(),
            calls: Cell::new(0),
        };
        let catalog = SeriesCatalog::new([("A", "Alpha"), ("B", "Beta")]).unwrap();
        let err = run_fetch(&cfg, &catalog, &source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn panels_pair_headline_with_each_category() {
        let catalog = SeriesCatalog::cpi();
        let panels = dashboard_panels(&catalog.labels());
        assert_eq!(panels.len(), 9);
        assert_eq!(panels[0].title, "Inflation All items vs All items less food and energy");
        assert_eq!(panels[8].columns, ["All items".to_string(), "Transportation".to_string()]);
        assert!(dashboard_panels(&["Food"]).is_empty());
    }

    #[test]
    fn dashboard_charts_use_percent_axis_and_window() {
        let mut dates = Vec::new();
        let mut d = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        for _ in 0..48 {
            dates.push(d);
            d = next_month(d).unwrap();
        }
        let headline = (0..48).map(|i| Some(250.0 + i as f64)).collect();
        let food = (0..48).map(|i| Some(270.0 + 0.5 * i as f64)).collect();
        let snapshot = TimeTable::new(
            dates,
            vec![Column::new("All items", headline), Column::new("Food", food)],
        )
        .unwrap();

        let dash = build_dashboard(snapshot, 2).unwrap();
        assert_eq!(dash.panels.len(), 1);
        assert_eq!(dash.latest.as_ref().unwrap().date, NaiveDate::from_ymd_opt(2022, 12, 1).unwrap());

        let (yoy, ann) = dash.panel_charts(&dash.panels[0]).unwrap();
        assert_eq!(yoy.mode, AxisMode::Percent);
        assert_eq!(yoy.unit_label, YOY_UNIT);
        assert_eq!(ann.unit_label, ANNUALIZED_UNIT);
        assert!(yoy.x_range.is_none());
        let [x0, x1] = ann.x_range.unwrap();
        assert!((x1 - x0 - 2.0).abs() < 1e-9);
    }
}
