//! Reshape a BLS response: nested series → long rows → wide `TimeTable`.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::warn;

use crate::data::bls::{BlsResponse, RawValue};
use crate::domain::{Column, SeriesCatalog, TimeTable};
use crate::error::AppError;

/// One observation in long format.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub series_id: String,
    pub date: NaiveDate,
    /// `None` when the API publishes a placeholder (`-`) instead of a number.
    pub value: Option<f64>,
}

/// Flatten every observation of every series into long rows.
///
/// Any malformed period or value aborts the whole flatten: a snapshot with
/// silently missing months is worse than no snapshot.
pub fn flatten(response: &BlsResponse) -> Result<Vec<LongRow>, AppError> {
    let mut rows = Vec::new();
    for series in &response.results.series {
        for datum in &series.data {
            let date = period_to_date(&datum.year, &datum.period).map_err(|e| {
                AppError::parse(format!("Series {}: {}", series.series_id, e.message()))
            })?;
            let value = parse_value(&datum.value).map_err(|e| {
                AppError::parse(format!("Series {} {date}: {}", series.series_id, e.message()))
            })?;
            if value.is_none() {
                warn!(series = %series.series_id, %date, "observation published without a value");
            }
            rows.push(LongRow {
                series_id: series.series_id.clone(),
                date,
                value,
            });
        }
    }
    Ok(rows)
}

/// Convert `("2023", "M05")` to `2023-05-01`.
pub fn period_to_date(year: &str, period: &str) -> Result<NaiveDate, AppError> {
    let year = year.trim();
    let period = period.trim();

    let month = period
        .strip_prefix('M')
        .filter(|m| m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| AppError::parse(format!("Invalid period code '{period}' (expected M01..M12).")))?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::parse(format!("Invalid year '{year}'.")));
    }

    NaiveDate::parse_from_str(&format!("{year}-{month}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::parse(format!("Invalid period code '{period}' (expected M01..M12).")))
}

fn parse_value(raw: &RawValue) -> Result<Option<f64>, AppError> {
    match raw {
        RawValue::Number(v) if v.is_finite() => Ok(Some(*v)),
        RawValue::Number(v) => Err(AppError::parse(format!("Non-finite value {v}."))),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed == "-" {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(AppError::parse(format!("Invalid value '{s}'."))),
            }
        }
    }
}

/// Pivot long rows into a wide table: one row per date (ascending), one column
/// per catalog entry in catalog order, named by the catalog label.
pub fn pivot(rows: &[LongRow], catalog: &SeriesCatalog) -> Result<TimeTable, AppError> {
    let mut cells: Vec<BTreeMap<NaiveDate, Option<f64>>> = vec![BTreeMap::new(); catalog.len()];
    let mut dates = BTreeSet::new();

    for row in rows {
        let idx = catalog.position(&row.series_id).ok_or_else(|| {
            AppError::parse(format!("Response contains unrequested series {}.", row.series_id))
        })?;
        if cells[idx].insert(row.date, row.value).is_some() {
            let label = catalog.label_for(&row.series_id).unwrap_or_default();
            return Err(AppError::parse(format!(
                "Duplicate observation for {} ({label}) at {}.",
                row.series_id, row.date
            )));
        }
        dates.insert(row.date);
    }

    let seen: HashSet<&str> = rows.iter().map(|r| r.series_id.as_str()).collect();
    for def in catalog.iter() {
        if !seen.contains(def.id.as_str()) {
            warn!(series = %def.id, label = %def.label, "series missing from response");
        }
    }

    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let columns = catalog
        .iter()
        .zip(cells)
        .map(|(def, by_date)| {
            let values = dates.iter().map(|d| by_date.get(d).copied().flatten()).collect();
            Column::new(def.label.clone(), values)
        })
        .collect();

    TimeTable::new(dates, columns)
}
