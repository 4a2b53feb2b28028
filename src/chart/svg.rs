//! SVG export of chart descriptions via Plotters.

use std::path::Path;

use plotters::prelude::*;

use crate::chart::{ChartSpec, format_x};
use crate::error::AppError;

/// Output size in pixels.
pub const SVG_SIZE: (u32, u32) = (1000, 500);

fn render_err(e: impl std::fmt::Display) -> AppError {
    AppError::io(format!("Chart rendering failed: {e}"))
}

/// Draw `spec` as an SVG line chart at `path`.
pub fn write_svg(spec: &ChartSpec, path: &Path) -> Result<(), AppError> {
    let Some(([x0, x1], [y0, y1])) = spec.bounds() else {
        return Err(AppError::precondition(format!("Chart '{}' has no data to draw.", spec.title)));
    };

    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&RGBColor(250, 250, 250)).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 20).into_font().color(&RGBColor(13, 16, 24)))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .y_desc(spec.unit_label.as_str())
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| format_x(*v))
        .y_label_formatter(&|v| spec.format_y(*v))
        .axis_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    for line in &spec.lines {
        let color = RGBColor(line.color.r, line.color.g, line.color.b);
        let mut labelled = false;
        for seg in spec.visible_segments(line) {
            let series = chart
                .draw_series(LineSeries::new(seg, color.stroke_width(2)))
                .map_err(render_err)?;
            if !labelled {
                series
                    .label(line.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
                labelled = true;
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    let (_, height) = SVG_SIZE;
    root.draw(&Text::new(
        spec.source.to_string(),
        (12, height as i32 - 16),
        ("sans-serif", 10).into_font().color(&RGBColor(128, 128, 128)),
    ))
    .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::chart::build_chart;
    use crate::domain::{AxisMode, Column, TimeTable};

    #[test]
    fn writes_svg_with_title_and_lines() {
        let dates = (1..=6).map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap()).collect();
        let table = TimeTable::new(
            dates,
            vec![
                Column::new("All items", vec![Some(0.030), Some(0.031), None, Some(0.029), Some(0.028), Some(0.027)]),
                Column::new("Food", vec![Some(0.020), Some(0.021), Some(0.022), Some(0.023), Some(0.024), Some(0.025)]),
            ],
        )
        .unwrap();
        let spec = build_chart(&table, &["All items", "Food"], "Inflation All items vs Food", "Inflation by year", AxisMode::Percent)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        write_svg(&spec, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Inflation All items vs Food"));
        assert!(svg.contains("source: BLS"));
    }

    #[test]
    fn empty_chart_is_refused() {
        let dates = vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()];
        let table = TimeTable::new(dates, vec![Column::new("a", vec![None])]).unwrap();
        let spec = build_chart(&table, &["a"], "t", "u", AxisMode::Plain).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(write_svg(&spec, &dir.path().join("x.svg")).is_err());
    }
}
