//! Plotters-powered line chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`,
//! which gives axis and tick rendering for free on low-resolution terminal cells.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::{ChartSpec, format_x};

/// Render-only view over a `ChartSpec`.
///
/// Series, colors and the visible window are all decided when the `ChartSpec` is
/// built; `render()` only draws.
pub struct DashboardChart<'a> {
    pub spec: &'a ChartSpec,
}

impl<'a> Widget for DashboardChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let Some(([x0, x1], [y0, y1])) = self.spec.bounds() else {
            buf.set_string(area.x, area.y, "No data in range.", Style::default().fg(Color::Yellow));
            return;
        };

        let spec = self.spec;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format_x(*v))
                .y_label_formatter(&|v| spec.format_y(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in &spec.lines {
                let color = RGBColor(line.color.r, line.color.g, line.color.b);
                for seg in spec.visible_segments(line) {
                    chart.draw_series(LineSeries::new(seg, &color))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
