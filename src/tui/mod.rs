//! Ratatui-based terminal dashboard.
//!
//! Each panel compares the headline index with one category: year-over-year
//! change on top, 3-month annualized change (trailing window) below. A second
//! view shows the latest complete row and the correlation table.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{Dashboard, load_dashboard};
use crate::chart::ChartSpec;
use crate::domain::PresentConfig;
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::DashboardChart;

/// Start the TUI on the snapshot named in `config`.
///
/// The snapshot is loaded before the terminal is touched, so a missing file
/// is reported on a normal screen.
pub fn run(config: PresentConfig) -> Result<(), AppError> {
    let dash = load_dashboard(&config)?;
    if dash.panels.is_empty() {
        return Err(AppError::precondition("Snapshot has no headline column to compare against."));
    }

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::io(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dash);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::io(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::io(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Charts,
    Summary,
}

struct App {
    dash: Dashboard,
    panel: usize,
    view: View,
    /// Chart pair for the current panel, rebuilt on navigation.
    charts: Option<(ChartSpec, ChartSpec)>,
    status: String,
}

impl App {
    fn new(dash: Dashboard) -> Self {
        let mut app = Self {
            dash,
            panel: 0,
            view: View::Charts,
            charts: None,
            status: String::new(),
        };
        app.rebuild_charts();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::io(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::io(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::io(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let n = self.dash.panels.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Char('l') if n > 0 => {
                self.panel = (self.panel + 1) % n;
                self.rebuild_charts();
            }
            KeyCode::Left | KeyCode::Char('h') if n > 0 => {
                self.panel = (self.panel + n - 1) % n;
                self.rebuild_charts();
            }
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Charts => View::Summary,
                    View::Summary => View::Charts,
                };
            }
            _ => {}
        }
        false
    }

    fn rebuild_charts(&mut self) {
        let Some(panel) = self.dash.panels.get(self.panel) else {
            self.charts = None;
            return;
        };
        match self.dash.panel_charts(panel) {
            Ok(pair) => {
                self.charts = Some(pair);
                self.status.clear();
            }
            Err(err) => {
                self.charts = None;
                self.status = err.to_string();
            }
        }
    }

    /// Correlation of year-over-year changes for the current panel's pair.
    fn panel_correlation(&self) -> Option<f64> {
        let panel = self.dash.panels.get(self.panel)?;
        self.dash.correlation.get(&panel.columns[0], &panel.columns[1])
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Charts => self.draw_charts(frame, chunks[1]),
            View::Summary => self.draw_summary(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let snapshot = &self.dash.snapshot;
        let span = match (snapshot.dates().first(), snapshot.dates().last()) {
            (Some(a), Some(b)) => format!("{} .. {}", a.format("%Y-%m"), b.format("%Y-%m")),
            _ => "-".to_string(),
        };
        let title = self
            .dash
            .panels
            .get(self.panel)
            .map(|p| p.title.as_str())
            .unwrap_or("-");

        let corr = self
            .panel_correlation()
            .map(|r| format!("{r:.3}"))
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("cpi", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" | {title}")),
            ]),
            Line::from(Span::styled(
                format!(
                    "snapshot: {span} | panel {}/{} | yoy corr: {corr} | annualized window: {}y",
                    self.panel + 1,
                    self.dash.panels.len(),
                    self.dash.window_years
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        match &self.charts {
            Some((yoy, annualized)) => {
                draw_chart(frame, chunks[0], yoy);
                draw_chart(frame, chunks[1], annualized);
            }
            None => {
                let msg = Paragraph::new("No chart for this panel.")
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(msg, area);
            }
        }
    }

    fn draw_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut text = crate::report::format_latest(self.dash.latest.as_ref());
        text.push('\n');
        text.push_str(&crate::report::format_correlation(&self.dash.correlation));
        let p = Paragraph::new(text).block(Block::default().title("Summary").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ panel  Tab charts/summary  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// One bordered chart with the unit as title and a colored legend line.
fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, spec: &ChartSpec) {
    let block = Block::default()
        .title(format!("{} ({})", spec.unit_label, spec.source))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if inner.height < 2 {
        return;
    }
    let legend_rect = Rect { height: 1, ..inner };
    let chart_rect = Rect {
        y: inner.y + 1,
        height: inner.height - 1,
        ..inner
    };

    frame.render_widget(Paragraph::new(legend_line(spec)), legend_rect);
    frame.render_widget(DashboardChart { spec }, chart_rect);
}

fn legend_line(spec: &ChartSpec) -> Line<'static> {
    let mut spans = Vec::new();
    for line in &spec.lines {
        let c = line.color;
        spans.push(Span::styled("── ", Style::default().fg(Color::Rgb(c.r, c.g, c.b))));
        spans.push(Span::raw(format!("{}  ", line.label)));
    }
    Line::from(spans)
}
