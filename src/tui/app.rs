//! Dashboard TUI Application
//!
//! Application state and event handling. The dataset is loaded once and
//! held immutably; every filter change rebuilds the [`DashboardView`].

use super::widgets::*;
use crate::config::DashboardConfig;
use crate::data::{Dataset, Group};
use crate::filter::GroupFilter;
use crate::report::{format_rate, format_thousands, DashboardView, DASHBOARD_TITLE};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Cell, Chart, Clear, Dataset as ChartDataset, GraphType,
        Paragraph, Row, Table, Tabs,
    },
    Frame,
};
use tracing::info;

/// Application state
pub struct DashboardApp {
    pub running: bool,
    pub show_help: bool,
    dataset: Dataset,
    config: DashboardConfig,
    source: String,
    filter: GroupFilter,
    view: DashboardView,
}

impl DashboardApp {
    pub fn new(
        dataset: Dataset,
        config: DashboardConfig,
        source: impl Into<String>,
        filter: GroupFilter,
    ) -> Result<Self> {
        let view = DashboardView::build(&dataset, filter, &config)?;
        Ok(Self {
            running: true,
            show_help: false,
            dataset,
            config,
            source: source.into(),
            filter,
            view,
        })
    }

    pub fn filter(&self) -> GroupFilter {
        self.filter
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Switch arm and recompute everything from the loaded rows
    pub fn set_filter(&mut self, filter: GroupFilter) -> Result<()> {
        if filter == self.filter {
            return Ok(());
        }
        self.view = DashboardView::build(&self.dataset, filter, &self.config)?;
        self.filter = filter;
        info!(filter = %filter, rows = self.view.metrics.total_users, "filter changed");
        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = !self.show_help,
            KeyCode::Tab | KeyCode::Right => self.set_filter(self.filter.next())?,
            KeyCode::BackTab | KeyCode::Left => self.set_filter(self.filter.prev())?,
            KeyCode::Char('a') | KeyCode::Char('1') => self.set_filter(GroupFilter::All)?,
            KeyCode::Char('c') | KeyCode::Char('2') => self.set_filter(GroupFilter::Control)?,
            KeyCode::Char('t') | KeyCode::Char('3') => self.set_filter(GroupFilter::Treatment)?,
            _ => {}
        }
        Ok(())
    }

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Metrics
                Constraint::Min(12),   // Charts
                Constraint::Length(5), // Z-test
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_metrics(frame, chunks[1]);
        self.render_body(frame, chunks[2]);
        frame.render_widget(VerdictBanner::new(&self.view.significance), chunks[3]);
        self.render_footer(frame, chunks[4]);

        if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<_> = GroupFilter::all()
            .iter()
            .map(|f| Line::from(format!(" {} ", f.label().to_uppercase())))
            .collect();

        let idx = GroupFilter::all()
            .iter()
            .position(|f| *f == self.filter)
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(panel(&DASHBOARD_TITLE.to_uppercase(), ACCENT_CYAN))
            .select(idx)
            .style(Style::default().fg(TEXT_DIM))
            .highlight_style(
                Style::default()
                    .fg(ACCENT_CYAN)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::UNDERLINED),
            );

        frame.render_widget(tabs, area);
    }

    fn render_metrics(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(area);

        let m = &self.view.metrics;
        frame.render_widget(
            MetricCard::new("TOTAL USERS", format_thousands(m.total_users)),
            chunks[0],
        );
        frame.render_widget(
            MetricCard::new("TOTAL CONVERSIONS", format_thousands(m.total_conversions))
                .color(ACCENT_GREEN),
            chunks[1],
        );
        frame.render_widget(
            MetricCard::new("CONVERSION RATE", format_rate(m.conversion_rate)).color(ACCENT_CYAN),
            chunks[2],
        );
        frame.render_widget(
            MetricCard::new("SOURCE", self.source.clone()).color(TEXT_DIM),
            chunks[3],
        );
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let preview_height = u16::try_from(self.config.analysis.preview_rows)
            .unwrap_or(u16::MAX)
            .saturating_add(3);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(preview_height), Constraint::Min(6)])
            .split(chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(6)])
            .split(chunks[1]);

        self.render_preview(frame, left[0]);
        self.render_group_bars(frame, left[1]);
        frame.render_widget(DistributionBar::new(self.view.distribution), right[0]);
        self.render_trend(frame, right[1]);
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec!["user_id", "timestamp", "group", "converted"])
            .style(Style::default().fg(TEXT_DIM).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .view
            .preview
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.user_id.clone()),
                    Cell::from(r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                    Cell::from(r.group.as_str()).style(Style::default().fg(group_color(r.group))),
                    Cell::from(u8::from(r.converted).to_string()),
                ])
                .style(Style::default().fg(TEXT_BRIGHT))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(20),
                Constraint::Length(10),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .block(panel("DATASET PREVIEW", ACCENT_CYAN));

        frame.render_widget(table, area);
    }

    fn render_group_bars(&self, frame: &mut Frame, area: Rect) {
        let axis_max = self.config.charts.rate_axis_max;
        // Basis points keep two decimals of percent in the u64 bar values
        let to_bp = |rate: f64| (rate.min(axis_max) * 10_000.0).round() as u64;

        let bars: Vec<Bar> = self
            .view
            .groups
            .iter()
            .map(|s| {
                Bar::default()
                    .label(Line::from(s.group.as_str()))
                    .value(to_bp(s.rate))
                    .text_value(format!("{:.2}%", s.rate * 100.0))
                    .style(Style::default().fg(group_color(s.group)))
                    .value_style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(group_color(s.group))
                            .add_modifier(Modifier::BOLD),
                    )
            })
            .collect();

        let chart = BarChart::default()
            .block(panel("CONVERSION RATE BY GROUP", ACCENT_PURPLE))
            .data(BarGroup::default().bars(&bars))
            .bar_width(11)
            .bar_gap(4)
            .max(to_bp(axis_max));

        frame.render_widget(chart, area);
    }

    fn render_trend(&self, frame: &mut Frame, area: Rect) {
        let trend = &self.view.trend;
        let block = panel("CONVERSION TREND OVER TIME", ACCENT_YELLOW);

        if trend.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("no sessions", Style::default().fg(TEXT_DIM)))
                    .block(block),
                area,
            );
            return;
        }

        let points: Vec<(Group, Vec<(f64, f64)>)> = Group::all()
            .iter()
            .filter_map(|g| trend.line(*g))
            .map(|line| {
                let data = line
                    .rates
                    .iter()
                    .enumerate()
                    .filter_map(|(i, r)| r.map(|r| (i as f64, r)))
                    .collect();
                (line.group, data)
            })
            .collect();

        let y_max = points
            .iter()
            .flat_map(|(_, data)| data.iter().map(|(_, y)| *y))
            .fold(0.0_f64, f64::max)
            .max(0.01);

        let datasets = points
            .iter()
            .map(|(group, data)| {
                ChartDataset::default()
                    .name(group.as_str())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(group_color(*group)))
                    .data(data)
            })
            .collect();

        let x_max = (trend.dates.len().saturating_sub(1)).max(1) as f64;
        let first = trend.dates.first().map(|d| d.format("%m-%d").to_string());
        let last = trend.dates.last().map(|d| d.format("%m-%d").to_string());

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(TEXT_DIM))
                    .bounds([0.0, x_max])
                    .labels(vec![
                        Span::raw(first.unwrap_or_default()),
                        Span::raw(last.unwrap_or_default()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(TEXT_DIM))
                    .bounds([0.0, y_max])
                    .labels(vec![
                        Span::raw("0"),
                        Span::raw(format!("{:.3}", y_max)),
                    ]),
            );

        frame.render_widget(chart, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(ACCENT_CYAN)),
            Span::styled(" Quit ", Style::default().fg(TEXT_DIM)),
            Span::styled("[TAB]", Style::default().fg(ACCENT_CYAN)),
            Span::styled(" Switch Group ", Style::default().fg(TEXT_DIM)),
            Span::styled("[A/C/T]", Style::default().fg(ACCENT_CYAN)),
            Span::styled(" All/Control/Treatment ", Style::default().fg(TEXT_DIM)),
            Span::styled("[?]", Style::default().fg(ACCENT_CYAN)),
            Span::styled(" Help ", Style::default().fg(TEXT_DIM)),
            Span::raw("  │  "),
            Span::styled(
                format!("{} rows loaded", format_thousands(self.dataset.len() as u64)),
                Style::default().fg(TEXT_DIM),
            ),
        ]);

        frame.render_widget(Paragraph::new(footer), area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, help_area);

        let block = panel("KEYBOARD SHORTCUTS", ACCENT_CYAN)
            .border_style(Style::default().fg(ACCENT_CYAN))
            .style(Style::default().bg(Color::Rgb(16, 16, 16)));

        let key = |k: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("{:<14}", k), Style::default().fg(ACCENT_CYAN)),
                Span::raw(desc),
            ])
        };

        let help_text = vec![
            key("Q / Esc", "Quit dashboard"),
            key("Tab / →", "Next group filter"),
            key("Shift+Tab / ←", "Previous group filter"),
            key("A / 1", "All groups"),
            key("C / 2", "Control only"),
            key("T / 3", "Treatment only"),
            key("?", "Toggle help"),
        ];

        frame.render_widget(Paragraph::new(help_text).block(block), help_area);
    }
}

fn group_color(group: Group) -> Color {
    match group {
        Group::Control => ACCENT_CYAN,
        Group::Treatment => ACCENT_PURPLE,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
