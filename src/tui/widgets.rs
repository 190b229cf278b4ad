//! Custom TUI widgets for the dashboard
//!
//! AMOLED-black palette shared by every panel

use crate::aggregate::ConversionDistribution;
use crate::significance::{SignificanceOutcome, Verdict, SKIPPED_MESSAGE};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub const ACCENT_CYAN: Color = Color::Rgb(0, 255, 255);
pub const ACCENT_GREEN: Color = Color::Rgb(0, 255, 136);
pub const ACCENT_YELLOW: Color = Color::Rgb(255, 204, 0);
pub const ACCENT_PURPLE: Color = Color::Rgb(168, 85, 247);
pub const TEXT_DIM: Color = Color::Rgb(128, 128, 128);
pub const TEXT_BRIGHT: Color = Color::Rgb(255, 255, 255);
pub const BORDER_DIM: Color = Color::Rgb(48, 48, 48);

/// Bordered panel with the dashboard title style
pub fn panel(title: &str, accent: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_DIM))
}

/// Single headline number
pub struct MetricCard<'a> {
    title: &'a str,
    value: String,
    color: Color,
}

impl<'a> MetricCard<'a> {
    pub fn new(title: &'a str, value: String) -> Self {
        Self {
            title,
            value,
            color: TEXT_BRIGHT,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl<'a> Widget for MetricCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = panel(self.title, TEXT_DIM);
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(Line::from(Span::styled(
            self.value,
            Style::default().fg(self.color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(inner, buf);
    }
}

/// Converted vs. not converted split, drawn as one proportional bar
pub struct DistributionBar {
    distribution: ConversionDistribution,
}

impl DistributionBar {
    pub fn new(distribution: ConversionDistribution) -> Self {
        Self { distribution }
    }
}

impl Widget for DistributionBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = panel("OVERALL CONVERSION DISTRIBUTION", ACCENT_GREEN);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 || inner.width < 4 {
            return;
        }

        let d = self.distribution;
        if d.total() == 0 {
            Paragraph::new(Span::styled("no sessions", Style::default().fg(TEXT_DIM)))
                .render(inner, buf);
            return;
        }

        let converted_width = (d.converted_share() * inner.width as f64).round() as u16;
        let converted_width = if d.converted > 0 {
            converted_width.max(1)
        } else {
            0
        };

        // Bar
        for dx in 0..inner.width {
            let color = if dx < converted_width {
                ACCENT_GREEN
            } else {
                BORDER_DIM
            };
            buf.get_mut(inner.x + dx, inner.y)
                .set_char('█')
                .set_fg(color);
        }

        // Legend
        let legend = Line::from(vec![
            Span::styled("■ ", Style::default().fg(ACCENT_GREEN)),
            Span::styled(
                format!("Converted {:.1}%", d.converted_share() * 100.0),
                Style::default().fg(TEXT_BRIGHT),
            ),
            Span::raw("   "),
            Span::styled("■ ", Style::default().fg(TEXT_DIM)),
            Span::styled(
                format!("Not Converted {:.1}%", d.not_converted_share() * 100.0),
                Style::default().fg(TEXT_BRIGHT),
            ),
        ]);
        Paragraph::new(legend).render(
            Rect::new(inner.x, inner.y + 1, inner.width, 1),
            buf,
        );
    }
}

/// Z-test statistics and the coloured verdict banner
pub struct VerdictBanner<'a> {
    outcome: &'a SignificanceOutcome,
}

impl<'a> VerdictBanner<'a> {
    pub fn new(outcome: &'a SignificanceOutcome) -> Self {
        Self { outcome }
    }
}

pub fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Significant => ACCENT_GREEN,
        Verdict::NotSignificant => ACCENT_YELLOW,
    }
}

impl<'a> Widget for VerdictBanner<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = panel("STATISTICAL SIGNIFICANCE TEST (Z-TEST)", ACCENT_PURPLE);
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match self.outcome {
            SignificanceOutcome::Tested(result) => {
                let color = verdict_color(result.verdict);
                vec![
                    Line::from(vec![
                        Span::styled("Z-statistic: ", Style::default().fg(TEXT_DIM)),
                        Span::styled(
                            format!("{:.4}", result.z_statistic),
                            Style::default().fg(TEXT_BRIGHT),
                        ),
                        Span::raw("   "),
                        Span::styled("P-value: ", Style::default().fg(TEXT_DIM)),
                        Span::styled(
                            format!("{:.4}", result.p_value),
                            Style::default().fg(TEXT_BRIGHT),
                        ),
                        Span::raw("   "),
                        Span::styled(
                            format!("alpha {}", result.alpha),
                            Style::default().fg(TEXT_DIM),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!(" {} ", result.verdict.headline()),
                        Style::default()
                            .fg(Color::Black)
                            .bg(color)
                            .add_modifier(Modifier::BOLD),
                    )),
                ]
            }
            SignificanceOutcome::Skipped { .. } => vec![Line::from(vec![
                Span::styled("ℹ ", Style::default().fg(ACCENT_CYAN)),
                Span::styled(SKIPPED_MESSAGE, Style::default().fg(ACCENT_CYAN)),
            ])],
        };

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
