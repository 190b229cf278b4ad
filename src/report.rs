//! One fully computed dashboard view and its console rendering
//!
//! A view is rebuilt from the immutable dataset on every filter change:
//! load → filter → aggregate → test → render.

use crate::aggregate::{
    conversion_distribution, daily_trend, overall_metrics, summarize_groups,
    ConversionDistribution, GroupSummary, OverallMetrics, TrendSeries,
};
use crate::config::DashboardConfig;
use crate::data::{Dataset, Group, SessionRecord};
use crate::filter::GroupFilter;
use crate::significance::{SignificanceOutcome, SignificanceTester, SKIPPED_MESSAGE};
use crate::theme::{format_banner, format_heading, format_metric, BannerStyle, Palette};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::debug;

pub const DASHBOARD_TITLE: &str = "E-Commerce A/B Testing Dashboard";

/// Everything the dashboard shows for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filter: GroupFilter,
    pub preview: Vec<SessionRecord>,
    pub metrics: OverallMetrics,
    pub groups: Vec<GroupSummary>,
    pub distribution: ConversionDistribution,
    pub trend: TrendSeries,
    pub significance: SignificanceOutcome,
}

impl DashboardView {
    pub fn build(dataset: &Dataset, filter: GroupFilter, config: &DashboardConfig) -> Result<Self> {
        let tester = SignificanceTester::new(config.analysis.alpha)?;
        let view = filter.apply(dataset);

        let groups = summarize_groups(&view);
        let significance = tester.evaluate(&groups)?;

        debug!(
            filter = %filter,
            rows = view.len(),
            tested = significance.result().is_some(),
            "dashboard view rebuilt"
        );

        Ok(Self {
            filter,
            preview: view.head(config.analysis.preview_rows).to_vec(),
            metrics: overall_metrics(&view),
            groups,
            distribution: conversion_distribution(&view),
            trend: TrendSeries::from_points(&daily_trend(&view)),
            significance,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the whole view as a console report
    pub fn render_text(&self, palette: &Palette, config: &DashboardConfig) -> String {
        let mut out = String::new();

        let subtitle = format!("Group filter: {}", self.filter);
        out.push_str(&format_banner(
            palette,
            DASHBOARD_TITLE,
            &[subtitle.as_str()],
            BannerStyle::Primary,
        ));
        out.push('\n');

        self.write_preview(&mut out, palette);
        self.write_metrics(&mut out, palette);
        self.write_group_bars(&mut out, palette, config);
        self.write_distribution(&mut out, palette);
        self.write_trend(&mut out, palette);
        self.write_significance(&mut out, palette);

        out
    }

    fn write_preview(&self, out: &mut String, palette: &Palette) {
        let _ = writeln!(out, "{}", format_heading(palette, "Dataset Preview"));
        let _ = writeln!(
            out,
            "{:>10}  {:<26}  {:<10}  {:>9}",
            "user_id", "timestamp", "group", "converted"
        );
        for r in &self.preview {
            let _ = writeln!(
                out,
                "{:>10}  {:<26}  {:<10}  {:>9}",
                r.user_id,
                r.timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
                r.group,
                u8::from(r.converted)
            );
        }
        if self.preview.is_empty() {
            let _ = writeln!(out, "{}(no rows){}", palette.fg_dim, palette.reset);
        }
        out.push('\n');
    }

    fn write_metrics(&self, out: &mut String, palette: &Palette) {
        let _ = writeln!(out, "{}", format_heading(palette, "Summary Metrics"));
        let _ = writeln!(
            out,
            "{}",
            format_metric(palette, "Total Users", &format_thousands(self.metrics.total_users))
        );
        let _ = writeln!(
            out,
            "{}",
            format_metric(
                palette,
                "Total Conversions",
                &format_thousands(self.metrics.total_conversions)
            )
        );
        let _ = writeln!(
            out,
            "{}",
            format_metric(
                palette,
                "Conversion Rate",
                &format_rate(self.metrics.conversion_rate)
            )
        );
        out.push('\n');
    }

    fn write_group_bars(&self, out: &mut String, palette: &Palette, config: &DashboardConfig) {
        let _ = writeln!(out, "{}", format_heading(palette, "Conversion Rate by Group"));
        let width = config.charts.bar_width;
        for summary in &self.groups {
            let filled = bar_cells(summary.rate, config.charts.rate_axis_max, width);
            let _ = writeln!(
                out,
                "{:<10} {}{}{}{} {:.2}%  ({} / {})",
                summary.group,
                group_color(palette, summary.group),
                "█".repeat(filled),
                palette.reset,
                " ".repeat(width - filled),
                summary.rate * 100.0,
                format_thousands(summary.conversions),
                format_thousands(summary.count)
            );
        }
        if self.groups.is_empty() {
            let _ = writeln!(out, "{}(no rows){}", palette.fg_dim, palette.reset);
        }
        out.push('\n');
    }

    fn write_distribution(&self, out: &mut String, palette: &Palette) {
        let _ = writeln!(out, "{}", format_heading(palette, "Overall Conversion Distribution"));
        let d = &self.distribution;
        let _ = writeln!(
            out,
            "Not Converted  {:>5.1}%  ({})",
            d.not_converted_share() * 100.0,
            format_thousands(d.not_converted)
        );
        let _ = writeln!(
            out,
            "{}Converted      {:>5.1}%  ({}){}",
            palette.fg_green,
            d.converted_share() * 100.0,
            format_thousands(d.converted),
            palette.reset
        );
        out.push('\n');
    }

    fn write_trend(&self, out: &mut String, palette: &Palette) {
        let _ = writeln!(out, "{}", format_heading(palette, "Conversion Trend Over Time"));
        let mut header = format!("{:<12}", "date");
        for line in &self.trend.lines {
            let _ = write!(header, "{:>12}", line.group.as_str());
        }
        let _ = writeln!(out, "{}", header);

        for (i, date) in self.trend.dates.iter().enumerate() {
            let mut row = format!("{:<12}", date.format("%Y-%m-%d").to_string());
            for line in &self.trend.lines {
                let cell = line.rates[i]
                    .map(|r| format!("{:.4}", r))
                    .unwrap_or_else(|| "-".to_string());
                let _ = write!(row, "{:>12}", cell);
            }
            let _ = writeln!(out, "{}", row);
        }
        out.push('\n');
    }

    fn write_significance(&self, out: &mut String, palette: &Palette) {
        let _ = writeln!(
            out,
            "{}",
            format_heading(palette, "Statistical Significance Test (Z-Test)")
        );
        match &self.significance {
            SignificanceOutcome::Tested(result) => {
                let _ = writeln!(out, "Z-statistic: {:.4}", result.z_statistic);
                let _ = writeln!(out, "P-value: {:.4}", result.p_value);
                let style = if result.verdict.is_significant() {
                    BannerStyle::Success
                } else {
                    BannerStyle::Warning
                };
                let alpha_line = format!("alpha = {}", result.alpha);
                out.push_str(&format_banner(
                    palette,
                    result.verdict.headline(),
                    &[alpha_line.as_str()],
                    style,
                ));
            }
            SignificanceOutcome::Skipped { .. } => {
                out.push_str(&format_banner(palette, SKIPPED_MESSAGE, &[], BannerStyle::Info));
            }
        }
    }
}

fn group_color(palette: &Palette, group: Group) -> &'static str {
    match group {
        Group::Control => palette.fg_cyan,
        Group::Treatment => palette.fg_purple,
    }
}

/// Bar length for `rate` on an axis topped at `axis_max`, clamped to `width`
pub fn bar_cells(rate: f64, axis_max: f64, width: usize) -> usize {
    if axis_max <= 0.0 || !rate.is_finite() {
        return 0;
    }
    let ratio = (rate / axis_max).clamp(0.0, 1.0);
    ((ratio * width as f64).round() as usize).min(width)
}

/// `1234567` → `"1,234,567"`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rate as a percentage with two decimals, or `n/a` for an empty view
pub fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.2}%", r * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeMode;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for i in 0..40u32 {
            let group = if i % 2 == 0 { Group::Control } else { Group::Treatment };
            records.push(SessionRecord {
                user_id: i.to_string(),
                timestamp: NaiveDate::from_ymd_opt(2017, 1, 2 + i % 3)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                group,
                converted: i % 5 == 0,
            });
        }
        Dataset::new(records)
    }

    #[test]
    fn test_build_all() {
        let view = DashboardView::build(&dataset(), GroupFilter::All, &DashboardConfig::default())
            .unwrap();
        assert_eq!(view.preview.len(), 5);
        assert_eq!(view.metrics.total_users, 40);
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.trend.dates.len(), 3);
        assert!(view.significance.result().is_some());
    }

    #[test]
    fn test_single_arm_is_informational() {
        let config = DashboardConfig::default();
        let view = DashboardView::build(&dataset(), GroupFilter::Control, &config).unwrap();
        assert_eq!(view.groups.len(), 1);
        assert!(matches!(view.significance, SignificanceOutcome::Skipped { .. }));

        let text = view.render_text(&ThemeMode::Plain.palette(), &config);
        assert!(text.contains(SKIPPED_MESSAGE));
        assert!(!text.contains("Z-statistic"));
    }

    #[test]
    fn test_empty_dataset_renders() {
        let config = DashboardConfig::default();
        let view = DashboardView::build(&Dataset::default(), GroupFilter::All, &config).unwrap();
        let text = view.render_text(&ThemeMode::Plain.palette(), &config);
        assert!(text.contains("n/a"));
        assert!(text.contains(SKIPPED_MESSAGE));
    }

    #[test]
    fn test_text_sections() {
        let config = DashboardConfig::default();
        let view = DashboardView::build(&dataset(), GroupFilter::All, &config).unwrap();
        let text = view.render_text(&ThemeMode::Plain.palette(), &config);
        for section in [
            DASHBOARD_TITLE,
            "Dataset Preview",
            "Summary Metrics",
            "Conversion Rate by Group",
            "Overall Conversion Distribution",
            "Conversion Trend Over Time",
            "Z-statistic:",
            "P-value:",
        ] {
            assert!(text.contains(section), "missing section {}", section);
        }
    }

    #[test]
    fn test_json_shape() {
        let view = DashboardView::build(&dataset(), GroupFilter::All, &DashboardConfig::default())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(json["filter"], "all");
        assert_eq!(json["significance"]["status"], "tested");
        assert_eq!(json["groups"][0]["group"], "control");
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(294478), "294,478");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_rate(Some(0.1197)), "11.97%");
        assert_eq!(format_rate(None), "n/a");
    }

    #[test]
    fn test_bar_cells_clamped() {
        assert_eq!(bar_cells(0.1, 0.2, 40), 20);
        assert_eq!(bar_cells(0.5, 0.2, 40), 40);
        assert_eq!(bar_cells(0.0, 0.2, 40), 0);
        assert_eq!(bar_cells(f64::NAN, 0.2, 40), 0);
    }
}
