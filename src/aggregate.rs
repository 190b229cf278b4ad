//! Aggregation pipeline: per-arm conversion counts and daily trends
//!
//! All outputs are ordered deterministically (control before treatment,
//! dates ascending) so repeated runs over the same rows compare equal.

use crate::data::{Dataset, Group};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Conversion counts for one experiment arm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: Group,
    pub count: u64,
    pub conversions: u64,
    pub rate: f64,
}

impl GroupSummary {
    /// Build from raw counts; `conversions` is clamped to `count`
    pub fn from_counts(group: Group, count: u64, conversions: u64) -> Self {
        let conversions = conversions.min(count);
        let rate = if count > 0 {
            conversions as f64 / count as f64
        } else {
            0.0
        };
        Self {
            group,
            count,
            conversions,
            rate,
        }
    }
}

/// Headline numbers for the current view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallMetrics {
    pub total_users: u64,
    pub total_conversions: u64,
    /// `None` when the view is empty
    pub conversion_rate: Option<f64>,
}

/// Converted vs. not converted session counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversionDistribution {
    pub converted: u64,
    pub not_converted: u64,
}

impl ConversionDistribution {
    pub fn total(&self) -> u64 {
        self.converted + self.not_converted
    }

    pub fn converted_share(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.converted as f64 / total as f64,
        }
    }

    pub fn not_converted_share(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.not_converted as f64 / total as f64,
        }
    }
}

/// Mean conversion of one arm on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    pub group: Group,
    pub sessions: u64,
    pub rate: f64,
}

/// One arm's daily rates aligned to [`TrendSeries::dates`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub group: Group,
    pub rates: Vec<Option<f64>>,
}

/// Daily trend pivoted to date rows × arm columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSeries {
    pub dates: Vec<NaiveDate>,
    pub lines: Vec<TrendLine>,
}

impl TrendSeries {
    pub fn from_points(points: &[DailyTrendPoint]) -> Self {
        let dates: Vec<NaiveDate> = points
            .iter()
            .map(|p| p.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let groups: BTreeSet<Group> = points.iter().map(|p| p.group).collect();

        let lines = groups
            .into_iter()
            .map(|group| {
                let by_date: BTreeMap<NaiveDate, f64> = points
                    .iter()
                    .filter(|p| p.group == group)
                    .map(|p| (p.date, p.rate))
                    .collect();
                TrendLine {
                    group,
                    rates: dates.iter().map(|d| by_date.get(d).copied()).collect(),
                }
            })
            .collect();

        Self { dates, lines }
    }

    pub fn line(&self, group: Group) -> Option<&TrendLine> {
        self.lines.iter().find(|l| l.group == group)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Per-arm counts, one entry per arm present in `dataset`
pub fn summarize_groups(dataset: &Dataset) -> Vec<GroupSummary> {
    let mut counts: BTreeMap<Group, (u64, u64)> = BTreeMap::new();
    for record in dataset.records() {
        let entry = counts.entry(record.group).or_default();
        entry.0 += 1;
        entry.1 += u64::from(record.converted);
    }

    counts
        .into_iter()
        .map(|(group, (count, conversions))| GroupSummary::from_counts(group, count, conversions))
        .collect()
}

/// Look up one arm in the output of [`summarize_groups`]
pub fn find_summary(summaries: &[GroupSummary], group: Group) -> Option<&GroupSummary> {
    summaries.iter().find(|s| s.group == group)
}

pub fn overall_metrics(dataset: &Dataset) -> OverallMetrics {
    let total_users = dataset.len() as u64;
    let total_conversions = dataset.records().iter().filter(|r| r.converted).count() as u64;
    let conversion_rate =
        (total_users > 0).then(|| total_conversions as f64 / total_users as f64);

    OverallMetrics {
        total_users,
        total_conversions,
        conversion_rate,
    }
}

pub fn conversion_distribution(dataset: &Dataset) -> ConversionDistribution {
    dataset
        .records()
        .iter()
        .fold(ConversionDistribution::default(), |mut acc, r| {
            if r.converted {
                acc.converted += 1;
            } else {
                acc.not_converted += 1;
            }
            acc
        })
}

/// Mean conversion per (date, arm), ordered by date then arm
pub fn daily_trend(dataset: &Dataset) -> Vec<DailyTrendPoint> {
    let mut buckets: BTreeMap<(NaiveDate, Group), (u64, u64)> = BTreeMap::new();
    for record in dataset.records() {
        let entry = buckets.entry((record.date(), record.group)).or_default();
        entry.0 += 1;
        entry.1 += u64::from(record.converted);
    }

    buckets
        .into_iter()
        .map(|((date, group), (sessions, conversions))| DailyTrendPoint {
            date,
            group,
            sessions,
            rate: conversions as f64 / sessions as f64,
        })
        .collect()
}
