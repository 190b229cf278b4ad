//! Experiment-arm filter applied before aggregation

use crate::data::{Dataset, Group};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rows of the session log to analyze
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupFilter {
    #[default]
    All,
    Control,
    Treatment,
}

impl GroupFilter {
    pub fn all() -> &'static [GroupFilter] {
        &[GroupFilter::All, GroupFilter::Control, GroupFilter::Treatment]
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupFilter::All => "all",
            GroupFilter::Control => "control",
            GroupFilter::Treatment => "treatment",
        }
    }

    /// The single arm this filter keeps, if any
    pub fn group(&self) -> Option<Group> {
        match self {
            GroupFilter::All => None,
            GroupFilter::Control => Some(Group::Control),
            GroupFilter::Treatment => Some(Group::Treatment),
        }
    }

    pub fn matches(&self, group: Group) -> bool {
        self.group().map_or(true, |g| g == group)
    }

    /// Restrict `dataset` to the selected arm
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if self.group().is_none() {
            return dataset.clone();
        }
        dataset
            .records()
            .iter()
            .filter(|r| self.matches(r.group))
            .cloned()
            .collect()
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SessionRecord;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let ts = NaiveDate::from_ymd_opt(2017, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        [
            ("1", Group::Control, false),
            ("2", Group::Treatment, true),
            ("3", Group::Control, true),
        ]
        .into_iter()
        .map(|(id, group, converted)| SessionRecord {
            user_id: id.to_string(),
            timestamp: ts,
            group,
            converted,
        })
        .collect()
    }

    #[test]
    fn test_all_passes_through() {
        let ds = dataset();
        assert_eq!(GroupFilter::All.apply(&ds).len(), 3);
    }

    #[test]
    fn test_single_arm() {
        let ds = dataset();
        let control = GroupFilter::Control.apply(&ds);
        assert_eq!(control.len(), 2);
        assert!(control.records().iter().all(|r| r.group == Group::Control));

        let treatment = GroupFilter::Treatment.apply(&ds);
        assert_eq!(treatment.len(), 1);
        assert_eq!(treatment.records()[0].user_id, "2");
    }

    #[test]
    fn test_source_untouched() {
        let ds = dataset();
        let _ = GroupFilter::Treatment.apply(&ds);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn test_cycle() {
        assert_eq!(GroupFilter::All.next(), GroupFilter::Control);
        assert_eq!(GroupFilter::Treatment.next(), GroupFilter::All);
        assert_eq!(GroupFilter::All.prev(), GroupFilter::Treatment);
    }
}
