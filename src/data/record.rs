//! Session records and the immutable dataset they live in

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Experiment arm a user was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Control,
    Treatment,
}

impl Group {
    pub fn all() -> &'static [Group] {
        &[Group::Control, Group::Treatment]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Control => "control",
            Group::Treatment => "treatment",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Group {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control" => Ok(Group::Control),
            "treatment" => Ok(Group::Treatment),
            other => anyhow::bail!("unknown group '{}' (expected control or treatment)", other),
        }
    }
}

/// One user session from the experiment log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub timestamp: NaiveDateTime,
    pub group: Group,
    pub converted: bool,
}

impl SessionRecord {
    /// Calendar date the session falls on
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Loaded session table.
///
/// Cloning is cheap: rows are shared behind an `Arc` and never mutated.
/// Filtering produces a new `Dataset` rather than changing this one.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[SessionRecord]>,
}

impl Dataset {
    pub fn new(records: Vec<SessionRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` rows, in file order
    pub fn head(&self, n: usize) -> &[SessionRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Whether at least one row belongs to `group`
    pub fn contains_group(&self, group: Group) -> bool {
        self.records.iter().any(|r| r.group == group)
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<SessionRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = SessionRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
