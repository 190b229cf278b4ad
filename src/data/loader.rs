//! CSV loader for the experiment session log
//!
//! Expected header (any order, extra columns ignored):
//! `user_id,timestamp,group,converted`

use super::record::{Dataset, Group, SessionRecord};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

const COL_USER_ID: &str = "user_id";
const COL_TIMESTAMP: &str = "timestamp";
const COL_GROUP: &str = "group";
const COL_CONVERTED: &str = "converted";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    user_id: usize,
    timestamp: usize,
    group: usize,
    converted: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .with_context(|| format!("missing required column '{}'", name))
        };

        Ok(Self {
            user_id: find(COL_USER_ID)?,
            timestamp: find(COL_TIMESTAMP)?,
            group: find(COL_GROUP)?,
            converted: find(COL_CONVERTED)?,
        })
    }

    fn width(&self) -> usize {
        [self.user_id, self.timestamp, self.group, self.converted]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Load the session log from disk
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open data file: {:?}", path))?;

    let dataset = parse_csv(BufReader::new(file))
        .with_context(|| format!("Failed to parse data file: {:?}", path))?;

    info!(rows = dataset.len(), path = %path.display(), "loaded session log");
    Ok(dataset)
}

/// Parse a session log from any buffered reader
pub fn parse_csv<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut lines = reader.lines().enumerate();

    let columns = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line.context("failed to read header")?;
                let line = line.trim_start_matches('\u{feff}');
                if line.trim().is_empty() {
                    continue;
                }
                break ColumnMap::from_header(&split_fields(line)?)?;
            }
            None => bail!("data file is empty (no header row)"),
        }
    };
    debug!(?columns, "resolved CSV columns");

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }
        let record =
            parse_row(&line, &columns).with_context(|| format!("invalid row at line {}", line_no))?;
        records.push(record);
    }

    Ok(Dataset::new(records))
}

fn parse_row(line: &str, columns: &ColumnMap) -> Result<SessionRecord> {
    let fields = split_fields(line)?;
    if fields.len() < columns.width() {
        bail!(
            "expected at least {} fields, found {}",
            columns.width(),
            fields.len()
        );
    }

    Ok(SessionRecord {
        user_id: fields[columns.user_id].trim().to_string(),
        timestamp: parse_timestamp(&fields[columns.timestamp])?,
        group: fields[columns.group].parse::<Group>()?,
        converted: parse_converted(&fields[columns.converted])?,
    })
}

/// Parse an ISO-style timestamp.
///
/// Offsets are normalised to UTC and then dropped; bare dates map to midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    bail!("unparseable timestamp '{}'", raw)
}

fn parse_converted(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => bail!("invalid converted flag '{}' (expected 0 or 1)", other),
    }
}

/// Split one CSV line into fields, honouring double quotes and `""` escapes
fn split_fields(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (ch, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    if in_quotes {
        bail!("unterminated quoted field");
    }
    fields.push(current.trim_end_matches('\r').to_string());
    Ok(fields)
}
