//! Experiment session data: record types and the CSV loader

pub mod loader;
pub mod record;

pub use loader::{load_csv, parse_csv, parse_timestamp};
pub use record::{Dataset, Group, SessionRecord};
