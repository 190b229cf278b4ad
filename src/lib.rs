//! A/B Test Dashboard Library
//!
//! Loads an experiment session log, filters it by arm, aggregates
//! conversion counts, and runs a two-proportion z-test. Shared by the
//! interactive TUI and the one-shot report binary.

pub mod aggregate;
pub mod config;
pub mod data;
pub mod filter;
pub mod report;
pub mod significance;
pub mod theme;
pub mod tui;

pub use config::DashboardConfig;
pub use data::{load_csv, Dataset, Group, SessionRecord};
pub use filter::GroupFilter;
pub use report::DashboardView;
pub use significance::{SignificanceOutcome, SignificanceTester, Verdict, ZTestResult};
