//! Dashboard TUI - interactive terminal view of the experiment
//!
//! - Group selector as header tabs (all / control / treatment)
//! - Preview table, headline metrics, bar / distribution / trend charts
//! - Z-test panel with a coloured verdict banner

pub mod app;
pub mod renderer;
pub mod widgets;

pub use app::DashboardApp;
