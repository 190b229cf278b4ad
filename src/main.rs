//! A/B Test Dashboard
//!
//! Interactive terminal dashboard for an e-commerce conversion experiment.
//!
//! Usage:
//!   abtest-dashboard                          # reads ./ab_data.csv
//!   abtest-dashboard --data runs/ab_data.csv  # explicit data file
//!   abtest-dashboard --group treatment        # open on one arm
//!
//! Keyboard:
//!   Q/Esc     - Quit
//!   Tab/←/→   - Switch group filter
//!   A/C/T     - Jump to all / control / treatment
//!   ?         - Show help

use abtest_dashboard::{load_csv, tui, DashboardConfig, GroupFilter};
use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interactive A/B test dashboard
#[derive(Parser, Debug)]
#[command(name = "abtest-dashboard")]
#[command(about = "Explore conversion rates and significance of an A/B test")]
struct Cli {
    /// Session log CSV (user_id, timestamp, group, converted)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Group shown on startup
    #[arg(short, long, value_enum)]
    group: Option<GroupFilter>,
}

fn init_tracing() {
    // stderr shares the terminal with the TUI, so stay quiet unless asked
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abtest_dashboard=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = DashboardConfig::resolve(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    let filter = cli.group.unwrap_or(config.default_filter);

    // Missing or malformed data is fatal before the terminal is touched
    let dataset = load_csv(&config.data_path)?;
    info!(rows = dataset.len(), filter = %filter, "starting dashboard");

    let source = config.data_path.display().to_string();
    let poll_interval = Duration::from_millis(config.ui.tick_rate_ms);
    let mut app = tui::DashboardApp::new(dataset, config, source, filter)?;

    tui::renderer::run(&mut app, poll_interval)
}
