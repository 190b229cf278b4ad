//! A/B Test Report CLI
//!
//! Runs the dashboard pipeline once and prints the result.
//!
//! # Usage
//!
//! ```bash
//! abtest-report --data ab_data.csv
//! abtest-report --data ab_data.csv --group control
//! abtest-report --data ab_data.csv --format json --alpha 0.01
//! ```
//!
//! # Exit Codes
//!
//! - 0: Report printed (including the single-arm informational case)
//! - 1: Missing data file, malformed CSV, or invalid configuration

use abtest_dashboard::theme::ThemeMode;
use abtest_dashboard::{load_csv, DashboardConfig, DashboardView, GroupFilter};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// One-shot A/B test report
#[derive(Parser, Debug)]
#[command(name = "abtest-report")]
#[command(about = "Print conversion statistics and a two-proportion z-test for an A/B test")]
struct Cli {
    /// Session log CSV (user_id, timestamp, group, converted)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restrict the report to one arm
    #[arg(short, long, value_enum)]
    group: Option<GroupFilter>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Significance level for the z-test
    #[arg(long)]
    alpha: Option<f64>,

    /// Console colour theme (text output)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abtest_dashboard=info".into()),
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
    if let Some(alpha) = cli.alpha {
        config.analysis.alpha = alpha;
    }
    config.validate()?;

    let filter = cli.group.unwrap_or(config.default_filter);
    let dataset = load_csv(&config.data_path)?;
    let view = DashboardView::build(&dataset, filter, &config)?;
    info!(filter = %filter, rows = view.metrics.total_users, "report built");

    match cli.format {
        OutputFormat::Json => println!("{}", view.to_json()?),
        OutputFormat::Text => {
            let theme = if cli.no_color {
                ThemeMode::Plain
            } else {
                cli.theme
                    .or_else(ThemeMode::from_env)
                    .unwrap_or(config.ui.theme)
            };
            print!("{}", view.render_text(&theme.palette(), &config));
        }
    }

    Ok(())
}
