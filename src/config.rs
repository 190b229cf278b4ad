//! Dashboard configuration
//!
//! Data location, significance level, and display settings. Loaded from
//! TOML with every field optional, then overridden from the environment.

use crate::filter::GroupFilter;
use crate::significance::DEFAULT_ALPHA;
use crate::theme::ThemeMode;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_VAR: &str = "ABTEST_CONFIG_PATH";
pub const DATA_PATH_VAR: &str = "ABTEST_DATA_PATH";
pub const ALPHA_VAR: &str = "ABTEST_ALPHA";

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Session log CSV
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Arm selected when the dashboard opens
    #[serde(default)]
    pub default_filter: GroupFilter,

    /// Statistical settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,

    /// Terminal UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("ab_data.csv")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            default_filter: GroupFilter::All,
            analysis: AnalysisConfig::default(),
            charts: ChartConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment or default path, then apply env overrides
    pub fn from_env() -> anyhow::Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "abtest_config.toml".to_string());

        let mut config = Self::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Using default dashboard config ({}): {:#}", path, e);
            Self::default()
        });
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Explicit config file if given (it must exist), else [`Self::from_env`]
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let mut config = Self::load(path)?;
                config.apply_overrides(|key| std::env::var(key).ok())?;
                Ok(config)
            }
            None => Self::from_env(),
        }
    }

    /// Apply `ABTEST_DATA_PATH` / `ABTEST_ALPHA` style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DATA_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(alpha) = lookup(ALPHA_VAR) {
            self.analysis.alpha = alpha
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", ALPHA_VAR, alpha))?;
        }
        self.validate()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let alpha = self.analysis.alpha;
        ensure!(
            alpha > 0.0 && alpha < 1.0,
            "analysis.alpha must lie strictly between 0 and 1 (got {})",
            alpha
        );
        ensure!(
            self.charts.rate_axis_max > 0.0 && self.charts.rate_axis_max <= 1.0,
            "charts.rate_axis_max must be in (0, 1] (got {})",
            self.charts.rate_axis_max
        );
        ensure!(
            self.analysis.preview_rows <= MAX_PREVIEW_ROWS,
            "analysis.preview_rows must be at most {} (got {})",
            MAX_PREVIEW_ROWS,
            self.analysis.preview_rows
        );
        ensure!(self.ui.tick_rate_ms > 0, "ui.tick_rate_ms must be positive");
        Ok(())
    }

    /// Save to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Significance test and table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Significance level for the z-test
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Rows shown in the dataset preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
/// Upper bound on the dataset preview table
pub const MAX_PREVIEW_ROWS: usize = 1000;

fn default_preview_rows() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            preview_rows: 5,
        }
    }
}

/// Chart scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Upper bound of the conversion-rate axis on the bar chart
    #[serde(default = "default_rate_axis_max")]
    pub rate_axis_max: f64,

    /// Width in characters of text-report bars
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

fn default_rate_axis_max() -> f64 {
    0.2
}
fn default_bar_width() -> usize {
    40
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            rate_axis_max: 0.2,
            bar_width: 40,
        }
    }
}

/// Terminal UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Input poll interval (milliseconds)
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Console colour theme for the text report
    #[serde(default)]
    pub theme: ThemeMode,
}

fn default_tick_rate_ms() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            theme: ThemeMode::Dark,
        }
    }
}
