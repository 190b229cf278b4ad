//! Theme configuration for console report output
//!
//! Supports dark (AMOLED-black), light, and plain (no escape codes) output.
//! The palette is passed to the renderer explicitly.

use serde::{Deserialize, Serialize};

/// Theme mode for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Dark theme (AMOLED-black) - default
    #[default]
    Dark,
    /// Light theme (white/cream background friendly)
    Light,
    /// No ANSI escapes, for pipes and files
    Plain,
}

impl ThemeMode {
    /// Theme from `ABTEST_THEME`; `NO_COLOR` forces plain output
    pub fn from_env() -> Option<ThemeMode> {
        if std::env::var_os("NO_COLOR").is_some() {
            return Some(ThemeMode::Plain);
        }
        match std::env::var("ABTEST_THEME").as_deref() {
            Ok("light") | Ok("Light") | Ok("LIGHT") => Some(ThemeMode::Light),
            Ok("dark") | Ok("Dark") | Ok("DARK") => Some(ThemeMode::Dark),
            Ok("plain") | Ok("Plain") | Ok("PLAIN") => Some(ThemeMode::Plain),
            _ => None,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Dark => Palette {
                fg_bright: "\x1b[97m",
                fg_dim: "\x1b[90m",
                fg_cyan: "\x1b[96m",
                fg_green: "\x1b[92m",
                fg_yellow: "\x1b[93m",
                fg_purple: "\x1b[95m",
                bold: "\x1b[1m",
                reset: "\x1b[0m",
            },
            ThemeMode::Light => Palette {
                fg_bright: "\x1b[30m",
                fg_dim: "\x1b[90m",
                fg_cyan: "\x1b[36m",
                fg_green: "\x1b[32m",
                fg_yellow: "\x1b[33m",
                fg_purple: "\x1b[35m",
                bold: "\x1b[1m",
                reset: "\x1b[0m",
            },
            ThemeMode::Plain => Palette {
                fg_bright: "",
                fg_dim: "",
                fg_cyan: "",
                fg_green: "",
                fg_yellow: "",
                fg_purple: "",
                bold: "",
                reset: "",
            },
        }
    }
}

/// ANSI escape sequences for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg_bright: &'static str,
    pub fg_dim: &'static str,
    pub fg_cyan: &'static str,
    pub fg_green: &'static str,
    pub fg_yellow: &'static str,
    pub fg_purple: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

// Box drawing
const BOX_TL: &str = "╔";
const BOX_TR: &str = "╗";
const BOX_BL: &str = "╚";
const BOX_BR: &str = "╝";
const BOX_H: &str = "═";
const BOX_V: &str = "║";
const BOX_T_LEFT: &str = "╣";
const BOX_T_RIGHT: &str = "╠";

/// Banner style presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerStyle {
    /// Significant result (green)
    Success,
    /// Not significant (yellow)
    Warning,
    /// Neutral information (cyan)
    Info,
    /// Page heading (purple)
    Primary,
}

impl BannerStyle {
    fn color(&self, palette: &Palette) -> &'static str {
        match self {
            BannerStyle::Success => palette.fg_green,
            BannerStyle::Warning => palette.fg_yellow,
            BannerStyle::Info => palette.fg_cyan,
            BannerStyle::Primary => palette.fg_purple,
        }
    }
}

/// Format a themed banner (80-char wide box)
pub fn format_banner(
    palette: &Palette,
    title: &str,
    content_lines: &[&str],
    style: BannerStyle,
) -> String {
    let mut out = String::new();
    let width = 78; // Inner width (80 - 2 for borders)
    let color = style.color(palette);
    let reset = palette.reset;

    out.push_str(&format!("{}{}{}{}{}\n", color, BOX_TL, BOX_H.repeat(width), BOX_TR, reset));

    let title_padded = format!("  {}  ", title);
    let padding = width.saturating_sub(title_padded.chars().count());
    out.push_str(&format!(
        "{}{}{}{}{}{}{}{}{}{}{}\n",
        color,
        BOX_V,
        reset,
        color,
        palette.bold,
        title_padded,
        " ".repeat(padding),
        reset,
        color,
        BOX_V,
        reset
    ));

    if !content_lines.is_empty() {
        out.push_str(&format!(
            "{}{}{}{}{}\n",
            color,
            BOX_T_RIGHT,
            BOX_H.repeat(width),
            BOX_T_LEFT,
            reset
        ));

        for line in content_lines {
            let padding = width.saturating_sub(line.chars().count() + 2);
            out.push_str(&format!(
                "{}{}{}  {}{}{}{}{}\n",
                color,
                BOX_V,
                reset,
                line,
                " ".repeat(padding),
                color,
                BOX_V,
                reset
            ));
        }
    }

    out.push_str(&format!("{}{}{}{}{}\n", color, BOX_BL, BOX_H.repeat(width), BOX_BR, reset));
    out
}

/// Format a section heading
pub fn format_heading(palette: &Palette, title: &str) -> String {
    format!(
        "{}{}{}{}\n{}{}{}",
        palette.fg_cyan,
        palette.bold,
        title,
        palette.reset,
        palette.fg_dim,
        "─".repeat(title.chars().count()),
        palette.reset
    )
}

/// Format a label/value pair
pub fn format_metric(palette: &Palette, label: &str, value: &str) -> String {
    format!(
        "{}{}:{} {}{}{}",
        palette.fg_dim, label, palette.reset, palette.fg_bright, value, palette.reset
    )
}
