//! Two-proportion z-test between the control and treatment arms
//!
//! Uses the pooled-proportion standard error and a two-sided p-value
//! from the standard normal distribution:
//!
//! ```text
//! p̂  = (x₁ + x₂) / (n₁ + n₂)
//! SE = √(p̂(1 − p̂)(1/n₁ + 1/n₂))
//! z  = (p₁ − p₂) / SE
//! p  = 2 · (1 − Φ(|z|))
//! ```
//!
//! Arm 1 is control, arm 2 is treatment.

use crate::aggregate::{find_summary, GroupSummary};
use crate::data::Group;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

pub const DEFAULT_ALPHA: f64 = 0.05;

pub const SKIPPED_MESSAGE: &str =
    "Z-test requires both control and treatment groups to be present.";

/// Outcome of comparing the p-value against alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Significant,
    NotSignificant,
}

impl Verdict {
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Verdict::Significant
        } else {
            Verdict::NotSignificant
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, Verdict::Significant)
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::Significant => {
                "Reject the Null Hypothesis: statistically significant difference between groups."
            }
            Verdict::NotSignificant => {
                "Fail to Reject the Null Hypothesis: no significant difference found."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZTestResult {
    pub z_statistic: f64,
    pub p_value: f64,
    pub alpha: f64,
    pub verdict: Verdict,
}

/// What the significance panel shows for the current view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignificanceOutcome {
    Tested(ZTestResult),
    /// One or both arms are absent; the test was not run
    Skipped { missing: Vec<Group> },
}

impl SignificanceOutcome {
    pub fn result(&self) -> Option<&ZTestResult> {
        match self {
            SignificanceOutcome::Tested(result) => Some(result),
            SignificanceOutcome::Skipped { .. } => None,
        }
    }
}

/// Pooled two-proportion z statistic and two-sided p-value.
///
/// When the pooled proportion is 0 or 1 both arms are identical and the
/// standard error vanishes; that case reports `z = 0, p = 1`.
pub fn two_proportion_ztest(
    conversions_1: u64,
    count_1: u64,
    conversions_2: u64,
    count_2: u64,
) -> Result<(f64, f64)> {
    ensure!(count_1 > 0 && count_2 > 0, "both samples must be non-empty");
    ensure!(
        conversions_1 <= count_1 && conversions_2 <= count_2,
        "conversions cannot exceed sample size"
    );

    let (n1, n2) = (count_1 as f64, count_2 as f64);
    let p1 = conversions_1 as f64 / n1;
    let p2 = conversions_2 as f64 / n2;
    let pooled = (conversions_1 + conversions_2) as f64 / (n1 + n2);

    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return Ok((0.0, 1.0));
    }

    let z = (p1 - p2) / se;
    let normal = Normal::new(0.0, 1.0).context("standard normal")?;
    let p_value = (2.0 * normal.sf(z.abs())).clamp(0.0, 1.0);

    Ok((z, p_value))
}

/// Runs the z-test at a fixed significance level
#[derive(Debug, Clone, Copy)]
pub struct SignificanceTester {
    alpha: f64,
}

impl Default for SignificanceTester {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SignificanceTester {
    pub fn new(alpha: f64) -> Result<Self> {
        ensure!(
            alpha > 0.0 && alpha < 1.0,
            "alpha must lie strictly between 0 and 1 (got {})",
            alpha
        );
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Compare control against treatment. Both arms must be non-empty.
    pub fn test(&self, control: &GroupSummary, treatment: &GroupSummary) -> Result<ZTestResult> {
        let (z_statistic, p_value) = two_proportion_ztest(
            control.conversions,
            control.count,
            treatment.conversions,
            treatment.count,
        )?;

        Ok(ZTestResult {
            z_statistic,
            p_value,
            alpha: self.alpha,
            verdict: Verdict::from_p_value(p_value, self.alpha),
        })
    }

    /// Test the view's arms, or report which arm is missing.
    ///
    /// Never runs the test unless both arms have at least one session.
    /// Inconsistent summaries (more conversions than sessions) are an error.
    pub fn evaluate(&self, summaries: &[GroupSummary]) -> Result<SignificanceOutcome> {
        let control = find_summary(summaries, Group::Control).filter(|s| s.count > 0);
        let treatment = find_summary(summaries, Group::Treatment).filter(|s| s.count > 0);

        match (control, treatment) {
            (Some(control), Some(treatment)) => {
                let result = self.test(control, treatment).map_err(|e| {
                    warn!("z-test failed: {:#}", e);
                    e
                })?;
                debug!(
                    z = result.z_statistic,
                    p = result.p_value,
                    verdict = ?result.verdict,
                    "z-test complete"
                );
                Ok(SignificanceOutcome::Tested(result))
            }
            (control, treatment) => {
                let mut missing = Vec::new();
                if control.is_none() {
                    missing.push(Group::Control);
                }
                if treatment.is_none() {
                    missing.push(Group::Treatment);
                }
                debug!(?missing, "z-test skipped");
                Ok(SignificanceOutcome::Skipped { missing })
            }
        }
    }
}
