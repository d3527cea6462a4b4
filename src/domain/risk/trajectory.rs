//! Trajectory Analyzer - trend classification over a user's risk history.
//!
//! "Declining" describes the user's wellbeing: risk scores going up.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::assessment::RiskAssessment;

/// Number of most recent points in the short window.
pub const RECENT_WINDOW: usize = 3;

/// Maximum number of points in the baseline window preceding it.
pub const BASELINE_WINDOW: usize = 7;

/// Relative change of the window means needed to call a trend.
pub const RELATIVE_THRESHOLD: f64 = 0.15;

/// Absolute rise needed when the baseline mean is zero.
pub const ZERO_BASELINE_RISE: f64 = 5.0;

/// Direction of a user's risk over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trajectory::Improving => "improving",
            Trajectory::Stable => "stable",
            Trajectory::Declining => "declining",
            Trajectory::InsufficientData => "insufficient_data",
        };
        write!(f, "{}", s)
    }
}

/// Pure trend classifier over time-ordered assessments.
pub struct TrajectoryAnalyzer;

impl TrajectoryAnalyzer {
    /// Classifies a time-ordered history (oldest first).
    pub fn analyze(history: &[RiskAssessment]) -> Trajectory {
        let scores: Vec<f64> = history.iter().map(|a| a.risk_score().value()).collect();
        Self::analyze_scores(&scores)
    }

    /// Classifies a time-ordered series of raw scores.
    ///
    /// # Edge Cases
    /// - Fewer than 2 points: `InsufficientData`
    /// - 2 points: the latest point is compared against the first
    /// - Zero baseline: any rise above `ZERO_BASELINE_RISE` is declining
    pub fn analyze_scores(scores: &[f64]) -> Trajectory {
        let n = scores.len();
        if n < 2 {
            return Trajectory::InsufficientData;
        }

        let recent_len = RECENT_WINDOW.min(n - 1);
        let split = n - recent_len;
        let baseline_start = split.saturating_sub(BASELINE_WINDOW);

        let recent = mean(&scores[split..]);
        let baseline = mean(&scores[baseline_start..split]);

        if baseline <= f64::EPSILON {
            return if recent - baseline > ZERO_BASELINE_RISE {
                Trajectory::Declining
            } else {
                Trajectory::Stable
            };
        }

        let change = (recent - baseline) / baseline;
        if change > RELATIVE_THRESHOLD {
            Trajectory::Declining
        } else if change < -RELATIVE_THRESHOLD {
            Trajectory::Improving
        } else {
            Trajectory::Stable
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
