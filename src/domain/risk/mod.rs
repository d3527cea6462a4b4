//! Risk module - pattern scoring and trend analysis.
//!
//! # Components
//!
//! - `patterns` - The fixed crisis-indicator table
//! - `PatternRiskScorer` - Check-in + classifier outcome -> `RiskAssessment`
//! - `TrajectoryAnalyzer` - Assessment history -> `Trajectory`
//!
//! Everything here is pure and deterministic. No ports, no I/O.

mod assessment;
pub mod patterns;
mod scorer;
mod trajectory;

pub use assessment::{RiskAssessment, IMMEDIATE_ATTENTION_THRESHOLD};
pub use patterns::{CrisisPattern, Severity};
pub use scorer::{
    PatternRiskScorer, TemporalWeights, DISTRESS_FLOOR, EXTREME_NEGATIVE_SENTIMENT,
    FACTOR_CUMULATIVE_DISTRESS, FACTOR_EXTREME_SENTIMENT, FACTOR_LATE_NIGHT,
    FACTOR_UNVERIFIED_HIGH_SEVERITY, FACTOR_WEEKEND, FAILSAFE_FLOOR,
};
pub use trajectory::{Trajectory, TrajectoryAnalyzer};
