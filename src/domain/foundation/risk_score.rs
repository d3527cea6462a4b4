//! Risk score value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A crisis-risk score between 0 and 100 inclusive.
///
/// Construction always clamps, so a `RiskScore` can never leave its range.
/// NaN inputs collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(f64);

impl RiskScore {
    /// No risk.
    pub const ZERO: Self = Self(0.0);

    /// Maximum risk.
    pub const MAX: Self = Self(100.0);

    /// Creates a new RiskScore, clamping to the valid range.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Creates a RiskScore, returning error if out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::out_of_range("risk_score", 0.0, 100.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Raises the score to at least `floor`.
    pub fn at_least(self, floor: f64) -> Self {
        Self::new(self.0.max(floor))
    }

    /// Strict greater-than against a threshold.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.0 > threshold
    }
}

impl Default for RiskScore {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_to_range() {
        assert_eq!(RiskScore::new(-5.0).value(), 0.0);
        assert_eq!(RiskScore::new(42.5).value(), 42.5);
        assert_eq!(RiskScore::new(180.0).value(), 100.0);
    }

    #[test]
    fn nan_collapses_to_zero() {
        assert_eq!(RiskScore::new(f64::NAN), RiskScore::ZERO);
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(RiskScore::try_new(100.0).is_ok());
        assert!(matches!(
            RiskScore::try_new(100.1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn at_least_never_lowers() {
        assert_eq!(RiskScore::new(90.0).at_least(80.0).value(), 90.0);
        assert_eq!(RiskScore::new(10.0).at_least(80.0).value(), 80.0);
    }

    #[test]
    fn exceeds_is_strict() {
        assert!(!RiskScore::new(85.0).exceeds(85.0));
        assert!(RiskScore::new(85.1).exceeds(85.0));
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&RiskScore::new(42.0)).unwrap(), "42.0");
    }
}
