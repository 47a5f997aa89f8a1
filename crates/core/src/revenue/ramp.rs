//! Ramp curves shaping how cumulative revenue approaches a scenario total.

use serde::{Deserialize, Serialize};

/// Fraction of the scenario total realized by a given month.
///
/// Implementations must be non-decreasing in `month` and return exactly 1.0
/// at `month == horizon`.
pub trait RampCurve: Send + Sync {
    fn fraction(&self, month: u32, horizon: u32) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RampStrategy {
    Linear,
    /// S-curve centred on the middle of the horizon.
    Logistic { steepness: f64 },
}

impl Default for RampStrategy {
    fn default() -> Self {
        Self::Linear
    }
}

impl RampStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "logistic" => Some(Self::Logistic { steepness: DEFAULT_LOGISTIC_STEEPNESS }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logistic { .. } => "logistic",
        }
    }
}

pub const DEFAULT_LOGISTIC_STEEPNESS: f64 = 10.0;

impl RampCurve for RampStrategy {
    fn fraction(&self, month: u32, horizon: u32) -> f64 {
        if horizon == 0 || month >= horizon {
            return 1.0;
        }
        let progress = f64::from(month) / f64::from(horizon);

        match self {
            Self::Linear => progress,
            Self::Logistic { steepness } => {
                let curve = |x: f64| 1.0 / (1.0 + (-steepness * (x - 0.5)).exp());
                let start = curve(0.0);
                let end = curve(1.0);
                ((curve(progress) - start) / (end - start)).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RampCurve, RampStrategy};

    #[test]
    fn linear_ramp_is_proportional() {
        let ramp = RampStrategy::Linear;
        assert_eq!(ramp.fraction(0, 24), 0.0);
        assert_eq!(ramp.fraction(6, 24), 0.25);
        assert_eq!(ramp.fraction(24, 24), 1.0);
    }

    #[test]
    fn logistic_ramp_is_monotonic_and_reaches_one() {
        let ramp = RampStrategy::Logistic { steepness: 8.0 };
        let mut previous = 0.0;
        for month in 0..=24 {
            let fraction = ramp.fraction(month, 24);
            assert!(fraction >= previous, "month {month} fell from {previous} to {fraction}");
            previous = fraction;
        }
        assert_eq!(ramp.fraction(24, 24), 1.0);
        assert!(ramp.fraction(6, 24) < RampStrategy::Linear.fraction(6, 24));
    }

    #[test]
    fn parse_accepts_known_names() {
        assert_eq!(RampStrategy::parse("Linear"), Some(RampStrategy::Linear));
        assert!(matches!(RampStrategy::parse("logistic"), Some(RampStrategy::Logistic { .. })));
        assert_eq!(RampStrategy::parse("exponential"), None);
    }
}
