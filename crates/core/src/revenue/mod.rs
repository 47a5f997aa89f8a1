//! Multi-scenario revenue projection with ROI, payback and NPV.

mod ramp;

pub use ramp::{RampCurve, RampStrategy, DEFAULT_LOGISTIC_STEEPNESS};

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::opportunity::Opportunity;
use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioName {
    Conservative,
    Expected,
    Optimistic,
}

impl ScenarioName {
    pub const ALL: [ScenarioName; 3] = [Self::Conservative, Self::Expected, Self::Optimistic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Expected => "expected",
            Self::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiplier against revenue potential plus an independent likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumption {
    pub multiplier: Decimal,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Default: x0.6 at 0.85 probability
    pub conservative: ScenarioAssumption,
    /// Default: x1.0 at 0.65 probability
    pub expected: ScenarioAssumption,
    /// Default: x1.5 at 0.35 probability
    pub optimistic: ScenarioAssumption,
    pub horizon_months: u32,
    /// Sample months; strictly increasing and ending at the horizon.
    pub checkpoints: Vec<u32>,
    pub ramp: RampStrategy,
    /// Annualized rate used for NPV discounting.
    pub discount_rate: f64,
    /// Margin applied when the opportunity does not carry its own.
    pub default_gross_margin: Decimal,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            conservative: ScenarioAssumption { multiplier: Decimal::new(6, 1), probability: 0.85 },
            expected: ScenarioAssumption { multiplier: Decimal::ONE, probability: 0.65 },
            optimistic: ScenarioAssumption { multiplier: Decimal::new(15, 1), probability: 0.35 },
            horizon_months: 24,
            checkpoints: vec![3, 6, 12, 24],
            ramp: RampStrategy::Linear,
            discount_rate: 0.10,
            default_gross_margin: Decimal::new(35, 2),
        }
    }
}

impl ScenarioConfig {
    /// Moves the horizon, keeping earlier checkpoints and ending the list at the new horizon.
    pub fn set_horizon(&mut self, horizon_months: u32) {
        self.horizon_months = horizon_months;
        self.checkpoints.retain(|month| *month < horizon_months);
        self.checkpoints.push(horizon_months);
    }

    pub fn assumption(&self, name: ScenarioName) -> &ScenarioAssumption {
        match name {
            ScenarioName::Conservative => &self.conservative,
            ScenarioName::Expected => &self.expected,
            ScenarioName::Optimistic => &self.optimistic,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for name in ScenarioName::ALL {
            let assumption = self.assumption(name);
            if assumption.multiplier <= Decimal::ZERO {
                return Err(EngineError::Configuration(format!(
                    "{name} multiplier must be positive"
                )));
            }
            if !assumption.probability.is_finite()
                || !(0.0..=1.0).contains(&assumption.probability)
            {
                return Err(EngineError::Configuration(format!(
                    "{name} probability must be within [0, 1]"
                )));
            }
        }

        if self.conservative.multiplier > self.expected.multiplier
            || self.expected.multiplier > self.optimistic.multiplier
        {
            return Err(EngineError::Configuration(
                "scenario multipliers must satisfy conservative <= expected <= optimistic"
                    .to_string(),
            ));
        }
        if self.conservative.probability < self.expected.probability
            || self.expected.probability < self.optimistic.probability
        {
            return Err(EngineError::Configuration(
                "scenario probabilities must not increase from conservative to optimistic"
                    .to_string(),
            ));
        }

        if self.horizon_months == 0 {
            return Err(EngineError::Configuration(
                "revenue horizon_months must be greater than zero".to_string(),
            ));
        }
        let increasing = self.checkpoints.windows(2).all(|pair| pair[0] < pair[1]);
        if self.checkpoints.is_empty()
            || !increasing
            || self.checkpoints.first() == Some(&0)
            || self.checkpoints.last() != Some(&self.horizon_months)
        {
            return Err(EngineError::Configuration(format!(
                "revenue checkpoints must be strictly increasing, positive and end at month {}",
                self.horizon_months
            )));
        }

        if let RampStrategy::Logistic { steepness } = self.ramp {
            if !steepness.is_finite() || steepness <= 0.0 {
                return Err(EngineError::Configuration(
                    "logistic ramp steepness must be positive".to_string(),
                ));
            }
        }
        if !self.discount_rate.is_finite() || self.discount_rate <= -1.0 {
            return Err(EngineError::Configuration(
                "discount_rate must be finite and greater than -1".to_string(),
            ));
        }
        if self.default_gross_margin < Decimal::ZERO || self.default_gross_margin > Decimal::ONE {
            return Err(EngineError::Configuration(
                "default_gross_margin must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Months since start.
    pub period: u32,
    pub cumulative_revenue: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "month", rename_all = "snake_case")]
pub enum Payback {
    Month(u32),
    BeyondHorizon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub investment: Decimal,
    pub gross_profit: Decimal,
    pub roi: f64,
    pub payback: Payback,
    pub npv: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueScenario {
    pub name: ScenarioName,
    pub total_revenue: Decimal,
    pub probability: f64,
    pub timeline_months: u32,
    pub monthly_projection: Vec<ProjectionPoint>,
    pub metrics: Option<ScenarioMetrics>,
}

impl RevenueScenario {
    pub fn cumulative_at(&self, period: u32) -> Option<Decimal> {
        self.monthly_projection
            .iter()
            .find(|point| point.period == period)
            .map(|point| point.cumulative_revenue)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RevenueProjector {
    config: ScenarioConfig,
}

impl RevenueProjector {
    pub fn new(config: ScenarioConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Conservative, expected and optimistic scenarios, in that order.
    pub fn project(&self, opportunity: &Opportunity) -> Result<Vec<RevenueScenario>, EngineError> {
        self.project_with_curve(opportunity, &self.config.ramp)
    }

    /// Projection using a caller-supplied ramp curve instead of the configured one.
    pub fn project_with_curve(
        &self,
        opportunity: &Opportunity,
        curve: &dyn RampCurve,
    ) -> Result<Vec<RevenueScenario>, EngineError> {
        opportunity.validate()?;
        let base = opportunity
            .revenue_potential
            .filter(|value| *value > Decimal::ZERO)
            .ok_or_else(|| EngineError::MissingRevenueBase {
                opportunity_id: opportunity.id.0.clone(),
            })?;
        let gross_margin = opportunity.gross_margin.unwrap_or(self.config.default_gross_margin);

        ScenarioName::ALL
            .into_iter()
            .map(|name| -> Result<RevenueScenario, EngineError> {
                let assumption = self.config.assumption(name);
                let total_revenue = base.checked_mul(assumption.multiplier).ok_or_else(|| {
                    EngineError::Arithmetic(format!(
                        "{} revenue overflows the decimal range",
                        name.as_str()
                    ))
                })?;
                let monthly_projection = self.projection(total_revenue, curve)?;
                let metrics = opportunity
                    .investment
                    .map(|investment| {
                        self.metrics(total_revenue, &monthly_projection, investment, gross_margin)
                    })
                    .transpose()?;

                Ok(RevenueScenario {
                    name,
                    total_revenue,
                    probability: assumption.probability,
                    timeline_months: self.config.horizon_months,
                    monthly_projection,
                    metrics,
                })
            })
            .collect()
    }

    fn projection(
        &self,
        total: Decimal,
        curve: &dyn RampCurve,
    ) -> Result<Vec<ProjectionPoint>, EngineError> {
        let horizon = self.config.horizon_months;
        let mut points = Vec::with_capacity(self.config.checkpoints.len());
        let mut previous = Decimal::ZERO;

        for &period in &self.config.checkpoints {
            let cumulative_revenue = if period == horizon {
                total
            } else {
                let fraction = curve.fraction(period, horizon);
                let fraction = Decimal::from_f64_retain(fraction).ok_or_else(|| {
                    EngineError::Arithmetic(format!("ramp fraction at month {period} is not finite"))
                })?;
                total
                    .checked_mul(fraction)
                    .ok_or_else(|| {
                        EngineError::Arithmetic(format!(
                            "cumulative revenue at month {period} overflows the decimal range"
                        ))
                    })?
                    .round_dp(2)
                    .min(total)
            };

            if cumulative_revenue < previous || cumulative_revenue < Decimal::ZERO {
                return Err(EngineError::Configuration(format!(
                    "ramp curve decreased at month {period}"
                )));
            }
            previous = cumulative_revenue;
            points.push(ProjectionPoint { period, cumulative_revenue });
        }

        Ok(points)
    }

    /// ROI, payback and NPV for one scenario's projection.
    pub fn metrics(
        &self,
        total_revenue: Decimal,
        projection: &[ProjectionPoint],
        investment: Decimal,
        gross_margin: Decimal,
    ) -> Result<ScenarioMetrics, EngineError> {
        if investment.is_zero() {
            return Err(EngineError::Arithmetic(
                "ROI is undefined for a zero investment".to_string(),
            ));
        }

        let gross_profit = total_revenue
            .checked_mul(gross_margin)
            .ok_or_else(|| {
                EngineError::Arithmetic("gross profit overflows the decimal range".to_string())
            })?
            .round_dp(2);
        let roi = gross_profit
            .checked_div(investment)
            .and_then(|roi| roi.to_f64())
            .ok_or_else(|| {
                EngineError::Arithmetic("ROI does not fit a floating point value".to_string())
            })?;

        let payback = projection
            .iter()
            .find(|point| point.cumulative_revenue >= investment)
            .map(|point| Payback::Month(point.period))
            .unwrap_or(Payback::BeyondHorizon);

        let npv = self.net_present_value(projection, investment, gross_margin)?;

        Ok(ScenarioMetrics { investment, gross_profit, roi, payback, npv })
    }

    /// Each checkpoint's incremental gross profit is discounted at the checkpoint month.
    fn net_present_value(
        &self,
        projection: &[ProjectionPoint],
        investment: Decimal,
        gross_margin: Decimal,
    ) -> Result<Decimal, EngineError> {
        let mut npv = -investment;
        let mut previous = Decimal::ZERO;

        for point in projection {
            let cash_flow = (point.cumulative_revenue - previous)
                .checked_mul(gross_margin)
                .ok_or_else(|| {
                    EngineError::Arithmetic(format!(
                        "cash flow at month {} overflows the decimal range",
                        point.period
                    ))
                })?;
            previous = point.cumulative_revenue;

            let years = f64::from(point.period) / 12.0;
            let discount = (1.0 + self.config.discount_rate).powf(years);
            let factor = Decimal::from_f64_retain(1.0 / discount).ok_or_else(|| {
                EngineError::Arithmetic(format!("discount factor at month {} is not finite", point.period))
            })?;
            npv = cash_flow
                .checked_mul(factor)
                .and_then(|discounted| npv.checked_add(discounted))
                .ok_or_else(|| {
                    EngineError::Arithmetic(format!(
                        "discounted cash flow at month {} overflows the decimal range",
                        point.period
                    ))
                })?;
        }

        Ok(npv.round_dp(2))
    }
}
