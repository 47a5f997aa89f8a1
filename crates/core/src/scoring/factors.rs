//! Individual match factors and the registry that evaluates them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregate::WeightPolicy;
use super::{
    CHANNEL_RELEVANCE, COMPETITIVE_POSITION, EXECUTION_COMPLEXITY, MARKET_TIMING, REVENUE_SIZE,
    STRATEGIC_FIT,
};
use crate::domain::opportunity::{normalize_tag, Opportunity};
use crate::domain::resource::{Resource, ResourceKind};
use crate::errors::EngineError;

/// A named, weighted contribution to a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: String,
    /// Normalized value (0.0 - 1.0)
    pub value: f64,
    pub weight: f64,
}

/// Reference points used to normalize raw market figures into [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorReferences {
    /// Market size at which the channel weighting term saturates.
    pub market_size: Decimal,
    /// Revenue potential that scores a full 1.0 on revenue size.
    pub revenue: Decimal,
    /// Annual growth rate treated as best-in-class timing.
    pub growth_rate: f64,
    /// Market share treated as a leading position.
    pub leading_share: f64,
    /// Competitor count at which a market counts as fully crowded.
    pub crowded_competitor_count: u32,
    /// Years of experience at which an expert counts as fully senior.
    pub senior_expert_years: u32,
    /// Product lead time at which readiness drops to zero.
    pub max_lead_time_weeks: u32,
}

impl Default for FactorReferences {
    fn default() -> Self {
        Self {
            market_size: Decimal::new(10_000_000, 0),
            revenue: Decimal::new(5_000_000, 0),
            growth_rate: 0.20,
            leading_share: 0.25,
            crowded_competitor_count: 20,
            senior_expert_years: 15,
            max_lead_time_weeks: 26,
        }
    }
}

impl FactorReferences {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.market_size <= Decimal::ZERO || self.revenue <= Decimal::ZERO {
            return Err(EngineError::Configuration(
                "factor references market_size and revenue must be positive".to_string(),
            ));
        }
        if !(self.growth_rate.is_finite() && self.growth_rate > 0.0) {
            return Err(EngineError::Configuration(
                "factor reference growth_rate must be positive".to_string(),
            ));
        }
        if !(self.leading_share > 0.0 && self.leading_share <= 1.0) {
            return Err(EngineError::Configuration(
                "factor reference leading_share must be within (0, 1]".to_string(),
            ));
        }
        if self.crowded_competitor_count == 0
            || self.senior_expert_years == 0
            || self.max_lead_time_weeks == 0
        {
            return Err(EngineError::Configuration(
                "factor reference counts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// One measurable dimension of opportunity/resource fit.
///
/// `evaluate` returns `None` when the inputs it needs are absent, which is
/// distinct from a genuine score of zero.
pub trait Factor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        references: &FactorReferences,
    ) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelRelevance;

impl Factor for ChannelRelevance {
    fn name(&self) -> &str {
        CHANNEL_RELEVANCE
    }

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        references: &FactorReferences,
    ) -> Option<f64> {
        let tags = resource.relevance_tags();
        let channels = resource.served_channels();
        if tags.is_empty() && channels.map_or(true, |channels| channels.is_empty()) {
            return None;
        }
        let market_size = opportunity.market_signals.market_size?;

        let target = opportunity.target_tags();
        let channel_tag = opportunity.channel.as_str();
        let mut matched = target.iter().filter(|tag| tags.contains(*tag)).count();
        let serves_channel =
            channels.is_some_and(|channels| channels.contains(&opportunity.channel));
        if serves_channel && !tags.contains(channel_tag) {
            matched += 1;
        }

        let overlap = matched as f64 / target.len() as f64;
        let size_term = ratio(market_size, references.market_size)?.min(1.0);
        Some(clamp_unit(overlap * (0.6 + 0.4 * size_term)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarketTiming;

impl Factor for MarketTiming {
    fn name(&self) -> &str {
        MARKET_TIMING
    }

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        _resource: &Resource,
        references: &FactorReferences,
    ) -> Option<f64> {
        let signals = &opportunity.market_signals;
        let growth = signals.growth_rate.map(|rate| clamp_unit(rate / references.growth_rate));
        let momentum = signals.trend_momentum.map(|momentum| clamp_unit((momentum + 1.0) / 2.0));

        blend(growth, momentum, 0.6)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitivePosition;

impl Factor for CompetitivePosition {
    fn name(&self) -> &str {
        COMPETITIVE_POSITION
    }

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        _resource: &Resource,
        references: &FactorReferences,
    ) -> Option<f64> {
        let signals = &opportunity.market_signals;
        let share = signals.market_share.map(|share| clamp_unit(share / references.leading_share));
        let openness = signals.competitor_count.map(|count| {
            1.0 - (f64::from(count) / f64::from(references.crowded_competitor_count)).min(1.0)
        });

        blend(share, openness, 0.5)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RevenueSize;

impl Factor for RevenueSize {
    fn name(&self) -> &str {
        REVENUE_SIZE
    }

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        references: &FactorReferences,
    ) -> Option<f64> {
        let revenue = opportunity.revenue_potential.filter(|value| *value > Decimal::ZERO)?;
        let mut value = ratio(revenue, references.revenue)?.min(1.0);

        // A product whose minimum order exceeds the deal can only be partially placed.
        if let ResourceKind::Product { min_order_value: Some(minimum), .. } = &resource.kind {
            if revenue < *minimum {
                value *= 0.5;
            }
        }

        Some(clamp_unit(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionComplexity;

impl Factor for ExecutionComplexity {
    fn name(&self) -> &str {
        EXECUTION_COMPLEXITY
    }

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        references: &FactorReferences,
    ) -> Option<f64> {
        let ease = 1.0 - opportunity.execution_complexity?;

        let readiness = match &resource.kind {
            ResourceKind::Product { lead_time_weeks, .. } => lead_time_weeks.map(|weeks| {
                1.0 - (f64::from(weeks) / f64::from(references.max_lead_time_weeks)).min(1.0)
            }),
            ResourceKind::Expert { years_experience, .. } => years_experience.map(|years| {
                (f64::from(years) / f64::from(references.senior_expert_years)).min(1.0)
            }),
            ResourceKind::Playbook { success_rate, .. } => *success_rate,
        };

        blend(Some(ease), readiness, 0.6)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrategicFit;

impl Factor for StrategicFit {
    fn name(&self) -> &str {
        STRATEGIC_FIT
    }

    fn evaluate(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        _references: &FactorReferences,
    ) -> Option<f64> {
        let priorities: BTreeSet<String> =
            opportunity.strategic_priorities.iter().map(|tag| normalize_tag(tag)).collect();
        let tags = resource.relevance_tags();
        if priorities.is_empty() || tags.is_empty() {
            return None;
        }

        let covered = priorities.iter().filter(|priority| tags.contains(*priority)).count();
        Some(covered as f64 / priorities.len() as f64)
    }
}

/// Registry of factors, evaluated in registration order.
#[derive(Debug, Clone)]
pub struct FactorScorer {
    factors: Vec<Arc<dyn Factor>>,
    references: FactorReferences,
}

impl FactorScorer {
    /// Scorer with every builtin factor.
    pub fn new() -> Self {
        Self::with_references(FactorReferences::default())
    }

    pub fn with_references(references: FactorReferences) -> Self {
        let factors: Vec<Arc<dyn Factor>> = vec![
            Arc::new(ChannelRelevance),
            Arc::new(MarketTiming),
            Arc::new(CompetitivePosition),
            Arc::new(RevenueSize),
            Arc::new(ExecutionComplexity),
            Arc::new(StrategicFit),
        ];
        Self { factors, references }
    }

    /// Scorer restricted to the named builtin factors, in the given order.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        references: FactorReferences,
    ) -> Result<Self, EngineError> {
        let builtins = Self::with_references(references.clone());
        let mut factors = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let factor = builtins.find(name).ok_or_else(|| {
                EngineError::Configuration(format!("unknown factor `{name}` in factor list"))
            })?;
            if factors.iter().any(|existing: &Arc<dyn Factor>| existing.name() == name) {
                return Err(EngineError::Configuration(format!(
                    "factor `{name}` is listed more than once"
                )));
            }
            factors.push(Arc::clone(factor));
        }
        Ok(Self { factors, references })
    }

    /// Registers an additional factor; its name must not collide with an existing one.
    pub fn register(mut self, factor: Arc<dyn Factor>) -> Result<Self, EngineError> {
        if self.find(factor.name()).is_some() {
            return Err(EngineError::Configuration(format!(
                "factor `{}` is already registered",
                factor.name()
            )));
        }
        self.factors.push(factor);
        Ok(self)
    }

    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|factor| factor.name()).collect()
    }

    pub fn references(&self) -> &FactorReferences {
        &self.references
    }

    /// Score a single named factor for one opportunity/resource pair.
    pub fn score(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        factor_name: &str,
        weights: &WeightPolicy,
    ) -> Result<Option<FactorScore>, EngineError> {
        let factor = self.find(factor_name).ok_or_else(|| {
            EngineError::Configuration(format!("factor `{factor_name}` is not registered"))
        })?;
        self.score_with(factor.as_ref(), opportunity, resource, weights)
    }

    /// Score every registered factor. Unscored factors are `None`.
    pub fn score_all(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        weights: &WeightPolicy,
    ) -> Result<Vec<(String, Option<FactorScore>)>, EngineError> {
        self.factors
            .iter()
            .map(|factor| -> Result<(String, Option<FactorScore>), EngineError> {
                let score = self.score_with(factor.as_ref(), opportunity, resource, weights)?;
                Ok((factor.name().to_string(), score))
            })
            .collect()
    }

    fn score_with(
        &self,
        factor: &dyn Factor,
        opportunity: &Opportunity,
        resource: &Resource,
        weights: &WeightPolicy,
    ) -> Result<Option<FactorScore>, EngineError> {
        let weight = weights.weight(factor.name()).ok_or_else(|| {
            EngineError::Configuration(format!(
                "weight policy has no entry for factor `{}`",
                factor.name()
            ))
        })?;

        Ok(factor
            .evaluate(opportunity, resource, &self.references)
            .filter(|value| value.is_finite())
            .map(|value| FactorScore {
                factor: factor.name().to_string(),
                value: clamp_unit(value),
                weight,
            }))
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Factor>> {
        self.factors.iter().find(|factor| factor.name() == name)
    }
}

impl Default for FactorScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Option<f64> {
    if denominator.is_zero() {
        return None;
    }
    (numerator / denominator).to_f64()
}

/// Weighted blend of two optional sub-metrics; falls back to whichever is present.
fn blend(primary: Option<f64>, secondary: Option<f64>, primary_weight: f64) -> Option<f64> {
    match (primary, secondary) {
        (Some(primary), Some(secondary)) => {
            Some(clamp_unit(primary * primary_weight + secondary * (1.0 - primary_weight)))
        }
        (Some(value), None) | (None, Some(value)) => Some(clamp_unit(value)),
        (None, None) => None,
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
