//! Category-based risk assessment.
//!
//! Each category score is a weighted mean of named risk readings. Readings come
//! from the opportunity's `risk_indicators`, with a few derived from core
//! opportunity fields when no indicator is supplied. Levels use one shared set
//! of thresholds, and mitigation guidance is looked up from a rules table
//! keyed by (category, level).

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::opportunity::Opportunity;
use crate::errors::EngineError;
use crate::scoring::WEIGHT_SUM_EPSILON;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategoryKind {
    Market,
    Operational,
    Financial,
    Regulatory,
    Strategic,
}

impl RiskCategoryKind {
    pub const ALL: [RiskCategoryKind; 5] =
        [Self::Market, Self::Operational, Self::Financial, Self::Regulatory, Self::Strategic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Operational => "operational",
            Self::Financial => "financial",
            Self::Regulatory => "regulatory",
            Self::Strategic => "strategic",
        }
    }
}

impl fmt::Display for RiskCategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score boundaries: `< medium` is low, `< high` is medium, otherwise high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Lowest score classified medium (default: 0.30)
    pub medium: f64,
    /// Lowest score classified high (default: 0.60)
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { medium: 0.30, high: 0.60 }
    }
}

impl RiskThresholds {
    pub fn classify(&self, score: f64) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = self.medium.is_finite() && self.high.is_finite();
        if !finite || self.medium <= 0.0 || self.high > 1.0 || self.medium >= self.high {
            return Err(EngineError::Configuration(format!(
                "risk thresholds must satisfy 0 < medium < high <= 1 (got medium={}, high={})",
                self.medium, self.high
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorWeight {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    pub category: RiskCategoryKind,
    /// Contribution to the overall risk score.
    pub weight: f64,
    pub factors: Vec<RiskFactorWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationRule {
    pub category: RiskCategoryKind,
    pub level: RiskLevel,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub thresholds: RiskThresholds,
    pub categories: Vec<CategoryPolicy>,
    pub mitigations: Vec<MitigationRule>,
    /// Score assigned to a category with no readings at all.
    pub unknown_score: f64,
    /// Competitor count that reads as maximum competition.
    pub crowded_competitor_count: u32,
    /// Timeline at or beyond which schedule pressure reads as zero.
    pub comfortable_timeline_months: u32,
}

pub const COMPETITION: &str = "competition";
pub const EXECUTION_COMPLEXITY: &str = "execution_complexity";
pub const TIMELINE_PRESSURE: &str = "timeline_pressure";
pub const INVESTMENT_EXPOSURE: &str = "investment_exposure";

const INSUFFICIENT_DATA: &str = "insufficient data";

impl Default for RiskConfig {
    fn default() -> Self {
        let category = |category, factors: &[(&str, f64)]| CategoryPolicy {
            category,
            weight: 0.2,
            factors: factors
                .iter()
                .map(|(name, weight)| RiskFactorWeight { name: (*name).to_string(), weight: *weight })
                .collect(),
        };

        Self {
            thresholds: RiskThresholds::default(),
            categories: vec![
                category(
                    RiskCategoryKind::Market,
                    &[(COMPETITION, 0.4), ("saturation", 0.3), ("demand_volatility", 0.3)],
                ),
                category(
                    RiskCategoryKind::Operational,
                    &[(EXECUTION_COMPLEXITY, 0.4), ("supply_chain", 0.3), (TIMELINE_PRESSURE, 0.3)],
                ),
                category(
                    RiskCategoryKind::Financial,
                    &[(INVESTMENT_EXPOSURE, 0.4), ("margin_pressure", 0.3), ("payment_terms", 0.3)],
                ),
                category(
                    RiskCategoryKind::Regulatory,
                    &[("compliance_burden", 0.5), ("food_safety", 0.3), ("licensing", 0.2)],
                ),
                category(
                    RiskCategoryKind::Strategic,
                    &[("brand_alignment", 0.4), ("channel_conflict", 0.3), ("partner_dependency", 0.3)],
                ),
            ],
            mitigations: default_mitigations(),
            unknown_score: 0.5,
            crowded_competitor_count: 20,
            comfortable_timeline_months: 24,
        }
    }
}

fn default_mitigations() -> Vec<MitigationRule> {
    use RiskCategoryKind::*;
    use RiskLevel::*;

    let rules = [
        (Market, Low, "Monitor competitor activity through quarterly channel reviews."),
        (Market, Medium, "Differentiate the offer with channel-specific assortment and pricing tests."),
        (Market, High, "Narrow the launch to defensible accounts and secure anchor operators before scaling."),
        (Operational, Low, "Follow the standard onboarding plan with existing distributor partners."),
        (Operational, Medium, "Assign a dedicated program lead and confirm distributor capacity before launch."),
        (Operational, High, "Pilot in a limited footprint and resolve supply and staffing gaps before rollout."),
        (Financial, Low, "Track revenue against plan in the regular monthly business review."),
        (Financial, Medium, "Stage investment against milestone gates and revisit pricing with finance."),
        (Financial, High, "Require finance approval, cap exposure and negotiate volume commitments up front."),
        (Regulatory, Low, "Confirm labeling and documentation meet current channel requirements."),
        (Regulatory, Medium, "Run a compliance review of food safety and licensing obligations per region."),
        (Regulatory, High, "Engage regulatory counsel and obtain certifications before committing spend."),
        (Strategic, Low, "Keep the opportunity aligned with the annual channel plan."),
        (Strategic, Medium, "Validate brand fit and channel conflict with category leadership."),
        (Strategic, High, "Escalate to leadership for an explicit go/no-go on strategic alignment."),
    ];

    rules
        .into_iter()
        .map(|(category, level, mitigation)| MitigationRule {
            category,
            level,
            mitigation: mitigation.to_string(),
        })
        .collect()
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.thresholds.validate()?;

        if !self.unknown_score.is_finite() || !(0.0..=1.0).contains(&self.unknown_score) {
            return Err(EngineError::Configuration(
                "risk unknown_score must be within [0, 1]".to_string(),
            ));
        }
        if self.crowded_competitor_count == 0 || self.comfortable_timeline_months == 0 {
            return Err(EngineError::Configuration(
                "risk reference counts must be greater than zero".to_string(),
            ));
        }

        let configured: Vec<RiskCategoryKind> =
            self.categories.iter().map(|policy| policy.category).collect();
        let unique: BTreeSet<RiskCategoryKind> = configured.iter().copied().collect();
        if configured.len() != RiskCategoryKind::ALL.len() || unique.len() != configured.len() {
            return Err(EngineError::Configuration(
                "risk config must define each of market, operational, financial, regulatory and strategic exactly once"
                    .to_string(),
            ));
        }

        check_weight_sum(
            "risk category weights",
            self.categories.iter().map(|policy| policy.weight),
        )?;
        for policy in &self.categories {
            if policy.factors.is_empty() {
                return Err(EngineError::Configuration(format!(
                    "risk category `{}` has no factors",
                    policy.category
                )));
            }
            check_weight_sum(
                &format!("`{}` risk factor weights", policy.category),
                policy.factors.iter().map(|factor| factor.weight),
            )?;
        }

        let mut covered = BTreeSet::new();
        for rule in &self.mitigations {
            if !covered.insert((rule.category, rule.level)) {
                return Err(EngineError::Configuration(format!(
                    "duplicate mitigation rule for {} / {}",
                    rule.category, rule.level
                )));
            }
        }
        for category in RiskCategoryKind::ALL {
            for level in RiskLevel::ALL {
                if !covered.contains(&(category, level)) {
                    return Err(EngineError::Configuration(format!(
                        "missing mitigation rule for {category} / {level}"
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn mitigation(&self, category: RiskCategoryKind, level: RiskLevel) -> Option<&str> {
        self.mitigations
            .iter()
            .find(|rule| rule.category == category && rule.level == level)
            .map(|rule| rule.mitigation.as_str())
    }
}

fn check_weight_sum(label: &str, weights: impl Iterator<Item = f64>) -> Result<(), EngineError> {
    let mut sum = 0.0;
    for weight in weights {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EngineError::Configuration(format!(
                "{label} must be finite non-negative numbers"
            )));
        }
        sum += weight;
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(EngineError::Configuration(format!("{label} must sum to 1.0 (got {sum:.6})")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub name: RiskCategoryKind,
    pub score: f64,
    pub level: RiskLevel,
    pub contributing_factors: Vec<String>,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub categories: Vec<RiskCategory>,
    pub overall_risk_score: f64,
    pub overall_level: RiskLevel,
}

impl RiskProfile {
    /// Highest-scoring category; earlier categories win ties.
    pub fn top_category(&self) -> Option<&RiskCategory> {
        self.categories.iter().fold(None, |top: Option<&RiskCategory>, category| match top {
            Some(current) if current.score >= category.score => Some(current),
            _ => Some(category),
        })
    }

    pub fn category(&self, name: RiskCategoryKind) -> Option<&RiskCategory> {
        self.categories.iter().find(|category| category.name == name)
    }
}

// ---------------------------------------------------------------------------
// Assessor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RiskAssessor {
    config: RiskConfig,
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self { config: RiskConfig::default() }
    }
}

impl RiskAssessor {
    pub fn new(config: RiskConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn assess(&self, opportunity: &Opportunity) -> Result<RiskProfile, EngineError> {
        opportunity.validate()?;

        let mut categories = Vec::with_capacity(self.config.categories.len());
        let mut overall = 0.0;

        for policy in &self.config.categories {
            let category = self.assess_category(policy, opportunity)?;
            overall += policy.weight * category.score;
            categories.push(category);
        }

        let overall_risk_score = overall.clamp(0.0, 1.0);
        Ok(RiskProfile {
            categories,
            overall_risk_score,
            overall_level: self.config.thresholds.classify(overall_risk_score),
        })
    }

    fn assess_category(
        &self,
        policy: &CategoryPolicy,
        opportunity: &Opportunity,
    ) -> Result<RiskCategory, EngineError> {
        let readings: Vec<(&RiskFactorWeight, f64)> = policy
            .factors
            .iter()
            .filter_map(|factor| self.reading(&factor.name, opportunity).map(|value| (factor, value)))
            .collect();
        let weight_total: f64 = readings.iter().map(|(factor, _)| factor.weight).sum();

        let (score, contributing_factors) = if readings.is_empty() || weight_total <= 0.0 {
            (self.config.unknown_score, vec![INSUFFICIENT_DATA.to_string()])
        } else {
            let weighted: f64 = readings.iter().map(|(factor, value)| factor.weight * value).sum();
            let mut elevated: Vec<&(&RiskFactorWeight, f64)> = readings
                .iter()
                .filter(|(_, value)| *value >= self.config.thresholds.medium)
                .collect();
            // stable sort keeps configured order on equal readings
            elevated.sort_by(|left, right| right.1.total_cmp(&left.1));
            let contributing = elevated
                .into_iter()
                .map(|(factor, value)| format!("{} ({value:.2})", factor.name))
                .collect();
            ((weighted / weight_total).clamp(0.0, 1.0), contributing)
        };

        let level = self.config.thresholds.classify(score);
        let mitigation = self.config.mitigation(policy.category, level).ok_or_else(|| {
            EngineError::Configuration(format!(
                "missing mitigation rule for {} / {level}",
                policy.category
            ))
        })?;

        Ok(RiskCategory {
            name: policy.category,
            score,
            level,
            contributing_factors,
            mitigation: mitigation.to_string(),
        })
    }

    /// Explicit indicator first, then a value derived from opportunity fields.
    fn reading(&self, factor: &str, opportunity: &Opportunity) -> Option<f64> {
        if let Some(value) = opportunity.market_signals.risk_indicators.get(factor) {
            return Some(*value);
        }

        match factor {
            COMPETITION => opportunity.market_signals.competitor_count.map(|count| {
                (f64::from(count) / f64::from(self.config.crowded_competitor_count)).min(1.0)
            }),
            EXECUTION_COMPLEXITY => opportunity.execution_complexity,
            TIMELINE_PRESSURE => Some(
                1.0 - (f64::from(opportunity.timeline_months)
                    / f64::from(self.config.comfortable_timeline_months))
                .min(1.0),
            ),
            INVESTMENT_EXPOSURE => {
                let investment = opportunity.investment?;
                let revenue = opportunity.revenue_potential.filter(|value| *value > Decimal::ZERO)?;
                // an overflowing ratio is a fully exposed investment
                let exposure = investment.checked_div(revenue).and_then(|ratio| ratio.to_f64());
                Some(exposure.unwrap_or(1.0).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }
}
