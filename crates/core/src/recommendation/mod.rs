//! Pursue / evaluate / pass decisions and next-action planning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::revenue::{Payback, RevenueScenario, ScenarioName};
use crate::risk::{RiskCategoryKind, RiskLevel, RiskProfile};
use crate::scoring::{MatchResult, CHANNEL_RELEVANCE, EXECUTION_COMPLEXITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Pursue,
    Evaluate,
    Pass,
}

impl RecommendationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pursue => "pursue",
            Self::Evaluate => "evaluate",
            Self::Pass => "pass",
        }
    }
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration order is urgency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

/// Condition under which an action template applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionTrigger {
    Always,
    /// The category is the highest-scoring risk and at least medium.
    TopRisk { category: RiskCategoryKind },
    /// The factor was scored below the given value.
    WeakFactor { factor: String, below: f64 },
    /// At least one factor could not be scored.
    UnscoredFactors,
    /// The expected scenario does not pay back within the horizon.
    PaybackBeyondHorizon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    pub tier: RecommendationTier,
    pub trigger: ActionTrigger,
    pub title: String,
    pub priority: ActionPriority,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub title: String,
    pub priority: ActionPriority,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: RecommendationTier,
    pub rationale: String,
    pub next_actions: Vec<NextAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPolicy {
    /// Minimum match score for pursue (default: 0.80)
    pub pursue_threshold: f64,
    /// Minimum match score for evaluate (default: 0.60)
    pub evaluate_threshold: f64,
    pub max_actions: usize,
    /// Priority-ordered templates; earlier entries win ties on priority.
    pub templates: Vec<ActionTemplate>,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            pursue_threshold: 0.80,
            evaluate_threshold: 0.60,
            max_actions: 5,
            templates: default_templates(),
        }
    }
}

fn default_templates() -> Vec<ActionTemplate> {
    use ActionPriority::*;
    use RecommendationTier::*;

    let template = |tier, trigger, title: &str, priority, timeframe: &str| ActionTemplate {
        tier,
        trigger,
        title: title.to_string(),
        priority,
        timeframe: timeframe.to_string(),
    };

    vec![
        template(Pursue, ActionTrigger::Always, "Assign an account lead and schedule the operator kickoff", High, "within 1 week"),
        template(
            Pursue,
            ActionTrigger::TopRisk { category: RiskCategoryKind::Operational },
            "Lock distributor capacity and supply commitments",
            High,
            "within 2 weeks",
        ),
        template(Pursue, ActionTrigger::Always, "Build the joint business plan with the distributor", Medium, "within 30 days"),
        template(
            Pursue,
            ActionTrigger::UnscoredFactors,
            "Backfill missing market data to firm up the match",
            Low,
            "within 30 days",
        ),
        template(
            Evaluate,
            ActionTrigger::Always,
            "Run a discovery call to validate volume and decision makers",
            High,
            "within 2 weeks",
        ),
        template(
            Evaluate,
            ActionTrigger::TopRisk { category: RiskCategoryKind::Financial },
            "Review the investment case and payback with finance",
            High,
            "within 2 weeks",
        ),
        template(
            Evaluate,
            ActionTrigger::TopRisk { category: RiskCategoryKind::Regulatory },
            "Complete a compliance pre-check for the channel",
            High,
            "within 30 days",
        ),
        template(
            Evaluate,
            ActionTrigger::WeakFactor { factor: CHANNEL_RELEVANCE.to_string(), below: 0.5 },
            "Confirm channel fit with a sample program in target accounts",
            Medium,
            "within 30 days",
        ),
        template(
            Evaluate,
            ActionTrigger::WeakFactor { factor: EXECUTION_COMPLEXITY.to_string(), below: 0.5 },
            "Scope a pilot to de-risk execution before committing",
            Medium,
            "within 45 days",
        ),
        template(
            Evaluate,
            ActionTrigger::TopRisk { category: RiskCategoryKind::Market },
            "Benchmark competitor pricing in the target accounts",
            Medium,
            "within 30 days",
        ),
        template(
            Evaluate,
            ActionTrigger::PaybackBeyondHorizon,
            "Rework the deal structure to bring payback inside the horizon",
            Medium,
            "within 45 days",
        ),
        template(
            Evaluate,
            ActionTrigger::UnscoredFactors,
            "Gather missing market signals before the next review",
            Low,
            "within 2 weeks",
        ),
        template(Pass, ActionTrigger::Always, "Record the decision and reasons in the pipeline", Medium, "within 1 week"),
        template(
            Pass,
            ActionTrigger::TopRisk { category: RiskCategoryKind::Strategic },
            "Share strategic fit concerns with channel leadership",
            Low,
            "next quarter",
        ),
        template(Pass, ActionTrigger::Always, "Revisit the opportunity at the next quarterly review", Low, "next quarter"),
    ]
}

impl RecommendationPolicy {
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = self.pursue_threshold.is_finite() && self.evaluate_threshold.is_finite();
        if !finite
            || self.evaluate_threshold < 0.0
            || self.pursue_threshold > 1.0
            || self.evaluate_threshold >= self.pursue_threshold
        {
            return Err(EngineError::Configuration(format!(
                "recommendation thresholds must satisfy 0 <= evaluate < pursue <= 1 (got evaluate={}, pursue={})",
                self.evaluate_threshold, self.pursue_threshold
            )));
        }
        if self.max_actions == 0 {
            return Err(EngineError::Configuration(
                "recommendation max_actions must be greater than zero".to_string(),
            ));
        }
        if let Some(template) = self.templates.iter().find(|template| template.title.trim().is_empty())
        {
            return Err(EngineError::Configuration(format!(
                "action template for tier `{}` has an empty title",
                template.tier
            )));
        }
        Ok(())
    }

    /// Tier for a match score and overall risk level.
    pub fn decide(&self, overall_score: f64, risk_level: RiskLevel) -> RecommendationTier {
        let in_evaluate_band =
            overall_score >= self.evaluate_threshold && overall_score < self.pursue_threshold;

        if overall_score >= self.pursue_threshold && risk_level != RiskLevel::High {
            RecommendationTier::Pursue
        } else if in_evaluate_band || risk_level == RiskLevel::Medium {
            RecommendationTier::Evaluate
        } else {
            RecommendationTier::Pass
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    policy: RecommendationPolicy,
}

impl RecommendationEngine {
    pub fn new(policy: RecommendationPolicy) -> Result<Self, EngineError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }

    pub fn recommend(
        &self,
        match_result: &MatchResult,
        revenue_scenarios: &[RevenueScenario],
        risk_profile: &RiskProfile,
    ) -> Result<Recommendation, EngineError> {
        let score = match_result.overall_score;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(EngineError::InputValidation(format!(
                "match score for resource `{}` must be within [0, 1]",
                match_result.resource_id
            )));
        }
        let expected = revenue_scenarios
            .iter()
            .find(|scenario| scenario.name == ScenarioName::Expected)
            .ok_or_else(|| {
                EngineError::InputValidation(
                    "revenue scenarios must include the expected scenario".to_string(),
                )
            })?;

        let tier = self.policy.decide(score, risk_profile.overall_level);
        let next_actions = self.next_actions(tier, match_result, expected, risk_profile);

        Ok(Recommendation {
            tier,
            rationale: rationale(tier, match_result, expected, risk_profile),
            next_actions,
        })
    }

    fn next_actions(
        &self,
        tier: RecommendationTier,
        match_result: &MatchResult,
        expected: &RevenueScenario,
        risk_profile: &RiskProfile,
    ) -> Vec<NextAction> {
        let mut matched: Vec<&ActionTemplate> = self
            .policy
            .templates
            .iter()
            .filter(|template| template.tier == tier)
            .filter(|template| triggered(&template.trigger, match_result, expected, risk_profile))
            .collect();
        matched.sort_by_key(|template| template.priority);
        matched.truncate(self.policy.max_actions);

        matched
            .into_iter()
            .map(|template| NextAction {
                title: template.title.clone(),
                priority: template.priority,
                timeframe: template.timeframe.clone(),
            })
            .collect()
    }
}

fn triggered(
    trigger: &ActionTrigger,
    match_result: &MatchResult,
    expected: &RevenueScenario,
    risk_profile: &RiskProfile,
) -> bool {
    match trigger {
        ActionTrigger::Always => true,
        ActionTrigger::TopRisk { category } => risk_profile
            .top_category()
            .is_some_and(|top| top.name == *category && top.level >= RiskLevel::Medium),
        ActionTrigger::WeakFactor { factor, below } => match_result
            .factor_breakdown
            .iter()
            .any(|score| score.factor == *factor && score.value < *below),
        ActionTrigger::UnscoredFactors => !match_result.unscored_factors.is_empty(),
        ActionTrigger::PaybackBeyondHorizon => expected
            .metrics
            .as_ref()
            .is_some_and(|metrics| metrics.payback == Payback::BeyondHorizon),
    }
}

fn rationale(
    tier: RecommendationTier,
    match_result: &MatchResult,
    expected: &RevenueScenario,
    risk_profile: &RiskProfile,
) -> String {
    let mut parts = vec![format!(
        "{tier}: match score {:.2} (confidence {:.2}) for {} `{}`",
        match_result.overall_score,
        match_result.confidence,
        match_result.resource_variant.as_str(),
        match_result.resource_id
    )];

    let mut risk = format!(
        "overall risk {} ({:.2})",
        risk_profile.overall_level, risk_profile.overall_risk_score
    );
    if let Some(top) = risk_profile.top_category() {
        risk.push_str(&format!(", led by {} risk ({})", top.name, top.level));
    }
    parts.push(risk);

    parts.push(format!(
        "expected revenue {} over {} months at probability {:.2}",
        expected.total_revenue.round_dp(2),
        expected.timeline_months,
        expected.probability
    ));

    if let Some(weakest) = match_result.weakest_factor() {
        parts.push(format!("weakest factor {} ({:.2})", weakest.factor, weakest.value));
    }

    parts.join("; ")
}
