//! Facade running every stage against one validated policy.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::opportunity::Opportunity;
use crate::domain::resource::Resource;
use crate::errors::EngineError;
use crate::policy::EnginePolicy;
use crate::recommendation::{Recommendation, RecommendationEngine, RecommendationPolicy};
use crate::revenue::{RevenueProjector, RevenueScenario, ScenarioConfig};
use crate::risk::{RiskAssessor, RiskConfig, RiskProfile};
use crate::scoring::{FactorScore, FactorScorer, MatchAggregator, MatchResult, WeightPolicy};

/// Everything computed for one opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityEvaluation {
    pub opportunity_id: String,
    pub matches: Vec<MatchResult>,
    pub scenarios: Vec<RevenueScenario>,
    pub risk: RiskProfile,
    /// Recommendation for the top-ranked match; absent when no resources were given.
    pub recommendation: Option<Recommendation>,
}

/// Stateless engine. Per-call overrides never mutate the held policy.
#[derive(Debug, Clone)]
pub struct OpportunityEngine {
    policy: EnginePolicy,
    scorer: FactorScorer,
    aggregator: MatchAggregator,
    projector: RevenueProjector,
    assessor: RiskAssessor,
    recommender: RecommendationEngine,
}

impl OpportunityEngine {
    pub fn new(policy: EnginePolicy) -> Result<Self, EngineError> {
        policy.validate()?;
        Ok(Self {
            scorer: policy.scorer()?,
            aggregator: MatchAggregator::with_confidence_weights(policy.confidence)?,
            projector: RevenueProjector::new(policy.revenue.clone())?,
            assessor: RiskAssessor::new(policy.risk.clone())?,
            recommender: RecommendationEngine::new(policy.recommendation.clone())?,
            policy,
        })
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    pub fn scorer(&self) -> &FactorScorer {
        &self.scorer
    }

    pub fn score(
        &self,
        opportunity: &Opportunity,
        resource: &Resource,
        factor_name: &str,
        weights: Option<&WeightPolicy>,
    ) -> Result<Option<FactorScore>, EngineError> {
        let weights = weights.unwrap_or(&self.policy.weights);
        weights.validate_against(&self.scorer)?;
        opportunity.validate()?;
        resource.validate()?;
        self.scorer.score(opportunity, resource, factor_name, weights)
    }

    pub fn rank(
        &self,
        opportunity: &Opportunity,
        resources: &[Resource],
        weights: Option<&WeightPolicy>,
    ) -> Result<Vec<MatchResult>, EngineError> {
        let weights = weights.unwrap_or(&self.policy.weights);
        let matches = self.aggregator.rank(&self.scorer, opportunity, resources, weights)?;

        debug!(
            event_name = "engine.rank.completed",
            opportunity_id = %opportunity.id,
            candidates = resources.len(),
            top_resource = matches.first().map(|top| top.resource_id.0.as_str()).unwrap_or("none"),
            "ranked candidate resources"
        );
        Ok(matches)
    }

    pub fn project_revenue(
        &self,
        opportunity: &Opportunity,
        config: Option<&ScenarioConfig>,
    ) -> Result<Vec<RevenueScenario>, EngineError> {
        let scenarios = match config {
            Some(config) => RevenueProjector::new(config.clone())?.project(opportunity)?,
            None => self.projector.project(opportunity)?,
        };

        debug!(
            event_name = "engine.revenue.projected",
            opportunity_id = %opportunity.id,
            scenarios = scenarios.len(),
            "projected revenue scenarios"
        );
        Ok(scenarios)
    }

    pub fn assess_risk(
        &self,
        opportunity: &Opportunity,
        config: Option<&RiskConfig>,
    ) -> Result<RiskProfile, EngineError> {
        let profile = match config {
            Some(config) => RiskAssessor::new(config.clone())?.assess(opportunity)?,
            None => self.assessor.assess(opportunity)?,
        };

        debug!(
            event_name = "engine.risk.assessed",
            opportunity_id = %opportunity.id,
            overall_level = %profile.overall_level,
            overall_risk_score = profile.overall_risk_score,
            "assessed opportunity risk"
        );
        Ok(profile)
    }

    pub fn recommend(
        &self,
        match_result: &MatchResult,
        revenue_scenarios: &[RevenueScenario],
        risk_profile: &RiskProfile,
        policy: Option<&RecommendationPolicy>,
    ) -> Result<Recommendation, EngineError> {
        match policy {
            Some(policy) => RecommendationEngine::new(policy.clone())?.recommend(
                match_result,
                revenue_scenarios,
                risk_profile,
            ),
            None => self.recommender.recommend(match_result, revenue_scenarios, risk_profile),
        }
    }

    /// Ranks, projects, assesses and recommends for the top-ranked match.
    pub fn evaluate(
        &self,
        opportunity: &Opportunity,
        resources: &[Resource],
    ) -> Result<OpportunityEvaluation, EngineError> {
        let matches = self.rank(opportunity, resources, None)?;
        let scenarios = self.project_revenue(opportunity, None)?;
        let risk = self.assess_risk(opportunity, None)?;
        let recommendation = matches
            .first()
            .map(|top| self.recommend(top, &scenarios, &risk, None))
            .transpose()?;

        info!(
            event_name = "engine.evaluation.completed",
            opportunity_id = %opportunity.id,
            matches = matches.len(),
            tier = recommendation.as_ref().map(|rec| rec.tier.as_str()).unwrap_or("none"),
            "opportunity evaluation completed"
        );

        Ok(OpportunityEvaluation {
            opportunity_id: opportunity.id.0.clone(),
            matches,
            scenarios,
            risk,
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use rust_decimal::Decimal;

    use super::{OpportunityEngine, OpportunityEvaluation};
    use crate::domain::opportunity::{Channel, MarketSignals, Opportunity, OpportunityId};
    use crate::domain::resource::{Resource, ResourceId, ResourceKind};
    use crate::errors::EngineError;
    use crate::policy::EnginePolicy;
    use crate::revenue::{ScenarioConfig, ScenarioName};
    use crate::risk::{RiskConfig, RiskThresholds};
    use crate::scoring::{WeightPolicy, CHANNEL_RELEVANCE};

    fn opportunity() -> Opportunity {
        Opportunity {
            id: OpportunityId("OPP-100".to_string()),
            title: "Regional hospital cafeterias".to_string(),
            channel: Channel::Healthcare,
            region: "Midwest".to_string(),
            revenue_potential: Some(Decimal::new(2_800_000, 0)),
            market_signals: MarketSignals {
                market_size: Some(Decimal::new(12_000_000, 0)),
                growth_rate: Some(0.12),
                trend_momentum: Some(0.4),
                market_share: Some(0.15),
                competitor_count: Some(5),
                risk_indicators: BTreeMap::from([
                    ("food_safety".to_string(), 0.2),
                    ("compliance_burden".to_string(), 0.3),
                ]),
            },
            timeline_months: 18,
            required_capabilities: BTreeSet::from([
                "allergen_control".to_string(),
                "high_volume".to_string(),
            ]),
            strategic_priorities: BTreeSet::from(["healthcare".to_string()]),
            execution_complexity: Some(0.3),
            investment: Some(Decimal::new(400_000, 0)),
            gross_margin: Some(Decimal::new(38, 2)),
        }
    }

    fn resources() -> Vec<Resource> {
        vec![
            Resource {
                id: ResourceId("PRD-1".to_string()),
                name: "Allergen-safe entree line".to_string(),
                capability_tags: BTreeSet::from([
                    "allergen_control".to_string(),
                    "high_volume".to_string(),
                ]),
                kind: ResourceKind::Product {
                    channels: BTreeSet::from([Channel::Healthcare]),
                    lead_time_weeks: Some(4),
                    min_order_value: None,
                },
            },
            Resource {
                id: ResourceId("EXP-1".to_string()),
                name: "Campus dining specialist".to_string(),
                capability_tags: BTreeSet::from(["menu_design".to_string()]),
                kind: ResourceKind::Expert {
                    expertise_tags: BTreeSet::from(["education".to_string()]),
                    years_experience: Some(6),
                },
            },
        ]
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpportunityEngine>();
        assert_send_sync::<OpportunityEvaluation>();
    }

    #[test]
    fn evaluate_runs_every_stage() {
        let engine = OpportunityEngine::new(EnginePolicy::default()).expect("engine");
        let evaluation = engine.evaluate(&opportunity(), &resources()).expect("evaluation");

        assert_eq!(evaluation.matches.len(), 2);
        assert_eq!(evaluation.matches[0].resource_id.0, "PRD-1");
        assert_eq!(evaluation.scenarios.len(), 3);
        assert_eq!(evaluation.risk.categories.len(), 5);
        assert!(evaluation.recommendation.is_some());
        for result in &evaluation.matches {
            assert!((0.0..=1.0).contains(&result.overall_score));
            assert!((0.0..=1.0).contains(&result.confidence));
        }
    }

    #[test]
    fn evaluate_without_resources_skips_recommendation() {
        let engine = OpportunityEngine::new(EnginePolicy::default()).expect("engine");
        let evaluation = engine.evaluate(&opportunity(), &[]).expect("evaluation");
        assert!(evaluation.matches.is_empty());
        assert!(evaluation.recommendation.is_none());
    }

    #[test]
    fn identical_inputs_give_bit_identical_scores() {
        let engine = OpportunityEngine::new(EnginePolicy::default()).expect("engine");
        let first = engine.rank(&opportunity(), &resources(), None).expect("rank");
        let second = engine.rank(&opportunity(), &resources(), None).expect("rank");
        for (left, right) in first.iter().zip(&second) {
            assert_eq!(left.overall_score.to_bits(), right.overall_score.to_bits());
            assert_eq!(left.confidence.to_bits(), right.confidence.to_bits());
        }
    }

    #[test]
    fn per_call_overrides_leave_policy_untouched() {
        let engine = OpportunityEngine::new(EnginePolicy::default()).expect("engine");

        let config = ScenarioConfig { horizon_months: 12, checkpoints: vec![6, 12], ..ScenarioConfig::default() };
        let scenarios = engine.project_revenue(&opportunity(), Some(&config)).expect("projection");
        assert!(scenarios.iter().all(|scenario| scenario.timeline_months == 12));
        let defaults = engine.project_revenue(&opportunity(), None).expect("projection");
        assert!(defaults.iter().all(|scenario| scenario.timeline_months == 24));
        assert_eq!(defaults[1].name, ScenarioName::Expected);

        let strict = RiskConfig {
            thresholds: RiskThresholds { medium: 0.05, high: 0.10 },
            ..RiskConfig::default()
        };
        let profile = engine.assess_risk(&opportunity(), Some(&strict)).expect("risk");
        assert_eq!(profile.overall_level, crate::risk::RiskLevel::High);
        assert_eq!(engine.policy().risk, RiskConfig::default());
    }

    #[test]
    fn weight_override_must_cover_registered_factors() {
        let engine = OpportunityEngine::new(EnginePolicy::default()).expect("engine");
        let partial = WeightPolicy::new(BTreeMap::from([(CHANNEL_RELEVANCE.to_string(), 1.0)]))
            .expect("weights sum to one");
        let error = engine.rank(&opportunity(), &resources(), Some(&partial)).expect_err("rejected");
        assert!(matches!(error, EngineError::Configuration(_)));
    }

    #[test]
    fn score_reports_single_factor() {
        let engine = OpportunityEngine::new(EnginePolicy::default()).expect("engine");
        let score = engine
            .score(&opportunity(), &resources()[0], CHANNEL_RELEVANCE, None)
            .expect("scored")
            .expect("channel relevance available");
        assert_eq!(score.factor, CHANNEL_RELEVANCE);
        assert!((score.weight - 0.25).abs() < 1e-12);
    }
}
