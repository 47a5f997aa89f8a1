pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod policy;
pub mod recommendation;
pub mod revenue;
pub mod risk;
pub mod scoring;

pub use domain::opportunity::{Channel, MarketSignals, Opportunity, OpportunityId};
pub use domain::resource::{Resource, ResourceId, ResourceKind, ResourceVariant};
pub use engine::{OpportunityEngine, OpportunityEvaluation};
pub use errors::{ApplicationError, EngineError};
pub use policy::EnginePolicy;
pub use recommendation::{
    ActionPriority, ActionTemplate, ActionTrigger, NextAction, Recommendation,
    RecommendationEngine, RecommendationPolicy, RecommendationTier,
};
pub use revenue::{
    Payback, ProjectionPoint, RampCurve, RampStrategy, RevenueProjector, RevenueScenario,
    ScenarioConfig, ScenarioMetrics, ScenarioName,
};
pub use risk::{RiskAssessor, RiskCategory, RiskCategoryKind, RiskConfig, RiskLevel, RiskProfile};
pub use scoring::{
    Factor, FactorReferences, FactorScore, FactorScorer, MatchAggregator, MatchResult,
    WeightPolicy,
};
