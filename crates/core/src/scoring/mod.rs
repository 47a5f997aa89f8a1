//! Opportunity-to-resource matching.
//!
//! Factors score one dimension of fit in [0, 1]; the aggregator folds them into
//! an overall score plus a confidence value and ranks candidate resources.

mod aggregate;
mod factors;

pub use aggregate::{
    compare_matches, ConfidenceWeights, MatchAggregator, MatchResult, MatchScore, WeightPolicy,
};
pub use factors::{
    ChannelRelevance, CompetitivePosition, ExecutionComplexity, Factor, FactorReferences,
    FactorScore, FactorScorer, MarketTiming, RevenueSize, StrategicFit,
};

pub const CHANNEL_RELEVANCE: &str = "channel_relevance";
pub const MARKET_TIMING: &str = "market_timing";
pub const COMPETITIVE_POSITION: &str = "competitive_position";
pub const REVENUE_SIZE: &str = "revenue_size";
pub const EXECUTION_COMPLEXITY: &str = "execution_complexity";
pub const STRATEGIC_FIT: &str = "strategic_fit";

/// Builtin factors in evaluation order.
pub const BUILTIN_FACTORS: [&str; 6] = [
    CHANNEL_RELEVANCE,
    MARKET_TIMING,
    COMPETITIVE_POSITION,
    REVENUE_SIZE,
    EXECUTION_COMPLEXITY,
    STRATEGIC_FIT,
];

/// Default factor weights (sum to 1.0).
pub const DEFAULT_FACTOR_WEIGHTS: [(&str, f64); 6] = [
    (CHANNEL_RELEVANCE, 0.25),
    (MARKET_TIMING, 0.15),
    (COMPETITIVE_POSITION, 0.15),
    (REVENUE_SIZE, 0.15),
    (EXECUTION_COMPLEXITY, 0.15),
    (STRATEGIC_FIT, 0.15),
];

/// Tolerance for weight sets that must sum to one.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;
