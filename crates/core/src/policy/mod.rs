//! The single policy object shared by every engine component.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::recommendation::RecommendationPolicy;
use crate::revenue::ScenarioConfig;
use crate::risk::RiskConfig;
use crate::scoring::{ConfidenceWeights, FactorReferences, FactorScorer, WeightPolicy, BUILTIN_FACTORS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicy {
    /// Factors to evaluate, in order. Names must be builtin factors.
    pub factors: Vec<String>,
    pub weights: WeightPolicy,
    pub confidence: ConfidenceWeights,
    pub references: FactorReferences,
    pub revenue: ScenarioConfig,
    pub risk: RiskConfig,
    pub recommendation: RecommendationPolicy,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            factors: BUILTIN_FACTORS.iter().map(|name| name.to_string()).collect(),
            weights: WeightPolicy::default(),
            confidence: ConfidenceWeights::default(),
            references: FactorReferences::default(),
            revenue: ScenarioConfig::default(),
            risk: RiskConfig::default(),
            recommendation: RecommendationPolicy::default(),
        }
    }
}

impl EnginePolicy {
    /// Scorer holding the configured factor list.
    pub fn scorer(&self) -> Result<FactorScorer, EngineError> {
        self.references.validate()?;
        FactorScorer::from_names(&self.factors, self.references.clone())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.factors.is_empty() {
            return Err(EngineError::Configuration("factor list cannot be empty".to_string()));
        }
        let scorer = self.scorer()?;
        self.weights.validate_against(&scorer)?;
        self.confidence.validate()?;
        self.revenue.validate()?;
        self.risk.validate()?;
        self.recommendation.validate()?;
        Ok(())
    }
}
