//! Weighted aggregation of factor scores and deterministic ranking.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::factors::{FactorScore, FactorScorer};
use super::{DEFAULT_FACTOR_WEIGHTS, WEIGHT_SUM_EPSILON};
use crate::domain::opportunity::Opportunity;
use crate::domain::resource::{Resource, ResourceId, ResourceVariant};
use crate::errors::EngineError;

/// Named factor weights. Weights must be finite, non-negative and sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightPolicy {
    weights: BTreeMap<String, f64>,
}

impl WeightPolicy {
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, EngineError> {
        let policy = Self { weights };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.weights.is_empty() {
            return Err(EngineError::Configuration("weight policy cannot be empty".to_string()));
        }
        if let Some((name, _)) =
            self.weights.iter().find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(EngineError::Configuration(format!(
                "weight for factor `{name}` must be a finite non-negative number"
            )));
        }

        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(EngineError::Configuration(format!(
                "factor weights must sum to 1.0 (got {sum:.6})"
            )));
        }
        Ok(())
    }

    /// Checks that the policy covers exactly the scorer's registered factors.
    pub fn validate_against(&self, scorer: &FactorScorer) -> Result<(), EngineError> {
        self.validate()?;
        let registered: BTreeSet<&str> = scorer.factor_names().into_iter().collect();
        let weighted: BTreeSet<&str> = self.weights.keys().map(String::as_str).collect();

        if let Some(name) = weighted.difference(&registered).next() {
            return Err(EngineError::Configuration(format!(
                "weight policy names unknown factor `{name}`"
            )));
        }
        if let Some(name) = registered.difference(&weighted).next() {
            return Err(EngineError::Configuration(format!(
                "weight policy is missing factor `{name}`"
            )));
        }
        Ok(())
    }

    pub fn weight(&self, factor: &str) -> Option<f64> {
        self.weights.get(factor).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, weight)| (name.as_str(), *weight))
    }
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            weights: DEFAULT_FACTOR_WEIGHTS
                .iter()
                .map(|(name, weight)| ((*name).to_string(), *weight))
                .collect(),
        }
    }
}

/// Weights combining completeness and consistency into confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Weight for the share of factors that produced a value (default: 0.6)
    pub completeness: f64,
    /// Weight for agreement between factor values (default: 0.4)
    pub consistency: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self { completeness: 0.6, consistency: 0.4 }
    }
}

impl ConfidenceWeights {
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = self.completeness.is_finite() && self.consistency.is_finite();
        if !finite || self.completeness < 0.0 || self.consistency < 0.0 {
            return Err(EngineError::Configuration(
                "confidence weights must be finite non-negative numbers".to_string(),
            ));
        }
        let sum = self.completeness + self.consistency;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(EngineError::Configuration(format!(
                "confidence weights must sum to 1.0 (got {sum:.6})"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub overall_score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub resource_id: ResourceId,
    pub resource_variant: ResourceVariant,
    /// Weighted mean of scored factors (0.0 - 1.0)
    pub overall_score: f64,
    /// Completeness/consistency blend (0.0 - 1.0)
    pub confidence: f64,
    pub factor_breakdown: Vec<FactorScore>,
    /// Factors that could not be scored for lack of data.
    #[serde(default)]
    pub unscored_factors: Vec<String>,
}

impl MatchResult {
    /// Lowest-valued scored factor; earlier factors win ties.
    pub fn weakest_factor(&self) -> Option<&FactorScore> {
        self.factor_breakdown.iter().fold(None, |weakest: Option<&FactorScore>, score| {
            match weakest {
                Some(current) if current.value <= score.value => Some(current),
                _ => Some(score),
            }
        })
    }
}

/// Ordering used by ranking: score desc, confidence desc, resource id asc.
pub fn compare_matches(left: &MatchResult, right: &MatchResult) -> Ordering {
    right
        .overall_score
        .total_cmp(&left.overall_score)
        .then_with(|| right.confidence.total_cmp(&left.confidence))
        .then_with(|| left.resource_id.cmp(&right.resource_id))
}

#[derive(Debug, Clone, Default)]
pub struct MatchAggregator {
    confidence: ConfidenceWeights,
}

impl MatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_weights(confidence: ConfidenceWeights) -> Result<Self, EngineError> {
        confidence.validate()?;
        Ok(Self { confidence })
    }

    pub fn confidence_weights(&self) -> ConfidenceWeights {
        self.confidence
    }

    /// Fold factor outcomes into an overall score and confidence.
    ///
    /// `None` entries are factors that could not be scored; they lower
    /// completeness but never count as zero.
    pub fn aggregate(&self, scores: &[Option<FactorScore>]) -> Result<MatchScore, EngineError> {
        let scored: Vec<&FactorScore> = scores.iter().flatten().collect();
        let weight_total: f64 = scored.iter().map(|score| score.weight).sum();
        if scored.is_empty() || weight_total <= 0.0 {
            return Err(EngineError::InsufficientData { resource_id: None });
        }

        let weighted: f64 = scored.iter().map(|score| score.value * score.weight).sum();
        let overall_score = (weighted / weight_total).clamp(0.0, 1.0);

        let completeness = scored.len() as f64 / scores.len() as f64;
        let values: Vec<f64> = scored.iter().map(|score| score.value).collect();
        // Variance of values in [0, 1] is at most 0.25.
        let consistency = (1.0 - variance(&values) / 0.25).clamp(0.0, 1.0);
        let confidence = (completeness * self.confidence.completeness
            + consistency * self.confidence.consistency)
            .clamp(0.0, 1.0);

        Ok(MatchScore { overall_score, confidence })
    }

    /// Score and rank every resource against one opportunity.
    pub fn rank(
        &self,
        scorer: &FactorScorer,
        opportunity: &Opportunity,
        resources: &[Resource],
        weights: &WeightPolicy,
    ) -> Result<Vec<MatchResult>, EngineError> {
        weights.validate_against(scorer)?;
        opportunity.validate()?;

        let mut seen = BTreeSet::new();
        let mut results = Vec::with_capacity(resources.len());
        for resource in resources {
            resource.validate()?;
            if !seen.insert(&resource.id) {
                return Err(EngineError::InputValidation(format!(
                    "duplicate resource id `{}`",
                    resource.id
                )));
            }
            results.push(self.match_resource(scorer, opportunity, resource, weights)?);
        }

        results.sort_by(compare_matches);
        Ok(results)
    }

    fn match_resource(
        &self,
        scorer: &FactorScorer,
        opportunity: &Opportunity,
        resource: &Resource,
        weights: &WeightPolicy,
    ) -> Result<MatchResult, EngineError> {
        let outcomes = scorer.score_all(opportunity, resource, weights)?;
        let unscored_factors = outcomes
            .iter()
            .filter(|(_, score)| score.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        let scores: Vec<Option<FactorScore>> =
            outcomes.into_iter().map(|(_, score)| score).collect();

        let MatchScore { overall_score, confidence } =
            self.aggregate(&scores).map_err(|error| match error {
                EngineError::InsufficientData { .. } => {
                    EngineError::InsufficientData { resource_id: Some(resource.id.clone()) }
                }
                other => other,
            })?;

        Ok(MatchResult {
            resource_id: resource.id.clone(),
            resource_variant: resource.variant(),
            overall_score,
            confidence,
            factor_breakdown: scores.into_iter().flatten().collect(),
            unscored_factors,
        })
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / values.len() as f64
}
