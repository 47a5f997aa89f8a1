use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpportunityId(pub String);

impl fmt::Display for OpportunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Away-From-Home channel an opportunity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Foodservice,
    Convenience,
    Hospitality,
    Education,
    Healthcare,
    Workplace,
    Travel,
    Recreation,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foodservice => "foodservice",
            Self::Convenience => "convenience",
            Self::Hospitality => "hospitality",
            Self::Education => "education",
            Self::Healthcare => "healthcare",
            Self::Workplace => "workplace",
            Self::Travel => "travel",
            Self::Recreation => "recreation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "foodservice" => Some(Self::Foodservice),
            "convenience" => Some(Self::Convenience),
            "hospitality" => Some(Self::Hospitality),
            "education" => Some(Self::Education),
            "healthcare" => Some(Self::Healthcare),
            "workplace" => Some(Self::Workplace),
            "travel" => Some(Self::Travel),
            "recreation" => Some(Self::Recreation),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market attributes resolved by the signal ingestion service before scoring.
///
/// Every field is optional: absent data lowers match confidence rather than
/// being read as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSignals {
    /// Addressable market size in currency units.
    pub market_size: Option<Decimal>,
    /// Annualized category growth as a fraction (0.12 = 12%).
    pub growth_rate: Option<f64>,
    /// Recent trend direction in [-1, 1].
    pub trend_momentum: Option<f64>,
    /// Current share of the addressable market in [0, 1].
    pub market_share: Option<f64>,
    pub competitor_count: Option<u32>,
    /// Named risk readings in [0, 1], keyed by risk factor name.
    pub risk_indicators: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    pub title: String,
    pub channel: Channel,
    pub region: String,
    pub revenue_potential: Option<Decimal>,
    #[serde(default)]
    pub market_signals: MarketSignals,
    pub timeline_months: u32,
    #[serde(default)]
    pub required_capabilities: BTreeSet<String>,
    #[serde(default)]
    pub strategic_priorities: BTreeSet<String>,
    /// Delivery complexity in [0, 1]; 1 is the hardest.
    #[serde(default)]
    pub execution_complexity: Option<f64>,
    /// Up-front spend needed to pursue the opportunity.
    #[serde(default)]
    pub investment: Option<Decimal>,
    /// Gross margin fraction applied to projected revenue.
    #[serde(default)]
    pub gross_margin: Option<Decimal>,
}

impl Opportunity {
    /// Channel tag plus every explicitly required capability.
    pub fn target_tags(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> =
            self.required_capabilities.iter().map(|tag| normalize_tag(tag)).collect();
        tags.insert(self.channel.as_str().to_string());
        tags
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.0.trim().is_empty() {
            return Err(EngineError::InputValidation("opportunity.id cannot be empty".to_string()));
        }
        if self.timeline_months == 0 {
            return Err(EngineError::InputValidation(format!(
                "opportunity `{}` timeline_months must be greater than zero",
                self.id
            )));
        }

        check_unit_interval(&self.id, "execution_complexity", self.execution_complexity)?;
        check_unit_interval(&self.id, "market_share", self.market_signals.market_share)?;

        if let Some(momentum) = self.market_signals.trend_momentum {
            if !momentum.is_finite() || !(-1.0..=1.0).contains(&momentum) {
                return Err(EngineError::InputValidation(format!(
                    "opportunity `{}` trend_momentum must be within [-1, 1]",
                    self.id
                )));
            }
        }
        if let Some(growth) = self.market_signals.growth_rate {
            if !growth.is_finite() {
                return Err(EngineError::InputValidation(format!(
                    "opportunity `{}` growth_rate must be finite",
                    self.id
                )));
            }
        }
        if matches!(self.market_signals.market_size, Some(size) if size < Decimal::ZERO) {
            return Err(EngineError::InputValidation(format!(
                "opportunity `{}` market_size cannot be negative",
                self.id
            )));
        }
        if matches!(self.investment, Some(investment) if investment < Decimal::ZERO) {
            return Err(EngineError::InputValidation(format!(
                "opportunity `{}` investment cannot be negative",
                self.id
            )));
        }
        if let Some(margin) = self.gross_margin {
            if margin < Decimal::ZERO || margin > Decimal::ONE {
                return Err(EngineError::InputValidation(format!(
                    "opportunity `{}` gross_margin must be within [0, 1]",
                    self.id
                )));
            }
        }

        for (name, value) in &self.market_signals.risk_indicators {
            if !value.is_finite() || !(0.0..=1.0).contains(value) {
                return Err(EngineError::InputValidation(format!(
                    "opportunity `{}` risk indicator `{name}` must be within [0, 1]",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

fn check_unit_interval(
    id: &OpportunityId,
    field: &str,
    value: Option<f64>,
) -> Result<(), EngineError> {
    match value {
        Some(value) if !value.is_finite() || !(0.0..=1.0).contains(&value) => {
            Err(EngineError::InputValidation(format!(
                "opportunity `{id}` {field} must be within [0, 1]"
            )))
        }
        _ => Ok(()),
    }
}

pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}
