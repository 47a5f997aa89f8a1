use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::opportunity::{normalize_tag, Channel};
use crate::errors::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub String);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceVariant {
    Product,
    Expert,
    Playbook,
}

impl ResourceVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Expert => "expert",
            Self::Playbook => "playbook",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ResourceKind {
    Product {
        #[serde(default)]
        channels: BTreeSet<Channel>,
        #[serde(default)]
        lead_time_weeks: Option<u32>,
        #[serde(default)]
        min_order_value: Option<Decimal>,
    },
    Expert {
        #[serde(default)]
        expertise_tags: BTreeSet<String>,
        #[serde(default)]
        years_experience: Option<u32>,
    },
    Playbook {
        #[serde(default)]
        channels: BTreeSet<Channel>,
        /// Historical win rate in [0, 1].
        #[serde(default)]
        success_rate: Option<f64>,
    },
}

/// A matchable asset ranked against an opportunity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub capability_tags: BTreeSet<String>,
    pub kind: ResourceKind,
}

impl Resource {
    pub fn variant(&self) -> ResourceVariant {
        match self.kind {
            ResourceKind::Product { .. } => ResourceVariant::Product,
            ResourceKind::Expert { .. } => ResourceVariant::Expert,
            ResourceKind::Playbook { .. } => ResourceVariant::Playbook,
        }
    }

    /// Normalized capability tags, widened with expert expertise tags.
    pub fn relevance_tags(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> =
            self.capability_tags.iter().map(|tag| normalize_tag(tag)).collect();
        if let ResourceKind::Expert { expertise_tags, .. } = &self.kind {
            tags.extend(expertise_tags.iter().map(|tag| normalize_tag(tag)));
        }
        tags
    }

    /// Channels the resource explicitly serves. Experts declare none.
    pub fn served_channels(&self) -> Option<&BTreeSet<Channel>> {
        match &self.kind {
            ResourceKind::Product { channels, .. } | ResourceKind::Playbook { channels, .. } => {
                Some(channels)
            }
            ResourceKind::Expert { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.0.trim().is_empty() {
            return Err(EngineError::InputValidation("resource.id cannot be empty".to_string()));
        }

        match &self.kind {
            ResourceKind::Playbook { success_rate: Some(rate), .. }
                if !rate.is_finite() || !(0.0..=1.0).contains(rate) =>
            {
                Err(EngineError::InputValidation(format!(
                    "resource `{}` success_rate must be within [0, 1]",
                    self.id
                )))
            }
            ResourceKind::Product { min_order_value: Some(value), .. } if *value < Decimal::ZERO => {
                Err(EngineError::InputValidation(format!(
                    "resource `{}` min_order_value cannot be negative",
                    self.id
                )))
            }
            _ => Ok(()),
        }
    }
}
