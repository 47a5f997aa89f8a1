use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::Context;
use oppscope_core::{
    Channel, MarketSignals, Opportunity, OpportunityId, Resource, ResourceId, ResourceKind,
};
use rust_decimal::Decimal;

use crate::commands::CommandResult;
use crate::input::EvaluationInput;

pub fn run(output: Option<&Path>) -> CommandResult {
    let input = sample_input();
    match output {
        Some(path) => match write_sample(path, &input) {
            Ok(()) => CommandResult::success(
                "sample",
                format!("wrote sample input to {}", path.display()),
            ),
            Err(error) => CommandResult::failure("sample", "output_write", format!("{error:#}"), 3),
        },
        None => CommandResult::success_with("sample", "sample input", &input),
    }
}

fn write_sample(path: &Path, input: &EvaluationInput) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(input).context("serializing sample input")?;
    fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Fixed demo document; identical on every call.
pub fn sample_input() -> EvaluationInput {
    let opportunity = Opportunity {
        id: OpportunityId("OPP-2026-014".to_string()),
        title: "Regional hospital system cafeteria refresh".to_string(),
        channel: Channel::Healthcare,
        region: "Midwest".to_string(),
        revenue_potential: Some(Decimal::new(2_800_000, 0)),
        market_signals: MarketSignals {
            market_size: Some(Decimal::new(12_000_000, 0)),
            growth_rate: Some(0.09),
            trend_momentum: Some(0.35),
            market_share: Some(0.12),
            competitor_count: Some(7),
            risk_indicators: BTreeMap::from([
                ("brand_alignment".to_string(), 0.2),
                ("compliance_burden".to_string(), 0.55),
                ("food_safety".to_string(), 0.45),
                ("supply_chain".to_string(), 0.3),
            ]),
        },
        timeline_months: 18,
        required_capabilities: tags(&["allergen_control", "high_volume", "patient_nutrition"]),
        strategic_priorities: tags(&["better_for_you", "healthcare_growth"]),
        execution_complexity: Some(0.35),
        investment: Some(Decimal::new(450_000, 0)),
        gross_margin: Some(Decimal::new(38, 2)),
    };

    let resources = vec![
        Resource {
            id: ResourceId("PRD-ENTREE-01".to_string()),
            name: "Allergen-safe frozen entree line".to_string(),
            capability_tags: tags(&["allergen_control", "better_for_you", "high_volume"]),
            kind: ResourceKind::Product {
                channels: BTreeSet::from([Channel::Education, Channel::Healthcare]),
                lead_time_weeks: Some(6),
                min_order_value: Some(Decimal::new(250_000, 0)),
            },
        },
        Resource {
            id: ResourceId("EXP-NUTRITION-01".to_string()),
            name: "Clinical nutrition menu specialist".to_string(),
            capability_tags: tags(&["menu_design", "patient_nutrition"]),
            kind: ResourceKind::Expert {
                expertise_tags: tags(&["healthcare_growth"]),
                years_experience: Some(12),
            },
        },
        Resource {
            id: ResourceId("PBK-CAFE-REFRESH".to_string()),
            name: "Cafeteria refresh playbook".to_string(),
            capability_tags: tags(&["better_for_you", "high_volume"]),
            kind: ResourceKind::Playbook {
                channels: BTreeSet::from([Channel::Healthcare, Channel::Workplace]),
                success_rate: Some(0.72),
            },
        },
        Resource {
            id: ResourceId("PRD-SNACK-02".to_string()),
            name: "Grab-and-go snack assortment".to_string(),
            capability_tags: tags(&["grab_and_go"]),
            kind: ResourceKind::Product {
                channels: BTreeSet::from([Channel::Convenience, Channel::Travel]),
                lead_time_weeks: Some(3),
                min_order_value: None,
            },
        },
    ];

    EvaluationInput { opportunity, resources }
}
