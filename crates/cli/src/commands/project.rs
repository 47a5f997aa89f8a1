use std::path::Path;

use oppscope_core::config::LoadOptions;
use oppscope_core::{ApplicationError, RevenueScenario, ScenarioName};

use crate::commands::{prepare, CommandResult};

pub fn run(options: LoadOptions, input: &Path) -> CommandResult {
    match project(options, input) {
        Ok(scenarios) => {
            let expected = scenarios
                .iter()
                .find(|scenario| scenario.name == ScenarioName::Expected)
                .map(|scenario| scenario.total_revenue.round_dp(2).to_string())
                .unwrap_or_else(|| "n/a".to_string());
            let message = format!("projected {} scenarios; expected total {expected}", scenarios.len());
            CommandResult::success_with("project", message, &scenarios)
        }
        Err(error) => CommandResult::from_error("project", &error),
    }
}

fn project(options: LoadOptions, input: &Path) -> Result<Vec<RevenueScenario>, ApplicationError> {
    let (engine, input) = prepare(options, input)?;
    Ok(engine.project_revenue(&input.opportunity, None)?)
}
