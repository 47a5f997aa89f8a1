use std::path::Path;

use oppscope_core::config::LoadOptions;
use oppscope_core::{ApplicationError, RiskProfile};

use crate::commands::{prepare, CommandResult};

pub fn run(options: LoadOptions, input: &Path) -> CommandResult {
    match assess(options, input) {
        Ok(profile) => {
            let message = format!(
                "overall risk {} ({:.2})",
                profile.overall_level, profile.overall_risk_score
            );
            CommandResult::success_with("risk", message, &profile)
        }
        Err(error) => CommandResult::from_error("risk", &error),
    }
}

fn assess(options: LoadOptions, input: &Path) -> Result<RiskProfile, ApplicationError> {
    let (engine, input) = prepare(options, input)?;
    Ok(engine.assess_risk(&input.opportunity, None)?)
}
