use std::path::Path;

use oppscope_core::config::LoadOptions;
use oppscope_core::{ApplicationError, OpportunityEvaluation};

use crate::commands::{prepare, CommandResult};

pub fn run(options: LoadOptions, input: &Path) -> CommandResult {
    match evaluate(options, input) {
        Ok(evaluation) => {
            let message = match &evaluation.recommendation {
                Some(recommendation) => format!(
                    "opportunity {} evaluated: {} ({} matches)",
                    evaluation.opportunity_id,
                    recommendation.tier,
                    evaluation.matches.len()
                ),
                None => format!(
                    "opportunity {} evaluated without candidate resources",
                    evaluation.opportunity_id
                ),
            };
            CommandResult::success_with("evaluate", message, &evaluation)
        }
        Err(error) => CommandResult::from_error("evaluate", &error),
    }
}

fn evaluate(options: LoadOptions, input: &Path) -> Result<OpportunityEvaluation, ApplicationError> {
    let (engine, input) = prepare(options, input)?;
    Ok(engine.evaluate(&input.opportunity, &input.resources)?)
}
