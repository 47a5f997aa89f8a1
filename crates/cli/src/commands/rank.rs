use std::path::Path;

use oppscope_core::config::LoadOptions;
use oppscope_core::{ApplicationError, MatchResult};

use crate::commands::{prepare, CommandResult};

pub fn run(options: LoadOptions, input: &Path) -> CommandResult {
    match rank(options, input) {
        Ok(matches) => {
            let message = match matches.first() {
                Some(top) => format!(
                    "ranked {} resources; top match {} at {:.2}",
                    matches.len(),
                    top.resource_id,
                    top.overall_score
                ),
                None => "no resources to rank".to_string(),
            };
            CommandResult::success_with("rank", message, &matches)
        }
        Err(error) => CommandResult::from_error("rank", &error),
    }
}

fn rank(options: LoadOptions, input: &Path) -> Result<Vec<MatchResult>, ApplicationError> {
    let (engine, input) = prepare(options, input)?;
    Ok(engine.rank(&input.opportunity, &input.resources, None)?)
}
