use std::fs;
use std::path::Path;

use oppscope_core::{ApplicationError, Opportunity, Resource};
use serde::{Deserialize, Serialize};

/// Input document shared by every analysis command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub opportunity: Opportunity,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

pub fn read_input(path: &Path) -> Result<EvaluationInput, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| ApplicationError::InputRead {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;

    serde_json::from_str(&raw).map_err(|error| ApplicationError::InputParse {
        path: path.display().to_string(),
        message: error.to_string(),
    })
}
