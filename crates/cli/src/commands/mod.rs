pub mod config;
pub mod evaluate;
pub mod project;
pub mod rank;
pub mod risk;
pub mod sample;

use std::path::Path;

use oppscope_core::config::{AppConfig, LoadOptions};
use oppscope_core::{ApplicationError, OpportunityEngine};
use serde::Serialize;

use crate::input::{read_input, EvaluationInput};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            result: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Success envelope carrying a structured result.
    pub fn success_with<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        result: &T,
    ) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => {
                let payload = CommandOutcome {
                    command: command.to_string(),
                    status: "ok".to_string(),
                    error_class: None,
                    message: message.into(),
                    result: Some(value),
                };
                Self { exit_code: 0, output: serialize_payload(payload) }
            }
            Err(error) => Self::failure(
                command,
                "serialization",
                format!("could not serialize result: {error}"),
                5,
            ),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            result: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads config, builds the engine and reads the input document.
pub(crate) fn prepare(
    options: LoadOptions,
    input: &Path,
) -> Result<(OpportunityEngine, EvaluationInput), ApplicationError> {
    let config = AppConfig::load(options)?;
    let engine = OpportunityEngine::new(config.engine)?;
    let input = read_input(input)?;
    tracing::debug!(
        event_name = "cli.input.loaded",
        opportunity_id = %input.opportunity.id,
        resources = input.resources.len(),
        "input document loaded"
    );
    Ok((engine, input))
}
