use thiserror::Error;

use crate::domain::resource::ResourceId;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("input validation failed: {0}")]
    InputValidation(String),
    #[error("insufficient data: every factor was unscored{}", resource_suffix(.resource_id))]
    InsufficientData { resource_id: Option<ResourceId> },
    #[error("configuration invalid: {0}")]
    Configuration(String),
    #[error("revenue base missing or non-positive for opportunity `{opportunity_id}`")]
    MissingRevenueBase { opportunity_id: String },
    #[error("arithmetic failure: {0}")]
    Arithmetic(String),
}

fn resource_suffix(resource_id: &Option<ResourceId>) -> String {
    match resource_id {
        Some(id) => format!(" for resource `{id}`"),
        None => String::new(),
    }
}

impl EngineError {
    /// Stable machine-readable class used by CLI envelopes.
    pub fn class(&self) -> &'static str {
        match self {
            Self::InputValidation(_) => "input_validation",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Configuration(_) => "configuration",
            Self::MissingRevenueBase { .. } => "missing_revenue_base",
            Self::Arithmetic(_) => "arithmetic",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("could not read input `{path}`: {message}")]
    InputRead { path: String, message: String },
    #[error("could not parse input `{path}`: {message}")]
    InputParse { path: String, message: String },
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Engine(error) => error.class(),
            Self::Config(_) => "config_validation",
            Self::InputRead { .. } => "input_read",
            Self::InputParse { .. } => "input_parse",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::InputRead { .. } | Self::InputParse { .. } => 3,
            Self::Engine(EngineError::Configuration(_)) => 2,
            Self::Engine(_) => 4,
        }
    }
}
