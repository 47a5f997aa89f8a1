use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::EngineError;
use crate::policy::EnginePolicy;
use crate::recommendation::ActionTemplate;
use crate::revenue::{RampStrategy, ScenarioAssumption};
use crate::risk::{CategoryPolicy, MitigationRule};
use crate::scoring::{ConfidenceWeights, FactorReferences, WeightPolicy};

pub const CONFIG_FILE_NAME: &str = "oppscope.toml";
pub const NESTED_CONFIG_FILE: &str = "config/oppscope.toml";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub engine: EnginePolicy,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub horizon_months: Option<u32>,
    pub discount_rate: Option<f64>,
    pub ramp: Option<RampStrategy>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EnginePolicy::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(matching) = patch.matching {
            if let Some(factors) = matching.factors {
                self.engine.factors = factors;
            }
            if let Some(weights) = matching.weights {
                self.engine.weights = weights;
            }
            if let Some(confidence) = matching.confidence {
                self.engine.confidence = confidence;
            }
            if let Some(references) = matching.references {
                self.engine.references = references;
            }
        }

        if let Some(revenue) = patch.revenue {
            let scenarios = &mut self.engine.revenue;
            if let Some(conservative) = revenue.conservative {
                scenarios.conservative = conservative;
            }
            if let Some(expected) = revenue.expected {
                scenarios.expected = expected;
            }
            if let Some(optimistic) = revenue.optimistic {
                scenarios.optimistic = optimistic;
            }
            if let Some(horizon_months) = revenue.horizon_months {
                scenarios.set_horizon(horizon_months);
            }
            if let Some(checkpoints) = revenue.checkpoints {
                scenarios.checkpoints = checkpoints;
            }
            if let Some(ramp) = revenue.ramp {
                scenarios.ramp = ramp;
            }
            if let Some(discount_rate) = revenue.discount_rate {
                scenarios.discount_rate = discount_rate;
            }
            if let Some(default_gross_margin) = revenue.default_gross_margin {
                scenarios.default_gross_margin = default_gross_margin;
            }
        }

        if let Some(risk) = patch.risk {
            let assessment = &mut self.engine.risk;
            if let Some(medium) = risk.medium_threshold {
                assessment.thresholds.medium = medium;
            }
            if let Some(high) = risk.high_threshold {
                assessment.thresholds.high = high;
            }
            if let Some(unknown_score) = risk.unknown_score {
                assessment.unknown_score = unknown_score;
            }
            if let Some(crowded_competitor_count) = risk.crowded_competitor_count {
                assessment.crowded_competitor_count = crowded_competitor_count;
            }
            if let Some(comfortable_timeline_months) = risk.comfortable_timeline_months {
                assessment.comfortable_timeline_months = comfortable_timeline_months;
            }
            if let Some(categories) = risk.categories {
                assessment.categories = categories;
            }
            // Individual rules replace the default for their (category, level) pair.
            for rule in risk.mitigations.unwrap_or_default() {
                match assessment
                    .mitigations
                    .iter_mut()
                    .find(|existing| existing.category == rule.category && existing.level == rule.level)
                {
                    Some(existing) => existing.mitigation = rule.mitigation,
                    None => assessment.mitigations.push(rule),
                }
            }
        }

        if let Some(recommendation) = patch.recommendation {
            let policy = &mut self.engine.recommendation;
            if let Some(pursue_threshold) = recommendation.pursue_threshold {
                policy.pursue_threshold = pursue_threshold;
            }
            if let Some(evaluate_threshold) = recommendation.evaluate_threshold {
                policy.evaluate_threshold = evaluate_threshold;
            }
            if let Some(max_actions) = recommendation.max_actions {
                policy.max_actions = max_actions;
            }
            if let Some(templates) = recommendation.templates {
                policy.templates = templates;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("OPPSCOPE_HORIZON_MONTHS") {
            let horizon_months = parse_u32("OPPSCOPE_HORIZON_MONTHS", &value)?;
            self.engine.revenue.set_horizon(horizon_months);
        }
        if let Some(value) = read_env("OPPSCOPE_DISCOUNT_RATE") {
            self.engine.revenue.discount_rate = parse_f64("OPPSCOPE_DISCOUNT_RATE", &value)?;
        }
        if let Some(value) = read_env("OPPSCOPE_RAMP") {
            self.engine.revenue.ramp =
                RampStrategy::parse(&value).ok_or_else(|| ConfigError::InvalidEnvOverride {
                    key: "OPPSCOPE_RAMP".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = read_env("OPPSCOPE_PURSUE_THRESHOLD") {
            self.engine.recommendation.pursue_threshold =
                parse_f64("OPPSCOPE_PURSUE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("OPPSCOPE_EVALUATE_THRESHOLD") {
            self.engine.recommendation.evaluate_threshold =
                parse_f64("OPPSCOPE_EVALUATE_THRESHOLD", &value)?;
        }

        let log_level =
            read_env("OPPSCOPE_LOGGING_LEVEL").or_else(|| read_env("OPPSCOPE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("OPPSCOPE_LOGGING_FORMAT").or_else(|| read_env("OPPSCOPE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(horizon_months) = overrides.horizon_months {
            self.engine.revenue.set_horizon(horizon_months);
        }
        if let Some(discount_rate) = overrides.discount_rate {
            self.engine.revenue.discount_rate = discount_rate;
        }
        if let Some(ramp) = overrides.ramp {
            self.engine.revenue.ramp = ramp;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate().map_err(|error| match error {
            EngineError::Configuration(message) => ConfigError::Validation(message),
            other => ConfigError::Validation(other.to_string()),
        })?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing config file: the explicit path, else `oppscope.toml`, else
/// `config/oppscope.toml`.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    matching: Option<MatchingPatch>,
    revenue: Option<RevenuePatch>,
    risk: Option<RiskPatch>,
    recommendation: Option<RecommendationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchingPatch {
    factors: Option<Vec<String>>,
    weights: Option<WeightPolicy>,
    confidence: Option<ConfidenceWeights>,
    references: Option<FactorReferences>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RevenuePatch {
    conservative: Option<ScenarioAssumption>,
    expected: Option<ScenarioAssumption>,
    optimistic: Option<ScenarioAssumption>,
    horizon_months: Option<u32>,
    checkpoints: Option<Vec<u32>>,
    ramp: Option<RampStrategy>,
    discount_rate: Option<f64>,
    default_gross_margin: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RiskPatch {
    medium_threshold: Option<f64>,
    high_threshold: Option<f64>,
    unknown_score: Option<f64>,
    crowded_competitor_count: Option<u32>,
    comfortable_timeline_months: Option<u32>,
    categories: Option<Vec<CategoryPolicy>>,
    mitigations: Option<Vec<MitigationRule>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecommendationPatch {
    pursue_threshold: Option<f64>,
    evaluate_threshold: Option<f64>,
    max_actions: Option<usize>,
    templates: Option<Vec<ActionTemplate>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::revenue::RampStrategy;
    use crate::risk::{RiskCategoryKind, RiskLevel};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<std::path::PathBuf, String> {
        let path = dir.path().join("oppscope.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_load_without_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist/oppscope.toml".into()),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config == AppConfig::default(), "missing optional file should yield defaults")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist/oppscope.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_OPPSCOPE_DISCOUNT", "0.08");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[revenue]
discount_rate = ${TEST_OPPSCOPE_DISCOUNT}
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                (config.engine.revenue.discount_rate - 0.08).abs() < 1e-12,
                "discount rate should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_OPPSCOPE_DISCOUNT"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[logging]\nlevel = \"${OPPSCOPE_TEST_UNSET_LEVEL}\"\n")?;

        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(
                result,
                Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "OPPSCOPE_TEST_UNSET_LEVEL"
            ),
            "missing interpolation variable should be named",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPPSCOPE_LOG_LEVEL", "warn");
        env::set_var("OPPSCOPE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(&["OPPSCOPE_LOG_LEVEL", "OPPSCOPE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPPSCOPE_DISCOUNT_RATE", "0.12");
        env::set_var("OPPSCOPE_RAMP", "logistic");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[revenue]
discount_rate = 0.05
default_gross_margin = "0.42"

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ramp: Some(RampStrategy::Linear),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.engine.revenue.default_gross_margin == Decimal::new(42, 2),
                "file margin should win over default",
            )?;
            ensure(
                (config.engine.revenue.discount_rate - 0.12).abs() < 1e-12,
                "env discount rate should win over file",
            )?;
            ensure(
                config.engine.revenue.ramp == RampStrategy::Linear,
                "explicit override should win over env ramp",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&["OPPSCOPE_DISCOUNT_RATE", "OPPSCOPE_RAMP"]);
        result
    }

    #[test]
    fn horizon_from_file_or_env_moves_the_final_checkpoint() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[revenue]\nhorizon_months = 12\n")?;
        let config = AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;
        ensure(
            config.engine.revenue.checkpoints == vec![3, 6, 12],
            "file horizon should trim later checkpoints",
        )?;

        env::set_var("OPPSCOPE_HORIZON_MONTHS", "36");
        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;
            ensure(config.engine.revenue.horizon_months == 36, "env horizon should win over file")?;
            ensure(
                config.engine.revenue.checkpoints == vec![3, 6, 12, 36],
                "env horizon should become the final checkpoint",
            )
        })();

        clear_vars(&["OPPSCOPE_HORIZON_MONTHS"]);
        result
    }

    #[test]
    fn mitigation_rules_replace_matching_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[risk]
medium_threshold = 0.25

[[risk.mitigations]]
category = "regulatory"
level = "high"
mitigation = "Engage the state food safety liaison before contracting"
"#,
        )?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        ensure(
            (config.engine.risk.thresholds.medium - 0.25).abs() < 1e-12,
            "medium threshold should come from file",
        )?;
        ensure(
            config.engine.risk.mitigation(RiskCategoryKind::Regulatory, RiskLevel::High)
                == Some("Engage the state food safety liaison before contracting"),
            "file mitigation should replace the default rule",
        )?;
        ensure(config.engine.risk.mitigations.len() == 15, "rule count should be unchanged")
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[matching.weights]
channel_relevance = 0.5
market_timing = 0.5
competitive_position = 0.5
revenue_size = 0.0
execution_complexity = 0.0
strategic_fit = 0.0
"#,
        )?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("sum to 1.0")
        );
        ensure(has_message, "validation failure should mention the weight sum")
    }

    #[test]
    fn invalid_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPPSCOPE_HORIZON_MONTHS", "two years");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["OPPSCOPE_HORIZON_MONTHS"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "OPPSCOPE_HORIZON_MONTHS"
            ),
            "unparseable horizon should be rejected",
        )
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[revenue]\nhorizon = 12\n")?;
        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(matches!(result, Err(ConfigError::ParseFile { .. })), "typo should fail parsing")
    }
}
