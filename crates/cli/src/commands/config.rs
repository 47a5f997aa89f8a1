use std::env;
use std::fs;
use std::path::Path;

use oppscope_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let sources = Sources {
        doc: load_config_file_doc(config_file_path.as_deref()),
        path: config_file_path.as_deref(),
    };
    let overrides = &options.overrides;
    let engine = &config.engine;

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string(),
    ];

    lines.push(sources.line("matching.factors", &engine.factors.join(", "), &[], false));
    let weights = engine
        .weights
        .iter()
        .map(|(name, weight)| format!("{name}={weight}"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(sources.line("matching.weights", &weights, &[], false));
    lines.push(sources.line(
        "matching.confidence",
        &format!(
            "completeness={}, consistency={}",
            engine.confidence.completeness, engine.confidence.consistency
        ),
        &[],
        false,
    ));

    let revenue = &engine.revenue;
    lines.push(sources.line(
        "revenue.horizon_months",
        &revenue.horizon_months.to_string(),
        &["OPPSCOPE_HORIZON_MONTHS"],
        overrides.horizon_months.is_some(),
    ));
    let checkpoints =
        revenue.checkpoints.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
    lines.push(sources.line("revenue.checkpoints", &checkpoints, &[], false));
    lines.push(sources.line(
        "revenue.ramp",
        revenue.ramp.as_str(),
        &["OPPSCOPE_RAMP"],
        overrides.ramp.is_some(),
    ));
    lines.push(sources.line(
        "revenue.discount_rate",
        &revenue.discount_rate.to_string(),
        &["OPPSCOPE_DISCOUNT_RATE"],
        overrides.discount_rate.is_some(),
    ));
    lines.push(sources.line(
        "revenue.default_gross_margin",
        &revenue.default_gross_margin.to_string(),
        &[],
        false,
    ));

    let risk = &engine.risk;
    lines.push(sources.line(
        "risk.medium_threshold",
        &risk.thresholds.medium.to_string(),
        &[],
        false,
    ));
    lines.push(sources.line("risk.high_threshold", &risk.thresholds.high.to_string(), &[], false));
    lines.push(sources.line("risk.unknown_score", &risk.unknown_score.to_string(), &[], false));

    let recommendation = &engine.recommendation;
    lines.push(sources.line(
        "recommendation.pursue_threshold",
        &recommendation.pursue_threshold.to_string(),
        &["OPPSCOPE_PURSUE_THRESHOLD"],
        false,
    ));
    lines.push(sources.line(
        "recommendation.evaluate_threshold",
        &recommendation.evaluate_threshold.to_string(),
        &["OPPSCOPE_EVALUATE_THRESHOLD"],
        false,
    ));
    lines.push(sources.line(
        "recommendation.max_actions",
        &recommendation.max_actions.to_string(),
        &[],
        false,
    ));

    lines.push(sources.line(
        "logging.level",
        &config.logging.level,
        &["OPPSCOPE_LOGGING_LEVEL", "OPPSCOPE_LOG_LEVEL"],
        overrides.log_level.is_some(),
    ));
    lines.push(sources.line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_ascii_lowercase(),
        &["OPPSCOPE_LOGGING_FORMAT", "OPPSCOPE_LOG_FORMAT"],
        overrides.log_format.is_some(),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

struct Sources<'a> {
    doc: Option<Value>,
    path: Option<&'a Path>,
}

impl Sources<'_> {
    fn line(&self, key_path: &str, value: &str, env_keys: &[&str], overridden: bool) -> String {
        render_line(key_path, value, self.field_source(key_path, env_keys, overridden))
    }

    fn field_source(&self, key_path: &str, env_keys: &[&str], overridden: bool) -> String {
        if overridden {
            return "override".to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
