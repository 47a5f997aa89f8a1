use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use oppscope_cli::commands::{config, evaluate, project, rank, risk, sample};
use oppscope_core::config::{ConfigOverrides, LoadOptions};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn evaluate_succeeds_on_sample_input() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = write_sample(&dir);

        let result = evaluate::run(isolated_options(&dir), &input);
        assert_eq!(result.exit_code, 0, "expected successful evaluation: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "evaluate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["result"]["opportunity_id"], "OPP-2026-014");
        assert_eq!(payload["result"]["matches"].as_array().map(Vec::len), Some(4));
        assert_eq!(payload["result"]["scenarios"][1]["name"], "expected");
        assert_eq!(payload["result"]["risk"]["categories"].as_array().map(Vec::len), Some(5));

        let tier = payload["result"]["recommendation"]["tier"].as_str().unwrap_or_default();
        assert!(["pursue", "evaluate", "pass"].contains(&tier), "unexpected tier `{tier}`");
    });
}

#[test]
fn rank_orders_matches_by_score() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = write_sample(&dir);

        let result = rank::run(isolated_options(&dir), &input);
        assert_eq!(result.exit_code, 0, "expected successful rank: {}", result.output);

        let payload = parse_payload(&result.output);
        let scores: Vec<f64> = payload["result"]
            .as_array()
            .expect("rank result should be an array")
            .iter()
            .map(|entry| entry["overall_score"].as_f64().expect("numeric score"))
            .collect();
        assert_eq!(scores.len(), 4);
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));
    });
}

#[test]
fn project_reports_default_scenarios() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = write_sample(&dir);

        let result = project::run(isolated_options(&dir), &input);
        assert_eq!(result.exit_code, 0, "expected successful projection: {}", result.output);

        let payload = parse_payload(&result.output);
        let names: Vec<&str> = payload["result"]
            .as_array()
            .expect("scenario array")
            .iter()
            .filter_map(|scenario| scenario["name"].as_str())
            .collect();
        assert_eq!(names, vec!["conservative", "expected", "optimistic"]);
        assert!(payload["message"].as_str().unwrap_or_default().contains("expected total 2800000"));
    });
}

#[test]
fn risk_reports_overall_level() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = write_sample(&dir);

        let result = risk::run(isolated_options(&dir), &input);
        assert_eq!(result.exit_code, 0, "expected successful assessment: {}", result.output);

        let payload = parse_payload(&result.output);
        let level = payload["result"]["overall_level"].as_str().unwrap_or_default();
        assert!(["low", "medium", "high"].contains(&level));
    });
}

#[test]
fn missing_input_file_is_an_input_error() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let result = evaluate::run(isolated_options(&dir), &dir.path().join("absent.json"));
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "input_read");
    });
}

#[test]
fn malformed_input_is_a_parse_error() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = dir.path().join("broken.json");
        fs::write(&input, "{\"opportunity\": {\"id\": \"OPP-1\"").expect("write input");

        let result = rank::run(isolated_options(&dir), &input);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "input_parse");
    });
}

#[test]
fn project_without_revenue_base_fails() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let mut document = sample::sample_input();
        document.opportunity.revenue_potential = None;
        let input = dir.path().join("no-revenue.json");
        fs::write(&input, serde_json::to_string(&document).expect("encode")).expect("write");

        let result = project::run(isolated_options(&dir), &input);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "project");
        assert_eq!(payload["error_class"], "missing_revenue_base");
    });
}

#[test]
fn invalid_config_file_fails_before_evaluation() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = write_sample(&dir);
        let config_path = dir.path().join("oppscope.toml");
        fs::write(&config_path, "[recommendation]\npursue_threshold = 0.5\nevaluate_threshold = 0.7\n")
            .expect("write config");

        let result = evaluate::run(
            LoadOptions { config_path: Some(config_path), ..LoadOptions::default() },
            &input,
        );
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn horizon_override_extends_projection() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let input = write_sample(&dir);
        let options = LoadOptions {
            overrides: ConfigOverrides { horizon_months: Some(36), ..ConfigOverrides::default() },
            ..isolated_options(&dir)
        };

        let result = project::run(options, &input);
        assert_eq!(result.exit_code, 0, "expected successful projection: {}", result.output);

        let payload = parse_payload(&result.output);
        for scenario in payload["result"].as_array().expect("scenario array") {
            assert_eq!(scenario["timeline_months"], 36);
            let periods: Vec<u64> = scenario["monthly_projection"]
                .as_array()
                .expect("projection array")
                .iter()
                .filter_map(|point| point["period"].as_u64())
                .collect();
            assert_eq!(periods, vec![3, 6, 12, 24, 36]);
        }
    });
}

#[test]
fn sample_output_is_deterministic() {
    with_env(&[], || {
        let first = sample::run(None);
        let second = sample::run(None);
        assert_eq!(first.exit_code, 0);
        assert_eq!(first.output, second.output);
        assert_eq!(parse_payload(&first.output)["result"]["resources"][0]["id"], "PRD-ENTREE-01");
    });
}

#[test]
fn config_reports_sources() {
    with_env(&[("OPPSCOPE_DISCOUNT_RATE", "0.12")], || {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("oppscope.toml");
        fs::write(&config_path, "[risk]\nmedium_threshold = 0.25\n").expect("write config");

        let result = config::run(LoadOptions {
            config_path: Some(config_path.clone()),
            overrides: ConfigOverrides { log_level: Some("debug".to_string()), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        });
        assert_eq!(result.exit_code, 0, "expected config listing: {}", result.output);

        let output = result.output;
        assert!(output.contains("- revenue.discount_rate = 0.12 (source: env (OPPSCOPE_DISCOUNT_RATE))"));
        assert!(output.contains(&format!(
            "- risk.medium_threshold = 0.25 (source: file ({}))",
            config_path.display()
        )));
        assert!(output.contains("- logging.level = debug (source: override)"));
        assert!(output.contains("- revenue.horizon_months = 24 (source: default)"));
    });
}

fn write_sample(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("opportunity.json");
    let result = sample::run(Some(&path));
    assert_eq!(result.exit_code, 0, "sample should be written: {}", result.output);
    path
}

/// Points at a config file that does not exist so a repo-level file is never picked up.
fn isolated_options(dir: &TempDir) -> LoadOptions {
    LoadOptions { config_path: Some(dir.path().join("absent.toml")), ..LoadOptions::default() }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OPPSCOPE_HORIZON_MONTHS",
        "OPPSCOPE_DISCOUNT_RATE",
        "OPPSCOPE_RAMP",
        "OPPSCOPE_PURSUE_THRESHOLD",
        "OPPSCOPE_EVALUATE_THRESHOLD",
        "OPPSCOPE_LOGGING_LEVEL",
        "OPPSCOPE_LOGGING_FORMAT",
        "OPPSCOPE_LOG_LEVEL",
        "OPPSCOPE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
