pub mod commands;
pub mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use oppscope_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use oppscope_core::RampStrategy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "oppscope",
    about = "AFH opportunity scoring and matching CLI",
    long_about = "Score resources against an Away-From-Home opportunity, project revenue scenarios, assess risk, and recommend a pursue/evaluate/pass decision.",
    after_help = "Examples:\n  oppscope sample --output opportunity.json\n  oppscope evaluate --input opportunity.json\n  oppscope --ramp logistic project --input opportunity.json\n  oppscope config"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Path to an oppscope.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[arg(long, global = true, value_parser = parse_log_format, help = "Log format (compact|pretty|json)")]
    log_format: Option<LogFormat>,
    #[arg(long, global = true, help = "Projection horizon in months")]
    horizon_months: Option<u32>,
    #[arg(long, global = true, help = "Annual discount rate used for NPV, as a fraction")]
    discount_rate: Option<f64>,
    #[arg(long, global = true, value_parser = parse_ramp, help = "Revenue ramp curve (linear|logistic)")]
    ramp: Option<RampStrategy>,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                log_format: self.log_format,
                horizon_months: self.horizon_months,
                discount_rate: self.discount_rate,
                ramp: self.ramp,
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank resources, project revenue, assess risk and recommend for the top match")]
    Evaluate {
        #[arg(long, help = "JSON file with `opportunity` and `resources`")]
        input: PathBuf,
    },
    #[command(about = "Rank candidate resources against the opportunity")]
    Rank {
        #[arg(long, help = "JSON file with `opportunity` and `resources`")]
        input: PathBuf,
    },
    #[command(about = "Project conservative, expected and optimistic revenue scenarios")]
    Project {
        #[arg(long, help = "JSON file with an `opportunity`")]
        input: PathBuf,
    },
    #[command(about = "Assess category and overall risk for the opportunity")]
    Risk {
        #[arg(long, help = "JSON file with an `opportunity`")]
        input: PathBuf,
    },
    #[command(about = "Emit a deterministic demo input document")]
    Sample {
        #[arg(long, help = "Write the sample to this path instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Inspect effective engine policy values with source attribution")]
    Config,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|error| error.to_string())
}

fn parse_ramp(value: &str) -> Result<RampStrategy, String> {
    RampStrategy::parse(value)
        .ok_or_else(|| format!("unsupported ramp `{value}` (expected linear|logistic)"))
}

fn init_logging(config: &AppConfig) {
    use LogFormat::*;

    // OPPSCOPE_LOG takes full filter directives; otherwise the configured level applies.
    let filter = EnvFilter::try_from_env("OPPSCOPE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter);

    // Output goes to stdout, so a failed init only loses diagnostics.
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    // A config that fails to load is reported by the command itself.
    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Evaluate { input } => commands::evaluate::run(options, &input),
        Command::Rank { input } => commands::rank::run(options, &input),
        Command::Project { input } => commands::project::run(options, &input),
        Command::Risk { input } => commands::risk::run(options, &input),
        Command::Sample { output } => commands::sample::run(output.as_deref()),
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
