//! Recipe runner
//!
//! Loads a recipe file, resolves its modules against the built-in registry
//! and runs the setup and process phases. A critical error at either phase
//! barrier is printed and the process exits non-zero.

use clap::{Parser, Subcommand};
use recipe_engine::{EngineError, Orchestrator, RunSummary};
use recipe_types::{CriticalError, Recipe};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod builtin;
mod config;
mod error;

use config::RunnerConfig;
use error::{CliError, CliResult};

/// Recipe runner CLI
#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Run module recipes", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "RECIPE_CONFIG")]
    config: Option<String>,

    /// Log level (overrides the configured one)
    #[arg(long, global = true, env = "RECIPE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a recipe
    Run {
        /// Recipe file (.json, .yaml or .yml)
        recipe: PathBuf,

        /// Recipe parameter, repeatable. Values are parsed as JSON and
        /// fall back to plain strings.
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, serde_json::Value)>,
    },

    /// List the available modules
    Modules,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RunnerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", CliError::from(e));
            return ExitCode::from(2);
        }
    };

    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.json || config.logging.json,
    );

    match cli.command {
        Command::Modules => {
            for name in builtin::registry().names() {
                println!("{}", name);
            }
            ExitCode::SUCCESS
        }
        Command::Run { recipe, params } => match run(&config, &recipe, params).await {
            Ok(summary) => {
                report_summary(&summary);
                ExitCode::SUCCESS
            }
            Err(CliError::Engine(EngineError::Critical(critical))) => {
                report_critical(&critical);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    // Logs go to stderr; stdout belongs to the modules.
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(
    config: &RunnerConfig,
    path: &Path,
    params: Vec<(String, serde_json::Value)>,
) -> CliResult<RunSummary> {
    let recipe = load_recipe(path)?;
    let params = config.merged_parameters(params);
    tracing::info!(
        recipe = %recipe.name,
        path = %path.display(),
        parameters = params.len(),
        "Running recipe"
    );

    let mut orchestrator = Orchestrator::new(builtin::registry());
    orchestrator.load_recipe(recipe)?;
    Ok(orchestrator.run(&params).await?)
}

/// Read a recipe, picking the format from the file extension
fn load_recipe(path: &Path) -> CliResult<Recipe> {
    let text = std::fs::read_to_string(path).map_err(recipe_types::RecipeError::from)?;
    let recipe = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Recipe::from_yaml(&text)?,
        _ => Recipe::from_json(&text)?,
    };
    Ok(recipe)
}

fn parse_param(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in `{}`", raw));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn report_summary(summary: &RunSummary) {
    eprintln!(
        "Run {} completed: {} module(s) processed",
        summary.run_id.short(),
        summary.process.completed.len()
    );
    if !summary.errors.is_empty() {
        eprintln!("Warnings:");
        for entry in &summary.errors {
            eprintln!("{}", entry);
        }
    }
}

fn report_critical(critical: &CriticalError) {
    eprintln!("Encountered one or more errors:");
    for entry in &critical.reported {
        eprintln!("{}", entry);
    }
    eprintln!("Critical error found. Aborting.");
}
