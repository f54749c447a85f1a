//! Provisioner - install and reset pipelines
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use provisioner::App;
use provisioner::cli::{Cli, Command, OutputFormat, RunArgs};
use provisioner::config::Config;
use provisioner::events::Step;
use provisioner::pipeline::Pipeline;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("provisioner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("pv.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Install { run } => cmd_pipeline(config, Pipeline::Install, &run),
        Command::Reset { run } => cmd_pipeline(config, Pipeline::Reset, &run),
        Command::Step { step, run } => cmd_step(config, &step, &run),
        Command::Steps { format } => cmd_steps(config, format),
    }
}

/// Run a whole pipeline
fn cmd_pipeline(config: Config, pipeline: Pipeline, run: &RunArgs) -> Result<()> {
    debug!(%pipeline, ?run, "cmd_pipeline: called");
    let app = App::new(config, run.force).context("Failed to configure handlers")?;
    let mut executor = app.executor(run.dry_run);

    println!("{} Running {} pipeline", "==>".cyan(), pipeline.to_string().bold());
    let summary = pipeline.run(&app.bus, &mut executor)?;

    println!(
        "{} {} complete ({} steps, {} handlers, {}ms)",
        "✓".green(),
        pipeline,
        summary.steps.len(),
        summary.handlers_invoked,
        summary.elapsed_ms
    );
    Ok(())
}

/// Publish a single step
fn cmd_step(config: Config, step: &str, run: &RunArgs) -> Result<()> {
    debug!(%step, ?run, "cmd_step: called");
    let step: Step = step.parse().map_err(|e: String| eyre::eyre!(e))?;
    let app = App::new(config, run.force).context("Failed to configure handlers")?;
    let mut executor = app.executor(run.dry_run);

    if app.bus.handler_count(step) == 0 {
        println!("{} No handlers for {}", "!".yellow(), step);
        return Ok(());
    }

    app.bus.publish(step, &mut executor)?;
    println!("{} {}", "✓".green(), step);
    Ok(())
}

#[derive(Serialize)]
struct HandlerListing<'a> {
    name: &'a str,
    priority: i32,
}

#[derive(Serialize)]
struct StepListing<'a> {
    step: Step,
    handlers: Vec<HandlerListing<'a>>,
}

#[derive(Serialize)]
struct PipelineListing<'a> {
    pipeline: String,
    steps: Vec<StepListing<'a>>,
}

/// List every pipeline and the handlers bound to its steps
fn cmd_steps(config: Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_steps: called");
    let app = App::new(config, false).context("Failed to configure handlers")?;

    let listing_for = |name: String, steps: &[Step]| PipelineListing {
        pipeline: name,
        steps: steps
            .iter()
            .map(|&step| StepListing {
                step,
                handlers: app
                    .bus
                    .handler_names(step)
                    .into_iter()
                    .map(|(name, priority)| HandlerListing { name, priority })
                    .collect(),
            })
            .collect(),
    };

    let mut listings: Vec<PipelineListing> = Pipeline::ALL
        .iter()
        .map(|p| listing_for(p.to_string(), p.steps()))
        .collect();

    // Steps no pipeline publishes are still reachable through `pv step`
    let standalone: Vec<Step> = Step::ALL
        .into_iter()
        .filter(|step| Pipeline::ALL.iter().all(|p| !p.steps().contains(step)))
        .collect();
    listings.push(listing_for("standalone".to_string(), &standalone));

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listings)?);
        }
        OutputFormat::Text => {
            for listing in &listings {
                println!("{}", listing.pipeline.bold());
                for entry in &listing.steps {
                    println!("  {}", entry.step.to_string().cyan());
                    for handler in &entry.handlers {
                        println!("    {} {}", format!("[{:>3}]", handler.priority).dimmed(), handler.name);
                    }
                }
            }
        }
    }
    Ok(())
}
