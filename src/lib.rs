pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod models;
pub mod parser;
pub mod services;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use discovery::{FileDiscovery, WalkdirDiscovery};
use models::MuxOutcome;
use parser::parse_selection;
use services::{MkvmergeAssembler, MuxRunner, RunMode, RunOptions};

pub use config::Config;

/// Stable exit codes for scripting around the CLI.
pub const EXIT_OK: u8 = 0;
pub const EXIT_MUX_FAILED: u8 = 1;
pub const EXIT_INVALID_SELECTION: u8 = 2;
pub const EXIT_NO_EPISODES: u8 = 3;

pub async fn run() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let discovery: Arc<dyn FileDiscovery> = Arc::new(WalkdirDiscovery);

    let selection = match parse_selection(
        &args.episodes,
        &config.paths.subtitle_dir,
        discovery.as_ref(),
    ) {
        Ok(selection) => selection,
        Err(e) => {
            error!("Invalid episode selection: {e}");
            return Ok(ExitCode::from(EXIT_INVALID_SELECTION));
        }
    };

    if selection.is_empty() {
        println!("No episodes selected - nothing to do.");
        return Ok(ExitCode::from(EXIT_NO_EPISODES));
    }

    let mode = if args.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Normal
    };

    if mode == RunMode::Normal {
        std::fs::create_dir_all(&args.outdir).with_context(|| {
            format!("Failed to create output directory: {}", args.outdir.display())
        })?;
    }

    let options = RunOptions {
        out_dir: args.outdir.clone(),
        flag: args
            .flag
            .clone()
            .unwrap_or_else(|| config.output.default_flag.clone()),
        version: args.version,
        mode,
    };

    info!(
        episodes = selection.len(),
        dry_run = args.dry_run,
        "starting run"
    );

    let assembly = Arc::new(MkvmergeAssembler::new(&config));
    let runner = MuxRunner::new(config, Arc::clone(&discovery), assembly);
    let report = runner.run(&selection, &options).await;

    println!();
    println!("{:-<70}", "");
    println!(
        "Processed {}/{} episodes successfully.",
        report.succeeded(),
        report.total()
    );
    for outcome in report.outcomes() {
        if let MuxOutcome::Failed { episode, reason } = outcome {
            println!("  Failed: {episode} - {reason}");
        }
    }

    Ok(if report.all_succeeded() {
        ExitCode::from(EXIT_OK)
    } else {
        ExitCode::from(EXIT_MUX_FAILED)
    })
}
