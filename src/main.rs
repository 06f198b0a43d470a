//! pipewright - asset pipeline orchestrator for sectioned static sites.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod graph;
mod logger;
mod pipeline;
mod public;
mod registry;
mod serve;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;
use core::{Mode, PipelineContext};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let mode = Mode::from_env();
    let config = PipelineConfig::load(&cli)?;
    let ctx = PipelineContext::new(config, mode)?;

    match &cli.command {
        Commands::Build => {
            let summary = cli::build::build_all(&ctx)?;
            if !summary.is_clean() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Dev { .. } => cli::dev::serve_dev(ctx).map(|_| ()),
        Commands::Plan { graph } => cli::plan::print_plan(*graph, &ctx),
    }
}
