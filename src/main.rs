//! sitekit - asset build and live-reload dev server for static site front ends.

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod site;
mod task;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

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

    if let Some(Commands::Tasks) = cli.command {
        return cli::run::list_tasks();
    }

    let config = Arc::new(SiteConfig::load(&cli)?);
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sitekit-worker")
        .build()?;

    runtime.block_on(async {
        match &cli.command {
            None | Some(Commands::Build) => cli::run::run_tasks(config, &["build"]).await,
            Some(Commands::Clean) => cli::run::run_tasks(config, &["clean"]).await,
            Some(Commands::Watch { .. }) => cli::watch::watch(config, &[]).await,
            Some(Commands::Serve { .. }) => {
                cli::watch::watch(config, site::SERVE_PREREQUISITES).await
            }
            Some(Commands::Run(tasks)) => {
                let targets: Vec<&str> = tasks.iter().map(String::as_str).collect();
                cli::run::run_tasks(config, &targets).await
            }
            Some(Commands::Tasks) => cli::run::list_tasks(),
        }
    })
}
