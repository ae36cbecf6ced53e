//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Asset build and live-reload development server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, searched upward from the working directory
    #[arg(short = 'C', long, global = true, default_value = "sitekit.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands, `build` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build every asset into the distribution directory
    #[command(visible_alias = "dist")]
    Build,

    /// Serve the staging directory and rebuild on change, without an initial build
    #[command(visible_alias = "develop")]
    Watch {
        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Build the development assets, then watch
    Serve {
        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Remove staging, distribution and generated sprite
    Clean,

    /// List tasks and their prerequisites
    Tasks,

    /// Run any task by name (styles, scripts, lint, ...)
    #[command(external_subcommand)]
    Run(Vec<String>),
}

/// Development server arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}
