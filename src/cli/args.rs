//! Command-line interface definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};

use crate::graph::GraphKind;

/// pipewright asset pipeline CLI
///
/// The build mode comes from `PIPEWRIGHT_ENV`: `development` selects
/// unminified output with source maps, anything else is production.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "pipewright.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build every section, then watch sources and serve with live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Build every section and the obfuscated public copy
    #[command(visible_alias = "b")]
    Build,

    /// Print a task graph's steps without running them
    #[command(visible_alias = "p")]
    Plan {
        /// Which graph to print
        #[arg(value_enum)]
        graph: GraphKind,
    },
}
