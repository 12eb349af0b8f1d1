//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Content validation and serving toolkit for the marketing site
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: curo.toml)
    #[arg(short = 'C', long, default_value = "curo.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate content metadata and redirects, and persist the redirect map
    #[command(visible_alias = "v")]
    Validate {
        /// Report problems without failing or persisting anything
        #[arg(short = 'w', long)]
        warn_only: bool,
    },

    /// Reconcile the image registry against disk and content references
    #[command(visible_alias = "i")]
    Images {
        #[command(subcommand)]
        command: ImagesCommand,
    },

    /// Serve content with redirect handling
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Image registry subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ImagesCommand {
    /// Report drift between registry, assets directory and content references
    Scan {
        /// Print the report as JSON instead of the human-readable sections
        #[arg(short, long)]
        json: bool,
    },

    /// Commit the scan proposals: register new images, re-point updated ones
    /// and rewrite content references
    Apply,
}
