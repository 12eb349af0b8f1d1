//! Curo - content validation and serving toolkit for the marketing site.

mod cli;
mod config;
mod content;
mod core;
mod index;
mod logger;
mod redirect;
mod registry;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, ImagesCommand};
use config::{SiteConfig, init_config};
use index::ContentIndex;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    let mut config = SiteConfig::load(cli)?;
    if let Commands::Serve { interface, port } = &cli.command {
        if let Some(interface) = interface {
            config.serve.interface = *interface;
        }
        if let Some(port) = port {
            config.serve.port = *port;
        }
    }
    let config = init_config(config);

    let index = Arc::new(ContentIndex::new(&config)?);

    match &cli.command {
        Commands::Validate { warn_only } => cli::validate::validate_site(&config, &index, *warn_only),
        Commands::Images { command } => match command {
            ImagesCommand::Scan { json } => cli::images::run_scan(&config, *json),
            ImagesCommand::Apply => cli::images::run_apply(&config),
        },
        Commands::Serve { .. } => cli::serve::serve_site(index),
    }
}
