//! Hash-comment annotation CLI tool

use anyhow::Result;
use clap::Parser;
use hashnote_cli::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let config = match Config::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            hashnote_cli::errors::print_error_with_suggestion(
                "Failed to load configuration",
                &e,
                "Check the config file keys: preset, introducer, block_delimiters, special_chars, max_nesting_depth, disambiguator, strict, extensions",
            );
            std::process::exit(1);
        }
    };

    // Execute the command
    let result = match &cli.command {
        Commands::Scan { paths } => scan_files(&config, paths, cli.format).map(|_| true),
        Commands::Attach { paths } => attach_files(&config, paths, cli.format).map(|_| true),
        Commands::Check { paths } => check_files(&config, paths, cli.format),
        Commands::Strip { path } => strip_file(&config, path).map(|_| true),
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            hashnote_cli::errors::print_error("Command failed", &e);
            std::process::exit(1);
        }
    }
}
