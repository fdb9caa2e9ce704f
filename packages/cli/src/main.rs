mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{export, init, inspect, replay, ExportArgs, InitArgs, InspectArgs, ReplayArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Strata CLI - block documents from the command line
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./strata.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter config and document
    Init(InitArgs),

    /// Export a document to static HTML
    Export(ExportArgs),

    /// Dispatch a list of actions against a document
    Replay(ReplayArgs),

    /// Print the block tree of a document
    Inspect(InspectArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;
    let config = Config::load(cli.config.as_deref(), &cwd)?;
    tracing::debug!(?config, "loaded config");

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Export(args) => export(args, &config),
        Command::Replay(args) => replay(args, &config),
        Command::Inspect(args) => inspect(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
