mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{add, inspect, normalize, update, AddArgs, InspectArgs, NormalizeArgs, UpdateArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Richnode CLI - inspect and edit custom nodes in markup documents
#[derive(Parser, Debug)]
#[command(name = "richnode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the custom nodes of a document with their positions
    Inspect(InspectArgs),

    /// Rewrite a document in canonical markup
    Normalize(NormalizeArgs),

    /// Insert a custom node at a position
    Add(AddArgs),

    /// Change attributes of the custom nodes at a position or in a range
    Update(UpdateArgs),
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot get current directory")?;
    let config = Config::load(&cwd)?;
    init_tracing(&config.log_level);

    match cli.command {
        Command::Inspect(args) => inspect(args, &config),
        Command::Normalize(args) => normalize(args, &config),
        Command::Add(args) => add(args, &config),
        Command::Update(args) => update(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
