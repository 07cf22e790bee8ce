//! exprgp CLI - evolve arithmetic expressions toward a target value.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// exprgp - Genetic programming for goal-seeking expressions
#[derive(Parser, Debug)]
#[command(name = "exprgp")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve an expression whose value approaches the target
    Evolve {
        /// Target value
        #[arg(short, long, allow_negative_numbers = true)]
        target: f64,

        /// TOML configuration file (see `exprgp config`)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Population size (default: 100)
        #[arg(short, long)]
        population: Option<usize>,

        /// Maximum generations (default: 100)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Maximum tree depth (default: 8)
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Random seed (default: 42)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Numbers puzzle: comma-separated values, each usable once
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        numbers: Option<Vec<f64>>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Evolve {
            target,
            config,
            population,
            generations,
            max_depth,
            seed,
            numbers,
            format,
            progress,
        } => cli::evolve::execute(cli::evolve::EvolveArgs {
            target,
            config,
            population,
            generations,
            max_depth,
            seed,
            numbers,
            format,
            progress,
        }),

        Commands::Config => cli::config::execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
