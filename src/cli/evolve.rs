//! CLI command for genetic programming evolution.

#![allow(clippy::needless_pass_by_value)]

use crate::cli::output::format_text;
use crate::cli::{CliError, OutputFormat, config};
use exprgp::{EvolutionConfig, run_with_observer};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Arguments of the evolve command.
#[derive(Debug)]
pub(crate) struct EvolveArgs {
    /// Target value.
    pub(crate) target: f64,
    /// Optional TOML configuration file.
    pub(crate) config: Option<PathBuf>,
    /// Population size override.
    pub(crate) population: Option<usize>,
    /// Generation limit override.
    pub(crate) generations: Option<usize>,
    /// Max tree depth override.
    pub(crate) max_depth: Option<usize>,
    /// Seed override.
    pub(crate) seed: Option<u64>,
    /// Numbers puzzle: the only literals allowed, each at most once.
    pub(crate) numbers: Option<Vec<f64>>,
    /// Output format.
    pub(crate) format: OutputFormat,
    /// Show a progress bar.
    pub(crate) progress: bool,
}

/// Build the run configuration: file (or defaults), then flag overrides.
pub(crate) fn build_config(args: &EvolveArgs) -> Result<EvolutionConfig, CliError> {
    let mut config = match (&args.config, &args.numbers) {
        (Some(path), _) => config::parse(path)?,
        (None, Some(numbers)) => EvolutionConfig::numbers_game(args.target, numbers.clone()),
        (None, None) => EvolutionConfig::default(),
    };
    if let (Some(_), Some(numbers)) = (&args.config, &args.numbers) {
        apply_numbers(&mut config, numbers);
    }

    config.target = args.target;
    if let Some(population) = args.population {
        config.population_size = population;
    }
    if let Some(generations) = args.generations {
        config.max_generations = generations;
    }
    if let Some(max_depth) = args.max_depth {
        config.tree.max_depth = max_depth;
        config.tree.initial_depth = config.tree.initial_depth.min(max_depth);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// Restrict a file configuration to the numbers puzzle.
fn apply_numbers(config: &mut EvolutionConfig, numbers: &[f64]) {
    let game = EvolutionConfig::numbers_game(config.target, numbers.to_vec());
    config.tree.primitives.terminals = game.tree.primitives.terminals;
    config.fitness.literal_budget = game.fitness.literal_budget;
    config.fitness.require_integer = true;
    if config.mutation.extend_rate <= 0.0 {
        config.mutation.extend_rate = game.mutation.extend_rate;
    }
}

/// Execute the evolve command.
pub(crate) fn execute(args: EvolveArgs) -> Result<(), CliError> {
    let config = build_config(&args)?;

    let progress = if args.progress {
        let pb = ProgressBar::new(bar_position(config.max_generations));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}")
                .map_err(|e| CliError::new(e.to_string()))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let result = run_with_observer(&config, |stats| {
        if let Some(pb) = &progress {
            pb.set_position(bar_position(stats.generation));
            pb.set_message(format!("best={:.6}", stats.best_of_run));
        }
    })?;

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    match args.format {
        OutputFormat::Text => print!("{}", format_text(&result, config.target)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

/// Progress bar position after `generation` has been evaluated.
fn bar_position(generation: usize) -> u64 {
    u64::try_from(generation).unwrap_or(u64::MAX).saturating_add(1)
}
