//! Main evolution loop for genetic programming.
//!
//! This module orchestrates the evolutionary process: initialization,
//! fitness evaluation, selection, crossover and mutation, until the
//! generation limit is hit or a genome lands close enough to the target.

use crate::error::ConfigError;
use crate::gp::constraints::{extend_toward_target, unused_literals};
use crate::gp::crossover::{CrossoverConfig, try_crossover};
use crate::gp::fitness::FitnessConfig;
use crate::gp::genome::Genome;
use crate::gp::mutation::{MutationConfig, mutate_in_place, point_mutate};
use crate::gp::population::{Individual, Population};
use crate::gp::primitives::{PrimitiveSet, Protection, TerminalSet};
use crate::gp::selection::{SelectionConfig, select, select_elite};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Deepest tree the engine accepts. Evaluation and generation recurse once
/// per level.
pub const MAX_TREE_DEPTH: usize = 64;

/// How generation zero is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitMethod {
    /// Grow every tree up to the initial depth.
    Grow,
    /// Build every tree to exactly the initial depth.
    Full,
    /// Alternate grow and full over depths `1..=initial_depth`.
    #[default]
    RampedHalfAndHalf,
}

/// Tree shape and primitive configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Depth limit enforced by every operator.
    pub max_depth: usize,
    /// Depth used to build generation zero.
    pub initial_depth: usize,
    /// Initialization method.
    pub init: InitMethod,
    /// Operators and terminals.
    pub primitives: PrimitiveSet,
    /// Numeric protection applied during evaluation.
    pub protection: Protection,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            initial_depth: 4,
            init: InitMethod::default(),
            primitives: PrimitiveSet::default(),
            protection: Protection::default(),
        }
    }
}

impl TreeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TREE_DEPTH).contains(&self.max_depth) {
            return Err(ConfigError::MaxDepth {
                value: self.max_depth,
                limit: MAX_TREE_DEPTH,
            });
        }
        if self.initial_depth > self.max_depth {
            return Err(ConfigError::InitialDepth {
                initial: self.initial_depth,
                max: self.max_depth,
            });
        }
        self.primitives.validate()?;
        self.protection.validate()?;
        let limit = self.protection.value_limit;
        let out_of_limit = self
            .primitives
            .terminals
            .constants
            .filter(|range| !range.within(limit));
        if let Some(range) = out_of_limit {
            return Err(ConfigError::ConstantRange {
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }
}

/// Configuration for the evolution process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Value the expressions should evaluate to.
    pub target: f64,
    /// Population size.
    pub population_size: usize,
    /// Number of breeding steps before giving up.
    pub max_generations: usize,
    /// Stop once the best fitness reaches `1 - fitness_threshold`.
    pub fitness_threshold: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Evaluate fitness on the rayon thread pool.
    pub parallel: bool,
    /// Log progress every N generations (0 disables).
    pub log_interval: usize,
    /// Tree configuration.
    pub tree: TreeConfig,
    /// Selection configuration.
    pub selection: SelectionConfig,
    /// Crossover configuration.
    pub crossover: CrossoverConfig,
    /// Mutation configuration.
    pub mutation: MutationConfig,
    /// Fitness evaluation configuration.
    pub fitness: FitnessConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            target: 42.0,
            population_size: 100,
            max_generations: 100,
            fitness_threshold: 1e-9,
            seed: 42,
            elite_count: 1,
            parallel: true,
            log_interval: 10,
            tree: TreeConfig::default(),
            selection: SelectionConfig::default(),
            crossover: CrossoverConfig::default(),
            mutation: MutationConfig::default(),
            fitness: FitnessConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Default configuration aimed at `target`.
    #[must_use]
    pub fn for_target(target: f64) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Configuration for the classic numbers puzzle: reach `target` using
    /// only `numbers`, each at most once, with an integer result.
    ///
    /// Violations are charged as fitness penalties rather than forbidden, so
    /// the search can pass through invalid expressions on its way to a valid
    /// one. Extension mutation is switched on to append unused numbers.
    #[must_use]
    pub fn numbers_game(target: f64, numbers: Vec<f64>) -> Self {
        let mut config = Self::for_target(target);
        config.tree.initial_depth = 2;
        config.tree.primitives.terminals = TerminalSet::literals(numbers.clone());
        config.fitness.literal_budget = Some(numbers);
        config.fitness.require_integer = true;
        config.mutation.extend_rate = 0.1;
        config
    }

    /// Check every setting.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target.is_finite() {
            return Err(ConfigError::Target { value: self.target });
        }
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(self.fitness_threshold.is_finite() && self.fitness_threshold >= 0.0) {
            return Err(ConfigError::Threshold {
                value: self.fitness_threshold,
            });
        }
        if self.elite_count >= self.population_size {
            return Err(ConfigError::EliteCount {
                elite: self.elite_count,
                population: self.population_size,
            });
        }
        self.tree.validate()?;
        self.selection.validate()?;
        self.crossover.validate()?;
        self.mutation.validate()?;
        self.fitness.validate(self.tree.primitives.terminals.variables)
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number.
    pub generation: usize,
    /// Best fitness in this generation.
    pub best_fitness: f64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Fitness standard deviation.
    pub fitness_std: f64,
    /// Best fitness seen so far in the run.
    pub best_of_run: f64,
}

/// Outcome of an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Fittest genome seen during the run.
    pub best_genome: Genome,
    /// Its fitness.
    pub best_fitness: f64,
    /// Its evaluated value.
    pub best_value: f64,
    /// Generation in which it first appeared.
    pub generation_found: usize,
    /// Breeding steps performed.
    pub generations_run: usize,
    /// Statistics per evaluated generation.
    pub history: Vec<GenerationStats>,
    /// Crossover or mutation applications that found no valid point.
    pub degenerate_operations: usize,
}

/// Run the evolution process.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn run(config: &EvolutionConfig) -> Result<RunResult, ConfigError> {
    run_with_observer(config, |_| {})
}

/// Run the evolution process, reporting every evaluated generation to
/// `observer`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid. Nothing fails once the
/// first generation exists.
pub fn run_with_observer<F>(
    config: &EvolutionConfig,
    mut observer: F,
) -> Result<RunResult, ConfigError>
where
    F: FnMut(&GenerationStats),
{
    config.validate()?;
    let start_time = std::time::Instant::now();

    log::info!(
        "Evolving toward {} with {} individuals for up to {} generations (seed {})",
        config.target,
        config.population_size,
        config.max_generations,
        config.seed
    );

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut genomes = initial_population(config, &mut rng);

    let mut best: Option<Individual> = None;
    let mut generation_found = 0;
    let mut history = Vec::new();
    let mut degenerate_operations = 0;

    let mut generation = 0usize;
    loop {
        let population = Population::evaluate(
            genomes,
            config.target,
            &config.fitness,
            &config.tree.protection,
            config.parallel,
        );

        let improved = population
            .best()
            .filter(|candidate| best.as_ref().is_none_or(|b| candidate.fitness > b.fitness));
        if let Some(candidate) = improved {
            best = Some(candidate.clone());
            generation_found = generation;
        }
        let best_of_run = best.as_ref().map_or(0.0, |b| b.fitness);

        let stats = population.stats();
        let gen_stats = GenerationStats {
            generation,
            best_fitness: stats.best_fitness,
            mean_fitness: stats.mean_fitness,
            fitness_std: stats.fitness_std,
            best_of_run,
        };
        history.push(gen_stats);
        observer(&gen_stats);

        if config.log_interval > 0 && generation.is_multiple_of(config.log_interval) {
            log::info!(
                "Gen {:>5}: best={:.6} mean={:.6} std={:.6} run_best={:.6} ({:.2}s)",
                generation,
                stats.best_fitness,
                stats.mean_fitness,
                stats.fitness_std,
                best_of_run,
                start_time.elapsed().as_secs_f64()
            );
        }

        if generation >= config.max_generations || best_of_run >= 1.0 - config.fitness_threshold {
            break;
        }

        genomes = breed(&population, config, &mut rng, &mut degenerate_operations);
        generation += 1;
    }

    // Validation guarantees at least one individual per generation.
    let best = best.ok_or(ConfigError::EmptyPopulation)?;

    log::info!(
        "Finished after {} generations in {:.2}s: best={:.6} value={} found in generation {}",
        generation,
        start_time.elapsed().as_secs_f64(),
        best.fitness,
        best.value,
        generation_found
    );

    Ok(RunResult {
        best_genome: best.genome,
        best_fitness: best.fitness,
        best_value: best.value,
        generation_found,
        generations_run: generation,
        history,
        degenerate_operations,
    })
}

/// Build generation zero.
fn initial_population<R: Rng>(config: &EvolutionConfig, rng: &mut R) -> Vec<Genome> {
    let tree = &config.tree;
    let depth = tree.initial_depth;

    (0..config.population_size)
        .map(|i| match tree.init {
            InitMethod::Grow => Genome::random(rng, depth, &tree.primitives),
            InitMethod::Full => Genome::random_full(rng, depth, &tree.primitives),
            InitMethod::RampedHalfAndHalf => {
                let ramp = if depth == 0 { 0 } else { 1 + (i / 2) % depth };
                if i % 2 == 0 {
                    Genome::random_full(rng, ramp, &tree.primitives)
                } else {
                    Genome::random(rng, ramp, &tree.primitives)
                }
            }
        })
        .collect()
}

/// Produce the next generation: elites in the leading slots, the rest bred
/// from selected parent pairs.
fn breed<R: Rng>(
    population: &Population,
    config: &EvolutionConfig,
    rng: &mut R,
    degenerate: &mut usize,
) -> Vec<Genome> {
    let individuals = population.individuals();
    let size = config.population_size;
    let mut next = Vec::with_capacity(size + 1);

    for idx in select_elite(individuals, config.elite_count) {
        next.push(individuals[idx].genome.clone());
    }

    while next.len() < size {
        let parent_a = select(individuals, &config.selection, rng);
        let parent_b = select(individuals, &config.selection, rng);

        let (mut child_a, mut child_b) = if rng.gen_bool(config.crossover.rate) {
            match try_crossover(
                &parent_a,
                &parent_b,
                config.tree.max_depth,
                &config.crossover,
                rng,
            ) {
                Ok(children) => children,
                Err(warning) => {
                    log::debug!("{warning}");
                    *degenerate += 1;
                    (parent_a, parent_b)
                }
            }
        } else {
            (parent_a, parent_b)
        };

        vary(&mut child_a, config, rng, degenerate);
        vary(&mut child_b, config, rng, degenerate);
        next.push(child_a);
        next.push(child_b);
    }

    next.truncate(size);
    next
}

/// Apply subtree, point and extension mutation to one offspring.
fn vary<R: Rng>(
    child: &mut Genome,
    config: &EvolutionConfig,
    rng: &mut R,
    degenerate: &mut usize,
) {
    let tree = &config.tree;
    if rng.gen_bool(config.mutation.rate) {
        let outcome =
            mutate_in_place(child, tree.max_depth, &tree.primitives, &config.mutation, rng);
        if let Err(warning) = outcome {
            log::debug!("{warning}");
            *degenerate += 1;
        }
    }
    if rng.gen_bool(config.mutation.point_rate) {
        point_mutate(child, &tree.primitives, rng);
    }
    if config.mutation.extend_rate > 0.0 && rng.gen_bool(config.mutation.extend_rate) {
        extend(child, config, rng);
    }
}

/// Grow an offspring toward the target with a literal it may still use.
fn extend<R: Rng>(child: &mut Genome, config: &EvolutionConfig, rng: &mut R) {
    let tree = &config.tree;
    let candidates = match &config.fitness.literal_budget {
        Some(budget) => unused_literals(child, budget),
        None => tree.primitives.terminals.literals.clone(),
    };
    let row = config.fitness.bindings.first().map_or(&[][..], Vec::as_slice);
    let value = child.evaluate_with(row, &tree.protection);
    if !extend_toward_target(child, value, config.target, &candidates, tree.max_depth, rng) {
        log::trace!("no room to extend {child}");
    }
}
