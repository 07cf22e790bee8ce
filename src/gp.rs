//! Genetic programming over arithmetic expression trees.
//!
//! This module provides a complete evolutionary framework for discovering
//! expressions whose value approximates a numeric target. Candidates are
//! binary expression trees built from operators and terminals.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │   Population / Fitness Evaluation   │
//! ├─────────────────────────────────────┤
//! │   Genome (expression tree)          │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use exprgp::gp::{EvolutionConfig, run};
//!
//! let config = EvolutionConfig::for_target(42.0);
//! let result = run(&config)?;
//! println!("{} = {}", result.best_genome, result.best_value);
//! # Ok::<(), exprgp::ConfigError>(())
//! ```

mod constraints;
mod crossover;
mod evolution;
mod fitness;
mod genome;
mod mutation;
mod population;
mod primitives;
mod selection;

pub use constraints::{budget_overuse, extend_toward_target, unused_literals};
pub use crossover::{CrossoverConfig, crossover, try_crossover};
pub use evolution::{
    EvolutionConfig, GenerationStats, InitMethod, MAX_TREE_DEPTH, RunResult, TreeConfig, run,
    run_with_observer,
};
pub use fitness::{
    ErrorMetric, FitnessConfig, FitnessResult, evaluate_fitness, evaluate_population, fitness,
    fitness_from_error,
};
pub use genome::{Genome, Node, Terminal};
pub use mutation::{MutationConfig, mutate, mutate_in_place, point_mutate, try_mutate};
pub use population::{FitnessStats, Individual, Population};
pub use primitives::{BinaryOp, ConstantRange, PrimitiveSet, Protection, TerminalSet};
pub use selection::{
    SelectionConfig, SelectionMethod, roulette_select, select, select_elite, tournament_select,
};
