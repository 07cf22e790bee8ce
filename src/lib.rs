// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! exprgp: a genetic-programming engine that evolves arithmetic expressions
//! toward a numeric goal.
//!
//! This crate provides:
//! - Expression trees with protected, always-finite evaluation
//! - Tournament and roulette selection with elitism
//! - Depth-bounded subtree crossover, subtree mutation and point mutation
//! - A seeded, reproducible generational loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        Caller (CLI / library)       │
//! ├─────────────────────────────────────┤
//! │         Evolution Driver            │
//! ├─────────────────────────────────────┤
//! │    Operators, Selection, Fitness    │
//! ├─────────────────────────────────────┤
//! │    Expression Trees                 │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod gp;

pub use error::{ConfigError, OperatorWarning};

// Re-export the entry points at crate root for convenience
pub use gp::{EvolutionConfig, GenerationStats, Genome, RunResult, run, run_with_observer};
