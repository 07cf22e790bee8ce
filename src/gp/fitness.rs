//! Fitness evaluation for genetic programming.
//!
//! Fitness measures how close a genome's value lands to the goal:
//! `fitness = 1 / (1 + error)`. It lies in `(0, 1]`, falls monotonically as
//! the error grows, and reaches exactly `1.0` on an exact match.
//!
//! Optional constraints (a literal budget, integer-only values) add a fixed
//! penalty per violation to the error, so a violating genome can never score
//! `1.0` yet its fitness stays positive.

// Averaging over binding rows casts the row count
#![allow(clippy::cast_precision_loss)]

use crate::error::ConfigError;
use crate::gp::constraints::budget_overuse;
use crate::gp::genome::Genome;
use crate::gp::primitives::Protection;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the distance between a value and the target is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMetric {
    /// `|value - target|`.
    #[default]
    Absolute,
    /// `(value - target)^2`.
    Squared,
}

impl ErrorMetric {
    /// Error of a single value against the target. Never infinite.
    #[must_use]
    pub fn error(self, value: f64, target: f64) -> f64 {
        let diff = (value - target).abs();
        let error = match self {
            Self::Absolute => diff,
            Self::Squared => diff * diff,
        };
        if error.is_nan() { f64::MAX } else { error.min(f64::MAX) }
    }
}

/// Configuration for fitness evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Error measure.
    pub metric: ErrorMetric,
    /// Variable binding rows. Empty means a single evaluation without variables;
    /// otherwise the error is averaged over every row.
    pub bindings: Vec<Vec<f64>>,
    /// Constants a genome may use, each entry at most once. `None` lifts the
    /// limit.
    pub literal_budget: Option<Vec<f64>>,
    /// Treat a fractional value under any binding row as a violation.
    pub require_integer: bool,
    /// Error added per violation.
    pub violation_penalty: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            metric: ErrorMetric::Absolute,
            bindings: Vec::new(),
            literal_budget: None,
            require_integer: false,
            violation_penalty: 1e6,
        }
    }
}

impl FitnessConfig {
    pub(crate) fn validate(&self, variables: usize) -> Result<(), ConfigError> {
        if !self.violation_penalty.is_finite() || self.violation_penalty <= 0.0 {
            return Err(ConfigError::ViolationPenalty {
                value: self.violation_penalty,
            });
        }
        let budget = self.literal_budget.as_deref().unwrap_or_default();
        if let Some(&value) = budget.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteLiteral { value });
        }
        for (row, values) in self.bindings.iter().enumerate() {
            if values.len() < variables {
                return Err(ConfigError::BindingArity {
                    row,
                    expected: variables,
                    found: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteBinding { row });
            }
        }
        Ok(())
    }
}

/// Result of a fitness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessResult {
    /// Fitness in `(0, 1]`.
    pub fitness: f64,
    /// Error the fitness was derived from.
    pub error: f64,
    /// Value of the genome under the first binding row (or no bindings).
    pub value: f64,
    /// Constraint violations charged into `error`.
    pub violations: usize,
}

/// Convert an error into a fitness.
#[must_use]
pub fn fitness_from_error(error: f64) -> f64 {
    1.0 / (1.0 + error)
}

/// Fitness of a genome against `target` with the default configuration.
#[must_use]
pub fn fitness(genome: &Genome, target: f64) -> f64 {
    evaluate_fitness(genome, target, &FitnessConfig::default(), &Protection::default()).fitness
}

/// Evaluate a genome against `target`.
#[must_use]
pub fn evaluate_fitness(
    genome: &Genome,
    target: f64,
    config: &FitnessConfig,
    protection: &Protection,
) -> FitnessResult {
    let unbound = [Vec::new()];
    let rows = if config.bindings.is_empty() {
        &unbound[..]
    } else {
        &config.bindings[..]
    };

    let mut value = 0.0;
    let mut total = 0.0;
    let mut fractional = false;
    for (i, row) in rows.iter().enumerate() {
        let v = genome.evaluate_with(row, protection);
        if i == 0 {
            value = v;
        }
        fractional |= v.fract().abs() > 0.0;
        total += config.metric.error(v, target);
    }

    let mut violations = usize::from(config.require_integer && fractional);
    if let Some(budget) = &config.literal_budget {
        violations += budget_overuse(genome, budget);
    }
    let error = (total / rows.len() as f64 + config.violation_penalty * violations as f64)
        .min(f64::MAX);

    FitnessResult {
        fitness: fitness_from_error(error),
        error,
        value,
        violations,
    }
}

/// Evaluate every genome, in parallel when `parallel` is set.
///
/// Evaluation is pure, so both paths return identical results in input order.
#[must_use]
pub fn evaluate_population(
    genomes: &[Genome],
    target: f64,
    config: &FitnessConfig,
    protection: &Protection,
    parallel: bool,
) -> Vec<FitnessResult> {
    if parallel {
        genomes
            .par_iter()
            .map(|genome| evaluate_fitness(genome, target, config, protection))
            .collect()
    } else {
        genomes
            .iter()
            .map(|genome| evaluate_fitness(genome, target, config, protection))
            .collect()
    }
}
