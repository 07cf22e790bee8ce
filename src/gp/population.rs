//! Populations of scored genomes.

// Statistics divide by the population size
#![allow(clippy::cast_precision_loss)]

use crate::gp::fitness::{FitnessConfig, evaluate_population};
use crate::gp::genome::Genome;
use crate::gp::primitives::Protection;
use serde::{Deserialize, Serialize};

/// A genome together with its evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// The expression.
    pub genome: Genome,
    /// Fitness in `(0, 1]`.
    pub fitness: f64,
    /// Evaluated value of the expression.
    pub value: f64,
}

/// An ordered, evaluated generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Score every genome and collect the results in input order.
    #[must_use]
    pub fn evaluate(
        genomes: Vec<Genome>,
        target: f64,
        config: &FitnessConfig,
        protection: &Protection,
        parallel: bool,
    ) -> Self {
        let results = evaluate_population(&genomes, target, config, protection, parallel);
        let individuals = genomes
            .into_iter()
            .zip(results)
            .map(|(genome, result)| Individual {
                genome,
                fitness: result.fitness,
                value: result.value,
            })
            .collect();
        Self { individuals }
    }

    /// Build a population from already scored individuals.
    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Number of individuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Individuals in their current order.
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Fitness values in population order.
    #[must_use]
    pub fn fitness(&self) -> Vec<f64> {
        self.individuals.iter().map(|i| i.fitness).collect()
    }

    /// Fittest individual; ties go to the earliest.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best_index().map(|idx| &self.individuals[idx])
    }

    /// Index of the fittest individual; ties go to the earliest.
    #[must_use]
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, individual) in self.individuals.iter().enumerate() {
            match best {
                Some((_, fit)) if individual.fitness <= fit => {}
                _ => best = Some((idx, individual.fitness)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Sort from fittest to least fit. The sort is stable.
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    /// Summary statistics of the current fitness values.
    #[must_use]
    pub fn stats(&self) -> FitnessStats {
        FitnessStats::from_fitness(&self.fitness())
    }

    /// Give up the individuals.
    #[must_use]
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }
}

/// Summary statistics of a set of fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Best fitness.
    pub best_fitness: f64,
    /// Worst fitness.
    pub worst_fitness: f64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl FitnessStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                fitness_std: 0.0,
            };
        }

        let sum: f64 = fitness.iter().sum();
        let mean = sum / fitness.len() as f64;

        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);

        let variance: f64 = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>()
            / fitness.len() as f64;

        Self {
            mean_fitness: mean,
            best_fitness: best,
            worst_fitness: worst,
            fitness_std: variance.sqrt(),
        }
    }
}
