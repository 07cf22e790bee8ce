//! Selection operators for genetic programming.
//!
//! Selection determines which individuals reproduce based on fitness.
//! Tournament selection is the default; fitness-proportional selection is
//! well-defined too because every fitness is strictly positive.

use crate::error::ConfigError;
use crate::gp::genome::Genome;
use crate::gp::population::Individual;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parent selection scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Best of `tournament_size` uniform draws.
    #[default]
    Tournament,
    /// Probability proportional to fitness.
    Roulette,
}

/// Configuration for selection operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Selection scheme.
    pub method: SelectionMethod,
    /// Number of individuals competing in each tournament.
    pub tournament_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            method: SelectionMethod::Tournament,
            tournament_size: 5,
        }
    }
}

impl SelectionConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.tournament_size == 0 {
            return Err(ConfigError::TournamentSize);
        }
        Ok(())
    }
}

/// Select one parent and return a clone of its genome.
///
/// # Panics
///
/// Panics if `population` is empty.
#[must_use]
pub fn select<R: Rng>(population: &[Individual], config: &SelectionConfig, rng: &mut R) -> Genome {
    let idx = match config.method {
        SelectionMethod::Tournament => tournament_index(population, config.tournament_size, rng),
        SelectionMethod::Roulette => roulette_index(population, rng),
    };
    population[idx].genome.clone()
}

/// Tournament selection: `k` uniform draws with replacement, the fittest wins.
///
/// Ties go to the contestant drawn first.
///
/// # Panics
///
/// Panics if `population` is empty.
#[must_use]
pub fn tournament_select<R: Rng>(population: &[Individual], k: usize, rng: &mut R) -> Genome {
    population[tournament_index(population, k, rng)].genome.clone()
}

/// Fitness-proportional selection.
///
/// # Panics
///
/// Panics if `population` is empty.
#[must_use]
pub fn roulette_select<R: Rng>(population: &[Individual], rng: &mut R) -> Genome {
    population[roulette_index(population, rng)].genome.clone()
}

/// Indices of the `count` fittest individuals, fittest first.
///
/// Equal fitness keeps population order.
#[must_use]
pub fn select_elite(population: &[Individual], count: usize) -> Vec<usize> {
    let mut indexed: Vec<(usize, f64)> = population
        .iter()
        .map(|i| i.fitness)
        .enumerate()
        .collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.into_iter().take(count).map(|(i, _)| i).collect()
}

fn tournament_index<R: Rng>(population: &[Individual], k: usize, rng: &mut R) -> usize {
    let pop_size = population.len();
    let mut best_idx = rng.gen_range(0..pop_size);
    let mut best_fitness = population[best_idx].fitness;

    for _ in 1..k.max(1) {
        let idx = rng.gen_range(0..pop_size);
        if population[idx].fitness > best_fitness {
            best_idx = idx;
            best_fitness = population[idx].fitness;
        }
    }

    best_idx
}

fn roulette_index<R: Rng>(population: &[Individual], rng: &mut R) -> usize {
    let total: f64 = population.iter().map(|i| i.fitness).sum();
    if !(total.is_finite() && total > 0.0) {
        return rng.gen_range(0..population.len());
    }

    let mut spin = rng.gen_range(0.0..total);
    for (idx, individual) in population.iter().enumerate() {
        if spin < individual.fitness {
            return idx;
        }
        spin -= individual.fitness;
    }
    population.len() - 1
}

#[cfg(test)]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;
    use crate::gp::genome::Node;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn population(fitness: &[f64]) -> Vec<Individual> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| Individual {
                genome: Genome::new(Node::constant(i as f64)),
                fitness: f,
                value: i as f64,
            })
            .collect()
    }

    fn picked(genome: &Genome) -> usize {
        genome.evaluate(&[]) as usize
    }

    #[test]
    fn test_tournament_selection_prefers_fitter() {
        let mut rng = SmallRng::seed_from_u64(42);
        let population = population(&[0.1, 0.5, 0.9, 0.2, 0.8]);

        let mut counts = [0usize; 5];
        for _ in 0..1000 {
            counts[picked(&tournament_select(&population, 3, &mut rng))] += 1;
        }

        let max_idx = counts.iter().enumerate().max_by_key(|(_, c)| *c).unwrap().0;
        assert_eq!(max_idx, 2);
    }

    #[test]
    fn test_tournament_size_one_is_uniform() {
        let mut rng = SmallRng::seed_from_u64(7);
        let population = population(&[0.1, 0.9]);

        let mut counts = [0usize; 2];
        for _ in 0..2000 {
            counts[picked(&tournament_select(&population, 1, &mut rng))] += 1;
        }
        assert!(counts[0] > 800 && counts[1] > 800);
    }

    #[test]
    fn test_tournament_tie_goes_to_first_drawn() {
        let mut rng = SmallRng::seed_from_u64(99);
        let population = population(&[0.5; 6]);

        for _ in 0..100 {
            let mut replay = rng.clone();
            let first = replay.gen_range(0..population.len());
            let winner = picked(&tournament_select(&population, 4, &mut rng));
            assert_eq!(winner, first);
        }
    }

    #[test]
    fn test_tournament_returns_clone() {
        let mut rng = SmallRng::seed_from_u64(1);
        let population = population(&[0.5]);
        let mut genome = tournament_select(&population, 4, &mut rng);
        genome.root = Node::constant(99.0);
        assert_eq!(population[0].genome.root, Node::constant(0.0));
    }

    #[test]
    fn test_roulette_prefers_fitter() {
        let mut rng = SmallRng::seed_from_u64(5);
        let population = population(&[0.05, 0.9, 0.05]);

        let mut counts = [0usize; 3];
        for _ in 0..1000 {
            counts[picked(&roulette_select(&population, &mut rng))] += 1;
        }
        assert!(counts[1] > counts[0] + counts[2]);
    }

    #[test]
    fn test_elite_selection() {
        let population = population(&[0.3, 0.9, 0.1, 0.8, 0.5]);
        let elite = select_elite(&population, 2);
        assert_eq!(elite, vec![1, 3]);
    }

    #[test]
    fn test_elite_ties_keep_order() {
        let population = population(&[0.7, 0.7, 0.7]);
        assert_eq!(select_elite(&population, 2), vec![0, 1]);
    }
}
