//! Subtree crossover.
//!
//! Both parents are cloned, one node is picked uniformly in each clone, and
//! the two subtrees trade places. The swap moves owned nodes between two
//! independent trees, so the children never share structure with each other
//! or with their parents.

use crate::error::{ConfigError, OperatorWarning};
use crate::gp::genome::Genome;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for crossover operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverConfig {
    /// Probability that a selected parent pair is recombined.
    pub rate: f64,
    /// Swap points tried before giving up on a pair.
    pub max_retries: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            rate: 0.9,
            max_retries: 10,
        }
    }
}

impl CrossoverConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.rate) {
            return Err(ConfigError::Probability {
                name: "crossover.rate",
                value: self.rate,
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries {
                operator: "crossover",
            });
        }
        Ok(())
    }
}

/// Perform subtree crossover, falling back to plain clones of the parents
/// when no swap keeps both children within `max_depth`.
#[must_use]
pub fn crossover<R: Rng>(
    parent_a: &Genome,
    parent_b: &Genome,
    max_depth: usize,
    config: &CrossoverConfig,
    rng: &mut R,
) -> (Genome, Genome) {
    match try_crossover(parent_a, parent_b, max_depth, config, rng) {
        Ok(children) => children,
        Err(warning) => {
            log::debug!("{warning}");
            (parent_a.clone(), parent_b.clone())
        }
    }
}

/// Perform subtree crossover.
///
/// When a swap happens the combined node count is preserved:
/// `size(child_a) + size(child_b) == size(parent_a) + size(parent_b)`.
///
/// # Errors
///
/// Returns [`OperatorWarning::CrossoverRejected`] when every one of the
/// `max_retries` candidate swaps would push a child beyond `max_depth`.
pub fn try_crossover<R: Rng>(
    parent_a: &Genome,
    parent_b: &Genome,
    max_depth: usize,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Result<(Genome, Genome), OperatorWarning> {
    let mut child_a = parent_a.clone();
    let mut child_b = parent_b.clone();

    for _ in 0..config.max_retries {
        let pos_a = child_a.random_position(rng);
        let pos_b = child_b.random_position(rng);

        if swap_fits(&child_a, pos_a, &child_b, pos_b, max_depth) {
            if let (Some(node_a), Some(node_b)) =
                (child_a.subtree_mut(pos_a), child_b.subtree_mut(pos_b))
            {
                std::mem::swap(node_a, node_b);
            }
            return Ok((child_a, child_b));
        }
    }

    Err(OperatorWarning::CrossoverRejected {
        attempts: config.max_retries,
    })
}

/// Whether swapping the subtrees at `pos_a` and `pos_b` keeps both trees
/// within `max_depth`.
fn swap_fits(a: &Genome, pos_a: usize, b: &Genome, pos_b: usize, max_depth: usize) -> bool {
    let (Some(sub_a), Some(sub_b)) = (a.subtree(pos_a), b.subtree(pos_b)) else {
        return false;
    };
    let (Some(depth_a), Some(depth_b)) = (a.depth_at(pos_a), b.depth_at(pos_b)) else {
        return false;
    };
    depth_a + sub_b.depth() <= max_depth && depth_b + sub_a.depth() <= max_depth
}
