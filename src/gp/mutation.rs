//! Mutation operators for genetic programming.
//!
//! Subtree mutation replaces a random subtree with a freshly grown one whose
//! depth budget is whatever room is left below the chosen position. Point
//! mutation keeps the shape and changes a single node.

use crate::error::{ConfigError, OperatorWarning};
use crate::gp::genome::{Genome, Node};
use crate::gp::primitives::PrimitiveSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability of subtree mutation per offspring.
    pub rate: f64,
    /// Probability of point mutation per offspring.
    pub point_rate: f64,
    /// Probability of growing an offspring one level toward the target with
    /// an unused literal. Off by default.
    pub extend_rate: f64,
    /// Positions tried before giving up.
    pub max_retries: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 0.1,
            point_rate: 0.05,
            extend_rate: 0.0,
            max_retries: 10,
        }
    }
}

impl MutationConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.rate) {
            return Err(ConfigError::Probability {
                name: "mutation.rate",
                value: self.rate,
            });
        }
        if !(0.0..=1.0).contains(&self.point_rate) {
            return Err(ConfigError::Probability {
                name: "mutation.point_rate",
                value: self.point_rate,
            });
        }
        if !(0.0..=1.0).contains(&self.extend_rate) {
            return Err(ConfigError::Probability {
                name: "mutation.extend_rate",
                value: self.extend_rate,
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries {
                operator: "mutation",
            });
        }
        Ok(())
    }
}

/// Subtree mutation on a clone; the clone is returned unchanged when no
/// position within `max_depth` turns up.
#[must_use]
pub fn mutate<R: Rng>(
    genome: &Genome,
    max_depth: usize,
    primitives: &PrimitiveSet,
    config: &MutationConfig,
    rng: &mut R,
) -> Genome {
    let mut child = genome.clone();
    if let Err(warning) = mutate_in_place(&mut child, max_depth, primitives, config, rng) {
        log::debug!("{warning}");
    }
    child
}

/// Subtree mutation on a clone.
///
/// # Errors
///
/// Returns [`OperatorWarning::MutationRejected`] when every tried position
/// already lies deeper than `max_depth`.
pub fn try_mutate<R: Rng>(
    genome: &Genome,
    max_depth: usize,
    primitives: &PrimitiveSet,
    config: &MutationConfig,
    rng: &mut R,
) -> Result<Genome, OperatorWarning> {
    let mut child = genome.clone();
    mutate_in_place(&mut child, max_depth, primitives, config, rng)?;
    Ok(child)
}

/// Subtree mutation in place. The genome is untouched on error.
///
/// # Errors
///
/// Returns [`OperatorWarning::MutationRejected`] when every tried position
/// already lies deeper than `max_depth`.
pub fn mutate_in_place<R: Rng>(
    genome: &mut Genome,
    max_depth: usize,
    primitives: &PrimitiveSet,
    config: &MutationConfig,
    rng: &mut R,
) -> Result<(), OperatorWarning> {
    for _ in 0..config.max_retries {
        let pos = genome.random_position(rng);
        let Some(depth) = genome.depth_at(pos) else {
            continue;
        };
        if depth > max_depth {
            continue;
        }

        let replacement = Node::grow(rng, max_depth - depth, primitives);
        if let Some(node) = genome.subtree_mut(pos) {
            *node = replacement;
        }
        return Ok(());
    }

    Err(OperatorWarning::MutationRejected {
        attempts: config.max_retries,
    })
}

/// Point mutation: an operator switches to a different kind, a terminal is
/// redrawn. Shape and depth are unchanged.
pub fn point_mutate<R: Rng>(genome: &mut Genome, primitives: &PrimitiveSet, rng: &mut R) {
    let pos = genome.random_position(rng);
    match genome.subtree_mut(pos) {
        Some(Node::Terminal(terminal)) => *terminal = primitives.terminals.random(rng),
        Some(Node::Operator { op, .. }) => *op = primitives.other_operator(*op, rng),
        None => {}
    }
}
