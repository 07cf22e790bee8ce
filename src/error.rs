//! Error types for the evolution engine.
//!
//! Evaluation is total, so the taxonomy is narrow: configuration problems are
//! reported once before a run starts, and operator warnings are recorded but
//! never propagated out of a run.

use thiserror::Error;

/// Inconsistent configuration, detected before generation 0 is created.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The population must hold at least one individual.
    #[error("population size must be at least 1")]
    EmptyPopulation,

    /// Maximum tree depth outside the supported range.
    #[error("max tree depth must be between 1 and {limit}, got {value}")]
    MaxDepth {
        /// Configured depth.
        value: usize,
        /// Largest supported depth.
        limit: usize,
    },

    /// Initial tree depth larger than the maximum tree depth.
    #[error("initial tree depth {initial} exceeds max tree depth {max}")]
    InitialDepth {
        /// Configured initial depth.
        initial: usize,
        /// Configured maximum depth.
        max: usize,
    },

    /// A probability outside `[0, 1]` (or NaN).
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability {
        /// Name of the offending setting.
        name: &'static str,
        /// Configured value.
        value: f64,
    },

    /// Tournaments need at least one contestant.
    #[error("tournament size must be at least 1")]
    TournamentSize,

    /// No operator kinds to build branches from.
    #[error("operator set is empty")]
    NoOperators,

    /// No terminal kinds to build leaves from.
    #[error("terminal set is empty: configure a constant range, literals or variables")]
    NoTerminals,

    /// Constant range bounds are non-finite or reversed.
    #[error("invalid constant range [{min}, {max}]")]
    ConstantRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Integer constants were requested from a range holding no integer.
    #[error("constant range [{min}, {max}] contains no integer")]
    NoIntegerInRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A literal terminal is NaN or infinite.
    #[error("literal terminal {value} is not finite")]
    NonFiniteLiteral {
        /// Offending literal.
        value: f64,
    },

    /// The stopping threshold is negative or non-finite.
    #[error("fitness threshold must be finite and non-negative, got {value}")]
    Threshold {
        /// Configured epsilon.
        value: f64,
    },

    /// The goal value is NaN or infinite.
    #[error("target must be finite, got {value}")]
    Target {
        /// Configured target.
        value: f64,
    },

    /// Elites would leave no room for offspring.
    #[error("elite count {elite} must be smaller than population size {population}")]
    EliteCount {
        /// Configured elite count.
        elite: usize,
        /// Configured population size.
        population: usize,
    },

    /// An operator was given no attempts at all.
    #[error("{operator} retries must be at least 1")]
    ZeroRetries {
        /// Operator name.
        operator: &'static str,
    },

    /// A variable binding row is shorter than the number of variables.
    #[error("binding row {row} has {found} values, expected at least {expected}")]
    BindingArity {
        /// Row index.
        row: usize,
        /// Number of configured variables.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// A variable binding is NaN or infinite.
    #[error("binding row {row} contains a non-finite value")]
    NonFiniteBinding {
        /// Row index.
        row: usize,
    },

    /// A numeric protection constant is unusable.
    #[error("protection setting {name} is invalid: {value}")]
    Protection {
        /// Name of the offending setting.
        name: &'static str,
        /// Configured value.
        value: f64,
    },

    /// The penalty charged per constraint violation is unusable.
    #[error("violation penalty must be finite and positive, got {value}")]
    ViolationPenalty {
        /// Configured value.
        value: f64,
    },
}

/// A genetic operator could not find a valid point within its retry budget.
///
/// The operator returns its unmodified clone(s) and the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OperatorWarning {
    /// Every candidate swap would have exceeded the depth limit.
    #[error("crossover found no depth-preserving swap after {attempts} attempts")]
    CrossoverRejected {
        /// Attempts made.
        attempts: usize,
    },
    /// Every candidate position already sat beyond the depth limit.
    #[error("mutation found no position within the depth limit after {attempts} attempts")]
    MutationRejected {
        /// Attempts made.
        attempts: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Probability {
            name: "crossover.rate",
            value: 1.5,
        };
        let message = err.to_string();
        assert!(message.contains("crossover.rate"));
        assert!(message.contains("1.5"));
    }

    #[test]
    fn test_operator_warning_display() {
        let warning = OperatorWarning::CrossoverRejected { attempts: 10 };
        assert!(warning.to_string().contains("10 attempts"));
    }
}
