//! Primitive sets: the operators and terminals trees are built from.
//!
//! The operator set is a closed enumeration chosen by configuration. Terminals
//! come from up to three sources: a constant range, a pool of literal values,
//! and a number of variable slots.

use crate::error::ConfigError;
use crate::gp::genome::Terminal;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Binary operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division (protected: near-zero denominators yield the fallback).
    Div,
    /// Minimum of both operands.
    Min,
    /// Maximum of both operands.
    Max,
}

impl BinaryOp {
    /// Every operator kind.
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Min,
        Self::Max,
    ];

    /// The four arithmetic operators.
    pub const ARITHMETIC: [Self; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    /// Apply the operator. The result may still need sanitizing.
    #[must_use]
    pub fn apply(self, a: f64, b: f64, protection: &Protection) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => protection.divide(a, b),
            Self::Min => a.min(b),
            Self::Max => a.max(b),
        }
    }

    /// Infix symbol, or function name for `Min`/`Max`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Whether the operator renders as `(a op b)` rather than `op(a, b)`.
    #[must_use]
    pub fn is_infix(self) -> bool {
        !matches!(self, Self::Min | Self::Max)
    }
}

/// Constants that keep evaluation total and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Protection {
    /// Denominators with a magnitude below this are treated as zero.
    pub division_epsilon: f64,
    /// Result of a protected division by (near) zero.
    pub division_fallback: f64,
    /// Every intermediate value is clamped to `[-value_limit, value_limit]`.
    pub value_limit: f64,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            division_epsilon: 1e-9,
            division_fallback: 1.0,
            value_limit: 1e12,
        }
    }
}

impl Protection {
    /// Protected division.
    #[must_use]
    pub fn divide(&self, a: f64, b: f64) -> f64 {
        if b.abs() < self.division_epsilon || b.is_nan() {
            self.division_fallback
        } else {
            a / b
        }
    }

    /// Replace NaN with zero and clamp everything else into the value limit.
    ///
    /// Uses `max`/`min` rather than `clamp` so a malformed limit never panics.
    #[must_use]
    pub fn sanitize(&self, value: f64) -> f64 {
        if value.is_nan() {
            0.0
        } else {
            value.max(-self.value_limit).min(self.value_limit)
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.value_limit.is_finite() || self.value_limit <= 0.0 {
            return Err(ConfigError::Protection {
                name: "value_limit",
                value: self.value_limit,
            });
        }
        if !self.division_epsilon.is_finite() || self.division_epsilon < 0.0 {
            return Err(ConfigError::Protection {
                name: "division_epsilon",
                value: self.division_epsilon,
            });
        }
        if !self.division_fallback.is_finite() || self.division_fallback.abs() > self.value_limit {
            return Err(ConfigError::Protection {
                name: "division_fallback",
                value: self.division_fallback,
            });
        }
        Ok(())
    }
}

/// Closed interval random constants are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl ConstantRange {
    /// Create a new range.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw a constant, rounded to an integer when `integer` is set.
    pub fn sample<R: Rng>(&self, rng: &mut R, integer: bool) -> f64 {
        let (low, high) = if integer {
            (self.min.ceil(), self.max.floor())
        } else {
            (self.min, self.max)
        };
        if low.is_nan() || high.is_nan() || low >= high {
            return low;
        }
        let value = rng.gen_range(low..=high);
        // `+ 0.0` folds negative zero into zero.
        if integer { value.round() + 0.0 } else { value }
    }

    /// Whether both bounds lie within `[-limit, limit]`.
    #[must_use]
    pub fn within(&self, limit: f64) -> bool {
        self.min.abs() <= limit && self.max.abs() <= limit
    }

    fn validate(&self, integer: bool) -> Result<(), ConfigError> {
        // A finite width keeps uniform sampling well-defined.
        if !(self.max - self.min).is_finite() || self.min > self.max {
            return Err(ConfigError::ConstantRange {
                min: self.min,
                max: self.max,
            });
        }
        if integer && self.min.ceil() > self.max.floor() {
            return Err(ConfigError::NoIntegerInRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Where leaf values come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSet {
    /// Range for freshly drawn constants, if any.
    pub constants: Option<ConstantRange>,
    /// Round drawn constants to integers.
    pub integer_constants: bool,
    /// Fixed pool of literal values.
    pub literals: Vec<f64>,
    /// Number of variable slots (`x0`, `x1`, ...).
    pub variables: usize,
}

impl Default for TerminalSet {
    fn default() -> Self {
        Self {
            constants: Some(ConstantRange::new(-10.0, 10.0)),
            integer_constants: true,
            literals: Vec::new(),
            variables: 0,
        }
    }
}

impl TerminalSet {
    /// Terminals drawn only from the given literal pool.
    #[must_use]
    pub fn literals(values: Vec<f64>) -> Self {
        Self {
            constants: None,
            integer_constants: false,
            literals: values,
            variables: 0,
        }
    }

    /// Number of non-empty terminal sources.
    fn source_count(&self) -> usize {
        usize::from(self.constants.is_some())
            + usize::from(!self.literals.is_empty())
            + usize::from(self.variables > 0)
    }

    /// Draw a random terminal.
    ///
    /// A source is picked uniformly among the non-empty ones, then a value
    /// within it. An empty set yields the constant zero.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Terminal {
        let sources = self.source_count();
        if sources == 0 {
            return Terminal::Constant(0.0);
        }
        let mut pick = rng.gen_range(0..sources);

        if let Some(range) = &self.constants {
            if pick == 0 {
                return Terminal::Constant(range.sample(rng, self.integer_constants));
            }
            pick -= 1;
        }
        if !self.literals.is_empty() {
            if pick == 0 {
                let idx = rng.gen_range(0..self.literals.len());
                return Terminal::Constant(self.literals[idx]);
            }
            pick -= 1;
        }
        debug_assert_eq!(pick, 0);
        Terminal::Variable(rng.gen_range(0..self.variables.max(1)))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.source_count() == 0 {
            return Err(ConfigError::NoTerminals);
        }
        if let Some(range) = &self.constants {
            range.validate(self.integer_constants)?;
        }
        if let Some(&value) = self.literals.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteLiteral { value });
        }
        Ok(())
    }
}

/// The operators and terminals a tree may contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveSet {
    /// Allowed operator kinds.
    pub operators: Vec<BinaryOp>,
    /// Allowed terminals.
    pub terminals: TerminalSet,
    /// Probability of placing a terminal before the depth limit is reached.
    pub terminal_bias: f64,
}

impl Default for PrimitiveSet {
    fn default() -> Self {
        Self {
            operators: BinaryOp::ARITHMETIC.to_vec(),
            terminals: TerminalSet::default(),
            terminal_bias: 0.3,
        }
    }
}

impl PrimitiveSet {
    /// Draw a random operator kind. An empty set yields `Add`.
    pub fn random_operator<R: Rng>(&self, rng: &mut R) -> BinaryOp {
        if self.operators.is_empty() {
            return BinaryOp::Add;
        }
        self.operators[rng.gen_range(0..self.operators.len())]
    }

    /// Draw an operator kind different from `current` when the set allows it.
    pub fn other_operator<R: Rng>(&self, current: BinaryOp, rng: &mut R) -> BinaryOp {
        let others: Vec<BinaryOp> = self
            .operators
            .iter()
            .copied()
            .filter(|&op| op != current)
            .collect();
        if others.is_empty() {
            current
        } else {
            others[rng.gen_range(0..others.len())]
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.operators.is_empty() {
            return Err(ConfigError::NoOperators);
        }
        if !(0.0..=1.0).contains(&self.terminal_bias) {
            return Err(ConfigError::Probability {
                name: "tree.primitives.terminal_bias",
                value: self.terminal_bias,
            });
        }
        self.terminals.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_protected_division() {
        let protection = Protection::default();
        assert!((BinaryOp::Div.apply(6.0, 3.0, &protection) - 2.0).abs() < 1e-12);
        assert!((BinaryOp::Div.apply(6.0, 0.0, &protection) - 1.0).abs() < 1e-12);
        assert!((BinaryOp::Div.apply(6.0, 1e-12, &protection) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sanitize_clamps_and_zeroes_nan() {
        let protection = Protection::default();
        assert!((protection.sanitize(f64::INFINITY) - 1e12).abs() < 1.0);
        assert!((protection.sanitize(f64::NEG_INFINITY) + 1e12).abs() < 1.0);
        assert!(protection.sanitize(f64::NAN).abs() < f64::EPSILON);
        assert!((protection.sanitize(3.5) - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_integer_constants_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        let range = ConstantRange::new(-2.5, 3.5);
        for _ in 0..500 {
            let value = range.sample(&mut rng, true);
            assert!((-2.0..=3.0).contains(&value));
            assert!((value - value.round()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_range_with_overflowing_width_is_rejected() {
        let huge = ConstantRange::new(-1e308, 1e308);
        assert_eq!(
            huge.validate(false),
            Err(ConfigError::ConstantRange {
                min: -1e308,
                max: 1e308
            })
        );
        assert!(ConstantRange::new(f64::NEG_INFINITY, 0.0).validate(false).is_err());
        assert!(ConstantRange::new(f64::NAN, 0.0).validate(false).is_err());
        assert!(ConstantRange::new(-1e12, 1e12).validate(true).is_ok());
        assert!(!huge.within(1e12));
        assert!(ConstantRange::new(-10.0, 10.0).within(1e12));
    }

    #[test]
    fn test_degenerate_range_returns_bound() {
        let mut rng = SmallRng::seed_from_u64(7);
        let range = ConstantRange::new(4.0, 4.0);
        assert!((range.sample(&mut rng, false) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_terminal_sources() {
        let mut rng = SmallRng::seed_from_u64(11);
        let set = TerminalSet {
            constants: None,
            integer_constants: false,
            literals: vec![5.0],
            variables: 2,
        };
        let mut saw_literal = false;
        let mut saw_variable = false;
        for _ in 0..200 {
            match set.random(&mut rng) {
                Terminal::Constant(v) => {
                    assert!((v - 5.0).abs() < f64::EPSILON);
                    saw_literal = true;
                }
                Terminal::Variable(i) => {
                    assert!(i < 2);
                    saw_variable = true;
                }
            }
        }
        assert!(saw_literal && saw_variable);
    }

    #[test]
    fn test_other_operator_differs() {
        let mut rng = SmallRng::seed_from_u64(3);
        let set = PrimitiveSet::default();
        for _ in 0..100 {
            assert_ne!(set.other_operator(BinaryOp::Mul, &mut rng), BinaryOp::Mul);
        }

        let single = PrimitiveSet {
            operators: vec![BinaryOp::Add],
            ..PrimitiveSet::default()
        };
        assert_eq!(single.other_operator(BinaryOp::Add, &mut rng), BinaryOp::Add);
    }

    #[test]
    fn test_validation() {
        assert!(PrimitiveSet::default().validate().is_ok());

        let no_ops = PrimitiveSet {
            operators: Vec::new(),
            ..PrimitiveSet::default()
        };
        assert_eq!(no_ops.validate(), Err(ConfigError::NoOperators));

        let no_terms = PrimitiveSet {
            terminals: TerminalSet::literals(Vec::new()),
            ..PrimitiveSet::default()
        };
        assert_eq!(no_terms.validate(), Err(ConfigError::NoTerminals));

        let no_integer = TerminalSet {
            constants: Some(ConstantRange::new(0.2, 0.7)),
            ..TerminalSet::default()
        };
        assert!(matches!(
            no_integer.validate(),
            Err(ConfigError::NoIntegerInRange { .. })
        ));

        let bad_limit = Protection {
            value_limit: f64::INFINITY,
            ..Protection::default()
        };
        assert!(bad_limit.validate().is_err());
    }
}
