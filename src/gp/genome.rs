//! Genome representation for genetic programming.
//!
//! A genome is an owned binary expression tree. Every operator node has
//! exactly two boxed children, so cloning is always a deep copy and no two
//! genomes ever share a subtree.
//!
//! Positions inside a tree are preorder indices: the root is `0`, its left
//! subtree occupies `1..=left.size()`, and the right subtree follows.

use crate::gp::primitives::{BinaryOp, PrimitiveSet, Protection};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Terminal {
    /// A fixed constant.
    Constant(f64),
    /// Reference to a variable binding by index.
    Variable(usize),
}

impl Terminal {
    /// Value of this terminal under the given bindings. Unbound variables read `0.0`.
    #[must_use]
    pub fn value(self, bindings: &[f64]) -> f64 {
        match self {
            Self::Constant(v) => v,
            Self::Variable(i) => bindings.get(i).copied().unwrap_or(0.0),
        }
    }
}

/// A single tree cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Leaf node.
    Terminal(Terminal),
    /// Binary operator applied to two subtrees.
    Operator {
        /// Operator kind.
        op: BinaryOp,
        /// Left operand.
        left: Box<Node>,
        /// Right operand.
        right: Box<Node>,
    },
}

impl Node {
    /// Constant leaf.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::Terminal(Terminal::Constant(value))
    }

    /// Variable leaf.
    #[must_use]
    pub fn variable(index: usize) -> Self {
        Self::Terminal(Terminal::Variable(index))
    }

    /// Operator node over two subtrees.
    #[must_use]
    pub fn operator(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Generate a random subtree with the "grow" method.
    ///
    /// Places a terminal once `max_depth` is exhausted, or earlier with
    /// probability `terminal_bias`; otherwise an operator with two grown
    /// children one level deeper.
    pub fn grow<R: Rng>(rng: &mut R, max_depth: usize, primitives: &PrimitiveSet) -> Self {
        if max_depth == 0 || rng.gen_bool(primitives.terminal_bias) {
            Self::Terminal(primitives.terminals.random(rng))
        } else {
            let op = primitives.random_operator(rng);
            let left = Self::grow(rng, max_depth - 1, primitives);
            let right = Self::grow(rng, max_depth - 1, primitives);
            Self::operator(op, left, right)
        }
    }

    /// Generate a random subtree with the "full" method: every leaf sits at
    /// exactly `depth`.
    pub fn full<R: Rng>(rng: &mut R, depth: usize, primitives: &PrimitiveSet) -> Self {
        if depth == 0 {
            Self::Terminal(primitives.terminals.random(rng))
        } else {
            let op = primitives.random_operator(rng);
            let left = Self::full(rng, depth - 1, primitives);
            let right = Self::full(rng, depth - 1, primitives);
            Self::operator(op, left, right)
        }
    }

    /// Evaluate this subtree. Always returns a finite value.
    #[must_use]
    pub fn evaluate(&self, bindings: &[f64], protection: &Protection) -> f64 {
        match self {
            Self::Terminal(t) => protection.sanitize(t.value(bindings)),
            Self::Operator { op, left, right } => {
                let a = left.evaluate(bindings, protection);
                let b = right.evaluate(bindings, protection);
                protection.sanitize(op.apply(a, b, protection))
            }
        }
    }

    /// Whether this node is a leaf.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Terminal(_) => 1,
            Self::Operator { left, right, .. } => 1 + left.size() + right.size(),
        }
    }

    /// Edges on the longest path from this node to a leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Terminal(_) => 0,
            Self::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Append the constant leaves of this subtree, in preorder.
    fn collect_constants(&self, out: &mut Vec<f64>) {
        match self {
            Self::Terminal(Terminal::Constant(v)) => out.push(*v),
            Self::Terminal(Terminal::Variable(_)) => {}
            Self::Operator { left, right, .. } => {
                left.collect_constants(out);
                right.collect_constants(out);
            }
        }
    }

    /// Subtree rooted at the given preorder position.
    #[must_use]
    pub fn subtree(&self, index: usize) -> Option<&Self> {
        if index == 0 {
            return Some(self);
        }
        match self {
            Self::Terminal(_) => None,
            Self::Operator { left, right, .. } => {
                let left_size = left.size();
                if index <= left_size {
                    left.subtree(index - 1)
                } else {
                    right.subtree(index - 1 - left_size)
                }
            }
        }
    }

    /// Mutable subtree rooted at the given preorder position.
    pub fn subtree_mut(&mut self, index: usize) -> Option<&mut Self> {
        if index == 0 {
            return Some(self);
        }
        match self {
            Self::Terminal(_) => None,
            Self::Operator { left, right, .. } => {
                let left_size = left.size();
                if index <= left_size {
                    left.subtree_mut(index - 1)
                } else {
                    right.subtree_mut(index - 1 - left_size)
                }
            }
        }
    }

    /// Number of edges between this node and the given preorder position.
    #[must_use]
    pub fn depth_at(&self, index: usize) -> Option<usize> {
        let mut node = self;
        let mut index = index;
        let mut depth = 0;
        loop {
            if index == 0 {
                return Some(depth);
            }
            match node {
                Self::Terminal(_) => return None,
                Self::Operator { left, right, .. } => {
                    let left_size = left.size();
                    index -= 1;
                    if index < left_size {
                        node = left.as_ref();
                    } else {
                        index -= left_size;
                        node = right.as_ref();
                    }
                    depth += 1;
                }
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(Terminal::Constant(v)) if *v < 0.0 => write!(f, "({v})"),
            Self::Terminal(Terminal::Constant(v)) => write!(f, "{v}"),
            Self::Terminal(Terminal::Variable(i)) => write!(f, "x{i}"),
            Self::Operator { op, left, right } if op.is_infix() => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            Self::Operator { op, left, right } => write!(f, "{}({left}, {right})", op.symbol()),
        }
    }
}

/// A candidate expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Root of the expression tree.
    pub root: Node,
}

impl From<Node> for Genome {
    fn from(root: Node) -> Self {
        Self { root }
    }
}

impl Genome {
    /// Wrap a tree.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Create a random genome whose depth never exceeds `max_depth`.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R, max_depth: usize, primitives: &PrimitiveSet) -> Self {
        Self::new(Node::grow(rng, max_depth, primitives))
    }

    /// Create a random genome whose leaves all sit at exactly `depth`.
    #[must_use]
    pub fn random_full<R: Rng>(rng: &mut R, depth: usize, primitives: &PrimitiveSet) -> Self {
        Self::new(Node::full(rng, depth, primitives))
    }

    /// Evaluate with the default protection constants.
    #[must_use]
    pub fn evaluate(&self, bindings: &[f64]) -> f64 {
        self.root.evaluate(bindings, &Protection::default())
    }

    /// Evaluate with explicit protection constants.
    #[must_use]
    pub fn evaluate_with(&self, bindings: &[f64], protection: &Protection) -> f64 {
        self.root.evaluate(bindings, protection)
    }

    /// Number of nodes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Longest root-to-leaf path, in edges.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Constant leaf values in preorder.
    #[must_use]
    pub fn constants(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.root.collect_constants(&mut out);
        out
    }

    /// Pick a node position uniformly over all nodes.
    pub fn random_position<R: Rng>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.size())
    }

    /// Subtree at a preorder position.
    #[must_use]
    pub fn subtree(&self, index: usize) -> Option<&Node> {
        self.root.subtree(index)
    }

    /// Mutable subtree at a preorder position.
    pub fn subtree_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.root.subtree_mut(index)
    }

    /// Depth of the node at a preorder position (the root is at depth 0).
    #[must_use]
    pub fn depth_at(&self, index: usize) -> Option<usize> {
        self.root.depth_at(index)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::primitives::TerminalSet;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn sample_tree() -> Node {
        // (3 + (x0 * 2))
        Node::operator(
            BinaryOp::Add,
            Node::constant(3.0),
            Node::operator(BinaryOp::Mul, Node::variable(0), Node::constant(2.0)),
        )
    }

    #[test]
    fn test_genome_random_respects_depth() {
        let mut rng = SmallRng::seed_from_u64(12345);
        let primitives = PrimitiveSet::default();
        for max_depth in 0..6 {
            for _ in 0..50 {
                let genome = Genome::random(&mut rng, max_depth, &primitives);
                assert!(genome.depth() <= max_depth);
            }
        }
    }

    #[test]
    fn test_full_tree_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let genome = Genome::random_full(&mut rng, 3, &PrimitiveSet::default());
        assert_eq!(genome.depth(), 3);
        assert_eq!(genome.size(), 15);
    }

    #[test]
    fn test_node_count_and_depth() {
        let tree = sample_tree();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.depth(), 2);
        assert_eq!(Node::constant(1.0).depth(), 0);
    }

    #[test]
    fn test_evaluate() {
        let genome = Genome::new(sample_tree());
        assert!((genome.evaluate(&[4.0]) - 11.0).abs() < 1e-12);
        // Unbound variable reads zero.
        assert!((genome.evaluate(&[]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_division_by_zero_is_protected() {
        let genome = Genome::new(Node::operator(
            BinaryOp::Div,
            Node::constant(5.0),
            Node::operator(BinaryOp::Sub, Node::constant(2.0), Node::constant(2.0)),
        ));
        assert!((genome.evaluate(&[]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_overflow_is_clamped() {
        let protection = Protection::default();
        let mut node = Node::constant(1e9);
        for _ in 0..6 {
            node = Node::operator(BinaryOp::Mul, node.clone(), node);
        }
        let value = node.evaluate(&[], &protection);
        assert!(value.is_finite());
        assert!(value <= protection.value_limit);
    }

    #[test]
    fn test_subtree_preorder() {
        let tree = sample_tree();
        assert_eq!(tree.subtree(0), Some(&tree));
        assert_eq!(tree.subtree(1), Some(&Node::constant(3.0)));
        assert!(matches!(
            tree.subtree(2),
            Some(Node::Operator { op: BinaryOp::Mul, .. })
        ));
        assert_eq!(tree.subtree(3), Some(&Node::variable(0)));
        assert_eq!(tree.subtree(4), Some(&Node::constant(2.0)));
        assert_eq!(tree.subtree(5), None);
    }

    #[test]
    fn test_depth_at() {
        let tree = sample_tree();
        assert_eq!(tree.depth_at(0), Some(0));
        assert_eq!(tree.depth_at(1), Some(1));
        assert_eq!(tree.depth_at(2), Some(1));
        assert_eq!(tree.depth_at(3), Some(2));
        assert_eq!(tree.depth_at(4), Some(2));
        assert_eq!(tree.depth_at(5), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Genome::new(sample_tree());
        let mut copy = original.clone();
        if let Some(node) = copy.subtree_mut(3) {
            *node = Node::constant(100.0);
        }
        assert!((original.evaluate(&[4.0]) - 11.0).abs() < 1e-12);
        assert!((copy.evaluate(&[4.0]) - 203.0).abs() < 1e-12);
    }

    #[test]
    fn test_random_position_covers_all_nodes() {
        let mut rng = SmallRng::seed_from_u64(99);
        let genome = Genome::new(sample_tree());
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[genome.random_position(&mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_display() {
        let genome = Genome::new(Node::operator(
            BinaryOp::Min,
            sample_tree(),
            Node::constant(-1.5),
        ));
        assert_eq!(genome.to_string(), "min((3 + (x0 * 2)), (-1.5))");
    }

    #[test]
    fn test_literal_only_terminals() {
        let mut rng = SmallRng::seed_from_u64(5);
        let primitives = PrimitiveSet {
            terminals: TerminalSet::literals(vec![0.0]),
            ..PrimitiveSet::default()
        };
        let genome = Genome::random(&mut rng, 0, &primitives);
        assert_eq!(genome.root, Node::constant(0.0));
    }

    #[test]
    fn test_genome_serialization() {
        let genome = Genome::new(sample_tree());
        let encoded = serde_json::to_string(&genome).unwrap();
        let decoded: Genome = serde_json::from_str(&encoded).unwrap();
        assert_eq!(genome, decoded);
    }

    #[test]
    fn test_constants_in_preorder() {
        let genome = Genome::new(Node::operator(
            BinaryOp::Sub,
            sample_tree(),
            Node::constant(-1.5),
        ));
        assert_eq!(genome.constants(), vec![3.0, 2.0, -1.5]);
        assert!(Genome::new(Node::variable(1)).constants().is_empty());
    }
}
