//! Property-based tests for expression trees and genetic operators.
//!
//! Run with: cargo test --release prop_tree

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use exprgp::gp::{
    BinaryOp, CrossoverConfig, Genome, MutationConfig, Node, PrimitiveSet, Protection,
    TerminalSet, fitness, mutate, point_mutate, try_crossover,
};

fn primitives(variables: usize) -> PrimitiveSet {
    PrimitiveSet {
        operators: BinaryOp::ALL.to_vec(),
        terminals: TerminalSet {
            variables,
            ..TerminalSet::default()
        },
        terminal_bias: 0.2,
    }
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        (-1e6f64..1e6).prop_map(Node::constant),
        Just(Node::constant(0.0)),
        (0usize..3).prop_map(Node::variable),
    ];
    leaf.prop_recursive(6, 64, 2, |inner| {
        (
            prop::sample::select(BinaryOp::ALL.to_vec()),
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| Node::operator(op, left, right))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Grown trees never exceed the requested depth.
    #[test]
    fn prop_grow_respects_depth(seed in any::<u64>(), max_depth in 0usize..10) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let genome = Genome::random(&mut rng, max_depth, &primitives(2));
        prop_assert!(genome.depth() <= max_depth);
    }

    /// Full trees reach exactly the requested depth on every branch.
    #[test]
    fn prop_full_has_exact_shape(seed in any::<u64>(), depth in 0usize..8) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let genome = Genome::random_full(&mut rng, depth, &primitives(0));
        prop_assert_eq!(genome.depth(), depth);
        prop_assert_eq!(genome.size(), (1usize << (depth + 1)) - 1);
    }

    /// Evaluation is finite and bounded for arbitrary trees and bindings.
    #[test]
    fn prop_evaluation_is_finite(
        node in node_strategy(),
        bindings in prop::collection::vec(-1e9f64..1e9, 0..3)
    ) {
        let genome = Genome::new(node);
        let value = genome.evaluate(&bindings);
        prop_assert!(value.is_finite());
        prop_assert!(value.abs() <= Protection::default().value_limit);
    }

    /// Fitness stays in (0, 1].
    #[test]
    fn prop_fitness_in_unit_interval(node in node_strategy(), target in -1e6f64..1e6) {
        let f = fitness(&Genome::new(node), target);
        prop_assert!(f > 0.0);
        prop_assert!(f <= 1.0);
    }

    /// Changing a clone never changes the original.
    #[test]
    fn prop_clone_is_independent(node in node_strategy(), seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let original = Genome::new(node);
        let snapshot = original.to_string();
        let before = original.evaluate(&[1.0, 2.0, 3.0]);

        let mut copy = original.clone();
        prop_assert_eq!(copy.evaluate(&[1.0, 2.0, 3.0]).to_bits(), before.to_bits());
        for _ in 0..5 {
            point_mutate(&mut copy, &primitives(3), &mut rng);
        }
        let pos = copy.random_position(&mut rng);
        if let Some(sub) = copy.subtree_mut(pos) {
            *sub = Node::constant(123.0);
        }

        prop_assert_eq!(original.to_string(), snapshot);
        prop_assert_eq!(original.evaluate(&[1.0, 2.0, 3.0]).to_bits(), before.to_bits());
    }

    /// A successful crossover preserves the combined node count and depth limit.
    #[test]
    fn prop_crossover_preserves_size(seed in any::<u64>(), max_depth in 1usize..8) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let prims = primitives(1);
        let a = Genome::random(&mut rng, max_depth, &prims);
        let b = Genome::random(&mut rng, max_depth, &prims);

        if let Ok((child_a, child_b)) =
            try_crossover(&a, &b, max_depth, &CrossoverConfig::default(), &mut rng)
        {
            prop_assert_eq!(child_a.size() + child_b.size(), a.size() + b.size());
            prop_assert!(child_a.depth() <= max_depth);
            prop_assert!(child_b.depth() <= max_depth);
        }
    }

    /// Subtree mutation never pushes a tree beyond the depth limit.
    #[test]
    fn prop_mutation_respects_depth(seed in any::<u64>(), max_depth in 1usize..8) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let prims = primitives(1);
        let genome = Genome::random(&mut rng, max_depth, &prims);
        let child = mutate(&genome, max_depth, &prims, &MutationConfig::default(), &mut rng);
        prop_assert!(child.depth() <= max_depth);
    }

    /// Every preorder position addresses a node whose subtree fits inside the tree.
    #[test]
    fn prop_positions_are_consistent(node in node_strategy()) {
        let genome = Genome::new(node);
        for pos in 0..genome.size() {
            let sub = genome.subtree(pos).unwrap();
            let depth = genome.depth_at(pos).unwrap();
            prop_assert!(depth + sub.depth() <= genome.depth());
            prop_assert!(sub.size() <= genome.size() - pos);
        }
        prop_assert!(genome.subtree(genome.size()).is_none());
    }
}
