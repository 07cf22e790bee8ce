#![no_main]

use arbitrary::Arbitrary;
use exprgp::gp::{
    CrossoverConfig, Genome, MutationConfig, PrimitiveSet, point_mutate, try_crossover, try_mutate,
};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Structured input for operator fuzzing.
#[derive(Arbitrary, Debug)]
struct OperatorInput {
    /// RNG seed.
    seed: u64,
    /// Depth limit (reduced to 1..=12).
    max_depth: u8,
    /// Retry budget (reduced to 1..=16).
    retries: u8,
}

fuzz_target!(|input: OperatorInput| {
    let max_depth = usize::from(input.max_depth % 12) + 1;
    let retries = usize::from(input.retries % 16) + 1;
    let mut rng = SmallRng::seed_from_u64(input.seed);
    let primitives = PrimitiveSet::default();

    let a = Genome::random(&mut rng, max_depth, &primitives);
    let b = Genome::random(&mut rng, max_depth, &primitives);

    let crossover = CrossoverConfig {
        max_retries: retries,
        ..CrossoverConfig::default()
    };
    if let Ok((child_a, child_b)) = try_crossover(&a, &b, max_depth, &crossover, &mut rng) {
        assert_eq!(child_a.size() + child_b.size(), a.size() + b.size());
        assert!(child_a.depth() <= max_depth);
        assert!(child_b.depth() <= max_depth);
    }

    let mutation = MutationConfig {
        max_retries: retries,
        ..MutationConfig::default()
    };
    if let Ok(mut child) = try_mutate(&a, max_depth, &primitives, &mutation, &mut rng) {
        assert!(child.depth() <= max_depth);
        let (size, depth) = (child.size(), child.depth());
        point_mutate(&mut child, &primitives, &mut rng);
        assert_eq!((child.size(), child.depth()), (size, depth));
    }
});
