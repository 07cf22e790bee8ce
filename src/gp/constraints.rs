//! Literal budgets for numbers-puzzle style runs.
//!
//! A budget is a multiset of constants: every constant leaf of a genome must
//! be matched by its own budget entry, so a value listed once may appear in
//! at most one leaf. Variable leaves are not counted.

use crate::gp::genome::{Genome, Node};
use crate::gp::primitives::BinaryOp;
use rand::Rng;

/// Bit pattern used to match constants; folds `-0.0` into `0.0`.
fn key(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

/// Match the genome's constants against the budget. Returns the number of
/// leaves left unmatched and the unused budget entries.
fn match_budget(genome: &Genome, budget: &[f64]) -> (usize, Vec<u64>) {
    let mut remaining: Vec<u64> = budget.iter().copied().map(key).collect();
    let mut overuse = 0;
    for constant in genome.constants() {
        let k = key(constant);
        match remaining.iter().position(|&r| r == k) {
            Some(idx) => {
                remaining.swap_remove(idx);
            }
            None => overuse += 1,
        }
    }
    (overuse, remaining)
}

/// Number of constant leaves not covered by `budget`.
#[must_use]
pub fn budget_overuse(genome: &Genome, budget: &[f64]) -> usize {
    match_budget(genome, budget).0
}

/// Budget entries the genome has not used yet.
#[must_use]
pub fn unused_literals(genome: &Genome, budget: &[f64]) -> Vec<f64> {
    match_budget(genome, budget)
        .1
        .into_iter()
        .map(f64::from_bits)
        .collect()
}

/// Grow the genome one level toward `target`: the whole tree becomes the
/// left operand of `+ n` when `value` falls short of the target, `- n`
/// otherwise, with `n` drawn from `candidates`.
///
/// Returns `false` and leaves the genome alone when there is no candidate or
/// the extra level would exceed `max_depth`.
pub fn extend_toward_target<R: Rng>(
    genome: &mut Genome,
    value: f64,
    target: f64,
    candidates: &[f64],
    max_depth: usize,
    rng: &mut R,
) -> bool {
    if candidates.is_empty() || genome.depth() >= max_depth {
        return false;
    }
    let n = candidates[rng.gen_range(0..candidates.len())];
    let op = if value < target {
        BinaryOp::Add
    } else {
        BinaryOp::Sub
    };
    let root = std::mem::replace(&mut genome.root, Node::constant(0.0));
    genome.root = Node::operator(op, root, Node::constant(n));
    true
}
