#![no_main]

use arbitrary::Arbitrary;
use exprgp::gp::{BinaryOp, Genome, Node, Protection};
use libfuzzer_sys::fuzz_target;

/// One step of a postfix program that builds a tree.
#[derive(Arbitrary, Debug)]
enum Step {
    /// Push a constant.
    Constant(f64),
    /// Push a variable reference.
    Variable(u8),
    /// Pop two subtrees and combine them.
    Operator(u8),
}

/// Structured input for evaluation fuzzing.
#[derive(Arbitrary, Debug)]
struct EvalInput {
    /// Postfix construction steps.
    steps: Vec<Step>,
    /// Variable bindings.
    bindings: Vec<f64>,
}

fuzz_target!(|input: EvalInput| {
    // Cap inputs to keep recursion shallow
    if input.steps.len() > 256 {
        return;
    }

    let mut stack: Vec<Node> = Vec::new();
    for step in input.steps {
        match step {
            Step::Constant(v) => stack.push(Node::constant(v)),
            Step::Variable(i) => stack.push(Node::variable(usize::from(i % 4))),
            Step::Operator(k) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return;
                };
                let op = BinaryOp::ALL[usize::from(k) % BinaryOp::ALL.len()];
                stack.push(Node::operator(op, left, right));
            }
        }
    }
    let Some(root) = stack.pop() else {
        return;
    };

    let genome = Genome::new(root);
    if genome.depth() > 64 {
        return;
    }

    // Evaluation must be finite and clamped for any input, NaN and infinities included
    let value = genome.evaluate(&input.bindings);
    assert!(value.is_finite(), "non-finite value {value} for {genome}");
    assert!(value.abs() <= Protection::default().value_limit);

    // Clones evaluate identically
    let copy = genome.clone();
    assert_eq!(copy.evaluate(&input.bindings).to_bits(), value.to_bits());
});
