//! End-to-end tests for the evolution driver.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use exprgp::gp::{
    BinaryOp, ConstantRange, ErrorMetric, EvolutionConfig, InitMethod, SelectionMethod,
    TerminalSet, budget_overuse, evaluate_fitness, run, run_with_observer,
};
use exprgp::ConfigError;

fn scenario_a() -> EvolutionConfig {
    let mut config = EvolutionConfig::for_target(42.0);
    config.population_size = 50;
    config.max_generations = 100;
    config.log_interval = 0;
    config.tree.primitives.operators = vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul];
    config.tree.primitives.terminals = TerminalSet {
        constants: Some(ConstantRange::new(-10.0, 10.0)),
        ..TerminalSet::default()
    };
    config
}

#[test]
fn best_of_run_never_decreases() {
    let config = scenario_a();
    let result = run(&config).unwrap();

    assert!(!result.history.is_empty());
    for pair in result.history.windows(2) {
        assert!(pair[1].best_of_run >= pair[0].best_of_run);
    }
    assert!(result.generation_found <= result.generations_run);
    assert!(result.generations_run <= config.max_generations);
    assert_eq!(result.history.len(), result.generations_run + 1);
    assert_eq!(
        result.history.last().map(|s| s.best_of_run),
        Some(result.best_fitness)
    );
    assert!(result.best_genome.depth() <= config.tree.max_depth);
    assert_eq!(result.best_genome.evaluate(&[]), result.best_value);
}

#[test]
fn zero_target_with_zero_literal_matches_quickly() {
    let mut config = EvolutionConfig::for_target(0.0);
    config.population_size = 50;
    config.log_interval = 0;
    config.tree.primitives.terminals = TerminalSet::literals(vec![0.0]);

    let result = run(&config).unwrap();
    assert_eq!(result.best_fitness, 1.0);
    assert_eq!(result.best_value, 0.0);
    assert!(result.generations_run <= 5);
}

#[test]
fn zero_generations_skips_breeding() {
    let config = EvolutionConfig {
        max_generations: 0,
        ..scenario_a()
    };
    let mut observed = 0;
    let result = run_with_observer(&config, |_| observed += 1).unwrap();

    assert_eq!(result.generations_run, 0);
    assert_eq!(result.history.len(), 1);
    assert_eq!(observed, 1);
    assert_eq!(result.degenerate_operations, 0);
}

#[test]
fn identical_seed_gives_identical_result() {
    let config = scenario_a();
    assert_eq!(run(&config).unwrap(), run(&config).unwrap());
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let parallel = EvolutionConfig {
        parallel: true,
        ..scenario_a()
    };
    let sequential = EvolutionConfig {
        parallel: false,
        ..scenario_a()
    };
    assert_eq!(run(&parallel).unwrap(), run(&sequential).unwrap());
}

#[test]
fn different_seeds_explore_differently() {
    let a = EvolutionConfig {
        max_generations: 0,
        seed: 1,
        ..scenario_a()
    };
    let b = EvolutionConfig { seed: 2, ..a.clone() };
    assert_ne!(run(&a).unwrap().history, run(&b).unwrap().history);
}

#[test]
fn variable_bindings_average_error() {
    let mut config = EvolutionConfig::for_target(10.0);
    config.population_size = 40;
    config.max_generations = 20;
    config.log_interval = 0;
    config.tree.primitives.terminals.variables = 1;
    config.fitness.bindings = vec![vec![1.0], vec![2.0], vec![3.0]];

    let result = run(&config).unwrap();
    assert!(result.best_fitness > 0.0 && result.best_fitness <= 1.0);
    assert!(result.best_value.is_finite());
}

#[test]
fn alternative_operators_and_settings_run() {
    let mut config = scenario_a();
    config.max_generations = 10;
    config.elite_count = 0;
    config.selection.method = SelectionMethod::Roulette;
    config.fitness.metric = ErrorMetric::Squared;
    config.tree.init = InitMethod::Full;
    config.tree.primitives.operators = BinaryOp::ALL.to_vec();
    config.mutation.point_rate = 0.5;

    let result = run(&config).unwrap();
    assert_eq!(result.history.len(), result.generations_run + 1);
}

#[test]
fn config_errors_are_reported_before_running() {
    let mut config = scenario_a();
    config.crossover.rate = f64::NAN;
    let mut observed = false;
    let result = run_with_observer(&config, |_| observed = true);

    assert!(matches!(result, Err(ConfigError::Probability { .. })));
    assert!(!observed);

    let mut bindings = scenario_a();
    bindings.tree.primitives.terminals.variables = 2;
    bindings.fitness.bindings = vec![vec![1.0]];
    assert!(matches!(
        run(&bindings),
        Err(ConfigError::BindingArity { .. })
    ));

    // Finite bounds whose width overflows would break constant sampling.
    let mut huge = scenario_a();
    huge.population_size = 10;
    huge.max_generations = 1;
    huge.tree.primitives.terminals.constants = Some(ConstantRange::new(-1e308, 1e308));
    assert!(matches!(
        run(&huge),
        Err(ConfigError::ConstantRange { .. })
    ));

    // Bounds beyond the value limit would be clamped on every evaluation.
    let mut clamped = scenario_a();
    clamped.tree.primitives.terminals.constants = Some(ConstantRange::new(0.0, 1e13));
    assert!(matches!(
        clamped.validate(),
        Err(ConfigError::ConstantRange { .. })
    ));
}

#[test]
fn numbers_game_respects_budget() {
    let numbers = vec![2.0, 5.0, 7.0, 1.0];
    let mut config = EvolutionConfig::numbers_game(10.0, numbers.clone());
    config.population_size = 60;
    config.max_generations = 50;
    config.log_interval = 0;

    let result = run(&config).unwrap();
    let rescored = evaluate_fitness(
        &result.best_genome,
        config.target,
        &config.fitness,
        &config.tree.protection,
    );

    assert_eq!(rescored.fitness, result.best_fitness);
    assert_eq!(rescored.violations, 0);
    assert_eq!(budget_overuse(&result.best_genome, &numbers), 0);
    assert_eq!(result.best_value.fract(), 0.0);
    assert!(result.best_fitness > 0.0 && result.best_fitness <= 1.0);
    assert_eq!(run(&config).unwrap(), result);
}

#[test]
fn result_serializes_to_json() {
    let config = EvolutionConfig {
        max_generations: 2,
        ..scenario_a()
    };
    let result = run(&config).unwrap();
    let json = serde_json::to_string(&result).unwrap();

    assert!(json.contains("\"best_genome\""));
    assert!(json.contains("\"history\""));
}
