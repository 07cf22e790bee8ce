//! Output formatting utilities for CLI.

use exprgp::{GenerationStats, RunResult};

/// Most history rows printed in text mode.
const MAX_HISTORY_ROWS: usize = 20;

/// Format a run result as human-readable text.
pub(super) fn format_text(result: &RunResult, target: f64) -> String {
    let mut output = String::new();

    output.push_str(&format!("Best expression: {}\n", result.best_genome));
    output.push_str(&format!("  Value: {}\n", result.best_value));
    output.push_str(&format!("  Target: {target}\n"));
    output.push_str(&format!("  Fitness: {:.6}\n", result.best_fitness));
    output.push_str(&format!(
        "  Size: {} nodes, depth {}\n",
        result.best_genome.size(),
        result.best_genome.depth()
    ));
    output.push_str(&format!("  Found in generation: {}\n", result.generation_found));
    output.push_str(&format!("  Generations run: {}\n", result.generations_run));
    if result.degenerate_operations > 0 {
        output.push_str(&format!(
            "  Degenerate operations: {}\n",
            result.degenerate_operations
        ));
    }

    output.push_str("\nConvergence:\n");
    output.push_str("    gen       best       mean        std   run best\n");
    for stats in history_rows(&result.history, MAX_HISTORY_ROWS) {
        output.push_str(&format!(
            "  {:>5} {:>10.6} {:>10.6} {:>10.6} {:>10.6}\n",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.fitness_std,
            stats.best_of_run
        ));
    }

    output
}

/// Evenly spaced history rows, always including the final generation.
fn history_rows(history: &[GenerationStats], max_rows: usize) -> Vec<&GenerationStats> {
    if history.len() <= max_rows || max_rows < 2 {
        return history.iter().collect();
    }
    let step = history.len().div_ceil(max_rows - 1);
    let mut rows: Vec<&GenerationStats> = history.iter().step_by(step).collect();
    let missing_last = history
        .last()
        .filter(|last| rows.last().is_none_or(|row| row.generation != last.generation));
    rows.extend(missing_last);
    rows
}
