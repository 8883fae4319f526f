//! Offline grid search over heuristic weights.

use crate::heuristic::Weights;
use crate::solver::{SolveError, SolveOutcome, Solver, Strategy};

use freecell_common::board::Board;

use log::{info, warn};
use rayon::prelude::*;
use std::io::{self, Write};
use std::time::Duration;

pub const CSV_HEADER: &str = "foundation_weight,free_cell_weight,empty_column_weight,blocked_card_weight,cost,elapsed_seconds";

/// Candidate values for each weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightGrid {
    pub foundation_weights: Vec<u32>,
    pub free_cell_weights: Vec<u32>,
    pub empty_column_weights: Vec<u32>,
    pub blocked_card_weights: Vec<u32>,
}

impl Default for WeightGrid {
    fn default() -> Self {
        Self {
            foundation_weights: vec![1, 2, 3],
            free_cell_weights: vec![0, 1, 2],
            empty_column_weights: vec![0, 1, 2],
            blocked_card_weights: vec![0, 1, 2],
        }
    }
}

impl WeightGrid {
    /// Cartesian product of the four lists.
    pub fn combinations(&self) -> Vec<Weights> {
        let mut result = Vec::with_capacity(
            self.foundation_weights.len()
                * self.free_cell_weights.len()
                * self.empty_column_weights.len()
                * self.blocked_card_weights.len(),
        );
        for &foundation_weight in &self.foundation_weights {
            for &free_cell_weight in &self.free_cell_weights {
                for &empty_column_weight in &self.empty_column_weights {
                    for &blocked_card_weight in &self.blocked_card_weights {
                        result.push(Weights {
                            foundation_weight,
                            free_cell_weight,
                            empty_column_weight,
                            blocked_card_weight,
                        });
                    }
                }
            }
        }
        result
    }
}

#[derive(Debug, Clone)]
pub struct TuningOptions {
    /// Wall-clock budget of each combination.
    pub timeout: Duration,
    pub max_states: usize,
}

impl Default for TuningOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_states: 1_000_000,
        }
    }
}

/// Result of one combination. `cost` is the solution length, `None` when the
/// search gave up.
#[derive(Debug, Clone)]
pub struct TuningRecord {
    pub weights: Weights,
    pub cost: Option<usize>,
    pub states: usize,
    pub elapsed: Duration,
}

/// Runs one A* search per weight combination across the rayon pool. Results
/// come back in `grid.combinations()` order.
pub fn tune(
    board: &Board,
    grid: &WeightGrid,
    options: &TuningOptions,
) -> Result<Vec<TuningRecord>, SolveError> {
    grid.combinations()
        .into_par_iter()
        .map(|weights| -> Result<TuningRecord, SolveError> {
            let deal = board.clone();
            let outcome = Solver::new(Strategy::AStar)
                .with_weights(weights)
                .with_max_states(options.max_states)
                .with_timeout(options.timeout)
                .solve(&deal)?;

            let cost = match &outcome {
                SolveOutcome::Solved(solution) => {
                    info!(
                        "{weights:?}: {} actions in {:?}",
                        solution.actions.len(),
                        solution.elapsed
                    );
                    Some(solution.actions.len())
                }
                SolveOutcome::NoSolution(none) => {
                    warn!("{weights:?}: {}", none.reason);
                    None
                }
            };
            Ok(TuningRecord {
                weights,
                cost,
                states: outcome.states(),
                elapsed: outcome.elapsed(),
            })
        })
        .collect()
}

pub fn write_csv_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")
}

pub fn write_csv_row<W: Write>(writer: &mut W, record: &TuningRecord) -> io::Result<()> {
    let Weights {
        foundation_weight,
        free_cell_weight,
        empty_column_weight,
        blocked_card_weight,
    } = record.weights;
    let cost = record.cost.map(|c| c.to_string()).unwrap_or_default();
    writeln!(
        writer,
        "{foundation_weight},{free_cell_weight},{empty_column_weight},{blocked_card_weight},{cost},{:.3}",
        record.elapsed.as_secs_f64()
    )
}
