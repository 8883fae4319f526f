//! Breadth-first, depth-bounded and A* solvers for FreeCell, plus the
//! heuristic they share and an offline weight tuner.
mod heuristic;
mod node;
mod solver;
mod tuning;

pub use crate::heuristic::{Weights, blocked_next_cards, estimate, foundation_score, hint, rank_moves};
pub use crate::solver::{
    Exhausted, NoSolution, SolveError, SolveOutcome, Solution, Solver, Strategy, expand, solve,
};
pub use crate::tuning::{
    CSV_HEADER, TuningOptions, TuningRecord, WeightGrid, tune, write_csv_header, write_csv_row,
};
