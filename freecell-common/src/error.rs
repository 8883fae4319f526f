use crate::action::{Action, MoveKind};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("Invalid rank {0}, expected 1..=13")]
    InvalidRank(u8),
}

/// Errors raised while building or applying moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Invalid move type: {0}")]
    InvalidMoveType(String),

    #[error("Malformed {kind} move: {reason}")]
    Malformed {
        kind: MoveKind,
        reason: &'static str,
    },

    /// The move is well formed but its preconditions do not hold on the board.
    /// The board is left untouched.
    #[error("Move {0} is not applicable")]
    NotApplicable(Action),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed game data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid deal: {0}")]
    InvalidDeal(String),

    #[error("Preset '{0}' not found")]
    PresetNotFound(String),
}
