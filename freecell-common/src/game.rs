//! Interactive play session with undo and redo.

use crate::action::{Action, Move};
use crate::board::Board;
use crate::error::{MoveError, PersistenceError};
use crate::persist::SavedGame;
use crate::rules::{MovePolicy, apply, auto_move, legal_moves_with};

use smallvec::SmallVec;
use std::time::Duration;

/// Wraps a `Board` with the mutable state a human player needs. The snapshot
/// stacks live here, never inside `Board`, so they never affect equality.
#[derive(Debug, Clone)]
pub struct Game {
    pub board: Board,
    history: Vec<Board>,
    redo_stack: Vec<Board>,
    pub elapsed: Duration,
    pub auto_move: bool,
    pub policy: MovePolicy,
}

impl Game {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            history: Vec::new(),
            redo_stack: Vec::new(),
            elapsed: Duration::ZERO,
            auto_move: true,
            policy: MovePolicy::All,
        }
    }

    pub fn new_from_seed(seed: u64) -> Self {
        Self::new(Board::new_from_seed(seed))
    }

    /// Applies `action`, recording the previous board for `undo`. Returns the
    /// automatic moves that followed it. A rejected action changes nothing.
    pub fn play(&mut self, action: impl Into<Action>) -> Result<SmallVec<[Move; 8]>, MoveError> {
        let mut next = apply(&self.board, action)?;
        let auto_moves = if self.auto_move {
            auto_move(&mut next)
        } else {
            SmallVec::new()
        };
        self.history.push(std::mem::replace(&mut self.board, next));
        self.redo_stack.clear();
        Ok(auto_moves)
    }

    /// Restores the board before the last `play`. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.redo_stack
                    .push(std::mem::replace(&mut self.board, previous));
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.history.push(std::mem::replace(&mut self.board, next));
                true
            }
            None => false,
        }
    }

    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    /// First legal move in category order.
    pub fn hint(&self) -> Option<Move> {
        legal_moves_with(&self.board, self.policy).first().copied()
    }

    pub fn is_solved(&self) -> bool {
        self.board.is_solved()
    }

    pub fn to_saved(&self) -> SavedGame {
        SavedGame::from_board(&self.board, Some(self.elapsed))
    }

    pub fn from_saved(saved: &SavedGame) -> Result<Self, PersistenceError> {
        let mut game = Self::new(saved.to_board()?);
        game.elapsed = saved.elapsed()?.unwrap_or_default();
        Ok(game)
    }
}
