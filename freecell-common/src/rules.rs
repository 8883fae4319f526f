//! Legality predicates, move enumeration, supermoves and the automatic-move
//! cascade.

use crate::action::{Action, Move, Supermove};
use crate::board::{Board, TOTAL_FREECELLS, TOTAL_TABLEAUS};
use crate::card::{Card, Suit};
use crate::error::MoveError;

use smallvec::SmallVec;

pub type Moves = SmallVec<[Move; 64]>;
pub type Supermoves = SmallVec<[Supermove; 16]>;

/// Which move categories are offered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovePolicy {
    /// All seven categories.
    #[default]
    All,
    /// Leaves out moves that take cards back off the foundations.
    Progressive,
}

pub fn can_move_to_foundation(board: &Board, card: Card) -> bool {
    board.foundation(card.suit()) + 1 == card.rank()
}

pub fn can_move_to_tableau(board: &Board, card: Card, column: usize) -> bool {
    match board.tableaus[column].peek_top() {
        None => true,
        Some(top) => card.stacks_on(&top),
    }
}

pub fn can_move_to_freecell(board: &Board) -> bool {
    board.first_free_freecell().is_some()
}

/// Every legal single-card move, in category order.
pub fn legal_moves(board: &Board) -> Moves {
    legal_moves_with(board, MovePolicy::All)
}

pub fn legal_moves_with(board: &Board, policy: MovePolicy) -> Moves {
    let mut moves = Moves::new();
    let tops: [Option<Card>; TOTAL_TABLEAUS] = std::array::from_fn(|i| board.tableaus[i].peek_top());

    for (i, top) in tops.iter().enumerate() {
        if let Some(card) = top
            && can_move_to_foundation(board, *card)
        {
            moves.push(Move::TableauToFoundation(i));
        }
    }

    if can_move_to_freecell(board) {
        for (i, top) in tops.iter().enumerate() {
            if top.is_some() {
                moves.push(Move::TableauToFreecell(i));
            }
        }
    }

    for (i, card) in board.freecells.iter().enumerate() {
        if let Some(card) = card
            && can_move_to_foundation(board, *card)
        {
            moves.push(Move::FreecellToFoundation(i));
        }
    }

    for (i, top) in tops.iter().enumerate() {
        let Some(card) = top else {
            continue;
        };
        for j in 0..TOTAL_TABLEAUS {
            if i != j && can_move_to_tableau(board, *card, j) {
                moves.push(Move::TableauToTableau(i, j));
            }
        }
    }

    for (i, card) in board.freecells.iter().enumerate() {
        let Some(card) = card else {
            continue;
        };
        for j in 0..TOTAL_TABLEAUS {
            if can_move_to_tableau(board, *card, j) {
                moves.push(Move::FreecellToTableau(i, j));
            }
        }
    }

    if policy == MovePolicy::Progressive {
        return moves;
    }

    for suit in Suit::ALL {
        // An ace alone on its foundation is never worth taking back.
        if board.foundation(suit) <= 1 {
            continue;
        }
        let Some(card) = board.foundation_top(suit) else {
            continue;
        };
        for j in 0..TOTAL_TABLEAUS {
            if can_move_to_tableau(board, card, j) {
                moves.push(Move::FoundationToTableau(suit, j));
            }
        }
    }

    if can_move_to_freecell(board) {
        for suit in Suit::ALL {
            if board.foundation(suit) > 0 {
                moves.push(Move::FoundationToFreecell(suit));
            }
        }
    }

    moves
}

pub fn is_applicable(board: &Board, action: &Action) -> bool {
    match *action {
        Action::Move(mov) => is_move_applicable(board, mov),
        Action::Supermove(supermove) => is_supermove_applicable(board, supermove),
    }
}

fn is_move_applicable(board: &Board, mov: Move) -> bool {
    let tableau_top = |idx: usize| board.tableaus.get(idx).and_then(|t| t.peek_top());
    let freecell = |idx: usize| board.freecells.get(idx).copied().flatten();
    let in_range = |idx: usize| idx < TOTAL_TABLEAUS;

    match mov {
        Move::TableauToFoundation(from) => {
            tableau_top(from).is_some_and(|card| can_move_to_foundation(board, card))
        }
        Move::TableauToFreecell(from) => tableau_top(from).is_some() && can_move_to_freecell(board),
        Move::FreecellToFoundation(cell) => {
            freecell(cell).is_some_and(|card| can_move_to_foundation(board, card))
        }
        Move::TableauToTableau(from, to) => {
            from != to
                && in_range(to)
                && tableau_top(from).is_some_and(|card| can_move_to_tableau(board, card, to))
        }
        Move::FreecellToTableau(cell, to) => {
            in_range(to) && freecell(cell).is_some_and(|card| can_move_to_tableau(board, card, to))
        }
        Move::FoundationToTableau(suit, to) => {
            in_range(to)
                && board
                    .foundation_top(suit)
                    .is_some_and(|card| can_move_to_tableau(board, card, to))
        }
        Move::FoundationToFreecell(suit) => {
            board.foundation(suit) > 0 && can_move_to_freecell(board)
        }
    }
}

/// Largest run that can be moved onto `to`: `(F + 1) * 2^E`, where `E` does
/// not count `to` itself.
pub fn max_supermove_len(board: &Board, to: usize) -> usize {
    let free_cells = board.free_freecell_count();
    let empty_columns = board
        .tableaus
        .iter()
        .enumerate()
        .filter(|&(i, t)| i != to && t.is_empty())
        .count();
    (free_cells + 1) << empty_columns
}

fn is_supermove_applicable(board: &Board, supermove: Supermove) -> bool {
    let Supermove { from, to, count } = supermove;
    if from == to || from >= TOTAL_TABLEAUS || to >= TOTAL_TABLEAUS || count < 2 {
        return false;
    }
    let source = &board.tableaus[from];
    if count > source.run_len() || count > max_supermove_len(board, to) {
        return false;
    }
    let base = source.cards[source.len() - count];
    can_move_to_tableau(board, base, to)
}

/// Every legal supermove. Moving a whole column onto an empty one is skipped:
/// it only swaps two columns.
pub fn supermoves(board: &Board) -> Supermoves {
    let mut result = Supermoves::new();
    for (from, source) in board.tableaus.iter().enumerate() {
        let run_len = source.run_len();
        if run_len < 2 {
            continue;
        }
        for to in 0..TOTAL_TABLEAUS {
            if from == to {
                continue;
            }
            let max_len = run_len.min(max_supermove_len(board, to));
            match board.tableaus[to].peek_top() {
                Some(top) => {
                    // Only one run length can match the destination rank.
                    let base_rank = top.rank() as usize - 1;
                    let Some(count) = source
                        .peek_top()
                        .and_then(|card| (base_rank + 1).checked_sub(card.rank() as usize))
                    else {
                        continue;
                    };
                    if (2..=max_len).contains(&count)
                        && can_move_to_tableau(board, source.cards[source.len() - count], to)
                    {
                        result.push(Supermove { from, to, count });
                    }
                }
                None => {
                    for count in 2..=max_len {
                        if count == source.len() {
                            continue;
                        }
                        result.push(Supermove { from, to, count });
                    }
                }
            }
        }
    }
    result
}

/// Applies `action` to a copy of `board`. The input is never modified.
pub fn apply(board: &Board, action: impl Into<Action>) -> Result<Board, MoveError> {
    let mut board = board.clone();
    apply_in_place(&mut board, action)?;
    Ok(board)
}

/// Applies `action` to `board`, or leaves it untouched and reports
/// `MoveError::NotApplicable`.
pub fn apply_in_place(board: &mut Board, action: impl Into<Action>) -> Result<(), MoveError> {
    let action = action.into();
    if !is_applicable(board, &action) {
        return Err(MoveError::NotApplicable(action));
    }
    match action {
        Action::Move(mov) => match mov {
            Move::TableauToFoundation(from) => board.move_tableau_to_foundation(from),
            Move::TableauToFreecell(from) => {
                if let Some(cell) = board.first_free_freecell() {
                    board.move_tableau_to_freecell(from, cell);
                }
            }
            Move::FreecellToFoundation(cell) => board.move_freecell_to_foundation(cell),
            Move::TableauToTableau(from, to) => board.move_tableau_to_tableau(from, to, 1),
            Move::FreecellToTableau(cell, to) => board.move_freecell_to_tableau(cell, to),
            Move::FoundationToTableau(suit, to) => board.move_foundation_to_tableau(suit, to),
            Move::FoundationToFreecell(suit) => {
                if let Some(cell) = board.first_free_freecell() {
                    board.move_foundation_to_freecell(suit, cell);
                }
            }
        },
        Action::Supermove(Supermove { from, to, count }) => {
            board.move_tableau_to_tableau(from, to, count)
        }
    }
    Ok(())
}

/// Pushes every card the foundations are waiting for, repeating until a scan
/// finds nothing. Returns the moves made, in order.
pub fn auto_move(board: &mut Board) -> SmallVec<[Move; 8]> {
    let mut applied = SmallVec::new();
    loop {
        let mut found: SmallVec<[Move; 8]> = SmallVec::new();
        for (i, tableau) in board.tableaus.iter().enumerate() {
            if let Some(card) = tableau.peek_top()
                && can_move_to_foundation(board, card)
            {
                found.push(Move::TableauToFoundation(i));
            }
        }
        for (i, card) in board.freecells.iter().enumerate() {
            if let Some(card) = card
                && can_move_to_foundation(board, *card)
            {
                found.push(Move::FreecellToFoundation(i));
            }
        }
        if found.is_empty() {
            return applied;
        }
        // Each suit waits for a single rank, so the moves found in one scan
        // never conflict.
        for mov in found {
            if apply_in_place(board, mov).is_ok() {
                applied.push(mov);
            }
        }
    }
}

/// Replays a solution: cascade first, then each action followed by the cascade.
pub fn replay(board: &Board, actions: &[Action]) -> Result<Board, MoveError> {
    let mut board = board.clone();
    auto_move(&mut board);
    for action in actions {
        apply_in_place(&mut board, *action)?;
        auto_move(&mut board);
    }
    Ok(board)
}

pub fn is_solved(board: &Board) -> bool {
    board.is_solved()
}

/// Number of occupied free cells.
pub fn occupied_freecells(board: &Board) -> usize {
    TOTAL_FREECELLS - board.free_freecell_count()
}
