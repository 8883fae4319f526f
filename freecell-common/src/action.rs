use crate::board::{Board, TOTAL_FREECELLS, TOTAL_TABLEAUS};
use crate::card::{Card, Suit};
use crate::error::MoveError;
use crate::rules::{apply, auto_move};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The seven move categories, declared in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    TableauToFoundation,
    TableauToFreecell,
    FreecellToFoundation,
    TableauToTableau,
    FreecellToTableau,
    FoundationToTableau,
    FoundationToFreecell,
}

impl MoveKind {
    pub const ALL: [MoveKind; 7] = [
        MoveKind::TableauToFoundation,
        MoveKind::TableauToFreecell,
        MoveKind::FreecellToFoundation,
        MoveKind::TableauToTableau,
        MoveKind::FreecellToTableau,
        MoveKind::FoundationToTableau,
        MoveKind::FoundationToFreecell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::TableauToFoundation => "tableau_to_foundation",
            MoveKind::TableauToFreecell => "tableau_to_freecell",
            MoveKind::FreecellToFoundation => "freecell_to_foundation",
            MoveKind::TableauToTableau => "tableau_to_tableau",
            MoveKind::FreecellToTableau => "freecell_to_tableau",
            MoveKind::FoundationToTableau => "foundation_to_tableau",
            MoveKind::FoundationToFreecell => "foundation_to_freecell",
        }
    }

    pub fn from_foundation(&self) -> bool {
        matches!(
            self,
            MoveKind::FoundationToTableau | MoveKind::FoundationToFreecell
        )
    }
}

impl FromStr for MoveKind {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MoveError::InvalidMoveType(s.to_string()))
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-card transition. Free cell destinations are implicit: the card
/// goes to the first empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoveRecord", into = "MoveRecord")]
pub enum Move {
    TableauToFoundation(usize),
    TableauToFreecell(usize),
    FreecellToFoundation(usize),
    TableauToTableau(usize, usize),   // (from_index, to_index)
    FreecellToTableau(usize, usize),  // (cell_index, to_index)
    FoundationToTableau(Suit, usize), // (suit, to_index)
    FoundationToFreecell(Suit),
}

impl Move {
    /// Builds a move from its loose `(type, source, destination)` description.
    pub fn new(kind: MoveKind, source: usize, destination: Option<usize>) -> Result<Self, MoveError> {
        let malformed = |reason| MoveError::Malformed { kind, reason };
        let tableau = |idx: usize| {
            if idx < TOTAL_TABLEAUS {
                Ok(idx)
            } else {
                Err(malformed("tableau index out of range"))
            }
        };
        let freecell = |idx: usize| {
            if idx < TOTAL_FREECELLS {
                Ok(idx)
            } else {
                Err(malformed("free cell index out of range"))
            }
        };
        let suit = |idx: usize| Suit::from_index(idx).ok_or(malformed("suit index out of range"));
        let dest = || destination.ok_or(malformed("missing destination"));
        let no_dest = || match destination {
            None => Ok(()),
            Some(_) => Err(malformed("unexpected destination")),
        };

        let mov = match kind {
            MoveKind::TableauToFoundation => {
                no_dest()?;
                Move::TableauToFoundation(tableau(source)?)
            }
            MoveKind::TableauToFreecell => {
                no_dest()?;
                Move::TableauToFreecell(tableau(source)?)
            }
            MoveKind::FreecellToFoundation => {
                no_dest()?;
                Move::FreecellToFoundation(freecell(source)?)
            }
            MoveKind::TableauToTableau => {
                let (from, to) = (tableau(source)?, tableau(dest()?)?);
                if from == to {
                    return Err(malformed("source and destination are the same column"));
                }
                Move::TableauToTableau(from, to)
            }
            MoveKind::FreecellToTableau => {
                Move::FreecellToTableau(freecell(source)?, tableau(dest()?)?)
            }
            MoveKind::FoundationToTableau => {
                Move::FoundationToTableau(suit(source)?, tableau(dest()?)?)
            }
            MoveKind::FoundationToFreecell => {
                no_dest()?;
                Move::FoundationToFreecell(suit(source)?)
            }
        };
        Ok(mov)
    }

    pub fn kind(&self) -> MoveKind {
        match self {
            Move::TableauToFoundation(_) => MoveKind::TableauToFoundation,
            Move::TableauToFreecell(_) => MoveKind::TableauToFreecell,
            Move::FreecellToFoundation(_) => MoveKind::FreecellToFoundation,
            Move::TableauToTableau(..) => MoveKind::TableauToTableau,
            Move::FreecellToTableau(..) => MoveKind::FreecellToTableau,
            Move::FoundationToTableau(..) => MoveKind::FoundationToTableau,
            Move::FoundationToFreecell(_) => MoveKind::FoundationToFreecell,
        }
    }

    /// Tableau, free cell or suit index the card leaves from.
    pub fn source(&self) -> usize {
        match *self {
            Move::TableauToFoundation(idx)
            | Move::TableauToFreecell(idx)
            | Move::FreecellToFoundation(idx)
            | Move::TableauToTableau(idx, _)
            | Move::FreecellToTableau(idx, _) => idx,
            Move::FoundationToTableau(suit, _) | Move::FoundationToFreecell(suit) => suit.index(),
        }
    }

    /// Destination tableau index, when the destination is not implicit.
    pub fn destination(&self) -> Option<usize> {
        match *self {
            Move::TableauToTableau(_, to)
            | Move::FreecellToTableau(_, to)
            | Move::FoundationToTableau(_, to) => Some(to),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::TableauToFoundation(idx) => write!(f, "T{}:F", idx + 1),
            Move::TableauToFreecell(idx) => write!(f, "T{}:C", idx + 1),
            Move::FreecellToFoundation(idx) => write!(f, "C{}:F", idx + 1),
            Move::TableauToTableau(from, to) => write!(f, "T{}:T{}", from + 1, to + 1),
            Move::FreecellToTableau(cell, to) => write!(f, "C{}:T{}", cell + 1, to + 1),
            Move::FoundationToTableau(suit, to) => write!(f, "F{suit}:T{}", to + 1),
            Move::FoundationToFreecell(suit) => write!(f, "F{suit}:C"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MoveRecord {
    #[serde(rename = "type")]
    kind: String,
    source: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination: Option<usize>,
}

impl TryFrom<MoveRecord> for Move {
    type Error = MoveError;

    fn try_from(record: MoveRecord) -> Result<Self, Self::Error> {
        let kind = record.kind.parse()?;
        Move::new(kind, record.source, record.destination)
    }
}

impl From<Move> for MoveRecord {
    fn from(mov: Move) -> Self {
        MoveRecord {
            kind: mov.kind().to_string(),
            source: mov.source(),
            destination: mov.destination(),
        }
    }
}

/// Transfer of a descending, alternating-colour run of `count >= 2` cards
/// between two tableau columns as one logical step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Supermove {
    pub from: usize,
    pub to: usize,
    pub count: usize,
}

impl Supermove {
    pub fn new(from: usize, to: usize, count: usize) -> Result<Self, MoveError> {
        if from >= TOTAL_TABLEAUS || to >= TOTAL_TABLEAUS || from == to || count < 2 {
            return Err(MoveError::Malformed {
                kind: MoveKind::TableauToTableau,
                reason: "invalid supermove columns or count",
            });
        }
        Ok(Supermove { from, to, count })
    }
}

impl fmt::Display for Supermove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}:T{}@{}", self.from + 1, self.to + 1, self.count)
    }
}

/// One step of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ActionRecord", into = "ActionRecord")]
pub enum Action {
    Move(Move),
    Supermove(Supermove),
}

impl Action {
    pub fn is_supermove(&self) -> bool {
        matches!(self, Action::Supermove(_))
    }
}

impl From<Move> for Action {
    fn from(mov: Move) -> Self {
        Action::Move(mov)
    }
}

impl From<Supermove> for Action {
    fn from(supermove: Supermove) -> Self {
        Action::Supermove(supermove)
    }
}

const SUPERMOVE_TYPE: &str = "supermove";

/// Wire shape shared by both kinds of action; `count` only appears on
/// supermoves.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActionRecord {
    #[serde(rename = "type")]
    kind: String,
    source: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl TryFrom<ActionRecord> for Action {
    type Error = MoveError;

    fn try_from(record: ActionRecord) -> Result<Self, Self::Error> {
        if record.kind == SUPERMOVE_TYPE {
            let malformed = |reason| MoveError::Malformed {
                kind: MoveKind::TableauToTableau,
                reason,
            };
            let to = record.destination.ok_or(malformed("missing destination"))?;
            let count = record.count.ok_or(malformed("missing count"))?;
            return Ok(Supermove::new(record.source, to, count)?.into());
        }
        let kind: MoveKind = record.kind.parse()?;
        if record.count.is_some() {
            return Err(MoveError::Malformed {
                kind,
                reason: "count is only valid on supermoves",
            });
        }
        Ok(Move::new(kind, record.source, record.destination)?.into())
    }
}

impl From<Action> for ActionRecord {
    fn from(action: Action) -> Self {
        match action {
            Action::Move(mov) => ActionRecord {
                kind: mov.kind().to_string(),
                source: mov.source(),
                destination: mov.destination(),
                count: None,
            },
            Action::Supermove(Supermove { from, to, count }) => ActionRecord {
                kind: SUPERMOVE_TYPE.to_string(),
                source: from,
                destination: Some(to),
                count: Some(count),
            },
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(mov) => write!(f, "{mov}"),
            Action::Supermove(supermove) => write!(f, "{supermove}"),
        }
    }
}

pub fn format_actions(actions: &[Action]) -> String {
    let list: Vec<String> = actions.iter().map(|action| action.to_string()).collect();

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.chars().count()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

pub fn describe_action(board: &Board, action: &Action) -> String {
    let format_card =
        |card: Option<Card>| -> String { card.map(|c| c.pretty_print()).unwrap_or_default() };
    let foundation_top = |suit: Suit| board.foundation_top(suit);

    match *action {
        Action::Move(Move::TableauToFoundation(idx)) => {
            let card = board.tableaus[idx].peek_top();
            let to_card = card.and_then(|c| foundation_top(c.suit()));
            format!(
                "(Tableau{}) {} -> (Foundation) {}",
                idx + 1,
                format_card(card),
                format_card(to_card)
            )
        }
        Action::Move(Move::TableauToFreecell(idx)) => {
            let card = board.tableaus[idx].peek_top();
            format!("(Tableau{}) {} -> (Freecell)", idx + 1, format_card(card))
        }
        Action::Move(Move::FreecellToFoundation(cell)) => {
            let card = board.freecells[cell];
            let to_card = card.and_then(|c| foundation_top(c.suit()));
            format!(
                "(Freecell{}) {} -> (Foundation) {}",
                cell + 1,
                format_card(card),
                format_card(to_card)
            )
        }
        Action::Move(Move::TableauToTableau(from, to)) => {
            let card = board.tableaus[from].peek_top();
            let to_card = board.tableaus[to].peek_top();
            format!(
                "(Tableau{}) {} -> (Tableau{}) {}",
                from + 1,
                format_card(card),
                to + 1,
                format_card(to_card)
            )
        }
        Action::Move(Move::FreecellToTableau(cell, to)) => {
            let card = board.freecells[cell];
            let to_card = board.tableaus[to].peek_top();
            format!(
                "(Freecell{}) {} -> (Tableau{}) {}",
                cell + 1,
                format_card(card),
                to + 1,
                format_card(to_card)
            )
        }
        Action::Move(Move::FoundationToTableau(suit, to)) => {
            let to_card = board.tableaus[to].peek_top();
            format!(
                "(Foundation) {} -> (Tableau{}) {}",
                format_card(foundation_top(suit)),
                to + 1,
                format_card(to_card)
            )
        }
        Action::Move(Move::FoundationToFreecell(suit)) => {
            format!(
                "(Foundation) {} -> (Freecell)",
                format_card(foundation_top(suit))
            )
        }
        Action::Supermove(Supermove { from, to, count }) => {
            let from_cards = &board.tableaus[from].cards;
            let cards = from_cards
                .iter()
                .skip(from_cards.len().saturating_sub(count))
                .map(|c| c.pretty_print())
                .collect::<Vec<_>>()
                .join("");
            let to_card = board.tableaus[to].peek_top();
            format!(
                "(Tableau{}) {cards} -> (Tableau{}) {}",
                from + 1,
                to + 1,
                format_card(to_card)
            )
        }
    }
}

/// Replays `actions` from `board`, describing every step including the
/// automatic moves that follow it.
pub fn describe_solution(board: &Board, actions: &[Action]) -> Result<Vec<String>, MoveError> {
    let mut board = board.clone();
    let mut lines = vec![];

    describe_auto_moves(&mut board, &mut lines);
    for (index, action) in actions.iter().enumerate() {
        lines.push(format!(
            "{:03}/{:03} {}",
            index + 1,
            actions.len(),
            describe_action(&board, action)
        ));
        board = apply(&board, *action)?;
        describe_auto_moves(&mut board, &mut lines);
    }
    Ok(lines)
}

fn describe_auto_moves(board: &mut Board, lines: &mut Vec<String>) {
    let mut current = board.clone();
    for mov in auto_move(board) {
        lines.push(format!("  auto {}", describe_action(&current, &Action::Move(mov))));
        if let Ok(next) = apply(&current, mov) {
            current = next;
        }
    }
}
