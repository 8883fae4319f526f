use crate::card::{Card, MAX_CARD, MAX_RANK, Suit, full_deck};

use anyhow::{Context, Result, bail};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use smallvec::SmallVec;

pub const TOTAL_FOUNDATIONS: usize = 4;
pub const TOTAL_FREECELLS: usize = 4;
pub const TOTAL_TABLEAUS: usize = 8;
const TABLEAU_SIZE: usize = 20;

/// A FreeCell position. This is a pure value: equality and hashing cover the
/// tableau, the free cells and the foundations, nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Board {
    pub tableaus: [Tableau; TOTAL_TABLEAUS],
    pub freecells: [Option<Card>; TOTAL_FREECELLS],
    /// Highest rank placed per suit, indexed by `Suit::index`.
    pub foundations: [u8; TOTAL_FOUNDATIONS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffles a full deck with a seeded generator and deals it.
    pub fn new_from_seed(seed: u64) -> Self {
        let mut deck = full_deck();
        let mut rng = StdRng::seed_from_u64(seed);
        deck.shuffle(&mut rng);
        Self::deal(&deck)
    }

    /// Deals cards round-robin: columns 0-3 receive 7 cards, 4-7 receive 6.
    pub fn deal(deck: &[Card]) -> Self {
        let mut board = Board::new();
        for (i, &card) in deck.iter().enumerate() {
            board.tableaus[i % TOTAL_TABLEAUS].push(card);
        }
        board
    }

    pub fn foundation(&self, suit: Suit) -> u8 {
        self.foundations[suit.index()]
    }

    pub fn foundation_top(&self, suit: Suit) -> Option<Card> {
        match self.foundation(suit) {
            0 => None,
            rank => Card::new(rank, suit).ok(),
        }
    }

    /// The card each suit is waiting for, if the suit is not complete.
    pub fn next_needed(&self, suit: Suit) -> Option<Card> {
        Card::new(self.foundation(suit) + 1, suit).ok()
    }

    pub fn is_solved(&self) -> bool {
        self.foundations.iter().all(|&rank| rank == MAX_RANK)
    }

    pub fn free_freecell_count(&self) -> usize {
        self.freecells.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn first_free_freecell(&self) -> Option<usize> {
        self.freecells.iter().position(|cell| cell.is_none())
    }

    pub fn empty_tableau_count(&self) -> usize {
        self.tableaus.iter().filter(|t| t.is_empty()).count()
    }

    /// Checks that each of the 52 cards appears in exactly one place.
    pub fn is_valid(&self) -> bool {
        let mut seen = [false; MAX_CARD as usize];
        let mut count = 0;
        let mut check_card = |card: Card| -> bool {
            let id = card.id() as usize;
            if seen[id] {
                return false;
            }
            seen[id] = true;
            count += 1;
            true
        };

        for suit in Suit::ALL {
            let top = self.foundation(suit);
            if top > MAX_RANK {
                return false;
            }
            for rank in 1..=top {
                let Ok(card) = Card::new(rank, suit) else {
                    return false;
                };
                if !check_card(card) {
                    return false;
                }
            }
        }
        for card in self.freecells.iter().flatten() {
            if !check_card(*card) {
                return false;
            }
        }
        for tableau in &self.tableaus {
            for &card in &tableau.cards {
                if !check_card(card) {
                    return false;
                }
            }
        }
        count == MAX_CARD as usize
    }

    pub fn move_tableau_to_foundation(&mut self, tableau_idx: usize) {
        if let Some(card) = self.tableaus[tableau_idx].pop() {
            self.foundations[card.suit().index()] = card.rank();
        }
    }

    pub fn move_tableau_to_freecell(&mut self, tableau_idx: usize, cell_idx: usize) {
        self.freecells[cell_idx] = self.tableaus[tableau_idx].pop();
    }

    pub fn move_freecell_to_foundation(&mut self, cell_idx: usize) {
        if let Some(card) = self.freecells[cell_idx].take() {
            self.foundations[card.suit().index()] = card.rank();
        }
    }

    pub fn move_tableau_to_tableau(&mut self, from_idx: usize, to_idx: usize, count: usize) {
        let cards = self.tableaus[from_idx].drain_top(count);
        self.tableaus[to_idx].cards.extend(cards);
    }

    pub fn move_freecell_to_tableau(&mut self, cell_idx: usize, tableau_idx: usize) {
        if let Some(card) = self.freecells[cell_idx].take() {
            self.tableaus[tableau_idx].push(card);
        }
    }

    pub fn move_foundation_to_tableau(&mut self, suit: Suit, tableau_idx: usize) {
        if let Some(card) = self.take_foundation_top(suit) {
            self.tableaus[tableau_idx].push(card);
        }
    }

    pub fn move_foundation_to_freecell(&mut self, suit: Suit, cell_idx: usize) {
        if let Some(card) = self.take_foundation_top(suit) {
            self.freecells[cell_idx] = Some(card);
        }
    }

    fn take_foundation_top(&mut self, suit: Suit) -> Option<Card> {
        let card = self.foundation_top(suit)?;
        self.foundations[suit.index()] -= 1;
        Some(card)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board: Self = Default::default();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Foundation") {
                let (_, cards) = Self::parse_indexed(rest, TOTAL_FOUNDATIONS)
                    .context("Invalid foundation index")
                    .with_context(line_context)?;
                if let Some(card) = cards.last() {
                    board.foundations[card.suit().index()] = card.rank();
                }
            } else if let Some(rest) = line.strip_prefix("Freecell") {
                let (idx, cards) = Self::parse_indexed(rest, TOTAL_FREECELLS)
                    .context("Invalid freecell index")
                    .with_context(line_context)?;
                if cards.len() > 1 {
                    bail!("A freecell holds at most one card; {}", line_context());
                }
                board.freecells[idx] = cards.first().copied();
            } else if let Some(rest) = line.strip_prefix("Tableau") {
                let (idx, cards) = Self::parse_indexed(rest, TOTAL_TABLEAUS)
                    .context("Invalid tableau index")
                    .with_context(line_context)?;
                board.tableaus[idx].cards.extend(cards);
            } else {
                bail!("Unknown line; {}", line_context());
            }
        }

        Ok(board)
    }

    fn parse_indexed(rest: &str, total: usize) -> Result<(usize, Vec<Card>)> {
        let mut parts = rest.splitn(2, ':');
        let idx = parts.next().unwrap_or("").trim().parse::<usize>()?;
        if idx == 0 || idx > total {
            bail!("Index {idx} out of range 1..={total}");
        }
        let cards = Self::parse_cards(parts.next().unwrap_or("").trim())?;
        Ok((idx - 1, cards))
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c1) = chars.peek() {
            if c1.is_whitespace() || c1 == '|' {
                chars.next();
                continue;
            }
            let rank = c1;
            chars.next();
            let suit = match chars.next() {
                Some(s) => s,
                None => bail!("Missing suit after rank {rank}"),
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn pretty_print(&self) -> String {
        let mut lines = vec![];

        // Foundations
        for suit in Suit::ALL {
            if let Some(card) = self.foundation_top(suit) {
                lines.push(format!(
                    "Foundation{}: {}",
                    suit.index() + 1,
                    card.pretty_print()
                ));
            }
        }

        // Freecells
        for (i, card) in self.freecells.iter().enumerate() {
            if let Some(card) = card {
                lines.push(format!("Freecell{}: {}", i + 1, card.pretty_print()));
            }
        }

        // Tableaus
        for (i, tableau) in self.tableaus.iter().enumerate() {
            if tableau.is_empty() {
                continue;
            }
            let cards: String = tableau.cards.iter().map(|c| c.pretty_print()).collect();
            lines.push(format!("Tableau{}: {cards}", i + 1));
        }

        lines.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tableau {
    /// Bottom to top.
    pub cards: SmallVec<[Card; TABLEAU_SIZE]>,
}

impl Tableau {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn drain_top(&mut self, count: usize) -> SmallVec<[Card; TABLEAU_SIZE]> {
        let len = self.cards.len();
        self.cards.drain(len - count.min(len)..).collect()
    }

    /// Length of the rank-descending, alternating-colour run ending at the top.
    pub fn run_len(&self) -> usize {
        let mut count = 0;
        let mut above: Option<&Card> = None;
        for card in self.cards.iter().rev() {
            if let Some(above) = above
                && !above.stacks_on(card)
            {
                break;
            }
            count += 1;
            above = Some(card);
        }
        count
    }

    /// Position from the top of the first card matching `card`: 0 when exposed.
    pub fn depth_of(&self, card: Card) -> Option<usize> {
        self.cards.iter().rev().position(|&c| c == card)
    }
}
