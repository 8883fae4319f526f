use crate::error::CardError;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

const SUITS: [char; 4] = ['♥', '♦', '♣', '♠'];
const ASCII_SUITS: [char; 4] = ['H', 'D', 'C', 'S'];
const RANKS: [char; 13] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; MAX_SUIT as usize] =
        [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    pub fn symbol(self) -> char {
        SUITS[self.index()]
    }

    pub fn parse(c: char) -> Option<Self> {
        SUITS
            .iter()
            .position(|&s| s == c)
            .or_else(|| ASCII_SUITS.iter().position(|&s| s == c.to_ascii_uppercase()))
            .and_then(Self::from_index)
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
}

/// A playing card packed into one byte: `suit * 13 + (rank - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "CardRecord", into = "CardRecord")]
pub struct Card(u8);

impl Card {
    /// Builds a card from a rank in `1..=13`.
    pub fn new(rank: u8, suit: Suit) -> Result<Self, CardError> {
        if !(1..=MAX_RANK).contains(&rank) {
            return Err(CardError::InvalidRank(rank));
        }
        Ok(Self(suit.index() as u8 * MAX_RANK + rank - 1))
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let rank_idx = RANKS
            .iter()
            .position(|&r| r == rank.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit = Suit::parse(suit).with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Self(suit.index() as u8 * MAX_RANK + rank_idx as u8))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    /// Rank in `1..=13`, ace low.
    pub fn rank(&self) -> u8 {
        self.0 % MAX_RANK + 1
    }

    pub fn suit(&self) -> Suit {
        Suit::ALL[(self.0 / MAX_RANK) as usize]
    }

    pub fn color(&self) -> Color {
        self.suit().color()
    }

    pub fn is_ace(&self) -> bool {
        self.rank() == 1
    }

    /// Whether `self` may sit directly on `other` in a tableau run.
    pub fn stacks_on(&self, other: &Card) -> bool {
        self.rank() + 1 == other.rank() && self.color() != other.color()
    }

    pub fn pretty_print(&self) -> String {
        format!("{}{}", RANKS[(self.rank() - 1) as usize], self.suit().symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CardRecord {
    rank: u8,
    suit: Suit,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    colour: Option<Color>,
}

impl TryFrom<CardRecord> for Card {
    type Error = CardError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        Card::new(record.rank, record.suit)
    }
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        CardRecord {
            rank: card.rank(),
            suit: card.suit(),
            colour: Some(card.color()),
        }
    }
}

/// All 52 cards ordered by suit then rank.
pub fn full_deck() -> [Card; MAX_CARD as usize] {
    std::array::from_fn(|i| Card(i as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_suit_color() {
        let card = Card::new(12, Suit::Diamonds).unwrap();
        assert_eq!(card.rank(), 12);
        assert_eq!(card.suit(), Suit::Diamonds);
        assert_eq!(card.color(), Color::Red);
        assert_eq!(card.pretty_print(), "Q♦");

        let card = Card::new(1, Suit::Spades).unwrap();
        assert!(card.is_ace());
        assert_eq!(card.color(), Color::Black);
    }

    #[test]
    fn test_invalid_rank() {
        assert!(matches!(
            Card::new(0, Suit::Hearts),
            Err(CardError::InvalidRank(0))
        ));
        assert!(Card::new(14, Suit::Clubs).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Card::parse('T', '♣').unwrap(), Card::new(10, Suit::Clubs).unwrap());
        assert_eq!(Card::parse('k', 'h').unwrap(), Card::new(13, Suit::Hearts).unwrap());
        assert!(Card::parse('X', '♣').is_err());
        assert!(Card::parse('A', '?').is_err());
    }

    #[test]
    fn test_stacks_on() {
        let seven_red = Card::new(7, Suit::Hearts).unwrap();
        let eight_black = Card::new(8, Suit::Spades).unwrap();
        let eight_red = Card::new(8, Suit::Diamonds).unwrap();
        assert!(seven_red.stacks_on(&eight_black));
        assert!(!seven_red.stacks_on(&eight_red));
        assert!(!eight_black.stacks_on(&seven_red));
    }

    #[test]
    fn test_json_record() {
        let card = Card::new(3, Suit::Clubs).unwrap();
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"rank":3,"suit":"clubs","colour":"black"}"#);
        let back: Card = serde_json::from_str(r#"{"rank":3,"suit":"clubs"}"#).unwrap();
        assert_eq!(back, card);
        assert!(serde_json::from_str::<Card>(r#"{"rank":0,"suit":"clubs"}"#).is_err());
    }

    #[test]
    fn test_full_deck() {
        let deck = full_deck();
        assert_eq!(deck[0], Card::new(1, Suit::Hearts).unwrap());
        assert_eq!(deck[51], Card::new(13, Suit::Spades).unwrap());
    }
}
