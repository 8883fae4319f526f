//! JSON save files and preset catalogs.

use crate::board::{Board, TOTAL_FREECELLS, TOTAL_TABLEAUS};
use crate::card::{Card, MAX_RANK, Suit};
use crate::error::PersistenceError;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// On-disk shape of a deal, with optional elapsed play time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub tableau: Vec<Vec<Card>>,
    #[serde(default)]
    pub free_cells: Vec<Option<Card>>,
    /// Top rank per suit; suits left out are empty.
    #[serde(default)]
    pub foundations: BTreeMap<Suit, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

impl SavedGame {
    pub fn from_board(board: &Board, elapsed: Option<Duration>) -> Self {
        let secs = elapsed.map(|e| e.as_secs());
        Self {
            tableau: board
                .tableaus
                .iter()
                .map(|t| t.cards.to_vec())
                .collect(),
            free_cells: board.freecells.to_vec(),
            foundations: Suit::ALL
                .into_iter()
                .map(|suit| (suit, board.foundation(suit)))
                .collect(),
            minutes: secs.map(|s| s / 60),
            seconds: secs.map(|s| s % 60),
        }
    }

    pub fn to_board(&self) -> Result<Board, PersistenceError> {
        if self.tableau.len() != TOTAL_TABLEAUS {
            return Err(PersistenceError::InvalidDeal(format!(
                "expected {TOTAL_TABLEAUS} tableau columns, found {}",
                self.tableau.len()
            )));
        }
        if self.free_cells.len() > TOTAL_FREECELLS {
            return Err(PersistenceError::InvalidDeal(format!(
                "expected at most {TOTAL_FREECELLS} free cells, found {}",
                self.free_cells.len()
            )));
        }

        let mut board = Board::new();
        for (tableau, cards) in board.tableaus.iter_mut().zip(&self.tableau) {
            tableau.cards.extend(cards.iter().copied());
        }
        for (cell, card) in board.freecells.iter_mut().zip(&self.free_cells) {
            *cell = *card;
        }
        for (&suit, &rank) in &self.foundations {
            if rank > MAX_RANK {
                return Err(PersistenceError::InvalidDeal(format!(
                    "foundation {} holds rank {rank}",
                    suit.name()
                )));
            }
            board.foundations[suit.index()] = rank;
        }

        if !board.is_valid() {
            return Err(PersistenceError::InvalidDeal(
                "every card must appear exactly once".to_string(),
            ));
        }
        Ok(board)
    }

    /// Elapsed time, when either field was recorded.
    pub fn elapsed(&self) -> Result<Option<Duration>, PersistenceError> {
        if self.minutes.is_none() && self.seconds.is_none() {
            return Ok(None);
        }
        let secs = self
            .minutes
            .unwrap_or(0)
            .checked_mul(60)
            .and_then(|secs| secs.checked_add(self.seconds.unwrap_or(0)))
            .ok_or_else(|| PersistenceError::InvalidDeal("elapsed time out of range".to_string()))?;
        Ok(Some(Duration::from_secs(secs)))
    }
}

/// A named deal from a preset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(flatten)]
    pub game: SavedGame,
}

fn read_file(path: &Path) -> Result<String, PersistenceError> {
    fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_game(
    path: impl AsRef<Path>,
    board: &Board,
    elapsed: Option<Duration>,
) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let data = serde_json::to_string_pretty(&SavedGame::from_board(board, elapsed))?;
    fs::write(path, data).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Saved game to {}", path.display());
    Ok(())
}

pub fn load_game(path: impl AsRef<Path>) -> Result<(Board, Option<Duration>), PersistenceError> {
    let saved: SavedGame = serde_json::from_str(&read_file(path.as_ref())?)?;
    let board = saved.to_board()?;
    Ok((board, saved.elapsed()?))
}

pub fn load_presets(path: impl AsRef<Path>) -> Result<Vec<Preset>, PersistenceError> {
    let presets: Vec<Preset> = serde_json::from_str(&read_file(path.as_ref())?)?;
    log::debug!("Loaded {} presets", presets.len());
    Ok(presets)
}

pub fn find_preset(presets: &[Preset], name: &str) -> Result<Board, PersistenceError> {
    presets
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| PersistenceError::PresetNotFound(name.to_string()))?
        .game
        .to_board()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{apply, legal_moves};

    fn played_board() -> Board {
        let mut board = Board::new_from_seed(11);
        for _ in 0..6 {
            let Some(&mov) = legal_moves(&board).first() else {
                break;
            };
            board = apply(&board, mov).unwrap();
        }
        board
    }

    #[test]
    fn test_round_trip() {
        let board = played_board();
        let saved = SavedGame::from_board(&board, None);
        assert_eq!(saved.to_board().unwrap(), board);
        assert_eq!(saved.elapsed().unwrap(), None);

        let json = serde_json::to_string(&saved).unwrap();
        let back: SavedGame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_board().unwrap(), board);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_game.json");
        let board = played_board();
        save_game(&path, &board, Some(Duration::from_secs(125))).unwrap();

        let (loaded, elapsed) = load_game(&path).unwrap();
        assert_eq!(loaded, board);
        assert_eq!(elapsed, Some(Duration::from_secs(125)));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains(r#""minutes": 2"#));
        assert!(raw.contains(r#""colour""#));
    }

    #[test]
    fn test_missing_sections_default() {
        let mut saved = SavedGame::from_board(&Board::new_from_seed(3), None);
        saved.free_cells.clear();
        saved.foundations.clear();
        let json = serde_json::to_string(&saved).unwrap();
        let json = json
            .replace(r#","free_cells":[]"#, "")
            .replace(r#","foundations":{}"#, "");
        let back: SavedGame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_board().unwrap(), Board::new_from_seed(3));
    }

    #[test]
    fn test_invalid_deals() {
        let board = Board::new_from_seed(5);

        let mut saved = SavedGame::from_board(&board, None);
        saved.tableau.pop();
        assert!(matches!(
            saved.to_board(),
            Err(PersistenceError::InvalidDeal(_))
        ));

        let mut saved = SavedGame::from_board(&board, None);
        saved.free_cells.push(None);
        assert!(saved.to_board().is_err());

        let mut saved = SavedGame::from_board(&board, None);
        saved.foundations.insert(Suit::Clubs, 14);
        assert!(saved.to_board().is_err());

        let mut saved = SavedGame::from_board(&board, None);
        let card = saved.tableau[0][0];
        saved.tableau[1].push(card);
        assert!(saved.to_board().is_err());
    }

    #[test]
    fn test_elapsed_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_game.json");
        let mut saved = SavedGame::from_board(&Board::new_from_seed(4), None);
        saved.minutes = Some(u64::MAX);
        saved.seconds = Some(1);
        fs::write(&path, serde_json::to_string(&saved).unwrap()).unwrap();
        assert!(matches!(
            load_game(&path),
            Err(PersistenceError::InvalidDeal(_))
        ));

        saved.minutes = Some(u64::MAX / 60);
        saved.seconds = Some(59);
        assert!(saved.elapsed().is_err());

        saved.minutes = None;
        saved.seconds = Some(u64::MAX);
        assert_eq!(
            saved.elapsed().unwrap(),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_game(&missing),
            Err(PersistenceError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(load_game(&broken), Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_presets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        let presets = vec![
            Preset {
                name: "Easy".to_string(),
                game: SavedGame::from_board(&Board::new_from_seed(1), None),
            },
            Preset {
                name: "Hard".to_string(),
                game: SavedGame::from_board(&Board::new_from_seed(2), None),
            },
        ];
        fs::write(&path, serde_json::to_string(&presets).unwrap()).unwrap();

        let loaded = load_presets(&path).unwrap();
        assert_eq!(loaded, presets);
        assert_eq!(
            find_preset(&loaded, "Hard").unwrap(),
            Board::new_from_seed(2)
        );
        assert!(matches!(
            find_preset(&loaded, "Medium"),
            Err(PersistenceError::PresetNotFound(_))
        ));
    }
}
