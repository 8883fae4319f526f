use freecell_common::action::Action;
use freecell_common::board::Board;
use freecell_common::card::{MAX_RANK, Suit};
use freecell_common::rules::{apply, auto_move, legal_moves, occupied_freecells, supermoves};

/// Weights of the four heuristic terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weights {
    pub foundation_weight: u32,
    pub free_cell_weight: u32,
    pub empty_column_weight: u32,
    pub blocked_card_weight: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            foundation_weight: 2,
            free_cell_weight: 1,
            empty_column_weight: 1,
            blocked_card_weight: 1,
        }
    }
}

/// Cards still missing from the foundations.
pub fn foundation_score(board: &Board) -> u32 {
    Suit::ALL
        .into_iter()
        .map(|suit| (MAX_RANK - board.foundation(suit)) as u32)
        .sum()
}

/// Half the total number of cards sitting on top of each suit's next card.
pub fn blocked_next_cards(board: &Board) -> u32 {
    let mut depth = 0;
    for suit in Suit::ALL {
        let Some(card) = board.next_needed(suit) else {
            continue;
        };
        if let Some(d) = board.tableaus.iter().find_map(|t| t.depth_of(card)) {
            depth += d as u32;
        }
    }
    depth / 2
}

/// Lower is closer to solved; a solved board scores 0.
pub fn estimate(board: &Board, weights: &Weights) -> u32 {
    let cost = weights
        .foundation_weight
        .saturating_mul(foundation_score(board))
        .saturating_add(weights.free_cell_weight.saturating_mul(occupied_freecells(board) as u32))
        .saturating_add(weights.blocked_card_weight.saturating_mul(blocked_next_cards(board)));
    let reward = weights
        .empty_column_weight
        .saturating_mul(board.empty_tableau_count() as u32);
    cost.saturating_sub(reward)
}

/// Every legal action with the estimate of the board it leads to, best
/// first. Equal scores keep move-category order.
pub fn rank_moves(board: &Board, weights: &Weights) -> Vec<(Action, u32)> {
    let candidates = legal_moves(board)
        .into_iter()
        .map(Action::from)
        .chain(supermoves(board).into_iter().map(Action::from));

    let mut ranked: Vec<(Action, u32)> = candidates
        .filter_map(|action| {
            let mut next = apply(board, action).ok()?;
            auto_move(&mut next);
            Some((action, estimate(&next, weights)))
        })
        .collect();
    ranked.sort_by_key(|&(_, score)| score);
    ranked
}

pub fn hint(board: &Board, weights: &Weights) -> Option<Action> {
    rank_moves(board, weights).first().map(|&(action, _)| action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freecell_common::action::Move;

    #[test]
    fn test_solved_scores_zero() {
        let mut board = Board::new();
        board.foundations = [MAX_RANK; 4];
        assert_eq!(estimate(&board, &Weights::default()), 0);
    }

    #[test]
    fn test_terms() {
        let board = Board::parse(
            r#"Foundation1: 2♥
Freecell1: K♣
Tableau1: 3♥Q♦J♠
Tableau2: A♦5♠4♠9♥"#,
        )
        .unwrap();
        assert_eq!(foundation_score(&board), 11 + 13 + 13 + 13);
        // 3♥ under two cards, A♦ under three, A♣/A♠ absent.
        assert_eq!(blocked_next_cards(&board), 2);

        let weights = Weights {
            foundation_weight: 1,
            free_cell_weight: 10,
            empty_column_weight: 100,
            blocked_card_weight: 1000,
        };
        assert_eq!(estimate(&board, &weights), 50 + 10 + 2000 - 600);
    }

    #[test]
    fn test_large_weights_saturate() {
        let board = Board::new_from_seed(1);
        let weights = Weights {
            foundation_weight: 100_000_000,
            ..Weights::default()
        };
        assert_eq!(estimate(&board, &weights), u32::MAX);

        let weights = Weights {
            empty_column_weight: u32::MAX,
            ..Weights::default()
        };
        let open = Board::parse("Tableau1: K♠Q♥").unwrap();
        assert_eq!(estimate(&open, &weights), 0);
    }

    #[test]
    fn test_monotonic_in_foundations_and_burial() {
        let weights = Weights::default();
        let buried = Board::parse("Tableau1: A♥5♠6♠7♠\nTableau2: 8♠").unwrap();
        let exposed = Board::parse("Tableau1: 5♠6♠7♠A♥\nTableau2: 8♠").unwrap();
        assert!(estimate(&exposed, &weights) < estimate(&buried, &weights));

        let placed = Board::parse("Foundation1: A♥\nTableau1: 5♠6♠7♠\nTableau2: 8♠").unwrap();
        assert!(estimate(&placed, &weights) < estimate(&exposed, &weights));
    }

    #[test]
    fn test_hint_prefers_progress() {
        let board = Board::parse(
            r#"Foundation1: Q♥
Foundation2: K♦
Foundation3: K♣
Foundation4: Q♠
Tableau1: K♠
Tableau2: 5♣K♥"#,
        )
        .unwrap();
        assert_eq!(
            hint(&board, &Weights::default()),
            Some(Action::Move(Move::TableauToFoundation(0)))
        );
        let ranked = rank_moves(&board, &Weights::default());
        assert!(ranked.windows(2).all(|w| w[0].1 <= w[1].1));
    }
}
