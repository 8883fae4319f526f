use freecell_common::action::describe_solution;
use freecell_common::board::Board;
use freecell_common::rules::{legal_moves, replay};
use freecell_solver::{Exhausted, SolveOutcome, Solver, Strategy, Weights, solve};

const ONE_STEP: &str = r#"Foundation1: K♥
Foundation2: K♦
Foundation3: K♣
Foundation4: J♠
Tableau1: Q♠K♠"#;

const TWO_STEPS: &str = r#"Foundation1: K♥
Foundation2: K♦
Foundation3: K♣
Foundation4: T♠
Tableau1: J♠K♠Q♠"#;

const KINGS_ON_TENS: &str = r#"Foundation1: 9♥
Foundation2: 9♦
Foundation3: 9♣
Foundation4: 9♠
Tableau1: T♥K♠
Tableau2: T♦K♣
Tableau3: T♣K♥
Tableau4: T♠K♦
Tableau5: J♥Q♠
Tableau6: J♦Q♣
Tableau7: J♣Q♥
Tableau8: J♠Q♦"#;

/// Nine of hearts under three hearts; the lone K♥ tempts DFS into a wasted
/// free cell move.
const DEEP_BURIAL: &str = r#"Foundation1: 8♥
Foundation2: K♦
Foundation3: K♣
Foundation4: K♠
Tableau1: K♥
Tableau2: 9♥J♥T♥Q♥"#;

/// Two free cell moves solve it. With free cells as the only cost, A* first
/// reaches the solved state through Q♦→K♠, J♣→Q♦, Q♠ and only then finds the
/// two-move path.
const DETOUR: &str = r#"Foundation1: 9♥
Foundation2: 9♦
Foundation3: 9♣
Foundation4: J♠
Freecell1: Q♦
Tableau1: T♣Q♠J♣
Tableau2: K♠
Tableau3: T♦K♣
Tableau4: T♥K♦
Tableau5: Q♥J♦
Tableau6: J♥
Tableau7: Q♣
Tableau8: K♥"#;

/// Every two is buried, the free cells are full and no tableau move exists.
const DEADLOCK: &str = r#"Foundation1: A♥
Foundation2: A♦
Foundation3: A♣
Foundation4: A♠
Freecell1: K♣
Freecell2: K♠
Freecell3: Q♣
Freecell4: Q♠
Tableau1: 2♥3♥4♥5♥6♥J♣
Tableau2: 2♦3♦4♦5♦6♦J♠
Tableau3: 2♣3♣4♣5♣6♣T♣
Tableau4: 2♠3♠4♠5♠6♠T♠
Tableau5: 7♥8♥9♥T♥9♣
Tableau6: 7♦8♦9♦T♦9♠
Tableau7: J♥Q♥K♥7♣8♣
Tableau8: J♦Q♦K♦7♠8♠"#;

fn parse(s: &str) -> Board {
    let board = Board::parse(s).unwrap();
    assert!(board.is_valid());
    board
}

fn solved_actions(board: &Board, solver: Solver) -> usize {
    match solver.solve(board).unwrap() {
        SolveOutcome::Solved(solution) => {
            assert!(replay(board, &solution.actions).unwrap().is_solved());
            solution.actions.len()
        }
        SolveOutcome::NoSolution(none) => {
            panic!("{} found no solution: {}", solver.strategy(), none.reason)
        }
    }
}

#[test]
fn test_bfs_optimal_length() {
    let cases = [(ONE_STEP, 1), (TWO_STEPS, 2), (DEEP_BURIAL, 3), (DETOUR, 2)];
    for (board_str, depth) in cases {
        let board = parse(board_str);
        assert_eq!(solved_actions(&board, Solver::new(Strategy::Bfs)), depth);
    }
}

#[test]
fn test_every_strategy_replays() {
    let board = parse(TWO_STEPS);
    for strategy in [Strategy::Bfs, Strategy::Dfs, Strategy::AStar] {
        assert!(solved_actions(&board, Solver::new(strategy)) > 0);
    }
}

#[test]
fn test_dfs_longer_than_bfs() {
    let board = parse(DEEP_BURIAL);
    assert_eq!(solved_actions(&board, Solver::new(Strategy::Bfs)), 3);
    assert!(solved_actions(&board, Solver::new(Strategy::Dfs)) > 3);
}

#[test]
fn test_astar_keeps_cheaper_path() {
    let board = parse(DETOUR);
    let weights = Weights {
        foundation_weight: 0,
        free_cell_weight: 1,
        empty_column_weight: 0,
        blocked_card_weight: 0,
    };
    let solver = Solver::new(Strategy::AStar).with_weights(weights);
    assert_eq!(solved_actions(&board, solver), 2);
}

#[test]
fn test_astar_replays_to_solved() {
    let board = parse(KINGS_ON_TENS);
    let SolveOutcome::Solved(solution) = solve(&board, Strategy::AStar).unwrap() else {
        panic!("A* found no solution");
    };
    assert!(replay(&board, &solution.actions).unwrap().is_solved());

    let lines = describe_solution(&board, &solution.actions).unwrap();
    assert!(lines.len() > solution.actions.len());
    assert!(lines.iter().any(|line| line.trim_start().starts_with("auto")));
}

#[test]
fn test_astar_with_custom_weights() {
    let board = parse(KINGS_ON_TENS);
    let weights = Weights {
        foundation_weight: 5,
        free_cell_weight: 0,
        empty_column_weight: 3,
        blocked_card_weight: 2,
    };
    let outcome = Solver::new(Strategy::AStar)
        .with_weights(weights)
        .solve(&board)
        .unwrap();
    let SolveOutcome::Solved(solution) = outcome else {
        panic!("A* found no solution");
    };
    assert!(replay(&board, &solution.actions).unwrap().is_solved());
}

#[test]
fn test_dfs_finds_a_solution() {
    let board = parse(KINGS_ON_TENS);
    let outcome = Solver::new(Strategy::Dfs)
        .with_max_depth(20)
        .solve(&board)
        .unwrap();
    let SolveOutcome::Solved(solution) = outcome else {
        panic!("DFS found no solution");
    };
    assert!(solution.actions.len() <= 20);
    assert!(replay(&board, &solution.actions).unwrap().is_solved());
}

#[test]
fn test_deadlock_has_no_solution() {
    let board = parse(DEADLOCK);
    assert!(legal_moves(&board).is_empty());

    let bfs = solve(&board, Strategy::Bfs).unwrap();
    let dfs = Solver::new(Strategy::Dfs)
        .with_max_depth(3)
        .solve(&board)
        .unwrap();
    for outcome in [bfs, dfs] {
        match outcome {
            SolveOutcome::NoSolution(none) => assert_eq!(none.reason, Exhausted::SearchSpace),
            SolveOutcome::Solved(_) => panic!("deadlocked deal solved"),
        }
    }
}

#[test]
fn test_seeded_deal() {
    let board = Board::new_from_seed(670334786);
    let outcome = Solver::new(Strategy::AStar)
        .with_max_states(200_000)
        .solve(&board)
        .unwrap();
    match outcome {
        SolveOutcome::Solved(solution) => {
            assert!(replay(&board, &solution.actions).unwrap().is_solved());
        }
        SolveOutcome::NoSolution(none) => {
            assert_eq!(none.reason, Exhausted::StateLimit(200_000));
        }
    }
}
