use crate::heuristic::{Weights, estimate};
use crate::node::{Estimate, NodeStorage, OpenEntry};

use freecell_common::action::{Action, Move};
use freecell_common::board::Board;
use freecell_common::rules::{MovePolicy, apply, auto_move, legal_moves_with, supermoves};

use ahash::{AHashMap, AHashSet};
use log::{debug, trace};
use std::{
    collections::{BinaryHeap, VecDeque},
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use thiserror::Error;

const DEFAULT_MAX_STATES: usize = 1_000_000;
const DEFAULT_MAX_DEPTH: usize = 200;

type Successors = Vec<(Action, Board)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    Bfs,
    Dfs,
    #[default]
    AStar,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Bfs => "BFS",
            Strategy::Dfs => "DFS",
            Strategy::AStar => "A*",
        })
    }
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Invalid initial board state")]
    InvalidBoard,

    #[error("Search interrupted after {states} states")]
    Interrupted { states: usize },
}

/// Why a search stopped without reaching the solved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    /// Every reachable state was explored.
    SearchSpace,
    StateLimit(usize),
    DepthLimit(usize),
    Timeout(Duration),
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exhausted::SearchSpace => write!(f, "No solution found"),
            Exhausted::StateLimit(max) => write!(f, "Reached max states {max}"),
            Exhausted::DepthLimit(max) => write!(f, "No solution within depth {max}"),
            Exhausted::Timeout(timeout) => write!(f, "Timed out after {timeout:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub actions: Vec<Action>,
    pub states: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct NoSolution {
    pub reason: Exhausted,
    pub states: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Solved(Solution),
    NoSolution(NoSolution),
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    pub fn states(&self) -> usize {
        match self {
            SolveOutcome::Solved(solution) => solution.states,
            SolveOutcome::NoSolution(none) => none.states,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            SolveOutcome::Solved(solution) => solution.elapsed,
            SolveOutcome::NoSolution(none) => none.elapsed,
        }
    }
}

pub fn solve(board: &Board, strategy: Strategy) -> Result<SolveOutcome, SolveError> {
    Solver::new(strategy).solve(board)
}

/// Configured search. The solver holds no per-search state, so one value can
/// be reused for any number of boards.
#[derive(Debug, Clone)]
pub struct Solver {
    strategy: Strategy,
    max_states: usize,
    max_depth: usize,
    timeout: Option<Duration>,
    weights: Weights,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl Solver {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_states: DEFAULT_MAX_STATES,
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: None,
            weights: Weights::default(),
            cancel: None,
        }
    }

    /// Caps the number of stored search nodes.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    /// Depth bound for DFS. Ignored by the other strategies.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Setting the flag makes a running search return `SolveError::Interrupted`.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn solve(&self, board: &Board) -> Result<SolveOutcome, SolveError> {
        if !board.is_valid() {
            return Err(SolveError::InvalidBoard);
        }
        let mut start = board.clone();
        auto_move(&mut start);

        debug!(
            "Starting {} search (max states {}, max depth {}, timeout {:?})",
            self.strategy, self.max_states, self.max_depth, self.timeout
        );
        let search = Search {
            timer: Instant::now(),
            nodes: NodeStorage::new(),
        };
        let outcome = match self.strategy {
            Strategy::Bfs => self.bfs(start, search),
            Strategy::Dfs => self.dfs(start, search),
            Strategy::AStar => self.astar(start, search),
        }?;

        match &outcome {
            SolveOutcome::Solved(solution) => debug!(
                "{} solved in {} actions, {} states, {:?}",
                self.strategy,
                solution.actions.len(),
                solution.states,
                solution.elapsed
            ),
            SolveOutcome::NoSolution(none) => debug!(
                "{} gave up: {} ({} states, {:?})",
                self.strategy, none.reason, none.states, none.elapsed
            ),
        }
        Ok(outcome)
    }

    fn bfs(&self, start: Board, mut search: Search) -> Result<SolveOutcome, SolveError> {
        let mut seen = AHashSet::new();
        seen.insert(start.clone());
        let mut frontier = VecDeque::new();
        frontier.push_back((start, search.nodes.root(), 0usize));

        while let Some((board, index, depth)) = frontier.pop_front() {
            if board.is_solved() {
                trace!("BFS reached the solved state at depth {depth}");
                return Ok(search.solved(index));
            }
            if let Some(reason) = self.check_budget(&search)? {
                return Ok(search.exhausted(reason));
            }

            for (action, next) in expand(&board) {
                if seen.contains(&next) {
                    continue;
                }
                seen.insert(next.clone());
                let child = search.nodes.push(index, action);
                frontier.push_back((next, child, depth + 1));
            }
        }

        Ok(search.exhausted(Exhausted::SearchSpace))
    }

    fn dfs(&self, start: Board, mut search: Search) -> Result<SolveOutcome, SolveError> {
        if start.is_solved() {
            return Ok(search.solved(search.nodes.root()));
        }

        // Revisit a state only when it is reached at a lower depth.
        let mut best_depth = AHashMap::new();
        best_depth.insert(start.clone(), 0usize);
        let mut stack = vec![(start, search.nodes.root(), 0usize)];
        let mut pruned = false;

        while let Some((board, index, depth)) = stack.pop() {
            if let Some(reason) = self.check_budget(&search)? {
                return Ok(search.exhausted(reason));
            }
            if depth >= self.max_depth {
                pruned = true;
                continue;
            }

            // Reversed so the first generated successor is explored first.
            for (action, next) in expand(&board).into_iter().rev() {
                let next_depth = depth + 1;
                if best_depth.get(&next).is_some_and(|&d| d <= next_depth) {
                    continue;
                }
                let child = search.nodes.push(index, action);
                if next.is_solved() {
                    return Ok(search.solved(child));
                }
                best_depth.insert(next.clone(), next_depth);
                stack.push((next, child, next_depth));
            }
        }

        let reason = if pruned {
            Exhausted::DepthLimit(self.max_depth)
        } else {
            Exhausted::SearchSpace
        };
        Ok(search.exhausted(reason))
    }

    fn astar(&self, start: Board, mut search: Search) -> Result<SolveOutcome, SolveError> {
        let mut best_g = AHashMap::new();
        best_g.insert(start.clone(), 0u32);
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;
        open.push(OpenEntry {
            index: search.nodes.root(),
            estimate: Estimate {
                current: 0,
                remaining: estimate(&start, &self.weights),
            },
            seq,
            board: start,
        });

        while let Some(OpenEntry {
            index,
            estimate: node_estimate,
            board,
            ..
        }) = open.pop()
        {
            // Superseded by a cheaper path pushed later.
            if best_g
                .get(&board)
                .is_some_and(|&g| g < node_estimate.current)
            {
                continue;
            }
            if board.is_solved() {
                return Ok(search.solved(index));
            }
            if let Some(reason) = self.check_budget(&search)? {
                return Ok(search.exhausted(reason));
            }

            let current = node_estimate.current + 1;
            for (action, next) in expand(&board) {
                match best_g.get(&next) {
                    Some(&g) if g <= current => continue,
                    Some(&g) => trace!("Relaxed g {g} -> {current} via {action}"),
                    None => {}
                }
                best_g.insert(next.clone(), current);
                let child = search.nodes.push(index, action);
                seq += 1;
                open.push(OpenEntry {
                    index: child,
                    estimate: Estimate {
                        current,
                        remaining: estimate(&next, &self.weights),
                    },
                    seq,
                    board: next,
                });
            }
        }

        Ok(search.exhausted(Exhausted::SearchSpace))
    }

    fn check_budget(&self, search: &Search) -> Result<Option<Exhausted>, SolveError> {
        let states = search.nodes.len();
        if let Some(cancel) = &self.cancel
            && cancel.load(Ordering::Relaxed)
        {
            return Err(SolveError::Interrupted { states });
        }
        if let Some(timeout) = self.timeout
            && search.timer.elapsed() >= timeout
        {
            return Ok(Some(Exhausted::Timeout(timeout)));
        }
        if states >= self.max_states {
            return Ok(Some(Exhausted::StateLimit(self.max_states)));
        }
        Ok(None)
    }
}

/// Per-call search bookkeeping.
struct Search {
    timer: Instant,
    nodes: NodeStorage,
}

impl Search {
    fn solved(&self, index: u32) -> SolveOutcome {
        SolveOutcome::Solved(Solution {
            actions: self.nodes.path(index),
            states: self.nodes.len(),
            elapsed: self.timer.elapsed(),
        })
    }

    fn exhausted(&self, reason: Exhausted) -> SolveOutcome {
        SolveOutcome::NoSolution(NoSolution {
            reason,
            states: self.nodes.len(),
            elapsed: self.timer.elapsed(),
        })
    }
}

/// Successors of `board`: progressive single-card moves, then supermoves,
/// each followed by the automatic cascade.
pub fn expand(board: &Board) -> Successors {
    let mut successors = Successors::new();
    let atomic = legal_moves_with(board, MovePolicy::Progressive)
        .into_iter()
        .filter(|&mov| !is_column_swap(board, mov))
        .map(Action::from);
    let compound = supermoves(board).into_iter().map(Action::from);

    for action in atomic.chain(compound) {
        if let Ok(mut next) = apply(board, action) {
            auto_move(&mut next);
            successors.push((action, next));
        }
    }
    successors
}

/// A lone card moving to an empty column only relabels columns.
fn is_column_swap(board: &Board, mov: Move) -> bool {
    match mov {
        Move::TableauToTableau(from, to) => {
            board.tableaus[from].len() == 1 && board.tableaus[to].is_empty()
        }
        _ => false,
    }
}
