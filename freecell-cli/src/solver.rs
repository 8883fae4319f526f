mod utils;

use crate::utils::*;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use freecell_common::{
    action::{describe_solution, format_actions},
    persist::save_game,
};
use freecell_solver::{SolveOutcome, Solver, Strategy, Weights};

use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Bfs,
    Dfs,
    Astar,
}

impl From<Algorithm> for Strategy {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bfs => Strategy::Bfs,
            Algorithm::Dfs => Strategy::Dfs,
            Algorithm::Astar => Strategy::AStar,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    deal: DealArgs,
    /// Search strategy
    #[arg(short, long, value_enum, default_value_t = Algorithm::Astar)]
    algorithm: Algorithm,
    /// Max states to store before giving up
    #[arg(short = 's', long, default_value_t = 1_000_000, value_name = "NUM")]
    max_states: usize,
    /// Depth bound for DFS
    #[arg(short = 'd', long, default_value_t = 200, value_name = "NUM")]
    max_depth: usize,
    /// Give up after this many seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Heuristic weight of cards missing from the foundations
    #[arg(long, value_name = "NUM")]
    foundation_weight: Option<u32>,
    /// Heuristic weight of occupied free cells
    #[arg(long, value_name = "NUM")]
    free_cell_weight: Option<u32>,
    /// Heuristic reward for empty columns
    #[arg(long, value_name = "NUM")]
    empty_column_weight: Option<u32>,
    /// Heuristic weight of cards covering the next foundation cards
    #[arg(long, value_name = "NUM")]
    blocked_card_weight: Option<u32>,
    /// Preview initial game state without solving
    #[arg(short, long)]
    preview: bool,
    /// Describe every step, including automatic moves
    #[arg(long)]
    describe: bool,
    /// Print the solution as JSON move records
    #[arg(long)]
    json: bool,
    /// Save the deal as a JSON game file
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    let board = load_board(&cli.deal)?;
    if let Some(path) = &cli.save {
        save_game(path, &board, None)?;
        eprintln!("Saved game to {}", path.display());
    }
    if cli.preview {
        println!("{}", board.pretty_print());
        return Ok(());
    }

    let defaults = Weights::default();
    let weights = Weights {
        foundation_weight: cli.foundation_weight.unwrap_or(defaults.foundation_weight),
        free_cell_weight: cli.free_cell_weight.unwrap_or(defaults.free_cell_weight),
        empty_column_weight: cli
            .empty_column_weight
            .unwrap_or(defaults.empty_column_weight),
        blocked_card_weight: cli
            .blocked_card_weight
            .unwrap_or(defaults.blocked_card_weight),
    };
    let mut solver = Solver::new(cli.algorithm.into())
        .with_max_states(cli.max_states)
        .with_max_depth(cli.max_depth)
        .with_weights(weights);
    if let Some(secs) = cli.timeout {
        solver = solver.with_timeout(Duration::from_secs(secs));
    }

    let actions = match do_solve(&board, &solver)? {
        SolveOutcome::Solved(solution) => solution.actions,
        SolveOutcome::NoSolution(none) => bail!("{}", none.reason),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
    } else if cli.describe {
        let lines = describe_solution(&board, &actions).context("Failed to replay solution")?;
        for line in lines {
            println!("{line}");
        }
    } else {
        println!("{}", format_actions(&actions));
    }

    Ok(())
}
