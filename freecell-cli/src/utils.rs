use anyhow::{Context, Result, bail};
use clap::Args;
use freecell_common::{
    board::Board,
    persist::{SavedGame, find_preset, load_presets},
};
use freecell_solver::{SolveOutcome, Solver};

use std::{
    io::{IsTerminal, Read, Write, stderr, stdin},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Where the deal comes from. Falls back to stdin when nothing is given.
#[derive(Args)]
pub struct DealArgs {
    /// Deal a shuffled deck from this seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
    /// Name of a deal in the presets file
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,
    /// Presets file used with --preset
    #[arg(long, default_value = "presets.json", value_name = "FILE")]
    pub presets: PathBuf,
    /// Path to a board (text format) or saved game (JSON)
    pub file: Option<PathBuf>,
}

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

pub fn load_board(args: &DealArgs) -> Result<Board> {
    if let Some(file) = &args.file {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read '{}'", file.display()))?;
        parse_board(&content)
    } else if let Some(seed) = args.seed {
        Ok(Board::new_from_seed(seed))
    } else if let Some(name) = &args.preset {
        let presets = load_presets(&args.presets)?;
        Ok(find_preset(&presets, name)?)
    } else if !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        parse_board(&content)
    } else {
        bail!("No game state `file`, `--seed` or `--preset` provided.");
    }
}

/// Accepts a saved game in JSON or the line-oriented board format.
fn parse_board(content: &str) -> Result<Board> {
    if content.trim_start().starts_with('{') {
        let saved: SavedGame = serde_json::from_str(content).context("Failed to parse saved game")?;
        Ok(saved.to_board()?)
    } else {
        Board::parse(content).context("Failed to parse board")
    }
}

pub fn do_solve(board: &Board, solver: &Solver) -> Result<SolveOutcome> {
    println!("{}\n", board.pretty_print());
    let message = format!("Solving the game with {}...", solver.strategy());
    let outcome = with_spinner(&message, || solver.solve(board))?;

    let elapsed_str = format_elapsed(outcome.elapsed());
    match &outcome {
        SolveOutcome::Solved(solution) => {
            let supermoves = solution.actions.iter().filter(|a| a.is_supermove()).count();
            let mut steps_str = format!("{} Moves", solution.actions.len());
            if supermoves > 0 {
                steps_str.push_str(&format!(" ({supermoves} Supermoves)"));
            }
            println!(
                "✓ Solved in {steps_str}, Time: {elapsed_str}, States: {}\n",
                solution.states
            );
        }
        SolveOutcome::NoSolution(none) => {
            println!(
                "✗ {}, Time: {elapsed_str}, States: {}\n",
                none.reason, none.states
            );
        }
    }
    Ok(outcome)
}

pub fn with_spinner<T, F: FnOnce() -> T>(message: &str, f: F) -> T {
    if stderr().is_terminal() {
        let spinning = Arc::new(AtomicBool::new(true));
        let spinning_clone = Arc::clone(&spinning);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let spinner_chars = ['|', '/', '-', '\\'];
            let mut i = 0;
            let stderr = stderr();
            let mut handle = stderr.lock();

            let _ = write!(handle, "\x1b[?25l"); // hide cursor
            let _ = handle.flush();

            while spinning_clone.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars[i % spinner_chars.len()];
                let _ = write!(handle, "\r{spinner_char} {message}");
                let _ = handle.flush();
                std::thread::sleep(Duration::from_millis(100));
                i += 1;
            }

            let _ = write!(handle, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = handle.flush();
        });

        let result = f();
        spinning.store(false, Ordering::Relaxed);
        let _ = handle.join();
        result
    } else {
        f()
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        format!("{secs}.{:03}s", elapsed.subsec_millis())
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1234)), "1.234s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 05s");
    }

    #[test]
    fn test_parse_board_formats() {
        let board = Board::new_from_seed(21);
        let from_text = parse_board(&board.pretty_print()).unwrap();
        assert_eq!(from_text, board);

        let json = serde_json::to_string(&SavedGame::from_board(&board, None)).unwrap();
        assert_eq!(parse_board(&json).unwrap(), board);
        assert!(parse_board("{ \"tableau\": [] }").is_err());
    }
}
