mod utils;

use crate::utils::*;

use anyhow::{Context, Result};
use clap::Parser;
use freecell_solver::{TuningOptions, WeightGrid, tune, write_csv_header, write_csv_row};

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

#[derive(Parser)]
#[command(author, version, about = "Grid search over the A* heuristic weights")]
struct Cli {
    #[command(flatten)]
    deal: DealArgs,
    /// Foundation weights to try
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 3])]
    foundation_weights: Vec<u32>,
    /// Free cell weights to try
    #[arg(long, value_delimiter = ',', default_values_t = [0, 1, 2])]
    free_cell_weights: Vec<u32>,
    /// Empty column weights to try
    #[arg(long, value_delimiter = ',', default_values_t = [0, 1, 2])]
    empty_column_weights: Vec<u32>,
    /// Blocked card weights to try
    #[arg(long, value_delimiter = ',', default_values_t = [0, 1, 2])]
    blocked_card_weights: Vec<u32>,
    /// Seconds allowed per combination
    #[arg(short, long, default_value_t = 10, value_name = "SECS")]
    timeout: u64,
    /// Max states per combination
    #[arg(short = 's', long, default_value_t = 1_000_000, value_name = "NUM")]
    max_states: usize,
    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long, value_name = "NUM")]
    threads: Option<usize>,
    /// CSV report; rows are appended
    #[arg(short, long, default_value = "tuning_results.csv", value_name = "FILE")]
    output: PathBuf,
}

fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let board = load_board(&cli.deal)?;
    let grid = WeightGrid {
        foundation_weights: cli.foundation_weights,
        free_cell_weights: cli.free_cell_weights,
        empty_column_weights: cli.empty_column_weights,
        blocked_card_weights: cli.blocked_card_weights,
    };
    let options = TuningOptions {
        timeout: Duration::from_secs(cli.timeout),
        max_states: cli.max_states,
    };

    let total = grid.combinations().len();
    let message = format!("Trying {total} weight combinations...");
    let records = with_spinner(&message, || tune(&board, &grid, &options))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.output)
        .with_context(|| format!("Failed to open '{}'", cli.output.display()))?;
    let is_new = file.metadata()?.len() == 0;
    let mut writer = BufWriter::new(file);
    if is_new {
        write_csv_header(&mut writer)?;
    }
    for record in &records {
        write_csv_row(&mut writer, record)?;
    }
    writer.flush()?;

    let solved = records.iter().filter(|r| r.cost.is_some()).count();
    println!("✓ {solved}/{total} combinations solved the deal");
    if let Some(best) = records
        .iter()
        .filter_map(|r| r.cost.map(|cost| (cost, r.elapsed, r)))
        .min_by_key(|&(cost, elapsed, _)| (cost, elapsed))
    {
        let (cost, elapsed, record) = best;
        println!(
            "Best: {:?} with {cost} moves in {}",
            record.weights,
            format_elapsed(elapsed)
        );
    }
    println!("Results appended to {}", cli.output.display());

    Ok(())
}
