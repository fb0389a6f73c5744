use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use alphabeta_2048::cli::PlayerArgs;
use alphabeta_2048::engine::{GameGrid, DEFAULT_SIZE};
use alphabeta_2048::game::{self, GameOptions, GameOutcome};
use alphabeta_2048::trace;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "batch", about = "Play many 2048 games in parallel and report statistics")]
struct Args {
    #[command(flatten)]
    player: PlayerArgs,

    /// Number of games
    #[arg(long, default_value_t = 16)]
    games: u64,

    /// Worker threads (defaults to rayon's choice)
    #[arg(long)]
    threads: Option<usize>,

    /// Board side length
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Base seed for tile placement; game i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Per-game: stop after this many moves
    #[arg(long)]
    steps: Option<u64>,

    /// Per-game: stop once highest tile >= this value
    #[arg(long)]
    stop_tile: Option<u32>,

    /// Write one postcard trace per game into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    // Fail fast on a bad configuration before spawning anything.
    args.player.to_config()?;
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)?;
    }

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:30}] {pos}/{len} games | {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let start = Instant::now();
    let opts = GameOptions { size: args.size, max_moves: args.steps, stop_tile: args.stop_tile, record: args.out_dir.is_some() };
    let outcomes: Vec<GameOutcome> = (0..args.games)
        .into_par_iter()
        .map(|i| -> anyhow::Result<GameOutcome> {
            let mut player = args.player.build_player(i)?;
            let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(i));
            let outcome = game::play(&mut player, &mut rng, &opts, |_, _| {});
            if let (Some(dir), Some(record)) = (&args.out_dir, &outcome.record) {
                let path = dir.join(format!("run-{}-{:05}.a2run", record.meta.start_unix_s, i));
                trace::write_run_to_path(&path, record)?;
            }
            pb.inc(1);
            pb.set_message(format!("last score {}", outcome.final_grid.score()));
            Ok(outcome)
        })
        .collect::<anyhow::Result<_>>()?;
    pb.finish_and_clear();

    report(&outcomes, start.elapsed());
    Ok(())
}

fn report(outcomes: &[GameOutcome], elapsed: Duration) {
    if outcomes.is_empty() {
        println!("No games played.");
        return;
    }
    let games = outcomes.len() as f64;
    let total_moves: u64 = outcomes.iter().map(|o| o.moves).sum();
    let mean_score = outcomes.iter().map(|o| o.final_grid.score() as f64).sum::<f64>() / games;
    let best_score = outcomes.iter().map(|o| o.final_grid.score()).max().unwrap_or(0);
    let mut tiles: BTreeMap<u32, usize> = BTreeMap::new();
    for o in outcomes {
        *tiles.entry(o.final_grid.max_tile()).or_default() += 1;
    }

    println!(
        "Games: {} | moves: {} | moves/sec: {:.1} | mean score: {:.1} | best score: {}",
        outcomes.len(),
        total_moves,
        total_moves as f64 / elapsed.as_secs_f64().max(1e-6),
        mean_score,
        best_score
    );
    println!("Highest tile reached:");
    for (tile, count) in tiles.iter().rev() {
        println!("  {:>6}: {:>4} ({:.1}%)", tile, count, 100.0 * *count as f64 / games);
    }
}
