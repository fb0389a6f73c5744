use std::path::PathBuf;

use alphabeta_2048::cli::PlayerArgs;
use alphabeta_2048::engine::{GameGrid, DEFAULT_SIZE};
use alphabeta_2048::game::{self, GameOptions};
use alphabeta_2048::trace;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Debug, Parser)]
#[command(name = "alphabeta-2048", about = "Play one 2048 game with the alpha-beta player")]
struct Args {
    #[command(flatten)]
    player: PlayerArgs,

    /// Board side length
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Seed for the game's own tile placement (random if absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many moves
    #[arg(long)]
    steps: Option<u64>,

    /// Stop once highest tile >= this value
    #[arg(long)]
    stop_tile: Option<u32>,

    /// Only print the summary line
    #[arg(long)]
    quiet: bool,

    /// Write a postcard trace of the run to this path
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut player = args.player.build_player(0)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let opts = GameOptions { size: args.size, max_moves: args.steps, stop_tile: args.stop_tile, record: args.out.is_some() };

    let quiet = args.quiet;
    let outcome = game::play(&mut player, &mut rng, &opts, |board, dir| {
        if !quiet {
            println!("{}\n-> {}", board, dir);
        }
    });
    if !quiet {
        println!("{}", outcome.final_grid);
    }
    println!(
        "Moves made: {}, Score: {}, Highest tile: {}, States considered: {}, Max states considered for a move: {}",
        outcome.moves,
        outcome.final_grid.score(),
        outcome.final_grid.max_tile(),
        outcome.total_nodes,
        outcome.peak_nodes
    );

    if let (Some(path), Some(record)) = (args.out, outcome.record) {
        trace::write_run_to_path(&path, &record)?;
        log::info!("wrote trace to {}", path.display());
    }
    Ok(())
}
