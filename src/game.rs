//! Game loop shared by the binaries: ask the player, apply the move, insert a tile.

use std::time::Instant;

use rand::Rng;

use crate::alphabeta::{AlphaBetaPlayer, TileGenerator};
use crate::engine::{GameGrid, Grid, Move};
use crate::trace::{Recorder, RunRecord};

#[derive(Debug, Clone, Copy)]
pub struct GameOptions {
    pub size: usize,
    /// Stop after this many moves.
    pub max_moves: Option<u64>,
    /// Stop once the highest tile reaches this value.
    pub stop_tile: Option<u32>,
    pub record: bool,
}

impl Default for GameOptions {
    fn default() -> Self { Self { size: crate::engine::DEFAULT_SIZE, max_moves: None, stop_tile: None, record: false } }
}

#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub final_grid: Grid,
    pub moves: u64,
    /// Search nodes summed over all decisions.
    pub total_nodes: u64,
    pub peak_nodes: u64,
    pub elapsed_s: f64,
    pub record: Option<RunRecord>,
}

/// Play one game from a board with two random tiles.
///
/// `rng` drives the real tile insertions; the player's own generator only
/// feeds its look-ahead. `on_move` sees the board before each move.
pub fn play<T, R>(
    player: &mut AlphaBetaPlayer<T>,
    rng: &mut R,
    opts: &GameOptions,
    mut on_move: impl FnMut(&Grid, Move),
) -> GameOutcome
where
    T: TileGenerator,
    R: Rng + ?Sized,
{
    let start = Instant::now();
    let mut board = Grid::new(opts.size).with_random_tile(rng).with_random_tile(rng);
    let mut recorder = opts.record.then(|| Recorder::new(opts.size));
    let mut moves = 0u64;
    let mut total_nodes = 0u64;
    let mut peak_nodes = 0u64;

    loop {
        if opts.max_moves.is_some_and(|limit| moves >= limit) {
            break;
        }
        if opts.stop_tile.is_some_and(|tile| board.max_tile() >= tile) {
            break;
        }
        let decision = player.decide_with_utility(&board);
        let stats = player.last_stats();
        total_nodes = total_nodes.saturating_add(stats.nodes);
        peak_nodes = peak_nodes.max(stats.nodes);
        let Some(dir) = decision.mv else { break };

        on_move(&board, dir);
        if let Some(rec) = recorder.as_mut() {
            rec.push(&board, dir, decision.utility);
        }
        board = board.make_move(dir, rng);
        moves += 1;
    }

    let elapsed_s = start.elapsed().as_secs_f64();
    let engine_str = Some(format!("{:?}", player.config()));
    let record = recorder.map(|rec| rec.finish(&board, elapsed_s as f32, engine_str));
    GameOutcome { final_grid: board, moves, total_nodes, peak_nodes, elapsed_s, record }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::alphabeta::{PlayerConfig, RandomTiles};

    fn quick_player() -> AlphaBetaPlayer<RandomTiles<StdRng>> {
        let cfg = PlayerConfig { time_limit_ms: 10, max_depth: 3, ..Default::default() };
        AlphaBetaPlayer::with_generator(cfg, RandomTiles::seeded(5)).unwrap()
    }

    #[test]
    fn respects_move_limit_and_records() {
        let mut player = quick_player();
        let mut rng = StdRng::seed_from_u64(17);
        let opts = GameOptions { max_moves: Some(12), record: true, ..Default::default() };
        let mut seen = 0;
        let out = play(&mut player, &mut rng, &opts, |_, _| seen += 1);
        assert_eq!(out.moves, 12);
        assert_eq!(seen, 12);
        let record = out.record.unwrap();
        assert_eq!(record.meta.steps, 12);
        assert_eq!(record.final_grid().unwrap(), out.final_grid);
        assert!(out.total_nodes >= out.peak_nodes);
    }

    #[test]
    fn stops_at_target_tile() {
        let mut player = quick_player();
        let mut rng = StdRng::seed_from_u64(3);
        let opts = GameOptions { stop_tile: Some(16), max_moves: Some(500), ..Default::default() };
        let out = play(&mut player, &mut rng, &opts, |_, _| {});
        assert!(out.final_grid.max_tile() >= 16 || out.final_grid.is_game_over() || out.moves == 500);
        assert!(out.record.is_none());
    }
}
