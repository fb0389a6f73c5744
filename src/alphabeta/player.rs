use std::time::Instant;

use log::{debug, warn};
use rand::rngs::StdRng;

use crate::engine::{GameGrid, Move};

use super::heuristic::Evaluator;
use super::search::Search;
use super::tiles::{RandomTiles, TileGenerator};
use super::{ConfigError, PlayerConfig, RetentionPolicy, SearchStats};

/// Outcome of one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub mv: Option<Move>,
    /// Root utility of the committed round (`-inf` if nothing was committed).
    pub utility: f64,
}

/// Move and utility carried across deepening rounds.
///
/// A round returns no move only when the deadline passed between the
/// controller's own check and the root's first expansion, so the
/// `None` arms below are timing-dependent in `decide_until` and are
/// exercised directly in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Commitment {
    mv: Option<Move>,
    utility: f64,
}

impl Default for Commitment {
    fn default() -> Self { Self { mv: None, utility: f64::NEG_INFINITY } }
}

impl Commitment {
    /// Fold one round's result in; only strictly better utilities count.
    fn absorb(&mut self, depth: u32, mv: Option<Move>, utility: f64, retention: RetentionPolicy) {
        if utility <= self.utility {
            return;
        }
        match (mv, retention) {
            (Some(_), _) => *self = Self { mv, utility },
            (None, RetentionPolicy::Faithful) => {
                if let Some(prev) = self.mv {
                    warn!("depth {} ran out of time with no move; dropping committed move {}", depth, prev);
                }
                *self = Self { mv: None, utility };
            }
            (None, RetentionPolicy::Guarded) => {
                debug!("depth {} ran out of time with no move; keeping {:?}", depth, self.mv);
            }
        }
    }
}

/// Iterative-deepening alpha-beta player.
///
/// Each decision computes one deadline up front and runs depth 1, 2, ...
/// up to `max_depth` until the deadline passes, keeping the best round.
pub struct AlphaBetaPlayer<T = RandomTiles<StdRng>> {
    cfg: PlayerConfig,
    evaluator: Evaluator,
    tiles: T,
    stats: SearchStats,
}

impl AlphaBetaPlayer {
    /// Default configuration with an entropy-seeded tile generator.
    pub fn new() -> Self {
        let cfg = PlayerConfig::default();
        Self::build(cfg, RandomTiles::from_entropy())
    }

    pub fn with_config(cfg: PlayerConfig) -> Result<Self, ConfigError> {
        Self::with_generator(cfg, RandomTiles::from_entropy())
    }
}

impl Default for AlphaBetaPlayer {
    fn default() -> Self { Self::new() }
}

impl<T: TileGenerator> AlphaBetaPlayer<T> {
    pub fn with_generator(cfg: PlayerConfig, tiles: T) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::build(cfg, tiles))
    }

    fn build(cfg: PlayerConfig, tiles: T) -> Self {
        let evaluator = Evaluator::new(cfg.weights);
        Self { cfg, evaluator, tiles, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &PlayerConfig { &self.cfg }

    /// Entry point for a game loop: the move to play, or `None` when no move is legal.
    #[inline]
    pub fn get_move<G: GameGrid>(&mut self, grid: &G) -> Option<Move> { self.decide(grid) }

    /// Best move within the configured time limit.
    pub fn decide<G: GameGrid>(&mut self, grid: &G) -> Option<Move> { self.decide_with_utility(grid).mv }

    /// Like [`Self::decide`], also reporting the committed root utility.
    pub fn decide_with_utility<G: GameGrid>(&mut self, grid: &G) -> Decision {
        let deadline = Instant::now() + self.cfg.time_limit();
        self.decide_until(grid, deadline)
    }

    /// Run iterative deepening until `deadline`.
    pub fn decide_until<G: GameGrid>(&mut self, grid: &G, deadline: Instant) -> Decision {
        let start = Instant::now();
        let mut search = Search::new(&self.evaluator, &mut self.tiles, deadline)
            .with_two_probability(self.cfg.two_probability)
            .with_chance_model(self.cfg.chance_model)
            .with_min_deadline_check(self.cfg.check_deadline_in_min);

        let mut kept = Commitment::default();
        let mut depth_reached = 0;
        for depth in 1..=self.cfg.max_depth {
            if Instant::now() >= deadline {
                break;
            }
            let (mv, utility) = search.maximize(grid, f64::NEG_INFINITY, f64::INFINITY, depth);
            depth_reached = depth;
            debug!("depth {}: move {:?}, utility {:.4}, nodes {}", depth, mv, utility, search.nodes());
            kept.absorb(depth, mv, utility, self.cfg.retention);
        }

        let Commitment { mv: mut committed, utility: best } = kept;
        if committed.is_none() && self.cfg.retention == RetentionPolicy::Guarded {
            committed = grid.available_moves().first().copied();
            if let Some(mv) = committed {
                warn!("no deepening round committed a move; falling back to {}", mv);
            }
        }

        let nodes = search.nodes();
        self.stats = SearchStats {
            nodes,
            peak_nodes: self.stats.peak_nodes.max(nodes),
            depth_reached,
            elapsed: start.elapsed(),
        };
        Decision { mv: committed, utility: best }
    }

    /// Statistics collected from the last decision.
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }
}
