//! Time-bounded alpha-beta search policy for 2048-style boards.
//!
//! The search alternates a maximizing layer (the player picks a move) with
//! a minimizing layer (the environment inserts a tile into the worst empty
//! cell for the player). Leaves are scored by [`Evaluator`].
//!
//! - [`Search`]: the two mutually recursive layers for one decision.
//! - [`AlphaBetaPlayer`]: iterative deepening under a wall-clock deadline.
//!
//! Notes
//! - With [`ChanceModel::Sampled`] (the default) each insertion node draws
//!   one tile value per empty cell, so repeated calls on the same board may
//!   disagree. Seed the generator or use [`ChanceModel::Expected`] for
//!   reproducible decisions.
//!
//! Quick start
//! ```
//! use alphabeta_2048::engine::Grid;
//! use alphabeta_2048::alphabeta::{AlphaBetaPlayer, PlayerConfig, RandomTiles};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let board = Grid::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
//!
//! let cfg = PlayerConfig { time_limit_ms: 50, max_depth: 3, ..Default::default() };
//! let mut player = AlphaBetaPlayer::with_generator(cfg, RandomTiles::seeded(7)).unwrap();
//! assert!(player.get_move(&board).is_some());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod heuristic;
mod player;
mod search;
mod tiles;

pub use heuristic::{
    empty_cells_score, max_tile_score, monotonicity_score, smoothness_score, Evaluator, HeuristicWeights,
};
pub use player::{AlphaBetaPlayer, Decision};
pub use search::Search;
pub use tiles::{FixedTiles, RandomTiles, TileGenerator, FOUR, TWO};

/// How insertion nodes treat the 2-vs-4 choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChanceModel {
    /// One sampled tile value per empty cell.
    #[default]
    Sampled,
    /// Probability-weighted value of both tiles per empty cell.
    Expected,
}

/// What iterative deepening does with a round that returned no move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Keep the committed move unless a round yields a better utility *and* a move.
    /// If no round ever commits, fall back to the first legal move.
    #[default]
    Guarded,
    /// A better utility always wins, even when the round ran out of time
    /// before choosing a move. May return `None` while legal moves exist.
    Faithful,
}

/// Configurable knobs for the player. Defaults give a 200 ms, depth-15 search.
///
/// - `time_limit_ms`: wall-clock budget per decision.
/// - `max_depth`: deepest iterative-deepening round, in plies.
/// - `two_probability`: chance that a simulated insertion is a 2.
/// - `check_deadline_in_min`: also stop at insertion nodes once time is up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub time_limit_ms: u64,
    pub max_depth: u32,
    pub two_probability: f64,
    pub weights: HeuristicWeights,
    pub chance_model: ChanceModel,
    pub retention: RetentionPolicy,
    pub check_deadline_in_min: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 200,
            max_depth: 15,
            two_probability: 0.9,
            weights: HeuristicWeights::default(),
            chance_model: ChanceModel::default(),
            retention: RetentionPolicy::default(),
            check_deadline_in_min: false,
        }
    }
}

impl PlayerConfig {
    #[inline]
    pub fn time_limit(&self) -> Duration { Duration::from_millis(self.time_limit_ms) }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.two_probability) {
            return Err(ConfigError::Probability(self.two_probability));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.time_limit_ms == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if !self.weights.all_finite() {
            return Err(ConfigError::NonFiniteWeight);
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("two_probability must be within [0, 1], got {0}")]
    Probability(f64),
    #[error("max_depth must be at least 1")]
    ZeroDepth,
    #[error("time_limit_ms must be positive")]
    ZeroTimeLimit,
    #[error("heuristic weights must be finite")]
    NonFiniteWeight,
}

/// Basic search stats for a single decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    /// Nodes visited (both layers) in the last decision.
    pub nodes: u64,
    /// Largest `nodes` seen since the last reset.
    pub peak_nodes: u64,
    /// Depth of the last deepening round that ran.
    pub depth_reached: u32,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PlayerConfig::default().validate(), Ok(()));
        assert_eq!(PlayerConfig::default().time_limit(), Duration::from_millis(200));
    }

    #[test]
    fn validate_rejects_bad_knobs() {
        let bad_p = PlayerConfig { two_probability: 1.5, ..Default::default() };
        assert_eq!(bad_p.validate(), Err(ConfigError::Probability(1.5)));
        let zero_depth = PlayerConfig { max_depth: 0, ..Default::default() };
        assert_eq!(zero_depth.validate(), Err(ConfigError::ZeroDepth));
        let zero_time = PlayerConfig { time_limit_ms: 0, ..Default::default() };
        assert_eq!(zero_time.validate(), Err(ConfigError::ZeroTimeLimit));
        let nan = PlayerConfig {
            weights: HeuristicWeights { smoothness: f64::NAN, ..Default::default() },
            ..Default::default()
        };
        assert_eq!(nan.validate(), Err(ConfigError::NonFiniteWeight));
    }

    #[test]
    fn config_reads_partial_json() {
        let cfg: PlayerConfig =
            serde_json::from_str(r#"{ "max_depth": 4, "chance_model": "expected", "weights": { "max_tile": 0.5 } }"#)
                .unwrap();
        assert_eq!(cfg.max_depth, 4);
        assert_eq!(cfg.chance_model, ChanceModel::Expected);
        assert_eq!(cfg.weights.max_tile, 0.5);
        assert_eq!(cfg.weights.empty_cells, 2.5);
        assert_eq!(cfg.time_limit_ms, 200);
        assert_eq!(cfg.retention, RetentionPolicy::Guarded);
    }
}
