//! Command-line knobs shared by the binaries.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::alphabeta::{AlphaBetaPlayer, ChanceModel, PlayerConfig, RandomTiles, RetentionPolicy};

#[derive(Debug, Clone, Args)]
pub struct PlayerArgs {
    /// JSON file with a player configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Time budget per move, in milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Deepest iterative-deepening round
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Probability that a simulated insertion is a 2
    #[arg(long)]
    pub two_probability: Option<f64>,

    /// How insertion nodes model the 2-vs-4 choice
    #[arg(long, value_enum)]
    pub chance_model: Option<ChanceModel>,

    /// What to do with deepening rounds that ran out of time without a move
    #[arg(long, value_enum)]
    pub retention: Option<RetentionPolicy>,

    /// Also check the deadline at insertion nodes
    #[arg(long)]
    pub check_deadline_in_min: bool,

    /// Seed for the search's own tile generator (random if absent)
    #[arg(long)]
    pub search_seed: Option<u64>,
}

impl PlayerArgs {
    /// Load `--config` if given, apply flag overrides, then validate.
    pub fn to_config(&self) -> anyhow::Result<PlayerConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => PlayerConfig::default(),
        };
        if let Some(v) = self.time_limit_ms {
            cfg.time_limit_ms = v;
        }
        if let Some(v) = self.max_depth {
            cfg.max_depth = v;
        }
        if let Some(v) = self.two_probability {
            cfg.two_probability = v;
        }
        if let Some(v) = self.chance_model {
            cfg.chance_model = v;
        }
        if let Some(v) = self.retention {
            cfg.retention = v;
        }
        if self.check_deadline_in_min {
            cfg.check_deadline_in_min = true;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build a player; `stream` offsets `--search-seed` so parallel games differ.
    pub fn build_player(&self, stream: u64) -> anyhow::Result<AlphaBetaPlayer> {
        let cfg = self.to_config()?;
        let tiles = match self.search_seed {
            Some(seed) => RandomTiles::seeded(seed.wrapping_add(stream)),
            None => RandomTiles::from_entropy(),
        };
        Ok(AlphaBetaPlayer::with_generator(cfg, tiles)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        player: PlayerArgs,
    }

    #[test]
    fn flags_override_defaults() {
        let h = Harness::parse_from(["t", "--max-depth", "6", "--chance-model", "expected", "--retention", "faithful"]);
        let cfg = h.player.to_config().unwrap();
        assert_eq!(cfg.max_depth, 6);
        assert_eq!(cfg.chance_model, ChanceModel::Expected);
        assert_eq!(cfg.retention, RetentionPolicy::Faithful);
        assert_eq!(cfg.time_limit_ms, 200);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "time_limit_ms": 50, "max_depth": 3 }}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let h = Harness::parse_from(["t", "--config", path.as_str(), "--max-depth", "9"]);
        let cfg = h.player.to_config().unwrap();
        assert_eq!(cfg.time_limit_ms, 50);
        assert_eq!(cfg.max_depth, 9);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let h = Harness::parse_from(["t", "--two-probability", "2.0"]);
        assert!(h.player.to_config().is_err());
    }
}
