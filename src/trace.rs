//! Recorded games.
//!
//! A run stores every decision point (board before the move, chosen move,
//! root utility) plus the final board, encoded with postcard.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::{GameGrid, Grid, GridError, Move};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub grid_size: u32,
    pub steps: u32,
    pub start_unix_s: u64,
    pub elapsed_s: f32,
    pub final_score: u64,
    pub highest_tile: u32,
    /// Free-form description of the player settings.
    pub engine_str: Option<String>,
}

/// A single decision step in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Row-major cells before the move.
    pub pre_cells: Vec<u32>,
    pub chosen: Move,
    /// Root utility reported by the search.
    pub utility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub meta: Meta,
    pub steps: Vec<Step>,
    pub final_cells: Vec<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
    #[error("malformed grid in run: {0}")]
    Grid(#[from] GridError),
}

/// Accumulates steps while a game is played.
#[derive(Debug, Clone)]
pub struct Recorder {
    size: usize,
    start_unix_s: u64,
    steps: Vec<Step>,
}

impl Recorder {
    pub fn new(size: usize) -> Self {
        Self { size, start_unix_s: now_unix_seconds(), steps: Vec::with_capacity(1024) }
    }

    pub fn push(&mut self, pre: &Grid, chosen: Move, utility: f64) {
        self.steps.push(Step { pre_cells: pre.cells().to_vec(), chosen, utility });
    }

    pub fn finish(self, final_grid: &Grid, elapsed_s: f32, engine_str: Option<String>) -> RunRecord {
        let meta = Meta {
            grid_size: self.size as u32,
            steps: self.steps.len() as u32,
            start_unix_s: self.start_unix_s,
            elapsed_s,
            final_score: final_grid.score(),
            highest_tile: final_grid.max_tile(),
            engine_str,
        };
        RunRecord { meta, steps: self.steps, final_cells: final_grid.cells().to_vec() }
    }
}

impl RunRecord {
    /// Rebuild the final board.
    pub fn final_grid(&self) -> Result<Grid, TraceError> {
        Ok(Grid::from_cells(self.meta.grid_size as usize, self.final_cells.clone())?)
    }
}

pub fn to_postcard_bytes(run: &RunRecord) -> Result<Vec<u8>, TraceError> {
    Ok(postcard::to_allocvec(run)?)
}

pub fn from_postcard_bytes(bytes: &[u8]) -> Result<RunRecord, TraceError> {
    Ok(postcard::from_bytes(bytes)?)
}

pub fn write_run_to_path<P: AsRef<Path>>(path: P, run: &RunRecord) -> Result<(), TraceError> {
    let bytes = to_postcard_bytes(run)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_run_from_path<P: AsRef<Path>>(path: P) -> Result<RunRecord, TraceError> {
    let bytes = fs::read(path)?;
    from_postcard_bytes(&bytes)
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_run() -> RunRecord {
        let start = Grid::from_rows(&[[2, 0], [2, 0]]).unwrap();
        let mut rec = Recorder::new(2);
        rec.push(&start, Move::Up, 3.5);
        let next = Grid::from_rows(&[[4, 2], [0, 0]]).unwrap();
        rec.push(&next, Move::Right, 4.25);
        let end = Grid::from_rows(&[[2, 4], [0, 0]]).unwrap();
        rec.finish(&end, 0.5, Some("depth=2".to_string()))
    }

    #[test]
    fn recorder_fills_meta() {
        let run = sample_run();
        assert_eq!(run.meta.steps, 2);
        assert_eq!(run.meta.grid_size, 2);
        assert_eq!(run.meta.highest_tile, 4);
        assert_eq!(run.meta.final_score, 4);
        assert_eq!(run.steps[0].pre_cells, vec![2, 0, 2, 0]);
        assert_eq!(run.final_grid().unwrap(), Grid::from_rows(&[[2, 4], [0, 0]]).unwrap());
    }

    #[test]
    fn file_round_trip() {
        let run = sample_run();
        let tmp = NamedTempFile::new().unwrap();
        write_run_to_path(tmp.path(), &run).unwrap();
        assert_eq!(read_run_from_path(tmp.path()).unwrap(), run);
    }

    #[test]
    fn truncated_bytes_fail() {
        let bytes = to_postcard_bytes(&sample_run()).unwrap();
        let err = from_postcard_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, TraceError::Postcard(_)));
    }

    #[test]
    fn corrupt_final_grid_is_reported() {
        let mut run = sample_run();
        run.final_cells.pop();
        assert!(matches!(run.final_grid(), Err(TraceError::Grid(GridError::CellCount { .. }))));
    }
}
