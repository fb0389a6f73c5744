use serde::{Deserialize, Serialize};

use crate::engine::{Cell, GameGrid};

/// Linear weights for the four heuristic terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    pub empty_cells: f64,
    pub max_tile: f64,
    pub monotonicity: f64,
    pub smoothness: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self { empty_cells: 2.5, max_tile: 1.0, monotonicity: 1.0, smoothness: 0.1 }
    }
}

impl HeuristicWeights {
    pub(crate) fn all_finite(&self) -> bool {
        [self.empty_cells, self.max_tile, self.monotonicity, self.smoothness]
            .iter()
            .all(|w| w.is_finite())
    }
}

/// Scores a board snapshot. Pure: no search, no mutation, no hidden state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    weights: HeuristicWeights,
}

impl Evaluator {
    pub fn new(weights: HeuristicWeights) -> Self { Self { weights } }

    /// Weighted sum of the four terms.
    pub fn evaluate<G: GameGrid>(&self, grid: &G) -> f64 {
        let w = &self.weights;
        empty_cells_score(grid) * w.empty_cells
            + max_tile_score(grid) * w.max_tile
            + monotonicity_score(grid) * w.monotonicity
            + smoothness_score(grid) * w.smoothness
    }
}

/// `ln(empty cells)`, or 0 for a full board.
pub fn empty_cells_score<G: GameGrid>(grid: &G) -> f64 {
    match grid.available_cells().len() {
        0 => 0.0,
        n => (n as f64).ln(),
    }
}

/// Raw value of the largest tile. Unlike the other terms this is not log-scaled.
#[inline]
pub fn max_tile_score<G: GameGrid>(grid: &G) -> f64 { grid.max_tile() as f64 }

/// Per axis, the penalty of whichever direction (increasing or decreasing) is closer to sorted.
///
/// Both rows and columns contribute; a perfectly ordered board scores 0.
pub fn monotonicity_score<G: GameGrid>(grid: &G) -> f64 {
    let n = grid.size();
    let mut line = Vec::with_capacity(n);
    let mut rows = Monotonicity::default();
    let mut cols = Monotonicity::default();
    for lane in 0..n {
        line.clear();
        line.extend((0..n).map(|x| grid.cell_value(Cell::new(x, lane)).unwrap_or(0)));
        rows += line_monotonicity(&line);

        line.clear();
        line.extend((0..n).map(|y| grid.cell_value(Cell::new(lane, y)).unwrap_or(0)));
        cols += line_monotonicity(&line);
    }
    rows.best() + cols.best()
}

/// Sum of `-|log2 a - log2 b|` over every tile and its nearest non-empty neighbour
/// to the right and below. 0 when every such pair is equal.
pub fn smoothness_score<G: GameGrid>(grid: &G) -> f64 {
    let n = grid.size();
    let mut smoothness = 0.0;
    for y in 0..n {
        for x in 0..n {
            let val = match grid.cell_value(Cell::new(x, y)) {
                Some(v) if v != 0 => log2(v),
                _ => continue,
            };
            if let Some(target) = nearest_tile(grid, (x + 1..).map(|k| Cell::new(k, y))) {
                smoothness -= (val - log2(target)).abs();
            }
            if let Some(target) = nearest_tile(grid, (y + 1..).map(|k| Cell::new(x, k))) {
                smoothness -= (val - log2(target)).abs();
            }
        }
    }
    smoothness
}

/// First non-zero value along `cells`; the scan ends at the first out-of-bounds cell.
fn nearest_tile<G: GameGrid>(grid: &G, cells: impl Iterator<Item = Cell>) -> Option<u32> {
    for cell in cells {
        match grid.cell_value(cell)? {
            0 => continue,
            v => return Some(v),
        }
    }
    None
}

/// Non-positive penalties for a line failing to be increasing / decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Monotonicity {
    /// Accumulates drops (`next < current`).
    pub increasing: f64,
    /// Accumulates rises (`next >= current`).
    pub decreasing: f64,
}

impl Monotonicity {
    #[inline]
    fn best(self) -> f64 { self.increasing.max(self.decreasing) }
}

impl std::ops::AddAssign for Monotonicity {
    fn add_assign(&mut self, rhs: Self) {
        self.increasing += rhs.increasing;
        self.decreasing += rhs.decreasing;
    }
}

/// Walk the line tile to tile, skipping empty runs.
///
/// When no tile remains past the current position, the last index is used
/// as the comparison target (its value is 0 if empty).
pub(crate) fn line_monotonicity(line: &[u32]) -> Monotonicity {
    let n = line.len();
    let mut acc = Monotonicity::default();
    let mut curr = 0;
    let mut next = 1;
    while next < n {
        while next < n && line[next] == 0 {
            next += 1;
        }
        if next >= n {
            next -= 1;
        }
        let curr_val = log2(line[curr]);
        let next_val = log2(line[next]);
        if curr_val > next_val {
            acc.increasing += next_val - curr_val;
        } else {
            acc.decreasing += curr_val - next_val;
        }
        curr = next;
        next += 1;
    }
    acc
}

/// log2 of a tile value, with empty cells mapped to 0.
#[inline]
fn log2(v: u32) -> f64 {
    if v == 0 { 0.0 } else { (v as f64).log2() }
}
