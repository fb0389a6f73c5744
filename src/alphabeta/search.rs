use std::time::Instant;

use crate::engine::{Cell, GameGrid, Move};

use super::heuristic::Evaluator;
use super::tiles::{TileGenerator, FOUR, TWO};
use super::ChanceModel;

/// One decision's worth of depth-bounded alpha-beta search.
///
/// Holds only read-only inputs (evaluator, deadline, model knobs) plus the
/// tile generator and a node counter. Every explored child is a fresh clone
/// of its parent; no grid is mutated while a sibling still refers to it.
pub struct Search<'a, T: ?Sized> {
    evaluator: &'a Evaluator,
    tiles: &'a mut T,
    deadline: Instant,
    two_probability: f64,
    chance: ChanceModel,
    check_deadline_in_min: bool,
    nodes: u64,
}

impl<'a, T: TileGenerator + ?Sized> Search<'a, T> {
    pub fn new(evaluator: &'a Evaluator, tiles: &'a mut T, deadline: Instant) -> Self {
        Self {
            evaluator,
            tiles,
            deadline,
            two_probability: 0.9,
            chance: ChanceModel::Sampled,
            check_deadline_in_min: false,
            nodes: 0,
        }
    }

    pub fn with_two_probability(mut self, p: f64) -> Self {
        self.two_probability = p;
        self
    }

    pub fn with_chance_model(mut self, chance: ChanceModel) -> Self {
        self.chance = chance;
        self
    }

    pub fn with_min_deadline_check(mut self, enabled: bool) -> Self {
        self.check_deadline_in_min = enabled;
        self
    }

    /// Nodes visited so far.
    #[inline]
    pub fn nodes(&self) -> u64 { self.nodes }

    #[inline]
    fn expired(&self) -> bool { Instant::now() >= self.deadline }

    #[inline]
    fn leaf<G: GameGrid>(&self, grid: &G) -> f64 { self.evaluator.evaluate(grid) }

    /// Player layer: best move and its utility.
    ///
    /// Moves are tried in the grid's enumeration order; the first one to reach
    /// the maximum keeps it. Returns no move at depth 0, past the deadline, or
    /// when the grid has no legal move.
    pub fn maximize<G: GameGrid>(&mut self, grid: &G, mut alpha: f64, beta: f64, depth: u32) -> (Option<Move>, f64) {
        self.nodes += 1;
        if depth == 0 || self.expired() {
            return (None, self.leaf(grid));
        }
        let moves = grid.available_moves();
        if moves.is_empty() {
            return (None, self.leaf(grid));
        }

        let mut best_move = None;
        let mut best = f64::NEG_INFINITY;
        for dir in moves {
            let mut child = grid.clone();
            child.apply_move(dir);
            let (_, utility) = self.minimize(&child, alpha, beta, depth - 1);
            if utility > best {
                best = utility;
                best_move = Some(dir);
            }
            if best >= beta {
                break;
            }
            alpha = alpha.max(best);
        }
        (best_move, best)
    }

    /// Environment layer: the insertion that hurts the player most, and its utility.
    ///
    /// Cells are tried in the grid's enumeration order. Does not look at the
    /// deadline unless the min-layer check is enabled.
    pub fn minimize<G: GameGrid>(&mut self, grid: &G, alpha: f64, mut beta: f64, depth: u32) -> (Option<G>, f64) {
        self.nodes += 1;
        if depth == 0 || (self.check_deadline_in_min && self.expired()) {
            return (None, self.leaf(grid));
        }
        let cells = grid.available_cells();
        if cells.is_empty() {
            return (None, self.leaf(grid));
        }

        let mut min_child = None;
        let mut min = f64::INFINITY;
        for cell in cells {
            let (child, utility) = match self.chance {
                ChanceModel::Sampled => self.sampled_insertion(grid, cell, alpha, beta, depth),
                ChanceModel::Expected => self.expected_insertion(grid, cell, depth),
            };
            if utility < min {
                min = utility;
                min_child = Some(child);
            }
            if min <= alpha {
                break;
            }
            beta = beta.min(min);
        }
        (min_child, min)
    }

    fn sampled_insertion<G: GameGrid>(&mut self, grid: &G, cell: Cell, alpha: f64, beta: f64, depth: u32) -> (G, f64) {
        let value = self.tiles.sample(self.two_probability);
        let mut child = grid.clone();
        child.insert_tile(cell, value);
        let (_, utility) = self.maximize(&child, alpha, beta, depth - 1);
        (child, utility)
    }

    // Both outcomes are searched with an open window: a bounded (cut-off)
    // value would make the weighted sum meaningless.
    fn expected_insertion<G: GameGrid>(&mut self, grid: &G, cell: Cell, depth: u32) -> (G, f64) {
        let p = self.two_probability;
        let mut two = grid.clone();
        two.insert_tile(cell, TWO);
        let (_, v2) = self.maximize(&two, f64::NEG_INFINITY, f64::INFINITY, depth - 1);
        let mut four = grid.clone();
        four.insert_tile(cell, FOUR);
        let (_, v4) = self.maximize(&four, f64::NEG_INFINITY, f64::INFINITY, depth - 1);
        let likelier = if p >= 0.5 { two } else { four };
        (likelier, p * v2 + (1.0 - p) * v4)
    }
}
