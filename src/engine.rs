use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Enumeration order used by [`GameGrid::available_moves`] on [`Grid`].
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

/// A board position. `x` is the column, `y` the row; `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self { Cell { x, y } }
}

/// Everything the search needs from a board.
///
/// Implementors must make `clone` a deep copy: mutating a clone never
/// affects the original. Enumeration order of `available_cells` and
/// `available_moves` decides search tie-breaks.
pub trait GameGrid: Clone {
    /// Side length of the square board.
    fn size(&self) -> usize;

    /// Empty positions.
    fn available_cells(&self) -> Vec<Cell>;

    /// Moves that change the board.
    fn available_moves(&self) -> Vec<Move>;

    /// Largest tile value on the board (0 on an empty board).
    fn max_tile(&self) -> u32;

    /// Tile value at `cell`, or `None` when `cell` lies outside the board.
    fn cell_value(&self, cell: Cell) -> Option<u32>;

    /// Place `value` at `cell`.
    ///
    /// `cell` must come from `available_cells`. Implementations may panic on
    /// a cell outside the board.
    fn insert_tile(&mut self, cell: Cell, value: u32);

    /// Slide/merge in `dir`. Returns true if anything moved.
    fn apply_move(&mut self, dir: Move) -> bool;
}

/// Default side length.
pub const DEFAULT_SIZE: usize = 4;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("grid size must be at least 1")]
    ZeroSize,
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("{cells} cells do not form a {size}x{size} grid")]
    CellCount { cells: usize, size: usize },
    #[error("invalid tile value {0}: tiles are 0 or a power of two >= 2")]
    InvalidTile(u32),
}

/// Square 2048 board holding actual tile values (0 = empty), row-major.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// An empty `size` x `size` board.
    pub fn new(size: usize) -> Self {
        Grid { size, cells: vec![0; size * size] }
    }

    /// Build a board from row slices, top row first.
    ///
    /// ```
    /// use alphabeta_2048::engine::{Grid, GameGrid};
    /// let g = Grid::from_rows(&[[2, 0], [0, 4]]).unwrap();
    /// assert_eq!(g.max_tile(), 4);
    /// ```
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> Result<Self, GridError> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != size {
                return Err(GridError::NotSquare { row, len: r.len(), size });
            }
            cells.extend_from_slice(r);
        }
        Self::from_cells(size, cells)
    }

    /// Build a board from row-major cell values.
    pub fn from_cells(size: usize, cells: Vec<u32>) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::ZeroSize);
        }
        if cells.len() != size * size {
            return Err(GridError::CellCount { cells: cells.len(), size });
        }
        if let Some(&bad) = cells.iter().find(|&&v| v == 1 || (v != 0 && !v.is_power_of_two())) {
            return Err(GridError::InvalidTile(bad));
        }
        Ok(Grid { size, cells })
    }

    /// Row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[u32] { &self.cells }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    pub fn shift(&self, dir: Move) -> Self {
        let mut out = self.clone();
        let n = self.size;
        let mut line = vec![0u32; n];
        for lane in 0..n {
            for (offset, slot) in line.iter_mut().enumerate() {
                *slot = self.cells[self.line_index(dir, lane, offset)];
            }
            slide_line(&mut line);
            for (offset, &v) in line.iter().enumerate() {
                out.cells[self.line_index(dir, lane, offset)] = v;
            }
        }
        out
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// A full board is returned unchanged.
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        let empty = self.available_cells();
        if empty.is_empty() {
            return self;
        }
        let cell = empty[rng.gen_range(0..empty.len())];
        let value = generate_random_tile(rng);
        self.insert_tile(cell, value);
        self
    }

    /// Perform a move then insert a random tile if the move changed the board, using the provided RNG.
    pub fn make_move<R: Rng + ?Sized>(mut self, dir: Move, rng: &mut R) -> Self {
        if self.apply_move(dir) { self.with_random_tile(rng) } else { self }
    }

    /// Total score implied by the tiles on the board.
    ///
    /// A tile `2^k` (k >= 2) was built from merges worth `(k - 1) * 2^k` in total.
    pub fn score(&self) -> u64 {
        self.cells
            .iter()
            .filter(|&&v| v >= 4)
            .map(|&v| (v.trailing_zeros() as u64 - 1) * v as u64)
            .sum()
    }

    /// Return true if no legal moves remain.
    pub fn is_game_over(&self) -> bool {
        !Move::ALL.iter().any(|&dir| self.can_move(dir))
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize { self.cells.iter().filter(|&&v| v == 0).count() }

    fn can_move(&self, dir: Move) -> bool {
        let n = self.size;
        (0..n).any(|lane| {
            (1..n).any(|offset| {
                let lead = self.cells[self.line_index(dir, lane, offset - 1)];
                let next = self.cells[self.line_index(dir, lane, offset)];
                (lead == 0 && next != 0) || (lead != 0 && lead == next)
            })
        })
    }

    /// Row-major index of the `offset`-th cell of `lane`, counted from the edge tiles slide toward.
    #[inline]
    fn line_index(&self, dir: Move, lane: usize, offset: usize) -> usize {
        let n = self.size;
        match dir {
            Move::Left => lane * n + offset,
            Move::Right => lane * n + (n - 1 - offset),
            Move::Up => offset * n + lane,
            Move::Down => (n - 1 - offset) * n + lane,
        }
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.x < self.size && cell.y < self.size).then(|| cell.y * self.size + cell.x)
    }
}

impl GameGrid for Grid {
    #[inline]
    fn size(&self) -> usize { self.size }

    fn available_cells(&self) -> Vec<Cell> {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| Cell::new(i % n, i / n))
            .collect()
    }

    fn available_moves(&self) -> Vec<Move> {
        Move::ALL.into_iter().filter(|&dir| self.can_move(dir)).collect()
    }

    #[inline]
    fn max_tile(&self) -> u32 { self.cells.iter().copied().max().unwrap_or(0) }

    #[inline]
    fn cell_value(&self, cell: Cell) -> Option<u32> { self.index(cell).map(|i| self.cells[i]) }

    fn insert_tile(&mut self, cell: Cell, value: u32) {
        let idx = self.index(cell).unwrap_or_else(|| panic!("insert_tile outside {}x{} grid: {:?}", self.size, self.size, cell));
        debug_assert_eq!(self.cells[idx], 0, "insert_tile on occupied cell {:?}", cell);
        self.cells[idx] = value;
    }

    fn apply_move(&mut self, dir: Move) -> bool {
        if !self.can_move(dir) {
            return false;
        }
        *self = self.shift(dir);
        true
    }
}

impl Default for Grid {
    fn default() -> Self { Grid::new(DEFAULT_SIZE) }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid").field("size", &self.size).field("cells", &self.cells).finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.size * 8);
        writeln!(f)?;
        for (y, row) in self.cells.chunks(self.size).enumerate() {
            if y > 0 {
                writeln!(f, "{}", rule)?;
            }
            let line: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> u32 { if rng.gen_range(0..10) < 9 { 2 } else { 4 } }

/// Slide a line toward index 0, merging each equal pair once.
fn slide_line(line: &mut [u32]) {
    for i in 0..line.len() {
        settle_front(&mut line[i..]);
    }
}

/// Pull the first tile (merged with its equal successor, if any) into `slice[0]`.
fn settle_front(slice: &mut [u32]) {
    let mut acc = 0;
    for idx in 0..slice.len() {
        let val = slice[idx];
        if acc != 0 && acc == val {
            slice[idx] = 0;
            acc += val;
            break;
        } else if acc != 0 && val != 0 {
            break;
        } else if acc == 0 && val != 0 {
            slice[idx] = 0;
            acc = val;
        }
    }
    slice[0] = acc;
}

fn format_val(val: u32) -> String {
    match val {
        0 => " ".repeat(7),
        v => format!("{:^7}", v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn slid(mut v: Vec<u32>) -> Vec<u32> {
        slide_line(&mut v);
        v
    }

    #[test]
    fn it_slide_line() {
        assert_eq!(slid(vec![0, 0, 0, 0]), vec![0, 0, 0, 0]);
        assert_eq!(slid(vec![2, 4, 2, 4]), vec![2, 4, 2, 4]);
        assert_eq!(slid(vec![2, 2, 4, 4]), vec![4, 8, 0, 0]);
        assert_eq!(slid(vec![2, 0, 0, 2]), vec![4, 0, 0, 0]);
        assert_eq!(slid(vec![0, 2, 2, 2]), vec![4, 2, 0, 0]);
        assert_eq!(slid(vec![4, 4, 4, 4]), vec![8, 8, 0, 0]);
        assert_eq!(slid(vec![2, 4, 0, 0]), vec![2, 4, 0, 0]);
    }

    #[test]
    fn test_move_left() {
        let g = Grid::from_rows(&[[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]).unwrap();
        let expected = Grid::from_rows(&[[2, 4, 8, 16], [2, 16, 4, 0], [8, 0, 0, 0], [2, 4, 0, 0]]).unwrap();
        assert_eq!(g.shift(Move::Left), expected);
    }

    #[test]
    fn test_move_right() {
        let g = Grid::from_rows(&[[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]).unwrap();
        let expected = Grid::from_rows(&[[2, 4, 8, 16], [0, 2, 16, 4], [0, 0, 0, 8], [0, 0, 2, 4]]).unwrap();
        assert_eq!(g.shift(Move::Right), expected);
    }

    #[test]
    fn test_move_up_down() {
        let g = Grid::from_rows(&[[2, 0, 0, 0], [2, 0, 4, 0], [4, 0, 4, 0], [0, 0, 0, 2]]).unwrap();
        let up = Grid::from_rows(&[[4, 0, 8, 2], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]).unwrap();
        let down = Grid::from_rows(&[[0, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0], [4, 0, 8, 2]]).unwrap();
        assert_eq!(g.shift(Move::Up), up);
        assert_eq!(g.shift(Move::Down), down);
    }

    #[test]
    fn available_moves_follow_canonical_order() {
        let g = Grid::from_rows(&[[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]).unwrap();
        assert_eq!(g.available_moves(), vec![Move::Down, Move::Right]);
        let full = Grid::from_rows(&[[2, 4], [4, 2]]).unwrap();
        assert!(full.available_moves().is_empty());
        assert!(full.is_game_over());
    }

    #[test]
    fn apply_move_reports_change() {
        let mut g = Grid::from_rows(&[[2, 2], [0, 0]]).unwrap();
        assert!(!g.apply_move(Move::Up));
        assert!(g.apply_move(Move::Left));
        assert_eq!(g.cells(), &[4, 0, 0, 0]);
    }

    #[test]
    fn available_cells_are_row_major() {
        let g = Grid::from_rows(&[[2, 0], [0, 4]]).unwrap();
        assert_eq!(g.available_cells(), vec![Cell::new(1, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn cell_value_out_of_bounds_is_none() {
        let g = Grid::from_rows(&[[2, 0], [0, 4]]).unwrap();
        assert_eq!(g.cell_value(Cell::new(1, 1)), Some(4));
        assert_eq!(g.cell_value(Cell::new(2, 0)), None);
        assert_eq!(g.cell_value(Cell::new(0, 2)), None);
    }

    #[test]
    #[should_panic(expected = "insert_tile outside")]
    fn insert_tile_outside_grid_panics() {
        let mut g = Grid::new(2);
        g.insert_tile(Cell::new(2, 0), 2);
    }

    #[test]
    fn clone_is_independent() {
        let g = Grid::from_rows(&[[2, 0], [0, 0]]).unwrap();
        let mut c = g.clone();
        c.insert_tile(Cell::new(1, 1), 4);
        assert_eq!(g.cell_value(Cell::new(1, 1)), Some(0));
        assert_eq!(c.cell_value(Cell::new(1, 1)), Some(4));
    }

    #[test]
    fn it_fills_board_with_random_tiles() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut g = Grid::default();
        for _ in 0..16 {
            g = g.with_random_tile(&mut rng);
        }
        assert_eq!(g.count_empty(), 0);
        assert!(g.cells().iter().all(|&v| v == 2 || v == 4));
        // Full board: no-op.
        assert_eq!(g.clone().with_random_tile(&mut rng), g);
    }

    #[test]
    fn it_rejects_malformed_grids() {
        assert_eq!(Grid::from_rows(&[vec![2, 0], vec![0]]), Err(GridError::NotSquare { row: 1, len: 1, size: 2 }));
        assert_eq!(Grid::from_cells(2, vec![0, 0, 3, 0]), Err(GridError::InvalidTile(3)));
        assert_eq!(Grid::from_cells(2, vec![0; 3]), Err(GridError::CellCount { cells: 3, size: 2 }));
        assert_eq!(Grid::from_cells(0, vec![]), Err(GridError::ZeroSize));
    }

    #[test]
    fn it_scores_tiles() {
        let g = Grid::from_rows(&[[2, 4], [8, 0]]).unwrap();
        // 4 -> 4, 8 -> 16
        assert_eq!(g.score(), 20);
    }
}
