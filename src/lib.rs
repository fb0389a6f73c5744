//! alphabeta-2048: a 2048 board + time-bounded alpha-beta player
//!
//! This crate provides:
//! - A square `Grid` with ergonomic methods (`shift`, `make_move`, `score`, ...)
//!   behind the `GameGrid` trait the search is written against
//! - An iterative-deepening alpha-beta player (`alphabeta` module) over a
//!   four-term heuristic (empty cells, max tile, monotonicity, smoothness)
//! - A postcard run format for recorded games (`trace` module)
//! - The game loop and CLI knobs the binaries share (`game`, `cli`)
//!
//! Quick start:
//! ```
//! use alphabeta_2048::engine::{Grid, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Grid::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let b1 = b0.shift(Move::Left);
//! assert!(b1.count_empty() >= 14);
//! ```
//!
//! Full loop
//! ```
//! use alphabeta_2048::engine::Grid;
//! use alphabeta_2048::alphabeta::{AlphaBetaPlayer, PlayerConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let cfg = PlayerConfig { time_limit_ms: 20, max_depth: 3, ..Default::default() };
//! let mut player = AlphaBetaPlayer::with_config(cfg).unwrap();
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut b = Grid::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let mut moves = 0u32;
//! while !b.is_game_over() && moves < 4 {
//!     match player.get_move(&b) {
//!         Some(dir) => { b = b.make_move(dir, &mut rng); moves += 1; }
//!         None => break,
//!     }
//! }
//! assert!(moves > 0);
//! ```
//!
pub mod alphabeta;
pub mod cli;
pub mod engine;
pub mod game;
pub mod trace;
