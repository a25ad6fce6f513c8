//! Game state on top of the core board model.
//!
//! - [`GameField`] - Board plus the next piece; applies moves and detects game over
//! - [`GameStats`] - Per-game counters (turns, cleared rows, stack height)
//! - [`PieceGenerator`] - Seeded source of next pieces
//! - [`PieceDistribution`] - Count-weighted piece frequencies
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Example
//!
//! ```
//! use blocktune_engine::{GameField, PieceSeed};
//!
//! let mut field = GameField::with_seed(PieceSeed::from(42));
//!
//! while !field.is_lost() && field.turn() < 10 {
//!     // always drop the piece at its first legal placement
//!     let mv = field.legal_moves()[0];
//!     if field.apply_move(mv).is_err() {
//!         println!("Game over!");
//!     }
//! }
//! ```

pub use self::{game_field::*, game_stats::*, piece_generator::*};

mod game_field;
mod game_stats;
mod piece_generator;
