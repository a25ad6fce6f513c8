//! Move evaluation for the blocktune agent.
//!
//! The evaluator works on three levels:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores one move by simulating it on a
//!    copy of the board and combining board features with a weight vector.
//!
//! 2. **Turn Evaluation** ([`turn_evaluator`]) - Scores every legal move of the next piece and
//!    picks the best one (first move wins ties); plays whole games move by move.
//!
//! 3. **Session Evaluation** ([`session_evaluator`]) - Turns a finished game into a fitness
//!    score for training.
//!
//! ```text
//! Session Evaluation (fitness for training)
//!     ↓ uses
//! Turn Evaluation (select best move)
//!     ↓ uses
//! Placement Evaluation (score single move)
//! ```
//!
//! # Supporting Modules
//!
//! - [`board_analysis`] - Lazily computed board metrics (heights, holes, wells, transitions,
//!   ideal-position templates)
//! - [`placement_analysis`] - Simulated move plus the analysis of the resulting board
//! - [`board_feature`] - Feature trait objects over the metrics, and the standard palettes

pub mod board_analysis;
pub mod board_feature;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod session_evaluator;
pub mod turn_evaluator;
