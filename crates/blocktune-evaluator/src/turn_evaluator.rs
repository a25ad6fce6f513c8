//! Turn evaluation: choosing the move for the current piece.
//!
//! The [`TurnEvaluator`] scores every legal move of the next piece with a placement evaluator
//! and picks the highest-scoring one. It is a greedy one-piece lookahead: only the immediate
//! placement is considered.
//!
//! Ties are broken by order: moves are scanned in legal-move order and a later move replaces
//! the current best only with a strictly higher score, so the first of equally scored moves
//! wins.
//!
//! # Usage
//!
//! ```
//! use blocktune_engine::{GameField, GameStats, PieceSeed};
//! use blocktune_evaluator::{
//!     board_feature::{CLASSIC_WEIGHTS, classic_board_features},
//!     placement_evaluator::FeatureBasedPlacementEvaluator,
//!     turn_evaluator::TurnEvaluator,
//! };
//!
//! let placement_evaluator =
//!     FeatureBasedPlacementEvaluator::new(classic_board_features(), CLASSIC_WEIGHTS.to_vec());
//! let turn_evaluator = TurnEvaluator::new(Box::new(placement_evaluator));
//!
//! let mut field = GameField::with_seed(PieceSeed::from(3));
//! let stats: GameStats = turn_evaluator.play_session(&mut field, Some(50));
//! assert_eq!(stats.turns(), field.turn());
//! ```

use arrayvec::ArrayVec;
use blocktune_engine::{Board, GameField, GameStats, MAX_LEGAL_MOVES, Move, PieceKind};

use crate::placement_evaluator::PlacementEvaluator;

/// Statistics tracking for game sessions.
///
/// Lets session evaluators collect whatever they need to compute a fitness.
pub trait SessionStats: Sized {
    /// Creates a new statistics tracker.
    fn new() -> Self;

    /// Updates statistics after a piece is placed.
    fn complete_move(&mut self, board: &Board, cleared_rows: usize);
}

impl SessionStats for GameStats {
    fn new() -> Self {
        GameStats::new()
    }

    fn complete_move(&mut self, board: &Board, cleared_rows: usize) {
        GameStats::complete_move(self, cleared_rows, board.max_height());
    }
}

#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> TurnEvaluator<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Scores every legal move of `piece`, in legal-move order.
    #[must_use]
    pub fn score_moves(
        &self,
        board: &Board,
        piece: PieceKind,
    ) -> ArrayVec<(Move, f32), MAX_LEGAL_MOVES> {
        piece
            .legal_moves()
            .iter()
            .map(|&mv| (mv, self.placement_evaluator.evaluate_move(board, piece, mv)))
            .collect()
    }

    /// Returns the index into `legal_moves` of the best move.
    ///
    /// # Panics
    ///
    /// Panics if `legal_moves` is empty.
    #[must_use]
    pub fn pick_move(&self, board: &Board, piece: PieceKind, legal_moves: &[Move]) -> usize {
        assert!(!legal_moves.is_empty(), "no legal move to pick from");
        let mut best_index = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (i, &mv) in legal_moves.iter().enumerate() {
            let score = self.placement_evaluator.evaluate_move(board, piece, mv);
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }
        best_index
    }

    /// Plays `field` until the game is lost or `turn_limit` moves have been made.
    #[must_use]
    pub fn play_session<S>(&self, field: &mut GameField, turn_limit: Option<usize>) -> S
    where
        S: SessionStats,
    {
        let mut stats = S::new();
        let mut turns = 0;
        while turn_limit.is_none_or(|limit| turns < limit) {
            let legal_moves = field.legal_moves();
            let index = self.pick_move(field.board(), field.next_piece(), legal_moves);
            let Ok(cleared_rows) = field.apply_move(legal_moves[index]) else {
                break;
            };
            stats.complete_move(field.board(), cleared_rows);
            turns += 1;
        }
        stats
    }
}
