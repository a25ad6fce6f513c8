//! Placement evaluation: scoring a single move.
//!
//! The [`FeatureBasedPlacementEvaluator`] computes a linear combination of board features on
//! the board that results from the move:
//!
//! ```text
//! score = w₀·f₀ + w₁·f₁ + ... + wₙ·fₙ
//! ```
//!
//! Feature values are raw metric counts; the sign and scale of each weight decide whether the
//! metric is rewarded or penalized. A move that overflows the board scores [`f32::MIN`]
//! whatever the weights, so it is only chosen when every move overflows.
//!
//! # Usage
//!
//! ```
//! use blocktune_engine::{Board, Move, Orientation, PieceKind};
//! use blocktune_evaluator::{
//!     board_feature::{CLASSIC_WEIGHTS, classic_board_features},
//!     placement_evaluator::{FeatureBasedPlacementEvaluator, PlacementEvaluator},
//! };
//!
//! let evaluator =
//!     FeatureBasedPlacementEvaluator::new(classic_board_features(), CLASSIC_WEIGHTS.to_vec());
//!
//! let score = evaluator.evaluate_move(&Board::EMPTY, PieceKind::O, Move::new(Orientation::new(0), 0));
//! // two columns of height 2: aggregate 4, max 2, bumpiness 4
//! assert!((score - (-0.1 * 4.0 - 0.5 * 4.0 - 0.1 * 2.0)).abs() < 1e-6);
//! ```

use std::{fmt, iter};

use blocktune_engine::{Board, Move, PieceKind};

use crate::{
    board_feature::{BoardFeature as _, BoxedBoardFeature},
    placement_analysis::PlacementAnalysis,
};

/// Evaluates piece placements by assigning scores (higher is better).
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Scores an already simulated placement.
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32;

    /// Simulates the move on a copy of `board` and scores it.
    ///
    /// Returns [`f32::MIN`] when the move overflows the board.
    fn evaluate_move(&self, board: &Board, piece: PieceKind, mv: Move) -> f32 {
        match PlacementAnalysis::simulate(board, piece, mv) {
            Ok(analysis) => self.evaluate_placement(&analysis),
            Err(_) => f32::MIN,
        }
    }
}

/// Weighted sum of board features.
#[derive(Debug, Clone)]
pub struct FeatureBasedPlacementEvaluator {
    features: Vec<BoxedBoardFeature>,
    weights: Vec<f32>,
}

impl FeatureBasedPlacementEvaluator {
    /// Creates a new feature-based placement evaluator.
    ///
    /// # Panics
    ///
    /// Panics if `features.len() != weights.len()`
    #[must_use]
    pub fn new(features: Vec<BoxedBoardFeature>, weights: Vec<f32>) -> Self {
        assert_eq!(
            features.len(),
            weights.len(),
            "one weight is required per feature"
        );
        Self { features, weights }
    }

    #[must_use]
    pub fn features(&self) -> &[BoxedBoardFeature] {
        &self.features
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl PlacementEvaluator for FeatureBasedPlacementEvaluator {
    #[inline]
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        iter::zip(&self.features, &self.weights)
            .map(|(f, w)| f.value(analysis) * w)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use blocktune_engine::Orientation;

    use crate::board_feature::all_board_features;

    use super::*;

    #[test]
    #[should_panic(expected = "one weight is required per feature")]
    fn test_length_mismatch_panics() {
        let _ = FeatureBasedPlacementEvaluator::new(all_board_features(), vec![1.0; 5]);
    }

    #[test]
    fn test_overflow_scores_minimum() {
        let art = "##........\n".repeat(19);
        let board = Board::from_ascii(&art);
        let mut weights = vec![0.0; 14];
        weights[0] = 1000.0;
        let evaluator = FeatureBasedPlacementEvaluator::new(all_board_features(), weights);
        let mv = Move::new(Orientation::new(0), 0);
        assert!((evaluator.evaluate_move(&board, PieceKind::O, mv) - f32::MIN).abs() < f32::EPSILON);
    }

    #[test]
    fn test_single_feature_weight() {
        let mut weights = vec![0.0; 14];
        // rows_cleared only
        weights[0] = 2.5;
        let evaluator = FeatureBasedPlacementEvaluator::new(all_board_features(), weights);
        let board = Board::from_ascii("########..");
        let mv = Move::new(Orientation::new(0), 8);
        assert!((evaluator.evaluate_move(&board, PieceKind::O, mv) - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_evaluating_one_move_does_not_affect_another() {
        let evaluator = FeatureBasedPlacementEvaluator::new(
            all_board_features(),
            (0..14_u8).map(|i| f32::from(i) - 6.5).collect(),
        );
        let board = Board::EMPTY;
        let slot0 = Move::new(Orientation::new(0), 0);
        let slot5 = Move::new(Orientation::new(0), 5);

        let alone = evaluator.evaluate_move(&board, PieceKind::O, slot0);
        let _ = evaluator.evaluate_move(&board, PieceKind::O, slot5);
        let again = evaluator.evaluate_move(&board, PieceKind::O, slot0);
        assert_eq!(alone.to_bits(), again.to_bits());
        assert_eq!(board, Board::EMPTY);
    }
}
