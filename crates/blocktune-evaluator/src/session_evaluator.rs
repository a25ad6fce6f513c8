//! Session evaluation: fitness functions for training weight vectors.
//!
//! A session is one full game played by a [`TurnEvaluator`]. The session evaluator plays the
//! game on a copy of the starting [`GameField`], collects statistics, and turns them into a
//! single fitness score (higher is better) for the genetic algorithm.
//!
//! # Fitness Functions
//!
//! ## Lines Cleared
//!
//! ```text
//! fitness = rows_cleared
//! ```
//!
//! The plain game outcome. Games that end early are only penalized indirectly, by the rows
//! they did not get to clear.
//!
//! ## Health
//!
//! ```text
//! fitness = rows_cleared + 0.1 × turns × (1 - average_max_height / 21)
//! ```
//!
//! Adds a survival term that rewards every placed piece, scaled down when the stack ran
//! high. Useful early in training when most weight vectors clear no rows at all and the
//! lines-cleared fitness cannot tell them apart.
//!
//! # Usage
//!
//! ```
//! use blocktune_engine::{GameField, PieceSeed};
//! use blocktune_evaluator::{
//!     board_feature::{CLASSIC_WEIGHTS, classic_board_features},
//!     placement_evaluator::FeatureBasedPlacementEvaluator,
//!     session_evaluator::{DefaultSessionEvaluator, LinesClearedFitness, SessionEvaluator as _},
//!     turn_evaluator::TurnEvaluator,
//! };
//!
//! let turn_evaluator = TurnEvaluator::new(Box::new(FeatureBasedPlacementEvaluator::new(
//!     classic_board_features(),
//!     CLASSIC_WEIGHTS.to_vec(),
//! )));
//! let session_evaluator = DefaultSessionEvaluator::new(Some(100), LinesClearedFitness::new());
//!
//! let fields = [GameField::with_seed(PieceSeed::from(1)), GameField::with_seed(PieceSeed::from(2))];
//! let fitness = session_evaluator.play_and_evaluate_sessions(&fields, &turn_evaluator);
//! assert!(fitness >= 0.0);
//! ```

use std::fmt;

use blocktune_engine::{BOARD_HEIGHT, GameField, GameStats};

use crate::turn_evaluator::{SessionStats, TurnEvaluator};

/// Computes a fitness score from the statistics of a finished session.
pub trait EvaluateSessionStats {
    /// Type of statistics tracked during the session.
    type Stats: SessionStats;

    /// Computes fitness score from session statistics.
    ///
    /// # Arguments
    /// * `field` - Initial game field (for context)
    /// * `stats` - Collected session statistics
    /// * `turn_limit` - Maximum number of turns allowed, if any
    fn evaluate_session_stats(
        &self,
        field: &GameField,
        stats: &Self::Stats,
        turn_limit: Option<usize>,
    ) -> f32;
}

/// Evaluates complete game sessions for training.
pub trait SessionEvaluator: fmt::Debug + Send + Sync {
    /// Plays and evaluates a single game session.
    fn play_and_evaluate_session(&self, field: &GameField, turn_evaluator: &TurnEvaluator) -> f32;

    /// Plays and evaluates multiple game sessions, returning average fitness.
    fn play_and_evaluate_sessions(
        &self,
        fields: &[GameField],
        turn_evaluator: &TurnEvaluator,
    ) -> f32;
}

/// Plays sessions up to an optional turn limit and scores them with a fitness function.
#[derive(Debug)]
pub struct DefaultSessionEvaluator<E> {
    turn_limit: Option<usize>,
    evaluator: E,
}

impl<E> DefaultSessionEvaluator<E> {
    pub fn new(turn_limit: Option<usize>, evaluator: E) -> Self {
        Self {
            turn_limit,
            evaluator,
        }
    }

    #[must_use]
    pub fn turn_limit(&self) -> Option<usize> {
        self.turn_limit
    }
}

impl<S, E> SessionEvaluator for DefaultSessionEvaluator<E>
where
    E: EvaluateSessionStats<Stats = S> + fmt::Debug + Send + Sync,
    S: SessionStats,
{
    fn play_and_evaluate_session(&self, field: &GameField, turn_evaluator: &TurnEvaluator) -> f32 {
        let stats = turn_evaluator.play_session(&mut field.clone(), self.turn_limit);
        self.evaluator
            .evaluate_session_stats(field, &stats, self.turn_limit)
    }

    #[expect(clippy::cast_precision_loss)]
    fn play_and_evaluate_sessions(
        &self,
        fields: &[GameField],
        turn_evaluator: &TurnEvaluator,
    ) -> f32 {
        assert!(!fields.is_empty(), "at least one session is required");
        let total_fitness: f32 = fields
            .iter()
            .map(|field| self.play_and_evaluate_session(field, turn_evaluator))
            .sum();
        total_fitness / (fields.len() as f32)
    }
}

/// Fitness equal to the number of rows cleared.
#[derive(Default, Debug)]
pub struct LinesClearedFitness {}

impl LinesClearedFitness {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl EvaluateSessionStats for LinesClearedFitness {
    type Stats = GameStats;

    #[expect(clippy::cast_precision_loss)]
    fn evaluate_session_stats(
        &self,
        _field: &GameField,
        stats: &Self::Stats,
        _turn_limit: Option<usize>,
    ) -> f32 {
        stats.total_cleared_rows() as f32
    }
}

/// Rows cleared plus a survival bonus discounted by average stack height.
#[derive(Default, Debug)]
pub struct HealthFitness {}

impl HealthFitness {
    const SURVIVAL_WEIGHT: f64 = 0.1;

    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl EvaluateSessionStats for HealthFitness {
    type Stats = GameStats;

    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn evaluate_session_stats(
        &self,
        _field: &GameField,
        stats: &Self::Stats,
        _turn_limit: Option<usize>,
    ) -> f32 {
        let rows = stats.total_cleared_rows() as f64;
        let turns = stats.turns() as f64;
        let headroom = 1.0 - stats.average_max_height() / BOARD_HEIGHT as f64;
        (rows + Self::SURVIVAL_WEIGHT * turns * headroom) as f32
    }
}

#[cfg(test)]
mod tests {
    use blocktune_engine::{Board, PieceGenerator, PieceSeed};

    use crate::{
        board_feature::{CLASSIC_WEIGHTS, classic_board_features},
        placement_evaluator::FeatureBasedPlacementEvaluator,
    };

    use super::*;

    fn classic() -> TurnEvaluator<'static> {
        TurnEvaluator::new(Box::new(FeatureBasedPlacementEvaluator::new(
            classic_board_features(),
            CLASSIC_WEIGHTS.to_vec(),
        )))
    }

    fn stats(moves: &[(usize, usize)]) -> GameStats {
        let mut stats = GameStats::new();
        for &(cleared, height) in moves {
            stats.complete_move(cleared, height);
        }
        stats
    }

    #[test]
    fn test_lines_cleared_fitness() {
        let field = GameField::with_seed(PieceSeed::from(0));
        let fitness = LinesClearedFitness::new().evaluate_session_stats(
            &field,
            &stats(&[(1, 2), (0, 3), (2, 1)]),
            None,
        );
        assert!((fitness - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_health_fitness() {
        let field = GameField::with_seed(PieceSeed::from(0));
        let evaluator = HealthFitness::new();

        // 10 turns at average height 0: full survival bonus
        let flat = stats(&[(0, 0); 10]);
        let fitness = evaluator.evaluate_session_stats(&field, &flat, None);
        assert!((fitness - 1.0).abs() < 1e-6);

        // average height 21 cancels the survival bonus
        let tall = stats(&[(2, 21), (0, 21)]);
        let fitness = evaluator.evaluate_session_stats(&field, &tall, None);
        assert!((fitness - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sessions_do_not_touch_the_starting_field() {
        let field = GameField::with_generator(
            Board::from_ascii("#########."),
            PieceGenerator::with_seed(PieceSeed::from(4)),
        );
        let session_evaluator = DefaultSessionEvaluator::new(Some(30), LinesClearedFitness::new());
        let turn_evaluator = classic();

        let a = session_evaluator.play_and_evaluate_session(&field, &turn_evaluator);
        let b = session_evaluator.play_and_evaluate_session(&field, &turn_evaluator);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(field.turn(), 0);
    }

    #[test]
    fn test_sessions_are_averaged() {
        let session_evaluator = DefaultSessionEvaluator::new(Some(40), LinesClearedFitness::new());
        let turn_evaluator = classic();
        let fields = [
            GameField::with_seed(PieceSeed::from(8)),
            GameField::with_seed(PieceSeed::from(9)),
        ];
        let each: Vec<f32> = fields
            .iter()
            .map(|f| session_evaluator.play_and_evaluate_session(f, &turn_evaluator))
            .collect();
        let average = session_evaluator.play_and_evaluate_sessions(&fields, &turn_evaluator);
        assert!((average - (each[0] + each[1]) / 2.0).abs() < 1e-6);
    }
}
