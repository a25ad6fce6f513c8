//! Analysis of the board after a candidate move.
//!
//! [`PlacementAnalysis`] bundles the move, the number of rows it cleared and a lazily
//! evaluated [`BoardAnalysis`] of the resulting board. The simulation runs on a private copy,
//! so analyzing one move never affects the analysis of another.
//!
//! ```
//! use blocktune_engine::{Board, Move, Orientation, PieceKind};
//! use blocktune_evaluator::placement_analysis::PlacementAnalysis;
//!
//! let board = Board::from_ascii("########..");
//! let mv = Move::new(Orientation::new(0), 8);
//! let analysis = PlacementAnalysis::simulate(&board, PieceKind::O, mv).unwrap();
//!
//! assert_eq!(analysis.cleared_rows(), 1);
//! assert_eq!(analysis.board_analysis().max_height(), 1);
//! ```

use blocktune_engine::{Board, BoardOverflowError, Move, PieceKind};

use crate::board_analysis::BoardAnalysis;

#[derive(Debug)]
pub struct PlacementAnalysis {
    piece: PieceKind,
    mv: Move,
    cleared_rows: usize,
    board_analysis: BoardAnalysis,
}

impl PlacementAnalysis {
    /// Drops `piece` onto a copy of `board` and analyzes the result.
    pub fn simulate(board: &Board, piece: PieceKind, mv: Move) -> Result<Self, BoardOverflowError> {
        let (after, cleared_rows) = board.simulate_move(piece, mv)?;
        Ok(Self {
            piece,
            mv,
            cleared_rows,
            board_analysis: BoardAnalysis::new(after),
        })
    }

    #[must_use]
    pub fn piece(&self) -> PieceKind {
        self.piece
    }

    #[must_use]
    pub fn mv(&self) -> Move {
        self.mv
    }

    #[must_use]
    pub fn cleared_rows(&self) -> usize {
        self.cleared_rows
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis {
        &self.board_analysis
    }
}
