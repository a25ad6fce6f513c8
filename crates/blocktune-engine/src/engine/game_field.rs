use crate::{
    GameOverError,
    core::{
        board::Board,
        piece::{Move, PieceKind},
    },
};

use super::piece_generator::{PieceGenerator, PieceSeed};

/// Authoritative state of one game: the board, the piece to place next, and the counters.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    next_piece: PieceKind,
    generator: PieceGenerator,
    turn: usize,
    rows_cleared: usize,
    lost: bool,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(Board::EMPTY, PieceGenerator::new())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_generator(Board::EMPTY, PieceGenerator::with_seed(seed))
    }

    /// Starts a game from an arbitrary board; the first piece is drawn from `generator`.
    #[must_use]
    pub fn with_generator(board: Board, mut generator: PieceGenerator) -> Self {
        let next_piece = generator.next_piece();
        Self {
            board,
            next_piece,
            generator,
            turn: 0,
            rows_cleared: 0,
            lost: false,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next_piece
    }

    /// Number of pieces placed so far.
    #[must_use]
    pub fn turn(&self) -> usize {
        self.turn
    }

    #[must_use]
    pub fn rows_cleared(&self) -> usize {
        self.rows_cleared
    }

    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    #[must_use]
    pub fn legal_moves(&self) -> &'static [Move] {
        self.next_piece.legal_moves()
    }

    /// Places the next piece and draws a new one.
    ///
    /// Returns the number of cleared rows. A move that overflows the board ends the game; once
    /// lost, every further call fails with [`GameOverError::AlreadyLost`].
    pub fn apply_move(&mut self, mv: Move) -> Result<usize, GameOverError> {
        if self.lost {
            return Err(GameOverError::AlreadyLost);
        }
        let cleared = self.board.place(self.next_piece, mv).map_err(|e| {
            self.lost = true;
            GameOverError::Overflow(e)
        })?;
        self.turn += 1;
        self.rows_cleared += cleared;
        self.next_piece = self.generator.next_piece();
        Ok(cleared)
    }
}
