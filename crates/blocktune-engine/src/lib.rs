pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece would overflow the top of the board")]
pub struct BoardOverflowError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GameOverError {
    #[display("board overflowed while placing the piece")]
    Overflow(BoardOverflowError),
    #[display("game is already over")]
    AlreadyLost,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown piece kind: {input:?}")]
pub struct ParsePieceKindError {
    input: String,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("at least one piece kind needs a non-zero count")]
pub struct EmptyPieceDistributionError;
