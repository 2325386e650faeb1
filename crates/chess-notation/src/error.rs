//! Error type shared by every engine operation.

use chess_core::{FenError, MoveParseError};
use thiserror::Error;

/// Errors raised by [`Position`](crate::Position), [`Game`](crate::Game),
/// [`Variation`](crate::Variation) and [`PgnImporter`](crate::PgnImporter).
///
/// Every error is raised before any state is touched: a failed call leaves
/// the game exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("invalid FEN: {0}")]
    InvalidFen(#[from] FenError),

    #[error("invalid PGN: {0}")]
    InvalidPgn(String),

    #[error("invalid move syntax: {0}")]
    InvalidMoveSyntax(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("ambiguous or invalid SAN: {0}")]
    AmbiguousOrInvalidSan(String),

    #[error("ply {index} out of range (last ply is {last})")]
    IndexOutOfRange { index: usize, last: usize },
}

impl From<MoveParseError> for ChessError {
    fn from(e: MoveParseError) -> Self {
        ChessError::InvalidMoveSyntax(e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_core_errors() {
        let err: ChessError = FenError::InvalidPartCount(2).into();
        assert!(matches!(err, ChessError::InvalidFen(FenError::InvalidPartCount(2))));

        let err: ChessError = MoveParseError("e2e4".to_string()).into();
        assert_eq!(err, ChessError::InvalidMoveSyntax("e2e4".to_string()));
    }

    #[test]
    fn display() {
        let err = ChessError::IndexOutOfRange { index: 9, last: 4 };
        assert_eq!(err.to_string(), "ply 9 out of range (last ply is 4)");
        assert!(ChessError::IllegalMove("e2-e5".into())
            .to_string()
            .contains("e2-e5"));
    }
}
