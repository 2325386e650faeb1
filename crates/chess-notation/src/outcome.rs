//! Game outcomes detectable from a single position.

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// White delivered mate.
    WhiteWins,
    /// Black delivered mate.
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// No legal moves and not in check.
    Stalemate,
    /// Neither side can mate with the material left.
    InsufficientMaterial,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
}

impl GameResult {
    /// The PGN result token (`1-0`, `0-1` or `1/2-1/2`).
    pub const fn pgn_token(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "White wins"),
            GameResult::BlackWins => write!(f, "Black wins"),
            GameResult::Draw(DrawReason::Stalemate) => write!(f, "Draw by stalemate"),
            GameResult::Draw(DrawReason::InsufficientMaterial) => {
                write!(f, "Draw by insufficient material")
            }
            GameResult::Draw(DrawReason::FiftyMoveRule) => write!(f, "Draw by the 50-move rule"),
        }
    }
}
