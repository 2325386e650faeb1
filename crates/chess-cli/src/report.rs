//! Position status reports for the `status` command.

use chess_notation::{ChessError, GameResult, Position};
use serde::Serialize;
use std::fmt::Write;

/// Everything `status` prints about a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub fen: String,
    /// "white" or "black".
    pub side_to_move: String,
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub insufficient_material: bool,
    pub fifty_move_rule: bool,
    /// PGN result token when the position decides the game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Legal moves as "e2-e4".
    pub legal_moves: Vec<String>,
    /// The same moves in SAN, in the same order.
    pub legal_san: Vec<String>,
}

impl StatusReport {
    /// Builds the report for `position`.
    pub fn from_position(position: &Position) -> Result<Self, ChessError> {
        let color = position.active_color();
        let moves = position.legal_moves();
        let legal_san = moves
            .iter()
            .map(|&mv| {
                let next = position.apply_move(mv, None)?;
                position.to_san(mv, None, false, Position::check_suffix(&next))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StatusReport {
            fen: position.fen().to_string(),
            side_to_move: color.to_string().to_lowercase(),
            in_check: position.is_in_check(color),
            checkmate: position.is_checkmate(),
            stalemate: position.is_stalemate(),
            insufficient_material: position.is_draw_by_insufficient_material(),
            fifty_move_rule: position.is_draw_by_fifty_moves(),
            result: position.outcome().map(|r| r.pgn_token().to_string()),
            legal_moves: moves.iter().map(|mv| mv.to_string()).collect(),
            legal_san,
        })
    }

    /// Human-readable rendering of the report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let flag = |b: bool| if b { "yes" } else { "no" };
        let _ = writeln!(out, "FEN:          {}", self.fen);
        let _ = writeln!(out, "Side to move: {}", self.side_to_move);
        let _ = writeln!(out, "Check:        {}", flag(self.in_check));
        let _ = writeln!(out, "Checkmate:    {}", flag(self.checkmate));
        let _ = writeln!(out, "Stalemate:    {}", flag(self.stalemate));
        let _ = writeln!(out, "Insufficient: {}", flag(self.insufficient_material));
        let _ = writeln!(out, "Fifty moves:  {}", flag(self.fifty_move_rule));
        if let Some(result) = &self.result {
            let _ = writeln!(out, "Result:       {}", result);
        }
        let _ = writeln!(
            out,
            "Legal moves ({}): {}",
            self.legal_san.len(),
            self.legal_san.join(" ")
        );
        out
    }
}

/// Describes an outcome for log output.
pub fn describe(result: Option<GameResult>) -> String {
    match result {
        Some(result) => result.to_string(),
        None => "Game in progress".to_string(),
    }
}
