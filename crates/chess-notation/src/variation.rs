//! Alternative lines branching off a game or another variation.

use chess_core::{Move, PieceKind};

use crate::game::{advance, resolve_san};
use crate::movetext::push_line_tokens;
use crate::{ChessError, Position};

/// A branch replacing the move at `anchor_ply` of its parent line.
///
/// Plies are counted in the game's own numbering: `positions[0]` is the
/// game position before ply `anchor_ply`, and `moves[i]` is played at ply
/// `anchor_ply + i`. Children branch inside this variation's own range. A
/// variation always holds at least one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    anchor_ply: usize,
    positions: Vec<Position>,
    moves: Vec<Move>,
    san_moves: Vec<String>,
    children: Vec<Variation>,
}

impl Variation {
    /// Starts a variation from the FEN of the anchor position and its first
    /// SAN move.
    pub fn new(anchor_ply: usize, anchor_fen: &str, first_san: &str) -> Result<Self, ChessError> {
        Self::from_position(anchor_ply, Position::from_fen(anchor_fen)?, first_san)
    }

    /// Starts a variation from the anchor position and its first SAN move.
    pub fn from_position(
        anchor_ply: usize,
        anchor: Position,
        first_san: &str,
    ) -> Result<Self, ChessError> {
        let mut variation = Variation {
            anchor_ply,
            positions: vec![anchor],
            moves: Vec::new(),
            san_moves: Vec::new(),
            children: Vec::new(),
        };
        variation.append_san(first_san)?;
        Ok(variation)
    }

    /// Appends a SAN move at the end of the variation.
    pub fn append_san(&mut self, san: &str) -> Result<&str, ChessError> {
        let (mv, promotion) = resolve_san(self.tip(), san)?;
        self.append_coordinate_move(mv, promotion)
    }

    /// Appends a coordinate move, returning its SAN.
    pub fn append_coordinate_move(
        &mut self,
        mv: Move,
        promotion: Option<PieceKind>,
    ) -> Result<&str, ChessError> {
        let (next, san) = advance(self.tip(), mv, promotion)?;
        self.positions.push(next);
        self.moves.push(mv);
        self.san_moves.push(san);
        Ok(self.san_moves.last().map_or("", String::as_str))
    }

    /// Attaches a nested variation. It must branch from one of this
    /// variation's own plies, from the position played there.
    pub fn push_child(&mut self, child: Variation) -> Result<(), ChessError> {
        let offset = child
            .anchor_ply
            .checked_sub(self.anchor_ply)
            .filter(|&offset| offset < self.moves.len())
            .ok_or(ChessError::IndexOutOfRange {
                index: child.anchor_ply,
                last: self.end_ply(),
            })?;
        if child.positions[0] != self.positions[offset] {
            return Err(ChessError::IllegalMove(format!(
                "variation does not start from the position at ply {}",
                child.anchor_ply
            )));
        }
        self.children.push(child);
        Ok(())
    }

    pub fn anchor_ply(&self) -> usize {
        self.anchor_ply
    }

    /// Ply of the last move in the variation.
    pub fn end_ply(&self) -> usize {
        self.anchor_ply + self.moves.len().saturating_sub(1)
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn san_moves(&self) -> &[String] {
        &self.san_moves
    }

    pub fn children(&self) -> &[Variation] {
        &self.children
    }

    /// Position after the last move.
    pub fn tip(&self) -> &Position {
        // positions always holds the anchor
        &self.positions[self.positions.len() - 1]
    }

    /// Movetext of the variation in parentheses, e.g. `(1. d4 d5)`.
    pub fn render(&self) -> String {
        let mut tokens = Vec::new();
        self.push_tokens(&mut tokens);
        tokens.join(" ")
    }

    pub(crate) fn push_tokens(&self, out: &mut Vec<String>) {
        let start = out.len();
        push_line_tokens(
            self.anchor_ply,
            &self.positions,
            &self.san_moves,
            &self.children,
            out,
        );
        if let Some(first) = out.get_mut(start) {
            first.insert(0, '(');
        }
        if let Some(last) = out.last_mut() {
            last.push(')');
        }
    }
}
