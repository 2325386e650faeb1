//! Game records: the main line, its tags and variations.
//!
//! A [`Game`] keeps every position it went through, so the position, legal
//! moves and status at any earlier ply can be queried without replaying.

use std::fmt;

use chess_core::{Color, Fen, Move, PieceKind, Square};

use crate::movetext::{push_line_tokens, wrap, DEFAULT_LINE_WIDTH};
use crate::san::san_promotion;
use crate::tags::TagSet;
use crate::{ChessError, Position, Variation};

/// A move appended to a game's main line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Ply index of the move; the first move is ply 0.
    pub ply: usize,
    pub mv: Move,
    pub promotion: Option<PieceKind>,
    pub san: String,
    /// FEN of the position after the move.
    pub fen: String,
}

/// What a board view needs to show one ply of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyView {
    /// Position index: 0 is the start, `n` is after the n-th move.
    pub ply: usize,
    pub fen: String,
    pub active_color: Color,
    /// The move that led here, if any.
    pub last_move: Option<Move>,
    pub last_san: Option<String>,
    /// Square of the king in check, if the side to move is in check.
    pub check_square: Option<Square>,
}

/// Callback invoked after every move appended to the main line.
pub type MoveListener = Box<dyn FnMut(&MoveRecord) + Send>;

/// A chess game: tags, the main line and its variations.
///
/// `positions[0]` is the start position and `positions[i + 1]` follows
/// `moves[i]`. Every operation either succeeds completely or leaves the
/// game untouched.
pub struct Game {
    positions: Vec<Position>,
    moves: Vec<Move>,
    san_moves: Vec<String>,
    tags: TagSet,
    variations: Vec<Variation>,
    listeners: Vec<MoveListener>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("positions", &self.positions)
            .field("moves", &self.moves)
            .field("san_moves", &self.san_moves)
            .field("tags", &self.tags)
            .field("variations", &self.variations)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Clones the record. Listeners stay with the original.
impl Clone for Game {
    fn clone(&self) -> Self {
        Game {
            positions: self.positions.clone(),
            moves: self.moves.clone(),
            san_moves: self.san_moves.clone(),
            tags: self.tags.clone(),
            variations: self.variations.clone(),
            listeners: Vec::new(),
        }
    }
}

impl Game {
    /// Creates a game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// Creates a game from a custom starting position.
    ///
    /// A non-standard start is recorded in the `SetUp` and `FEN` tags. If
    /// the position is already decided, `Result` says so.
    pub fn from_position(position: Position) -> Self {
        let mut tags = TagSet::new();
        if position.fen() != Fen::STARTPOS {
            tags.insert("SetUp", "1");
            tags.insert("FEN", position.fen());
        }
        if let Some(result) = position.outcome() {
            tags.insert("Result", result.pgn_token());
        }
        Game {
            positions: vec![position],
            moves: Vec::new(),
            san_moves: Vec::new(),
            tags,
            variations: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Current position.
    pub fn tip(&self) -> &Position {
        // positions always holds the start
        &self.positions[self.positions.len() - 1]
    }

    /// Index of the current position, equal to the number of moves played.
    #[inline]
    pub fn last_ply(&self) -> usize {
        self.moves.len()
    }

    /// Plays a coordinate move on the main line.
    ///
    /// Afterwards, a mate, stalemate or other drawn position sets the
    /// `Result` tag. Listeners are notified with the returned record.
    pub fn apply_coordinate_move(
        &mut self,
        mv: Move,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        let (next, san) = advance(self.tip(), mv, promotion)?;
        if let Some(result) = next.outcome() {
            self.tags.insert("Result", result.pgn_token());
        }

        let record = MoveRecord {
            ply: self.moves.len(),
            mv,
            promotion,
            san: san.clone(),
            fen: next.fen().to_string(),
        };
        self.positions.push(next);
        self.moves.push(mv);
        self.san_moves.push(san);

        for listener in &mut self.listeners {
            listener(&record);
        }
        Ok(record)
    }

    /// Plays a move written as `e2-e4`.
    pub fn apply_move_text(
        &mut self,
        text: &str,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        self.apply_coordinate_move(Move::parse(text)?, promotion)
    }

    /// Plays a SAN move on the main line.
    pub fn apply_san(&mut self, san: &str) -> Result<MoveRecord, ChessError> {
        let (mv, promotion) = resolve_san(self.tip(), san)?;
        self.apply_coordinate_move(mv, promotion)
    }

    /// Registers a callback run after each main-line move.
    pub fn on_move_applied(&mut self, listener: impl FnMut(&MoveRecord) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }

    /// Sets a tag. See [`TagSet::set`] for which keys are accepted.
    pub fn set_tag(&mut self, key: &str, value: impl Into<String>) -> Result<(), ChessError> {
        self.tags.set(key, value)
    }

    pub(crate) fn replace_tags(&mut self, tags: TagSet) {
        self.tags = tags;
    }

    /// The tag section, one `[Key "Value"]` line per tag.
    pub fn tag_pairs_text(&self) -> String {
        self.tags.to_pgn()
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

    /// Variations branching off the main line.
    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    /// Variations replacing the main-line move at `ply`.
    pub fn variations_at(&self, ply: usize) -> impl Iterator<Item = &Variation> {
        self.variations.iter().filter(move |v| v.anchor_ply() == ply)
    }

    /// Attaches a variation replacing the main-line move at its anchor ply.
    pub fn add_variation(&mut self, variation: Variation) -> Result<(), ChessError> {
        let anchor = variation.anchor_ply();
        if anchor >= self.moves.len() {
            return Err(ChessError::IndexOutOfRange {
                index: anchor,
                last: self.last_ply(),
            });
        }
        if variation.positions()[0] != self.positions[anchor] {
            return Err(ChessError::IllegalMove(format!(
                "variation does not start from the position at ply {}",
                anchor
            )));
        }
        self.variations.push(variation);
        Ok(())
    }

    /// Position at `ply`: 0 is the start, `n` is after the n-th move.
    pub fn position_at(&self, ply: usize) -> Result<&Position, ChessError> {
        self.positions.get(ply).ok_or(ChessError::IndexOutOfRange {
            index: ply,
            last: self.last_ply(),
        })
    }

    pub fn fen_at(&self, ply: usize) -> Result<&str, ChessError> {
        Ok(self.position_at(ply)?.fen())
    }

    pub fn legal_moves_at(&self, ply: usize) -> Result<Vec<Move>, ChessError> {
        Ok(self.position_at(ply)?.legal_moves())
    }

    pub fn legal_targets_at(&self, ply: usize, from: Square) -> Result<Vec<Square>, ChessError> {
        Ok(self.position_at(ply)?.legal_targets(from).iter().collect())
    }

    /// Whether the side to move at `ply` is in check.
    pub fn is_in_check_at(&self, ply: usize) -> Result<bool, ChessError> {
        let position = self.position_at(ply)?;
        Ok(position.is_in_check(position.active_color()))
    }

    pub fn is_checkmate_at(&self, ply: usize) -> Result<bool, ChessError> {
        Ok(self.position_at(ply)?.is_checkmate())
    }

    pub fn is_stalemate_at(&self, ply: usize) -> Result<bool, ChessError> {
        Ok(self.position_at(ply)?.is_stalemate())
    }

    /// Stalemate, insufficient material or the fifty-move rule.
    pub fn is_draw_at(&self, ply: usize) -> Result<bool, ChessError> {
        let position = self.position_at(ply)?;
        Ok(position.is_stalemate()
            || position.is_draw_by_insufficient_material()
            || position.is_draw_by_fifty_moves())
    }

    /// Everything a board view shows at `ply`.
    pub fn navigate(&self, ply: usize) -> Result<PlyView, ChessError> {
        let position = self.position_at(ply)?;
        let color = position.active_color();
        let check_square = if position.is_in_check(color) {
            position.king_square(color)
        } else {
            None
        };
        let previous = ply.checked_sub(1);
        Ok(PlyView {
            ply,
            fen: position.fen().to_string(),
            active_color: color,
            last_move: previous.map(|i| self.moves[i]),
            last_san: previous.map(|i| self.san_moves[i].clone()),
            check_square,
        })
    }

    /// The game as a PGN document, wrapping movetext at 80 columns.
    pub fn render(&self) -> String {
        self.render_with_width(DEFAULT_LINE_WIDTH)
    }

    /// The game as a PGN document: tag pairs, a blank line, then movetext
    /// ending with the result token.
    pub fn render_with_width(&self, width: usize) -> String {
        let mut tokens = Vec::new();
        push_line_tokens(0, &self.positions, &self.san_moves, &self.variations, &mut tokens);
        tokens.push(self.tags.roster().result.clone());

        let mut pgn = self.tags.to_pgn();
        pgn.push('\n');
        pgn.push_str(&wrap(&tokens, width));
        pgn.push('\n');
        pgn
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Checks and plays a move from `tip`, returning the next position and the
/// move's SAN.
pub(crate) fn advance(
    tip: &Position,
    mv: Move,
    promotion: Option<PieceKind>,
) -> Result<(Position, String), ChessError> {
    if !tip.is_legal(mv) {
        return Err(ChessError::IllegalMove(mv.to_string()));
    }
    let next = tip.apply_move(mv, promotion)?;
    let san = tip.to_san(mv, promotion, false, Position::check_suffix(&next))?;
    Ok((next, san))
}

/// Resolves a SAN token at `tip`, together with its promotion piece.
pub(crate) fn resolve_san(
    tip: &Position,
    san: &str,
) -> Result<(Move, Option<PieceKind>), ChessError> {
    let mv = tip.from_san(san)?;
    Ok((mv, san_promotion(san)))
}
