//! Chess position representation.

use chess_core::{Color, Fen, File, Move, Piece, PieceKind, Square};
use std::fmt;

use crate::ChessError;

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Reads a FEN castling field. Unknown letters are ignored.
    pub fn from_fen_field(field: &str) -> Self {
        let flags = field.chars().fold(0, |flags, c| {
            flags
                | match c {
                    'K' => Self::WHITE_KINGSIDE,
                    'Q' => Self::WHITE_QUEENSIDE,
                    'k' => Self::BLACK_KINGSIDE,
                    'q' => Self::BLACK_QUEENSIDE,
                    _ => 0,
                }
        });
        CastlingRights::new(flags)
    }

    /// The FEN castling field, `-` when no rights remain.
    pub fn to_fen_field(self) -> String {
        let field: String = [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|(_, c)| *c)
        .collect();
        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }

    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_flag(color) != 0
    }

    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_flag(color) != 0
    }

    /// Removes both rights of a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !(Self::kingside_flag(color) | Self::queenside_flag(color));
    }

    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        self.0 &= !Self::kingside_flag(color);
    }

    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        self.0 &= !Self::queenside_flag(color);
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    const fn kingside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    const fn queenside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }
}

/// An immutable chess position.
///
/// A position is built either from FEN or by applying a move to another
/// position; it never changes afterwards. Its canonical FEN is computed once
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: [Option<Piece>; 64],
    active_color: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    fen: String,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self::from_parts(start_board(), Color::White, CastlingRights::ALL, None, 0, 1)
    }

    /// Parses a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::from_parsed(Fen::parse(fen)?))
    }

    fn from_parsed(parsed: Fen) -> Self {
        let castling = CastlingRights::from_fen_field(&parsed.castling);
        Self::from_parts(
            parsed.board,
            parsed.active_color,
            castling,
            parsed.en_passant,
            parsed.halfmove_clock,
            parsed.fullmove_number,
        )
    }

    fn from_parts(
        board: [Option<Piece>; 64],
        active_color: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        let fen = Fen {
            board,
            active_color,
            castling: castling.to_fen_field(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        }
        .to_fen();
        Position {
            board,
            active_color,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            fen,
        }
    }

    /// The canonical FEN of this position.
    #[inline]
    pub fn fen(&self) -> &str {
        &self.fen
    }

    #[inline]
    pub fn active_color(&self) -> Color {
        self.active_color
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the piece on a square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index() as usize]
    }

    /// Iterates over the pieces of one color, from a1 to h8.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|piece| piece.color == color)
                .map(|piece| (sq, piece))
        })
    }

    /// Returns the square of the king of the given color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Returns the position reached by playing `mv`.
    ///
    /// The move is expected to be legal; only an empty start square is
    /// rejected. `promotion` is used when a pawn reaches its last rank and
    /// defaults to a queen.
    pub fn apply_move(
        &self,
        mv: Move,
        promotion: Option<PieceKind>,
    ) -> Result<Position, ChessError> {
        let moved = self
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::IllegalMove(format!("{}: no piece on {}", mv, mv.from)))?;
        let color = moved.color;

        let mut board = self.board;
        let mut is_capture = board[mv.to.index() as usize].is_some();
        let mut placed = moved;
        board[mv.from.index() as usize] = None;

        match moved.kind {
            PieceKind::King => {
                if let Some((rook_from, rook_to)) = castling_rook_path(mv, color) {
                    if let Some(rook) = board[rook_from.index() as usize].take() {
                        board[rook_to.index() as usize] = Some(rook);
                    }
                }
            }
            PieceKind::Pawn => {
                if self.en_passant == Some(mv.to) && mv.from.file() != mv.to.file() && !is_capture {
                    let victim = Square::new(mv.to.file(), mv.from.rank());
                    board[victim.index() as usize] = None;
                    is_capture = true;
                }
                if mv.to.rank() == color.promotion_rank() {
                    let kind = promotion
                        .filter(|kind| kind.is_promotion_target())
                        .unwrap_or(PieceKind::Queen);
                    placed = Piece::new(color, kind);
                }
            }
            _ => {}
        }
        board[mv.to.index() as usize] = Some(placed);

        let mut castling = self.castling;
        if moved.kind == PieceKind::King {
            castling.remove_color(color);
        }
        for sq in [mv.from, mv.to] {
            match sq {
                Square::A1 => castling.remove_queenside(Color::White),
                Square::H1 => castling.remove_kingside(Color::White),
                Square::A8 => castling.remove_queenside(Color::Black),
                Square::H8 => castling.remove_kingside(Color::Black),
                _ => {}
            }
        }

        let rank_distance = (mv.to.rank().index() as i8 - mv.from.rank().index() as i8).abs();
        let en_passant = if moved.kind == PieceKind::Pawn && rank_distance == 2 {
            mv.from.offset(0, color.pawn_direction())
        } else {
            None
        };

        let halfmove_clock = if moved.kind == PieceKind::Pawn || is_capture {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        let fullmove_number = match self.active_color {
            Color::Black => self.fullmove_number.saturating_add(1),
            Color::White => self.fullmove_number,
        };

        Ok(Self::from_parts(
            board,
            self.active_color.opposite(),
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        ))
    }
}

/// Rook start and end squares when `mv` is a castling move of `color`'s king.
pub(crate) fn castling_rook_path(mv: Move, color: Color) -> Option<(Square, Square)> {
    let rank = color.back_rank();
    if mv.from != Square::new(File::E, rank) || mv.to.rank() != rank {
        return None;
    }
    match mv.to.file() {
        File::G => Some((Square::new(File::H, rank), Square::new(File::F, rank))),
        File::C => Some((Square::new(File::A, rank), Square::new(File::D, rank))),
        _ => None,
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen)
    }
}

/// Board of the standard starting position.
fn start_board() -> [Option<Piece>; 64] {
    let back = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];
    let mut board = [None; 64];
    for (file, kind) in File::ALL.into_iter().zip(back) {
        for color in Color::BOTH {
            board[Square::new(file, color.back_rank()).index() as usize] =
                Some(Piece::new(color, kind));
            board[Square::new(file, color.pawn_rank()).index() as usize] =
                Some(Piece::new(color, PieceKind::Pawn));
        }
    }
    board
}
