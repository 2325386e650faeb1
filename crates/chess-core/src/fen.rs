//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! The accepted grammar is the canonical one: single spaces between the six
//! fields, no adjacent digits in a rank, castling letters in `KQkq` order and
//! no leading zeros in the clocks. Anything this module accepts serializes
//! back to the identical string.

use crate::{Color, File, Piece, Rank, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 space-separated fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A parsed FEN record.
///
/// The engine turns this into its own position type; this struct only
/// guarantees the text was well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Board contents indexed by [`Square::index`].
    pub board: [Option<Piece>; 64],
    pub active_color: Color,
    /// Castling field exactly as written (`-` or a subsequence of `KQkq`).
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split(' ').collect();
        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let board = parse_placement(parts[0])?;

        let mut letters = parts[1].chars();
        let active_color = match (letters.next().and_then(Color::from_fen_char), letters.next()) {
            (Some(color), None) => color,
            _ => return Err(FenError::InvalidActiveColor(parts[1].to_string())),
        };

        if !is_castling_field(parts[2]) {
            return Err(FenError::InvalidCastlingRights(parts[2].to_string()));
        }

        let en_passant = match parts[3] {
            "-" => None,
            ep => Some(parse_en_passant(ep)?),
        };

        let halfmove_clock = parse_counter(parts[4])
            .ok_or_else(|| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
        let fullmove_number = parse_counter(parts[5])
            .filter(|&n| n > 0)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(Fen {
            board,
            active_color,
            castling: parts[2].to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Returns true if `fen` is accepted by [`Fen::parse`].
    pub fn is_valid(fen: &str) -> bool {
        Self::parse(fen).is_ok()
    }

    /// Serializes the piece-placement field of a board.
    pub fn placement(board: &[Option<Piece>; 64]) -> String {
        let mut out = String::with_capacity(71);
        for rank in Rank::ALL.iter().rev() {
            let mut gap = 0u8;
            for file in File::ALL {
                match board[Square::new(file, *rank).index() as usize] {
                    Some(piece) => {
                        if gap > 0 {
                            out.push((b'0' + gap) as char);
                            gap = 0;
                        }
                        out.push(piece.to_fen_char());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push((b'0' + gap) as char);
            }
            if *rank != Rank::R1 {
                out.push('/');
            }
        }
        out
    }

    /// Converts the record back to a FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            Self::placement(&self.board),
            self.active_color.fen_char(),
            self.castling,
            self.en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn parse_placement(placement: &str) -> Result<[Option<Piece>; 64], FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    let mut board = [None; 64];
    for (row, text) in ranks.iter().enumerate() {
        let rank = Rank::ALL[7 - row];
        let mut file = 0u8;
        let mut previous_was_digit = false;
        for c in text.chars() {
            if let Some(gap) = c.to_digit(10) {
                if !(1..=8).contains(&gap) || previous_was_digit {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "bad gap '{}' in rank {}",
                        c, rank
                    )));
                }
                file += gap as u8;
                previous_was_digit = true;
            } else if let Some(piece) = Piece::from_fen_char(c) {
                if let Some(f) = File::from_index(file) {
                    board[Square::new(f, rank).index() as usize] = Some(piece);
                }
                file += 1;
                previous_was_digit = false;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c, rank
                )));
            }
            if file > 8 {
                break;
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} covers {} files, expected 8",
                rank, file
            )));
        }
    }
    Ok(board)
}

fn is_castling_field(field: &str) -> bool {
    if field == "-" {
        return true;
    }
    // Non-empty, in-order subsequence of "KQkq".
    let mut order = "KQkq".chars();
    !field.is_empty() && field.chars().all(|c| order.by_ref().any(|o| o == c))
}

fn parse_en_passant(field: &str) -> Result<Square, FenError> {
    Square::from_algebraic(field)
        .filter(|sq| matches!(sq.rank(), Rank::R3 | Rank::R6))
        .ok_or_else(|| FenError::InvalidEnPassantSquare(field.to_string()))
}

/// Decimal counter without sign or leading zeros.
fn parse_counter(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if field.len() > 1 && field.starts_with('0') {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceKind;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(Fen::STARTPOS).unwrap();
        assert_eq!(fen.active_color, Color::White);
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(
            fen.board[sq("e1").index() as usize],
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            fen.board[sq("d8").index() as usize],
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        assert_eq!(fen.board[sq("e4").index() as usize], None);
    }

    #[test]
    fn roundtrip() {
        for original in [
            Fen::STARTPOS,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/R3K2R w KQ - 99 120",
        ] {
            assert_eq!(Fen::parse(original).unwrap().to_fen(), original);
        }
    }

    #[test]
    fn invalid_part_count() {
        assert_eq!(Fen::parse("invalid"), Err(FenError::InvalidPartCount(1)));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8  w - - 0 1"),
            Err(FenError::InvalidPartCount(7))
        ));
    }

    #[test]
    fn invalid_active_color() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 x KQkq - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        for placement in [
            "8/8/8/8/8/8/8",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR",
            "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "44/8/8/8/8/8/8/8",
            "7/8/8/8/8/8/8/8",
            "9/8/8/8/8/8/8/8",
            "08/8/8/8/8/8/8/8",
        ] {
            let fen = format!("{} w - - 0 1", placement);
            assert!(
                matches!(Fen::parse(&fen), Err(FenError::InvalidPiecePlacement(_))),
                "{placement}"
            );
        }
    }

    #[test]
    fn castling_field() {
        for ok in ["-", "K", "Kq", "KQkq", "Qk", "kq", "q"] {
            assert!(is_castling_field(ok), "{ok}");
        }
        for bad in ["", "XYZ", "qK", "KK", "KQkq-", "-K"] {
            assert!(!is_castling_field(bad), "{bad}");
        }
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w qk - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn en_passant_field() {
        let fen = Fen::parse("8/8/8/8/8/8/8/8 b - d6 0 1").unwrap();
        assert_eq!(fen.en_passant, Some(sq("d6")));
        for bad in ["abc", "x3", "e4", "e"] {
            let text = format!("8/8/8/8/8/8/8/8 w - {} 0 1", bad);
            assert!(
                matches!(Fen::parse(&text), Err(FenError::InvalidEnPassantSquare(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn clocks() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 01 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - -1 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 0 xyz"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn is_valid() {
        assert!(Fen::is_valid(Fen::STARTPOS));
        assert!(!Fen::is_valid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"));
    }

    #[test]
    fn fen_error_display() {
        let err = FenError::InvalidPartCount(3);
        assert!(format!("{}", err).contains('3'));

        let err = FenError::InvalidCastlingRights("XYZ".to_string());
        assert!(format!("{}", err).contains("XYZ"));

        let err = FenError::InvalidEnPassantSquare("z9".to_string());
        assert!(format!("{}", err).contains("z9"));
    }
}
