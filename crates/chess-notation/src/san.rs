//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "Qh4#".

use chess_core::{Color, File, Move, PieceKind, Rank, Square};

use crate::position::castling_rook_path;
use crate::{ChessError, Position};

/// Components of a SAN token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedSan {
    Castle {
        kingside: bool,
    },
    Normal {
        kind: PieceKind,
        file_hint: Option<File>,
        rank_hint: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<PieceKind>,
    },
}

impl ParsedSan {
    /// Parses a SAN token, ignoring a trailing `+` or `#`.
    ///
    /// This accepts a pawn file hint without a capture marker (`ed5`), which
    /// [`is_san_shaped`] rejects.
    pub fn parse(san: &str) -> Option<Self> {
        let body = san.strip_suffix(['+', '#']).unwrap_or(san);
        match body {
            "O-O" => return Some(ParsedSan::Castle { kingside: true }),
            "O-O-O" => return Some(ParsedSan::Castle { kingside: false }),
            _ => {}
        }

        let mut chars: Vec<char> = body.chars().collect();

        let kind = match chars.first().copied().and_then(PieceKind::from_san_letter) {
            Some(kind) => {
                chars.remove(0);
                kind
            }
            None => PieceKind::Pawn,
        };

        let mut promotion = None;
        if kind == PieceKind::Pawn && chars.len() >= 2 && chars[chars.len() - 2] == '=' {
            let letter = chars[chars.len() - 1];
            let kind = PieceKind::from_san_letter(letter).filter(|k| k.is_promotion_target())?;
            promotion = Some(kind);
            chars.truncate(chars.len() - 2);
        }

        if chars.len() < 2 {
            return None;
        }
        let rank = Rank::from_char(chars[chars.len() - 1])?;
        let file = File::from_char(chars[chars.len() - 2])?;
        let to = Square::new(file, rank);
        chars.truncate(chars.len() - 2);

        let capture = chars.last() == Some(&'x');
        if capture {
            chars.pop();
        }

        let (file_hint, rank_hint) = match chars.as_slice() {
            [] => (None, None),
            [c] => match (File::from_char(*c), Rank::from_char(*c)) {
                (Some(f), _) => (Some(f), None),
                (None, Some(r)) => (None, Some(r)),
                (None, None) => return None,
            },
            [f, r] => (Some(File::from_char(*f)?), Some(Rank::from_char(*r)?)),
            _ => return None,
        };

        let hinted = file_hint.is_some() || rank_hint.is_some();
        match kind {
            PieceKind::King if hinted => return None,
            PieceKind::Pawn if rank_hint.is_some() => return None,
            PieceKind::Pawn if capture && file_hint.is_none() => return None,
            _ => {}
        }

        Some(ParsedSan::Normal {
            kind,
            file_hint,
            rank_hint,
            capture,
            to,
            promotion,
        })
    }
}

/// Returns true if `text` has the shape of a SAN token as written in PGN
/// movetext.
pub fn is_san_shaped(text: &str) -> bool {
    match ParsedSan::parse(text) {
        Some(ParsedSan::Normal {
            kind: PieceKind::Pawn,
            file_hint: Some(_),
            capture: false,
            ..
        }) => false,
        Some(_) => true,
        None => false,
    }
}

/// Extracts the promotion piece of a SAN token (`e8=N` gives a knight).
pub fn san_promotion(san: &str) -> Option<PieceKind> {
    match ParsedSan::parse(san)? {
        ParsedSan::Normal { promotion, .. } => promotion,
        ParsedSan::Castle { .. } => None,
    }
}

impl Position {
    /// Writes `mv` in SAN.
    ///
    /// The position must be the one before the move. `suffix` is appended
    /// as given; see [`Position::check_suffix`]. With `with_move_number`,
    /// the token is prefixed by `N. ` or `N... ` depending on the side to
    /// move.
    pub fn to_san(
        &self,
        mv: Move,
        promotion: Option<PieceKind>,
        with_move_number: bool,
        suffix: &str,
    ) -> Result<String, ChessError> {
        let piece = self.piece_at(mv.from).ok_or_else(|| {
            ChessError::IllegalMove(format!("{}: no piece on {}", mv, mv.from))
        })?;

        let mut san = String::new();
        if with_move_number {
            san.push_str(&self.move_number_prefix());
            san.push(' ');
        }

        if piece.kind == PieceKind::King && castling_rook_path(mv, piece.color).is_some() {
            san.push_str(if mv.to.file() == File::G { "O-O" } else { "O-O-O" });
            san.push_str(suffix);
            return Ok(san);
        }

        let is_capture = self.piece_at(mv.to).is_some()
            || (piece.kind == PieceKind::Pawn
                && self.en_passant() == Some(mv.to)
                && mv.from.file() != mv.to.file());

        match piece.kind.san_letter() {
            Some(letter) => {
                san.push(letter);
                san.push_str(&self.disambiguation(mv, piece.kind, piece.color));
            }
            None if is_capture => san.push(mv.from.file().to_char()),
            None => {}
        }

        if is_capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());

        if piece.kind == PieceKind::Pawn && mv.to.rank() == piece.color.promotion_rank() {
            let kind = promotion
                .filter(|k| k.is_promotion_target())
                .unwrap_or(PieceKind::Queen);
            san.push('=');
            san.extend(kind.san_letter());
        }

        san.push_str(suffix);
        Ok(san)
    }

    /// `N.` when White is to move, `N...` when Black is.
    pub fn move_number_prefix(&self) -> String {
        match self.active_color() {
            Color::White => format!("{}.", self.fullmove_number()),
            Color::Black => format!("{}...", self.fullmove_number()),
        }
    }

    /// The SAN suffix for a move leading to `next`: `#` for mate, `+` for
    /// check, nothing otherwise.
    pub fn check_suffix(next: &Position) -> &'static str {
        if !next.is_in_check(next.active_color()) {
            ""
        } else if next.has_legal_moves() {
            "+"
        } else {
            "#"
        }
    }

    fn disambiguation(&self, mv: Move, kind: PieceKind, color: Color) -> String {
        let rivals: Vec<Square> = self
            .pieces(color)
            .filter(|&(sq, piece)| piece.kind == kind && sq != mv.from)
            .map(|(sq, _)| sq)
            .filter(|&sq| self.legal_targets(sq).contains(mv.to))
            .collect();

        if rivals.is_empty() {
            String::new()
        } else if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
            mv.from.file().to_string()
        } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
            mv.from.rank().to_string()
        } else {
            mv.from.to_algebraic()
        }
    }

    /// Resolves a SAN token to the coordinate move it denotes.
    ///
    /// Candidates are the pieces of the named kind that can legally reach the
    /// target. A file or rank hint is only consulted when more than one
    /// candidate remains, so a lone candidate wins whatever the hint says.
    pub fn from_san(&self, san: &str) -> Result<Move, ChessError> {
        let invalid = || ChessError::AmbiguousOrInvalidSan(san.to_string());
        let color = self.active_color();

        match ParsedSan::parse(san).ok_or_else(invalid)? {
            ParsedSan::Castle { kingside } => {
                let rank = color.back_rank();
                let file = if kingside { File::G } else { File::C };
                let mv = Move::new(Square::new(File::E, rank), Square::new(file, rank));
                let is_king = self
                    .piece_at(mv.from)
                    .is_some_and(|p| p.kind == PieceKind::King);
                if is_king && self.is_legal(mv) {
                    Ok(mv)
                } else {
                    Err(invalid())
                }
            }
            ParsedSan::Normal {
                kind,
                file_hint,
                rank_hint,
                to,
                promotion,
                ..
            } => {
                if promotion.is_some() && to.rank() != color.promotion_rank() {
                    return Err(invalid());
                }
                let mut candidates: Vec<Square> = self
                    .pieces(color)
                    .filter(|(_, piece)| piece.kind == kind)
                    .map(|(sq, _)| sq)
                    .filter(|&sq| self.legal_targets(sq).contains(to))
                    .collect();
                if candidates.len() > 1 {
                    candidates.retain(|sq| {
                        file_hint.map_or(true, |f| sq.file() == f)
                            && rank_hint.map_or(true, |r| sq.rank() == r)
                    });
                }
                match candidates.as_slice() {
                    [from] => Ok(Move::new(*from, to)),
                    _ => Err(invalid()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        Move::parse(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn san(position: &Position, m: &str) -> String {
        let m = mv(m);
        let next = position.apply_move(m, None).unwrap();
        position
            .to_san(m, None, false, Position::check_suffix(&next))
            .unwrap()
    }

    #[test]
    fn simple_moves() {
        let position = Position::startpos();
        assert_eq!(san(&position, "e2-e4"), "e4");
        assert_eq!(san(&position, "g1-f3"), "Nf3");
        assert_eq!(
            position.to_san(mv("e2-e4"), None, true, "").unwrap(),
            "1. e4"
        );
        let black = position.apply_move(mv("e2-e4"), None).unwrap();
        assert_eq!(black.to_san(mv("c7-c5"), None, true, "").unwrap(), "1... c5");
    }

    #[test]
    fn captures() {
        let position = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(san(&position, "e4-d5"), "exd5");
        let en_passant = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(san(&en_passant, "e5-f6"), "exf6");
    }

    #[test]
    fn castling() {
        let position = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(san(&position, "e1-g1"), "O-O");
        assert_eq!(san(&position, "e1-c1"), "O-O-O");
        assert_eq!(position.from_san("O-O").unwrap(), mv("e1-g1"));
        assert_eq!(position.from_san("O-O-O").unwrap(), mv("e1-c1"));
        let no_rights = pos("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(no_rights.from_san("O-O").is_err());
    }

    #[test]
    fn disambiguation_by_file_rank_and_square() {
        let by_file = pos("4k3/8/8/8/8/8/8/R4R1K w - - 0 1");
        assert_eq!(san(&by_file, "a1-c1"), "Rac1");
        assert_eq!(by_file.from_san("Rac1").unwrap(), mv("a1-c1"));
        assert!(matches!(
            by_file.from_san("Rc1"),
            Err(ChessError::AmbiguousOrInvalidSan(_))
        ));

        let by_rank = pos("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert_eq!(san(&by_rank, "a1-a3"), "R1a3");
        assert_eq!(by_rank.from_san("R5a3").unwrap(), mv("a5-a3"));

        let by_square = pos("4k3/8/8/8/8/Q7/8/Q1Q4K w - - 0 1");
        assert_eq!(san(&by_square, "a1-b2"), "Qa1b2");
        assert_eq!(by_square.from_san("Qa1b2").unwrap(), mv("a1-b2"));
        assert!(by_square.from_san("Qab2").is_err());
    }

    #[test]
    fn pinned_rival_needs_no_disambiguation() {
        // The c3 knight is pinned, so only the g1 knight reaches e2.
        let position = pos("4k3/8/8/b7/8/2N5/8/4K1N1 w - - 0 1");
        assert_eq!(san(&position, "g1-e2"), "Ne2");
    }

    #[test]
    fn promotion() {
        let position = pos("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1");
        assert_eq!(san(&position, "e7-e8"), "e8=Q+");
        assert_eq!(
            position
                .to_san(mv("e7-d8"), Some(PieceKind::Knight), false, "")
                .unwrap(),
            "exd8=N"
        );
        assert_eq!(position.from_san("exd8=N").unwrap(), mv("e7-d8"));
        assert_eq!(san_promotion("exd8=N"), Some(PieceKind::Knight));
        assert_eq!(san_promotion("e8"), None);
        assert!(position.from_san("e8=K").is_err());
    }

    #[test]
    fn check_and_mate_suffixes() {
        let position = pos("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2");
        assert_eq!(san(&position, "d8-h4"), "Qh4#");
        let check = pos("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert_eq!(san(&check, "a1-a8"), "Ra8+");
    }

    #[test]
    fn from_san_ignores_suffix_and_rejects_garbage() {
        let position = Position::startpos();
        assert_eq!(position.from_san("Nf3+").unwrap(), mv("g1-f3"));
        assert_eq!(position.from_san("e4").unwrap(), mv("e2-e4"));
        for bad in ["", "e5", "Nf4", "Ke2", "Zf3", "e4=Q", "xe4", "O-O", "e2e4"] {
            assert!(
                matches!(position.from_san(bad), Err(ChessError::AmbiguousOrInvalidSan(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn hint_is_ignored_for_a_single_candidate() {
        let position = Position::startpos();
        assert_eq!(position.from_san("Ngf3").unwrap(), mv("g1-f3"));
        assert_eq!(position.from_san("Ng1f3").unwrap(), mv("g1-f3"));
        assert_eq!(position.from_san("Nbf3").unwrap(), mv("g1-f3"));
        assert_eq!(position.from_san("N8f3").unwrap(), mv("g1-f3"));

        let after_d5 = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(after_d5.from_san("cxd5").unwrap(), mv("e4-d5"));
    }

    #[test]
    fn hint_must_pick_one_of_several_candidates() {
        let position = pos("4k3/8/8/8/8/8/8/R4R1K w - - 0 1");
        assert_eq!(position.from_san("Rfc1").unwrap(), mv("f1-c1"));
        assert!(matches!(
            position.from_san("Rbc1"),
            Err(ChessError::AmbiguousOrInvalidSan(_))
        ));
    }

    #[test]
    fn san_shapes() {
        for ok in ["e4", "exd5", "e8=Q", "exd8=N+", "Nf3", "Nbd2", "R1e1", "Qa4d1", "Kxe2", "O-O", "O-O-O#", "Bxc6+"] {
            assert!(is_san_shaped(ok), "{ok}");
        }
        for bad in ["", "ed5", "e9", "Pe4", "Kge2", "e4=K", "O-O-O-O", "1-0", "*", "Nf3++", "xe4"] {
            assert!(!is_san_shaped(bad), "{bad}");
        }
    }
}
