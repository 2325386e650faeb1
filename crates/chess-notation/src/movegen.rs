//! Target generation, legality and terminal-state detection.
//!
//! Targets are computed per piece: sliders ray-cast until the first occupied
//! square, knights and kings step through offset tables, pawns advance and
//! capture diagonally. Legal moves are the targets whose resulting position
//! does not leave the mover's king attacked.

use chess_core::{Color, File, Move, PieceKind, Square};

use crate::position::castling_rook_path;
use crate::{DrawReason, GameResult, Position, SquareSet};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

impl Position {
    /// Pseudo-legal arrival squares of the piece on `from`.
    ///
    /// With `offensive_only`, the result is the set of squares the piece
    /// controls: pawn diagonals are included even when empty, and castling
    /// squares are left out. An empty square has no targets.
    pub fn targets(&self, from: Square, offensive_only: bool) -> SquareSet {
        let Some(piece) = self.piece_at(from) else {
            return SquareSet::EMPTY;
        };
        let color = piece.color;
        match piece.kind {
            PieceKind::Pawn => self.pawn_targets(from, color, offensive_only),
            PieceKind::Knight => self.step_targets(from, color, &KNIGHT_OFFSETS),
            PieceKind::Bishop => self.ray_targets(from, color, &BISHOP_DIRECTIONS),
            PieceKind::Rook => self.ray_targets(from, color, &ROOK_DIRECTIONS),
            PieceKind::Queen => {
                self.ray_targets(from, color, &BISHOP_DIRECTIONS)
                    | self.ray_targets(from, color, &ROOK_DIRECTIONS)
            }
            PieceKind::King => self.king_targets(from, color, offensive_only),
        }
    }

    fn ray_targets(&self, from: Square, color: Color, directions: &[(i8, i8)]) -> SquareSet {
        let mut set = SquareSet::EMPTY;
        for &(df, dr) in directions {
            let mut cursor = from.offset(df, dr);
            while let Some(sq) = cursor {
                match self.piece_at(sq) {
                    None => set.insert(sq),
                    Some(blocker) => {
                        if blocker.color != color {
                            set.insert(sq);
                        }
                        break;
                    }
                }
                cursor = sq.offset(df, dr);
            }
        }
        set
    }

    fn step_targets(&self, from: Square, color: Color, offsets: &[(i8, i8)]) -> SquareSet {
        offsets
            .iter()
            .filter_map(|&(df, dr)| from.offset(df, dr))
            .filter(|&sq| self.piece_at(sq).map_or(true, |p| p.color != color))
            .collect()
    }

    fn pawn_targets(&self, from: Square, color: Color, offensive_only: bool) -> SquareSet {
        let dir = color.pawn_direction();
        let mut set = SquareSet::EMPTY;

        for df in [-1, 1] {
            if let Some(sq) = from.offset(df, dir) {
                let holds_enemy = self.piece_at(sq).is_some_and(|p| p.color != color);
                if offensive_only || holds_enemy || self.en_passant() == Some(sq) {
                    set.insert(sq);
                }
            }
        }

        if !offensive_only {
            let is_empty = |sq: &Square| self.piece_at(*sq).is_none();
            if let Some(one) = from.offset(0, dir).filter(is_empty) {
                set.insert(one);
                if from.rank() == color.pawn_rank() {
                    if let Some(two) = one.offset(0, dir).filter(is_empty) {
                        set.insert(two);
                    }
                }
            }
        }
        set
    }

    /// King steps, minus every square the opposing king also reaches.
    ///
    /// The subtraction keeps the kings apart without a recursive attack test.
    fn king_targets(&self, from: Square, color: Color, offensive_only: bool) -> SquareSet {
        let mut set = self.step_targets(from, color, &KING_OFFSETS);
        let enemy = color.opposite();
        if let Some(enemy_king) = self.king_square(enemy) {
            set = set & !self.step_targets(enemy_king, enemy, &KING_OFFSETS);
        }
        if !offensive_only {
            set |= self.castling_targets(from, color);
        }
        set
    }

    fn castling_targets(&self, from: Square, color: Color) -> SquareSet {
        let rank = color.back_rank();
        let enemy = color.opposite();
        let mut set = SquareSet::EMPTY;
        if from != Square::new(File::E, rank) || self.is_controlled_by(from, enemy) {
            return set;
        }

        let empty = |file: &File| self.piece_at(Square::new(*file, rank)).is_none();
        let safe = |file: File| !self.is_controlled_by(Square::new(file, rank), enemy);
        let rights = self.castling_rights();

        let queenside = Move::new(from, Square::new(File::C, rank));
        if rights.can_castle_queenside(color)
            && self.has_castling_rook(queenside, color)
            && [File::B, File::C, File::D].iter().all(empty)
            && safe(File::D)
        {
            set.insert(queenside.to);
        }

        let kingside = Move::new(from, Square::new(File::G, rank));
        if rights.can_castle_kingside(color)
            && self.has_castling_rook(kingside, color)
            && [File::F, File::G].iter().all(empty)
            && safe(File::F)
        {
            set.insert(kingside.to);
        }
        set
    }

    fn has_castling_rook(&self, king_move: Move, color: Color) -> bool {
        castling_rook_path(king_move, color)
            .and_then(|(rook_from, _)| self.piece_at(rook_from))
            .is_some_and(|p| p.color == color && p.kind == PieceKind::Rook)
    }

    /// Returns true if any piece of `by` controls `sq`.
    pub fn is_controlled_by(&self, sq: Square, by: Color) -> bool {
        self.pieces(by)
            .any(|(from, _)| self.targets(from, true).contains(sq))
    }

    /// Returns true if the king of `color` is attacked. A side without a
    /// king is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_controlled_by(king, color.opposite()))
    }

    fn keeps_king_safe(&self, mv: Move) -> bool {
        self.apply_move(mv, None)
            .map(|next| !next.is_in_check(self.active_color()))
            .unwrap_or(false)
    }

    /// Legal arrival squares of the piece on `from`. Empty unless the piece
    /// belongs to the side to move.
    pub fn legal_targets(&self, from: Square) -> SquareSet {
        match self.piece_at(from) {
            Some(piece) if piece.color == self.active_color() => self
                .targets(from, false)
                .iter()
                .filter(|&to| self.keeps_king_safe(Move::new(from, to)))
                .collect(),
            _ => SquareSet::EMPTY,
        }
    }

    /// All legal moves of the side to move, ordered by start then arrival square.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.pieces(self.active_color())
            .flat_map(|(from, _)| {
                self.legal_targets(from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    /// Returns true if `mv` is legal for the side to move.
    pub fn is_legal(&self, mv: Move) -> bool {
        self.piece_at(mv.from)
            .is_some_and(|piece| piece.color == self.active_color())
            && self.targets(mv.from, false).contains(mv.to)
            && self.keeps_king_safe(mv)
    }

    pub fn has_legal_moves(&self) -> bool {
        self.pieces(self.active_color())
            .any(|(from, _)| !self.legal_targets(from).is_empty())
    }

    /// The side to move is in check and cannot escape.
    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.active_color()) && !self.has_legal_moves()
    }

    /// The side to move is not in check and has no legal move.
    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.active_color()) && !self.has_legal_moves()
    }

    /// Returns true once 100 half-moves passed without a pawn move or capture.
    pub fn is_draw_by_fifty_moves(&self) -> bool {
        self.halfmove_clock() >= 100
    }

    /// Returns true if neither side keeps more than a lone minor piece or two
    /// knights besides its king.
    pub fn is_draw_by_insufficient_material(&self) -> bool {
        Color::BOTH.iter().all(|&color| {
            let mut kinds: Vec<PieceKind> = self
                .pieces(color)
                .map(|(_, piece)| piece.kind)
                .filter(|&kind| kind != PieceKind::King)
                .collect();
            if kinds.len() > 3 {
                return false;
            }
            kinds.sort();
            matches!(
                kinds.as_slice(),
                [] | [PieceKind::Bishop] | [PieceKind::Knight] | [PieceKind::Knight, PieceKind::Knight]
            )
        })
    }

    /// The result this position ends the game with, if any.
    pub fn outcome(&self) -> Option<GameResult> {
        if !self.has_legal_moves() {
            if !self.is_in_check(self.active_color()) {
                return Some(GameResult::Draw(DrawReason::Stalemate));
            }
            return Some(match self.active_color() {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            });
        }
        if self.is_draw_by_insufficient_material() {
            return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
        }
        if self.is_draw_by_fifty_moves() {
            return Some(GameResult::Draw(DrawReason::FiftyMoveRule));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::parse(s).unwrap()
    }

    fn squares(set: SquareSet) -> Vec<String> {
        set.iter().map(|s| s.to_string()).collect()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let moves = Position::startpos().legal_moves();
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&mv("e2-e4")));
        assert!(moves.contains(&mv("g1-f3")));
        assert!(!moves.contains(&mv("e2-e5")));
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let position = pos("4k3/8/8/3p4/8/1P6/8/R2QK3 w - - 0 1");
        assert_eq!(
            squares(position.targets(sq("a1"), false)),
            vec!["b1", "c1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"]
        );
        // d5 is an enemy pawn: included, and nothing past it.
        let queen = position.targets(sq("d1"), false);
        assert!(queen.contains(sq("d5")));
        assert!(!queen.contains(sq("d6")));
        assert!(!queen.contains(sq("e1")));
        assert!(!queen.contains(sq("b3")));
        assert!(!queen.contains(sq("a4")));
        assert!(queen.contains(sq("h5")));
    }

    #[test]
    fn knight_targets_skip_allies() {
        let position = Position::startpos();
        assert_eq!(squares(position.targets(sq("g1"), false)), vec!["f3", "h3"]);
        assert_eq!(squares(position.targets(sq("e4"), false)), Vec::<String>::new());
    }

    #[test]
    fn pawn_targets() {
        let position = pos("4k3/8/8/8/8/2p5/3P4/4K3 w - - 0 1");
        assert_eq!(squares(position.targets(sq("d2"), false)), vec!["c3", "d3", "d4"]);
        assert_eq!(squares(position.targets(sq("d2"), true)), vec!["c3", "e3"]);

        let blocked = pos("4k3/8/8/8/8/3p4/3P4/4K3 w - - 0 1");
        assert!(blocked.targets(sq("d2"), false).is_empty());

        let edge = pos("4k3/8/8/8/8/8/P7/4K3 w - - 0 1");
        assert_eq!(squares(edge.targets(sq("a2"), true)), vec!["b3"]);
    }

    #[test]
    fn en_passant_target() {
        let position = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(squares(position.targets(sq("e5"), false)), vec!["e6", "f6"]);
        assert!(position.is_legal(mv("e5-f6")));
        assert!(!position.is_legal(mv("e5-d6")));
    }

    #[test]
    fn castling_both_sides() {
        let position = pos("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = position.legal_moves();
        assert!(moves.contains(&mv("e1-g1")));
        assert!(moves.contains(&mv("e1-c1")));
        assert!(!position.targets(sq("e1"), true).contains(sq("g1")));
    }

    #[test]
    fn castling_requires_rights_and_empty_path() {
        let no_rights = pos("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(!no_rights.is_legal(mv("e1-g1")));

        let blocked = pos("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1");
        assert!(!blocked.is_legal(mv("e1-g1")));
        assert!(!blocked.is_legal(mv("e1-c1")));

        let no_rook = pos("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1");
        assert!(!no_rook.is_legal(mv("e1-g1")));
    }

    #[test]
    fn castling_through_or_out_of_check() {
        // f1 attacked by the rook on f8.
        let through = pos("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!through.is_legal(mv("e1-g1")));
        assert!(through.is_legal(mv("e1-c1")));

        // g1 attacked: rejected by the self-check filter.
        let into = pos("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!into.is_legal(mv("e1-g1")));

        let in_check = pos("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!in_check.is_legal(mv("e1-g1")));
        assert!(!in_check.is_legal(mv("e1-c1")));
    }

    #[test]
    fn kings_never_touch() {
        let position = pos("8/8/8/3k4/8/3K4/8/8 w - - 0 1");
        let targets = squares(position.legal_targets(sq("d3")));
        assert_eq!(targets, vec!["c2", "d2", "e2", "c3", "e3"]);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let position = pos("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(position.legal_targets(sq("e2")).is_empty());
        assert!(!position.is_legal(mv("e2-c3")));
    }

    #[test]
    fn legality_requires_the_side_to_move() {
        let position = Position::startpos();
        assert!(!position.is_legal(mv("e7-e5")));
        assert!(!position.is_legal(mv("e4-e5")));
        assert!(position.legal_targets(sq("e7")).is_empty());
    }

    #[test]
    fn check_and_mate() {
        let fools_mate = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(fools_mate.is_in_check(Color::White));
        assert!(!fools_mate.has_legal_moves());
        assert!(fools_mate.is_checkmate());
        assert!(!fools_mate.is_stalemate());
        assert_eq!(fools_mate.outcome(), Some(GameResult::BlackWins));
    }

    #[test]
    fn stalemate() {
        let position = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(!position.is_in_check(Color::Black));
        assert!(position.is_stalemate());
        assert!(!position.is_checkmate());
        assert_eq!(
            position.outcome(),
            Some(GameResult::Draw(DrawReason::Stalemate))
        );
    }

    #[test]
    fn missing_king_is_never_in_check() {
        let position = pos("8/8/8/8/8/8/8/R7 b - - 0 1");
        assert!(!position.is_in_check(Color::Black));
        assert!(!position.is_in_check(Color::White));
    }

    #[test]
    fn insufficient_material() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1",
            "4kn2/8/8/8/8/8/8/4KB2 w - - 0 1",
        ] {
            assert!(pos(fen).is_draw_by_insufficient_material(), "{fen}");
        }
        for fen in [
            "4k3/8/8/8/8/8/8/2BBK3 w - - 0 1",
            "4k3/8/8/8/8/8/8/1NB1K3 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/R3K3 w - - 0 1",
        ] {
            assert!(!pos(fen).is_draw_by_insufficient_material(), "{fen}");
        }
    }

    #[test]
    fn fifty_move_rule() {
        let position = pos("7k/8/8/8/8/8/8/R3K3 w - - 99 60");
        assert!(!position.is_draw_by_fifty_moves());
        let next = position.apply_move(mv("a1-a2"), None).unwrap();
        assert!(next.is_draw_by_fifty_moves());
        assert_eq!(
            next.outcome(),
            Some(GameResult::Draw(DrawReason::FiftyMoveRule))
        );
    }
}
