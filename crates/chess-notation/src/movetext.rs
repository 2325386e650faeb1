//! Movetext tokens and line wrapping shared by games and variations.

use chess_core::Color;

use crate::{Position, Variation};

/// Column at which rendered movetext wraps by default.
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Pushes the tokens of one line of play.
///
/// `positions[i]` is the position before `san_moves[i]`, played at ply
/// `anchor_ply + i`. Variations anchored at that ply follow the move in
/// parentheses. White moves always carry their number; a Black move carries
/// `N...` when it opens the line or resumes it after a variation.
pub(crate) fn push_line_tokens(
    anchor_ply: usize,
    positions: &[Position],
    san_moves: &[String],
    variations: &[Variation],
    out: &mut Vec<String>,
) {
    let mut resume = true;
    for (i, (before, san)) in positions.iter().zip(san_moves).enumerate() {
        if resume || before.active_color() == Color::White {
            out.push(before.move_number_prefix());
        }
        out.push(san.clone());
        resume = false;

        for variation in variations.iter().filter(|v| v.anchor_ply() == anchor_ply + i) {
            variation.push_tokens(out);
            resume = true;
        }
    }
}

/// Joins tokens with single spaces, breaking lines so none exceeds `width`
/// characters unless a single token is longer.
pub(crate) fn wrap(tokens: &[String], width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for token in tokens {
        let len = token.chars().count();
        if line_len > 0 && line_len + 1 + len > width {
            out.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn wrap_breaks_at_width() {
        let t = tokens(&["1.", "e4", "e5", "2.", "Nf3", "Nc6"]);
        assert_eq!(wrap(&t, 80), "1. e4 e5 2. Nf3 Nc6");
        assert_eq!(wrap(&t, 8), "1. e4 e5\n2. Nf3\nNc6");
    }

    #[test]
    fn long_token_gets_own_line() {
        let t = tokens(&["1.", "exd8=Q+", "*"]);
        assert_eq!(wrap(&t, 4), "1.\nexd8=Q+\n*");
    }

    #[test]
    fn empty() {
        assert_eq!(wrap(&[], 80), "");
    }

    #[test]
    fn line_tokens_number_moves() {
        let start = Position::startpos();
        let after_e4 = start
            .apply_move(chess_core::Move::parse("e2-e4").unwrap(), None)
            .unwrap();
        let mut out = Vec::new();
        push_line_tokens(
            0,
            &[start, after_e4],
            &tokens(&["e4", "e5"]),
            &[],
            &mut out,
        );
        assert_eq!(out, tokens(&["1.", "e4", "e5"]));
    }
}
