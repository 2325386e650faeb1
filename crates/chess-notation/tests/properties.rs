//! Property-based tests over random legal games.

use chess_notation::{Game, PgnImporter, Position};
use proptest::prelude::*;

/// Picks one legal move per choice until the game ends or choices run out.
fn random_game(choices: &[usize]) -> Game {
    let mut game = Game::new();
    for &choice in choices {
        let moves = game.tip().legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        game.apply_coordinate_move(mv, None).unwrap();
    }
    game
}

fn choices_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 1..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every reached position survives a FEN round trip.
    #[test]
    fn prop_fen_round_trip(choices in choices_strategy()) {
        let game = random_game(&choices);
        for position in game.positions() {
            let parsed = Position::from_fen(position.fen()).unwrap();
            prop_assert_eq!(parsed.fen(), position.fen());
            prop_assert_eq!(&parsed, position);
        }
    }

    /// Each move of a legal walk applies cleanly and hands the turn over.
    #[test]
    fn prop_walk_flips_side_to_move(choices in choices_strategy()) {
        let game = random_game(&choices);
        for pair in game.positions().windows(2) {
            prop_assert_eq!(pair[1].active_color(), pair[0].active_color().opposite());
        }
        prop_assert_eq!(game.positions().len(), game.moves().len() + 1);
    }

    /// Generated SAN resolves back to the move it was written for.
    #[test]
    fn prop_san_round_trip(choices in choices_strategy()) {
        let game = random_game(&choices);
        for (i, san) in game.san_moves().iter().enumerate() {
            let before = &game.positions()[i];
            prop_assert_eq!(before.from_san(san).unwrap(), game.moves()[i]);
        }
    }

    /// No legal move leaves the mover's own king attacked.
    #[test]
    fn prop_legal_moves_keep_king_safe(choices in choices_strategy()) {
        let game = random_game(&choices);
        let tip = game.tip();
        let mover = tip.active_color();
        for mv in tip.legal_moves() {
            let next = tip.apply_move(mv, None).unwrap();
            prop_assert!(!next.is_in_check(mover), "{} leaves the king in check", mv);
        }
    }

    /// Rendering and re-importing reproduces the same game.
    #[test]
    fn prop_render_import_idempotent(choices in choices_strategy()) {
        let game = random_game(&choices);
        let pgn = game.render();
        let again = PgnImporter::import(&pgn).unwrap();
        prop_assert_eq!(again.san_moves(), game.san_moves());
        prop_assert_eq!(again.tags(), game.tags());
        prop_assert_eq!(again.render(), pgn);
    }
}
