//! WebAssembly bindings for the chess notation engine.
//!
//! This crate exposes a [`ChessGame`] to JavaScript, giving a board
//! renderer everything it needs: move entry, per-ply queries for history
//! navigation, and PGN import and export.
//!
//! # Usage
//!
//! ```javascript
//! import init, { ChessGame } from 'chess-wasm';
//!
//! await init();
//!
//! const game = new ChessGame();
//! game.onMovePlayed((event) => console.log(event.san));
//!
//! game.play("e2-e4");
//! game.playSan("e5");
//! console.log(game.legalTargets(game.lastPly(), "g1"));
//! console.log(game.exportPgn());
//! ```

use chess_core::{Color, Fen, Move, PieceKind, Square};
use chess_notation::{ChessError, Game, MoveRecord, PgnImporter, PlyView};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// A JavaScript function receiving a [`MoveEvent`] after each move.
    pub type MoveCallback;

    #[wasm_bindgen(method, js_name = call)]
    fn call(this: &MoveCallback, this_arg: &JsValue, event: &JsValue);
}

/// A move as reported to `onMovePlayed` callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    pub ply: usize,
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
    pub san: String,
    pub fen: String,
}

impl From<&MoveRecord> for MoveEvent {
    fn from(record: &MoveRecord) -> Self {
        MoveEvent {
            ply: record.ply,
            from: record.mv.from.to_algebraic(),
            to: record.mv.to.to_algebraic(),
            promotion: record.promotion.and_then(PieceKind::san_letter),
            san: record.san.clone(),
            fen: record.fen.clone(),
        }
    }
}

/// The state of one ply, as returned by `navigate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub ply: usize,
    pub fen: String,
    /// "white" or "black".
    pub active_color: String,
    /// Coordinate move that led here, like "e2-e4".
    pub last_move: Option<String>,
    pub last_san: Option<String>,
    /// Square of the king in check, if any.
    pub check_square: Option<String>,
}

impl From<PlyView> for BoardView {
    fn from(view: PlyView) -> Self {
        BoardView {
            ply: view.ply,
            fen: view.fen,
            active_color: match view.active_color {
                Color::White => "white".to_string(),
                Color::Black => "black".to_string(),
            },
            last_move: view.last_move.map(|mv| mv.to_string()),
            last_san: view.last_san,
            check_square: view.check_square.map(Square::to_algebraic),
        }
    }
}

/// A chess game that can be driven from JavaScript.
///
/// Queries taking a `ply` address the position after that many moves; 0 is
/// the starting position.
#[wasm_bindgen]
pub struct ChessGame {
    game: Game,
    callbacks: Vec<MoveCallback>,
}

#[wasm_bindgen]
impl ChessGame {
    /// Creates a game from the standard starting position.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        ChessGame {
            game: Game::new(),
            callbacks: Vec::new(),
        }
    }

    /// Creates a game from a FEN string.
    ///
    /// Returns an error if the FEN is invalid.
    #[wasm_bindgen(js_name = fromFen)]
    pub fn from_fen(fen: &str) -> Result<ChessGame, JsError> {
        Ok(ChessGame {
            game: Game::from_fen(fen)?,
            callbacks: Vec::new(),
        })
    }

    /// Plays a move given as "e2-e4". `promotion` is a piece letter
    /// ("q", "r", "b" or "n") and defaults to a queen.
    ///
    /// Returns the SAN of the move.
    pub fn play(&mut self, mv: &str, promotion: Option<String>) -> Result<String, JsError> {
        let promotion = promotion.as_deref().and_then(parse_promotion);
        let record = self.game.apply_move_text(mv, promotion)?;
        self.played(record)
    }

    /// Plays a move given in SAN. Returns the SAN as recorded.
    ///
    /// Both this and `play` fail if a registered callback cannot be sent
    /// the move event.
    #[wasm_bindgen(js_name = playSan)]
    pub fn play_san(&mut self, san: &str) -> Result<String, JsError> {
        let record = self.game.apply_san(san)?;
        self.played(record)
    }

    /// Replaces the game with one imported from PGN. Callbacks are kept.
    #[wasm_bindgen(js_name = importPgn)]
    pub fn import_pgn(&mut self, pgn: &str) -> Result<(), JsError> {
        self.game = PgnImporter::import(pgn)?;
        Ok(())
    }

    /// Renders the game as PGN.
    #[wasm_bindgen(js_name = exportPgn)]
    pub fn export_pgn(&self) -> String {
        self.game.render()
    }

    #[wasm_bindgen(js_name = isValidPgn)]
    pub fn is_valid_pgn(pgn: &str) -> bool {
        PgnImporter::validate(pgn)
    }

    #[wasm_bindgen(js_name = isValidFen)]
    pub fn is_valid_fen(fen: &str) -> bool {
        Fen::is_valid(fen)
    }

    /// FEN of the position at `ply`.
    pub fn fen(&self, ply: usize) -> Result<String, JsError> {
        Ok(self.game.fen_at(ply)?.to_string())
    }

    /// Legal moves at `ply`, as "e2-e4" strings.
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, ply: usize) -> Result<Vec<String>, JsError> {
        Ok(self
            .game
            .legal_moves_at(ply)?
            .iter()
            .map(Move::to_string)
            .collect())
    }

    /// Squares the piece on `square` may move to at `ply`, for highlighting.
    #[wasm_bindgen(js_name = legalTargets)]
    pub fn legal_targets(&self, ply: usize, square: &str) -> Result<Vec<String>, JsError> {
        let from = Square::from_algebraic(square)
            .ok_or_else(|| JsError::new(&format!("Invalid square: {}", square)))?;
        Ok(self
            .game
            .legal_targets_at(ply, from)?
            .into_iter()
            .map(Square::to_algebraic)
            .collect())
    }

    #[wasm_bindgen(js_name = isInCheck)]
    pub fn is_in_check(&self, ply: usize) -> Result<bool, JsError> {
        Ok(self.game.is_in_check_at(ply)?)
    }

    #[wasm_bindgen(js_name = isCheckmate)]
    pub fn is_checkmate(&self, ply: usize) -> Result<bool, JsError> {
        Ok(self.game.is_checkmate_at(ply)?)
    }

    #[wasm_bindgen(js_name = isStalemate)]
    pub fn is_stalemate(&self, ply: usize) -> Result<bool, JsError> {
        Ok(self.game.is_stalemate_at(ply)?)
    }

    #[wasm_bindgen(js_name = isDraw)]
    pub fn is_draw(&self, ply: usize) -> Result<bool, JsError> {
        Ok(self.game.is_draw_at(ply)?)
    }

    /// SAN of every main-line move.
    #[wasm_bindgen(js_name = sanHistory)]
    pub fn san_history(&self) -> Vec<String> {
        self.game.san_moves().to_vec()
    }

    /// Every main-line move as "e2-e4".
    #[wasm_bindgen(js_name = moveHistory)]
    pub fn move_history(&self) -> Vec<String> {
        self.game.moves().iter().map(Move::to_string).collect()
    }

    /// Sets a tag. Keys may only use letters, digits and `_`.
    #[wasm_bindgen(js_name = setTag)]
    pub fn set_tag(&mut self, key: &str, value: &str) -> Result<(), JsError> {
        Ok(self.game.set_tag(key, value)?)
    }

    pub fn tag(&self, key: &str) -> Option<String> {
        self.game.tag(key).map(str::to_string)
    }

    /// The board state at `ply`: FEN, last move and check square.
    pub fn navigate(&self, ply: usize) -> Result<JsValue, JsError> {
        let view = self.board_view(ply)?;
        serde_wasm_bindgen::to_value(&view).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Index of the latest position.
    #[wasm_bindgen(js_name = lastPly)]
    pub fn last_ply(&self) -> usize {
        self.game.last_ply()
    }

    /// Starts over from the standard position. Callbacks are kept.
    pub fn reset(&mut self) {
        self.game = Game::new();
    }

    /// Registers a function called after every successful `play` or
    /// `playSan`.
    #[wasm_bindgen(js_name = onMovePlayed)]
    pub fn on_move_played(&mut self, callback: MoveCallback) {
        self.callbacks.push(callback);
    }
}

impl ChessGame {
    fn board_view(&self, ply: usize) -> Result<BoardView, ChessError> {
        Ok(self.game.navigate(ply)?.into())
    }

    /// Notifies the callbacks of an applied move.
    ///
    /// The move stays on the board even when the event cannot be built.
    fn played(&self, record: MoveRecord) -> Result<String, JsError> {
        if !self.callbacks.is_empty() {
            let event = serde_wasm_bindgen::to_value(&MoveEvent::from(&record))
                .map_err(|e| JsError::new(&format!("Failed to report {}: {}", record.san, e)))?;
            for callback in &self.callbacks {
                callback.call(&JsValue::NULL, &event);
            }
        }
        Ok(record.san)
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a promotion letter in either case.
fn parse_promotion(letter: &str) -> Option<PieceKind> {
    let mut chars = letter.chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    PieceKind::from_san_letter(c).filter(|kind| kind.is_promotion_target())
}
