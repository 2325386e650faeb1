//! Chess rules and notation.
//!
//! This crate provides:
//! - [`Position`] - An immutable board state with legal move generation
//! - SAN parsing and generation on [`Position`]
//! - [`Game`] - A main line with tags, variations and per-ply queries
//! - [`Variation`] - Alternative lines, nested to any depth
//! - [`PgnImporter`] - PGN validation and import
//!
//! # Example
//!
//! ```
//! use chess_notation::{Game, PgnImporter};
//!
//! let mut game = Game::new();
//! game.apply_san("e4").unwrap();
//! game.apply_move_text("e7-e5", None).unwrap();
//! game.set_tag("White", "Anderssen").unwrap();
//!
//! let pgn = game.render();
//! let copy = PgnImporter::import(&pgn).unwrap();
//! assert_eq!(copy.san_moves(), ["e4", "e5"]);
//! assert_eq!(copy.tag("White"), Some("Anderssen"));
//! ```

mod error;
mod game;
mod movegen;
mod movetext;
mod outcome;
pub mod pgn;
mod position;
pub mod san;
mod square_set;
mod tags;
mod variation;

pub use error::ChessError;
pub use game::{Game, MoveListener, MoveRecord, PlyView};
pub use movetext::DEFAULT_LINE_WIDTH;
pub use outcome::{DrawReason, GameResult};
pub use pgn::PgnImporter;
pub use position::{CastlingRights, Position};
pub use san::{is_san_shaped, san_promotion, ParsedSan};
pub use square_set::SquareSet;
pub use tags::{is_tag_key, SevenTagRoster, TagSet, REQUIRED_TAGS};
pub use variation::Variation;

pub use chess_core::{Color, Fen, FenError, File, Move, Piece, PieceKind, Rank, Square};
