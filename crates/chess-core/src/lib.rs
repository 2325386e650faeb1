//! Core types for chess notation.
//!
//! This crate provides the value types shared by the notation engine and its
//! front ends:
//! - [`Color`], [`PieceKind`] and [`Piece`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`], the `e2-e4` coordinate move
//! - [`Fen`] parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveParseError};
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square};
