//! Coordinate move representation.

use crate::Square;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a coordinate move string is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid coordinate move '{0}': expected <square>-<square>, e.g. e2-e4")]
pub struct MoveParseError(pub String);

/// A move from one square to another, written `e2-e4`.
///
/// A coordinate move carries no promotion piece; promotion is passed
/// alongside it wherever a move is applied.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Parses the `<file><rank>-<file><rank>` form.
    pub fn parse(s: &str) -> Result<Self, MoveParseError> {
        let err = || MoveParseError(s.to_string());
        let (from, to) = s.split_once('-').ok_or_else(err)?;
        let from = Square::from_algebraic(from).ok_or_else(err)?;
        let to = Square::from_algebraic(to).ok_or_else(err)?;
        Ok(Move { from, to })
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::parse(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}-{})", self.from, self.to)
    }
}
