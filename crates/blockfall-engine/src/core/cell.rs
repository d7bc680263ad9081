use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::piece::PieceKind;

/// A single cell of the board or of a piece shape.
///
/// On the wire (observations, serialized boards) a cell is an integer tag:
/// `0` for empty and `1..=7` for the piece kind that filled it. Keeping the
/// kind in the enum means a nonzero tag that maps to no piece kind cannot be
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell filled by a piece of the given kind.
    Piece(PieceKind),
}

impl Cell {
    /// Whether no piece occupies this cell.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Whether a piece occupies this cell.
    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    /// The kind of piece that left this cell, if any.
    #[must_use]
    pub const fn kind(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Piece(kind) => Some(kind),
        }
    }

    /// Returns the integer tag of this cell (`0` = empty, `1..=7` = piece color index).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Piece(kind) => kind.code(),
        }
    }

    /// Parses an integer tag back into a cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::{Cell, PieceKind};
    ///
    /// assert_eq!(Cell::from_code(0), Some(Cell::Empty));
    /// assert_eq!(Cell::from_code(7), Some(Cell::Piece(PieceKind::Cube)));
    /// assert_eq!(Cell::from_code(8), None);
    /// ```
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        if code == 0 {
            return Some(Cell::Empty);
        }
        match PieceKind::from_code(code) {
            Some(kind) => Some(Cell::Piece(kind)),
            None => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Cell::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown cell code: {code}")))
    }
}
