use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// Enum representing the type of piece.
///
/// Names follow the classic tile set: the 4-long `LINE`, the two `L`
/// variants, the two `S` variants, `T` and the 2x2 `CUBE`. The discriminant
/// plus one is the cell color index written into the board when the piece
/// locks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PieceKind {
    #[display("LINE")]
    Line = 0,
    #[display("L")]
    L = 1,
    #[display("L_REVERSED")]
    LReversed = 2,
    #[display("S")]
    S = 3,
    #[display("S_REVERSED")]
    SReversed = 4,
    #[display("T")]
    T = 5,
    #[display("CUBE")]
    Cube = 6,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown piece kind: {name:?}")]
pub struct UnknownPieceKindError {
    #[error(not(source))]
    name: String,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in color-index order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::Line,
        PieceKind::L,
        PieceKind::LReversed,
        PieceKind::S,
        PieceKind::SReversed,
        PieceKind::T,
        PieceKind::Cube,
    ];

    /// Returns the cell color index (`1..=7`) of this kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    /// Looks up a kind by its cell code, `1..=7`.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::Line),
            2 => Some(PieceKind::L),
            3 => Some(PieceKind::LReversed),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::SReversed),
            6 => Some(PieceKind::T),
            7 => Some(PieceKind::Cube),
            _ => None,
        }
    }

    /// Returns the name used by observations (e.g. `"L_REVERSED"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PieceKind::Line => "LINE",
            PieceKind::L => "L",
            PieceKind::LReversed => "L_REVERSED",
            PieceKind::S => "S",
            PieceKind::SReversed => "S_REVERSED",
            PieceKind::T => "T",
            PieceKind::Cube => "CUBE",
        }
    }

    /// Returns the canonical (spawn) shape of this kind.
    #[must_use]
    pub const fn canonical_shape(self) -> PieceShape {
        PIECE_SHAPES[self as usize][0]
    }

    /// Returns the shape of this kind turned clockwise `rotation` times.
    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> PieceShape {
        PIECE_SHAPES[self as usize][rotation.as_usize()]
    }
}

impl FromStr for PieceKind {
    type Err = UnknownPieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownPieceKindError { name: s.to_owned() })
    }
}

/// Side length of the square that bounds every piece shape.
pub const MAX_SHAPE_SIZE: usize = 4;

/// A piece shape: a small cell matrix with its own top-left origin.
///
/// Only the top-left `width × height` corner of the backing array is
/// meaningful; the rest is always empty, so two shapes with the same cell
/// pattern compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    width: u8,
    height: u8,
    cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl PieceShape {
    const fn new(width: u8, height: u8, cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Self {
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns in the bounding box.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Number of rows in the bounding box.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Returns the cell at local coordinates, or `None` outside the shape.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width() && y < self.height()).then(|| self.cells[y][x])
    }

    /// Iterates over the non-empty cells as `(dx, dy, cell)`.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + use<> {
        let cells = self.cells;
        let (width, height) = (self.width(), self.height());
        (0..height).flat_map(move |dy| {
            (0..width).filter_map(move |dx| {
                let cell = cells[dy][dx];
                cell.is_occupied().then_some((dx, dy, cell))
            })
        })
    }

    /// Returns this shape turned 90° clockwise.
    ///
    /// The rows are reversed and the result is transposed, so the new width is
    /// the old height and vice versa.
    #[must_use]
    pub const fn rotated(&self) -> Self {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut cells = [[Cell::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < width {
            let mut x = 0;
            while x < height {
                cells[y][x] = self.cells[height - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        Self::new(self.height, self.width, cells)
    }

    /// Returns the shape as rows of integer cell tags.
    #[must_use]
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells[..self.height()]
            .iter()
            .map(|row| row[..self.width()].iter().map(|cell| cell.code()).collect())
            .collect()
    }
}

/// Rotation state of a piece, counted in clockwise quarter turns from the
/// canonical shape.
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    /// Number of distinct rotation states.
    pub const LEN: usize = 4;

    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    /// One more clockwise quarter turn, wrapping after four.
    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    /// Number of clockwise quarter turns applied to the canonical shape (0-3).
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Board coordinates of a shape's top-left corner.
///
/// Signed so that collision tests can be asked about positions left of or
/// above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The piece currently under control: its kind, rotation and position.
///
/// Pieces are immutable - movement and rotation return new `Piece` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    position: Position,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: Position) -> Self {
        Self {
            kind,
            rotation,
            position,
        }
    }

    /// Creates a canonical piece on the top row, horizontally centered on a
    /// board `cols` wide.
    #[must_use]
    pub fn spawn(kind: PieceKind, cols: usize) -> Self {
        let width = kind.canonical_shape().width();
        let x = to_coord(cols.saturating_sub(width) / 2);
        Self::new(kind, PieceRotation::default(), Position::new(x, 0))
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Clockwise quarter turns from the canonical orientation.
    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Top-left corner of the shape's bounding box.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The shape in the current rotation.
    #[must_use]
    pub const fn shape(&self) -> PieceShape {
        self.kind.shape(self.rotation)
    }

    #[must_use]
    pub const fn with_position(self, position: Position) -> Self {
        Self { position, ..self }
    }

    /// The same piece moved to column `x`.
    #[must_use]
    pub const fn with_x(self, x: i32) -> Self {
        self.with_position(Position::new(x, self.position.y))
    }

    /// The same piece moved to row `y`.
    #[must_use]
    pub const fn with_y(self, y: i32) -> Self {
        self.with_position(Position::new(self.position.x, y))
    }

    /// Returns this piece turned clockwise in place (no wall kick).
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..self
        }
    }

    /// Board coordinates covered by this piece.
    pub fn occupied_positions(&self) -> impl Iterator<Item = Position> + use<> {
        let origin = self.position;
        self.shape()
            .occupied_cells()
            .map(move |(dx, dy, _)| Position::new(origin.x + to_coord(dx), origin.y + to_coord(dy)))
    }
}

/// Converts a board-sized count into a signed coordinate.
pub(crate) fn to_coord(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Generates all 4 rotation states of a shape by repeated clockwise turns.
const fn shape_rotations(shape: PieceShape) -> [PieceShape; PieceRotation::LEN] {
    let mut rotations = [shape; PieceRotation::LEN];
    let mut i = 1;
    while i < PieceRotation::LEN {
        rotations[i] = rotations[i - 1].rotated();
        i += 1;
    }
    rotations
}

const PIECE_SHAPES: [[PieceShape; PieceRotation::LEN]; PieceKind::LEN] = {
    use Cell::Empty as E;
    const I: Cell = Cell::Piece(PieceKind::Line);
    const L: Cell = Cell::Piece(PieceKind::L);
    const J: Cell = Cell::Piece(PieceKind::LReversed);
    const S: Cell = Cell::Piece(PieceKind::S);
    const Z: Cell = Cell::Piece(PieceKind::SReversed);
    const T: Cell = Cell::Piece(PieceKind::T);
    const O: Cell = Cell::Piece(PieceKind::Cube);
    const EEEE: [Cell; 4] = [E; 4];
    [
        shape_rotations(PieceShape::new(4, 1, [[I, I, I, I], EEEE, EEEE, EEEE])),
        shape_rotations(PieceShape::new(3, 2, [[E, E, L, E], [L, L, L, E], EEEE, EEEE])),
        shape_rotations(PieceShape::new(3, 2, [[J, E, E, E], [J, J, J, E], EEEE, EEEE])),
        shape_rotations(PieceShape::new(3, 2, [[E, S, S, E], [S, S, E, E], EEEE, EEEE])),
        shape_rotations(PieceShape::new(3, 2, [[Z, Z, E, E], [E, Z, Z, E], EEEE, EEEE])),
        shape_rotations(PieceShape::new(3, 2, [[T, T, T, E], [E, T, E, E], EEEE, EEEE])),
        shape_rotations(PieceShape::new(2, 2, [[O, O, E, E], [O, O, E, E], EEEE, EEEE])),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_shapes_match_tile_table() {
        let expected: [(PieceKind, Vec<Vec<u8>>); PieceKind::LEN] = [
            (PieceKind::Line, vec![vec![1, 1, 1, 1]]),
            (PieceKind::L, vec![vec![0, 0, 2], vec![2, 2, 2]]),
            (PieceKind::LReversed, vec![vec![3, 0, 0], vec![3, 3, 3]]),
            (PieceKind::S, vec![vec![0, 4, 4], vec![4, 4, 0]]),
            (PieceKind::SReversed, vec![vec![5, 5, 0], vec![0, 5, 5]]),
            (PieceKind::T, vec![vec![6, 6, 6], vec![0, 6, 0]]),
            (PieceKind::Cube, vec![vec![7, 7], vec![7, 7]]),
        ];
        for (kind, codes) in expected {
            assert_eq!(kind.canonical_shape().to_codes(), codes, "{kind}");
        }
    }

    #[test]
    fn test_rotation_is_reverse_then_transpose() {
        let l = PieceKind::L.canonical_shape().rotated();
        assert_eq!(l.to_codes(), vec![vec![2, 0], vec![2, 0], vec![2, 2]]);
        assert_eq!((l.width(), l.height()), (2, 3));

        let line = PieceKind::Line.canonical_shape().rotated();
        assert_eq!(line.to_codes(), vec![vec![1], vec![1], vec![1], vec![1]]);
    }

    #[test]
    fn test_four_rotations_restore_cell_pattern() {
        for kind in PieceKind::ALL {
            let shape = kind.canonical_shape();
            let turned = shape.rotated().rotated().rotated().rotated();
            assert_eq!(turned.to_codes(), shape.to_codes(), "{kind}");
            assert_eq!(turned, shape, "{kind}");
        }
    }

    #[test]
    fn test_precomputed_rotations_follow_transform() {
        for kind in PieceKind::ALL {
            let mut rotation = PieceRotation::default();
            for _ in 0..PieceRotation::LEN {
                let next = rotation.rotated_right();
                assert_eq!(kind.shape(next), kind.shape(rotation).rotated());
                rotation = next;
            }
        }
    }

    #[test]
    fn test_piece_kind_names_roundtrip() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.name().parse::<PieceKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.name())
            );
            assert_eq!(PieceKind::from_code(kind.code()), Some(kind));
        }

        let err = "Z".parse::<PieceKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown piece kind: \"Z\"");
    }

    #[test]
    fn test_spawn_is_horizontally_centered() {
        assert_eq!(Piece::spawn(PieceKind::Line, 10).position(), Position::new(3, 0));
        assert_eq!(Piece::spawn(PieceKind::T, 10).position(), Position::new(3, 0));
        assert_eq!(Piece::spawn(PieceKind::Cube, 10).position(), Position::new(4, 0));
        assert_eq!(Piece::spawn(PieceKind::L, 9).position(), Position::new(3, 0));
    }

    #[test]
    fn test_occupied_positions_are_offset_by_position() {
        let piece = Piece::new(
            PieceKind::T,
            PieceRotation::default(),
            Position::new(2, 5),
        );
        let cells: Vec<_> = piece.occupied_positions().collect();
        assert_eq!(
            cells,
            vec![
                Position::new(2, 5),
                Position::new(3, 5),
                Position::new(4, 5),
                Position::new(3, 6),
            ]
        );
    }
}
