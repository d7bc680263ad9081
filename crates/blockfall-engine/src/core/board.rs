use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    cell::Cell,
    piece::{Piece, PieceKind, PieceShape, Position, to_coord},
};

/// Error returned when an integer matrix cannot be turned into a [`Board`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardCodesError {
    #[display("board must have at least one row and one column")]
    Empty,
    #[display("row {row} has {actual} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("unknown cell code {code} at ({x}, {y})")]
    UnknownCode { x: usize, y: usize, code: u8 },
}

/// The grid of locked cells, excluding the falling piece.
///
/// Row 0 is the top of the board. The dimensions are fixed at creation; only
/// cell contents change, through [`Board::fill_shape`] and
/// [`Board::clear_lines`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, PieceKind, PieceRotation, Position};
///
/// let board = Board::new(20, 10);
/// let shape = PieceKind::T.shape(PieceRotation::default());
///
/// assert!(!board.collides(&shape, Position::new(0, 0)));
/// assert!(board.collides(&shape, Position::new(-1, 0)));
/// assert!(board.collides(&shape, Position::new(8, 0)));
/// assert_eq!(board.landing_row(&shape, Position::new(0, 0)), 18);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an all-empty board.
    ///
    /// # Panics
    ///
    /// Panics if `cols` is zero.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(cols > 0, "board must have at least one column");
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.cols && y < self.rows).then_some(y * self.cols + x)
    }

    /// Returns the cell at `(x, y)`, or `None` outside the board.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.cols && y < self.rows).then(|| self.cells[y * self.cols + x])
    }

    /// Overwrites the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the board.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        assert!(x < self.cols && y < self.rows, "({x}, {y}) is outside the board");
        self.cells[y * self.cols + x] = cell;
    }

    /// Cells of row `y`, left to right.
    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.cols..][..self.cols]
    }

    /// Iterates over the rows from top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.cols)
    }

    /// Whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    /// Checks whether `shape` placed with its top-left corner at `position`
    /// overlaps an occupied cell or leaves the board.
    ///
    /// This is the only legality test: movement, rotation, swapping and the
    /// placement search all go through it.
    #[must_use]
    pub fn collides(&self, shape: &PieceShape, position: Position) -> bool {
        shape.occupied_cells().any(|(dx, dy, _)| {
            let x = position.x + to_coord(dx);
            let y = position.y + to_coord(dy);
            match self.index(x, y) {
                Some(i) => self.cells[i].is_occupied(),
                None => true,
            }
        })
    }

    /// Shorthand for [`Board::collides`] with the piece's shape and position.
    #[must_use]
    pub fn collides_piece(&self, piece: &Piece) -> bool {
        self.collides(&piece.shape(), piece.position())
    }

    /// Returns the deepest row the shape can reach by falling straight down
    /// from `position`.
    ///
    /// `position` itself is assumed not to collide.
    #[must_use]
    pub fn landing_row(&self, shape: &PieceShape, position: Position) -> i32 {
        let mut y = position.y;
        while !self.collides(shape, Position::new(position.x, y + 1)) {
            y += 1;
        }
        y
    }

    /// Copies the non-empty cells of `shape` onto the board.
    ///
    /// This is called when a piece locks. Cells falling outside the board are
    /// skipped.
    pub fn fill_shape(&mut self, shape: &PieceShape, position: Position) {
        for (dx, dy, cell) in shape.occupied_cells() {
            let x = position.x + to_coord(dx);
            let y = position.y + to_coord(dy);
            if let Some(i) = self.index(x, y) {
                self.cells[i] = cell;
            }
        }
    }

    /// Copies the piece's cells onto the board.
    pub fn fill_piece(&mut self, piece: &Piece) {
        self.fill_shape(&piece.shape(), piece.position());
    }

    /// Returns a copy of this board with the piece drawn on it.
    #[must_use]
    pub fn with_piece(&self, piece: &Piece) -> Self {
        let mut board = self.clone();
        board.fill_piece(piece);
        board
    }

    /// Clears complete rows and returns how many were removed.
    ///
    /// A row is complete when it has no empty cell. Every complete row is
    /// removed, the rows above it shift down, and empty rows are inserted at
    /// the top, so the remaining rows keep their relative order.
    pub fn clear_lines(&mut self) -> usize {
        let cols = self.cols;
        let mut count = 0;
        for y in (0..self.rows).rev() {
            if self.row(y).iter().all(|cell| cell.is_occupied()) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.cells
                    .copy_within(y * cols..(y + 1) * cols, (y + count) * cols);
            }
        }
        self.cells[..count * cols].fill(Cell::Empty);
        count
    }

    /// Height of every column: `rows - y` of its topmost occupied cell, or 0.
    #[must_use]
    pub fn column_heights(&self) -> Vec<usize> {
        (0..self.cols)
            .map(|x| {
                (0..self.rows)
                    .find(|&y| self.cells[y * self.cols + x].is_occupied())
                    .map_or(0, |y| self.rows - y)
            })
            .collect()
    }

    /// Returns the board as rows of integer cell tags.
    #[must_use]
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.iter_rows()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }

    /// Returns the board as rows of `0`/`1` occupancy flags.
    #[must_use]
    pub fn to_occupancy(&self) -> Vec<Vec<u8>> {
        self.iter_rows()
            .map(|row| row.iter().map(|cell| u8::from(cell.is_occupied())).collect())
            .collect()
    }

    /// Builds a board from rows of integer cell tags.
    ///
    /// # Example
    ///
    /// ```
    /// use blockfall_engine::Board;
    ///
    /// let board = Board::from_codes(&[[0, 0, 1], [2, 2, 0]]).unwrap();
    /// assert_eq!((board.rows(), board.cols()), (2, 3));
    ///
    /// assert!(Board::from_codes(&[[0, 9]]).is_err());
    /// ```
    pub fn from_codes<R>(rows: &[R]) -> Result<Self, BoardCodesError>
    where
        R: AsRef<[u8]>,
    {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        if cols == 0 {
            return Err(BoardCodesError::Empty);
        }
        let mut board = Self::new(rows.len(), cols);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(BoardCodesError::Ragged {
                    row: y,
                    expected: cols,
                    actual: row.len(),
                });
            }
            for (x, &code) in row.iter().enumerate() {
                let cell = Cell::from_code(code).ok_or(BoardCodesError::UnknownCode { x, y, code })?;
                board.set(x, y, cell);
            }
        }
        Ok(board)
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `.` is an empty cell, `1`-`7` a cell of that color index and `#` a
    /// generic filled cell. Rows are given top to bottom; whitespace is
    /// ignored and blank lines are skipped.
    ///
    /// # Panics
    ///
    /// Panics on unknown characters or rows of different widths.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        const GENERIC: Cell = Cell::Piece(PieceKind::Cube);
        let rows: Vec<Vec<Cell>> = art
            .lines()
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c {
                        '.' => Cell::Empty,
                        '#' => GENERIC,
                        '1'..='7' => c
                            .to_digit(10)
                            .and_then(|d| Cell::from_code(u8::try_from(d).ok()?))
                            .unwrap_or(GENERIC),
                        _ => panic!("unexpected character {c:?} in board art"),
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();

        let cols = rows.first().map_or(0, Vec::len);
        let mut board = Self::new(rows.len(), cols);
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(
                row.len(),
                cols,
                "Each row must have exactly {cols} cells, got {} at row {y}",
                row.len()
            );
            for (x, &cell) in row.iter().enumerate() {
                board.set(x, y, cell);
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.iter_rows().enumerate() {
            write!(f, "{y:02} ")?;
            for cell in row {
                match cell {
                    Cell::Empty => f.write_str(".")?,
                    Cell::Piece(_) => write!(f, "{}", cell.code())?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: [[0,0,1,...],[...],...] (row-major integer tags)
        self.to_codes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<u8>>::deserialize(deserializer)?;
        Board::from_codes(&rows).map_err(serde::de::Error::custom)
    }
}
