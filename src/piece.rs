//! Tetrominoes: kinds, shape matrices, clockwise rotation, spawn placement.

use rand::Rng;

/// Largest bounding box any shape (or its rotation) needs.
pub const MAX_SHAPE_DIM: usize = 4;

const I_PATTERN: &[&[u8]] = &[&[1, 1, 1, 1]];
const O_PATTERN: &[&[u8]] = &[&[1, 1], &[1, 1]];
const T_PATTERN: &[&[u8]] = &[&[1, 1, 1], &[0, 1, 0]];
const J_PATTERN: &[&[u8]] = &[&[1, 1, 1], &[1, 0, 0]];
const L_PATTERN: &[&[u8]] = &[&[1, 1, 1], &[0, 0, 1]];
const S_PATTERN: &[&[u8]] = &[&[0, 1, 1], &[1, 1, 0]];
const Z_PATTERN: &[&[u8]] = &[&[1, 1, 0], &[0, 1, 1]];

/// Tetromino kinds, in canonical order (I, O, T, J, L, S, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    J,
    L,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::J, Self::L, Self::S, Self::Z];

    /// Position in [`PieceKind::ALL`]; also the theme colour slot.
    pub fn index(self) -> usize {
        match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::J => 3,
            Self::L => 4,
            Self::S => 5,
            Self::Z => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::O => "O",
            Self::T => "T",
            Self::J => "J",
            Self::L => "L",
            Self::S => "S",
            Self::Z => "Z",
        }
    }

    /// Spawn orientation, row-major, 1 = occupied.
    fn pattern(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => I_PATTERN,
            Self::O => O_PATTERN,
            Self::T => T_PATTERN,
            Self::J => J_PATTERN,
            Self::L => L_PATTERN,
            Self::S => S_PATTERN,
            Self::Z => Z_PATTERN,
        }
    }

    pub fn shape(self) -> Shape {
        Shape::from_pattern(self.pattern())
    }
}

/// Boolean occupancy matrix of `rows` x `cols` inside fixed 4x4 storage.
/// Cells outside `rows` x `cols` are always empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    rows: usize,
    cols: usize,
    cells: [[bool; MAX_SHAPE_DIM]; MAX_SHAPE_DIM],
}

impl Shape {
    fn from_pattern(pattern: &[&[u8]]) -> Self {
        let mut cells = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
        for (r, row) in pattern.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                cells[r][c] = v != 0;
            }
        }
        Self {
            rows: pattern.len(),
            cols: pattern.first().map_or(0, |row| row.len()),
            cells,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row][col]
    }

    /// Occupied cells as (row, col), row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols).filter_map(move |c| self.cells[r][c].then_some((r, c)))
        })
    }

    /// 90° clockwise: an R x C matrix becomes C x R with
    /// `result[c][R - 1 - r] = self[r][c]`.
    pub fn rotated(&self) -> Self {
        let mut cells = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
        for (r, c) in self.occupied() {
            cells[c][self.rows - 1 - r] = true;
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }
}

/// The falling piece. `(x, y)` is the top-left of its bounding box in board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Spawn orientation, horizontally centered, on row 0.
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape = kind.shape();
        Self {
            kind,
            shape,
            x: (board_width / 2) as i32 - (shape.cols() / 2) as i32,
            y: 0,
        }
    }

    /// Spawn a uniformly random kind.
    pub fn random<R: Rng>(rng: &mut R, board_width: usize) -> Self {
        let kind = PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())];
        Self::spawn(kind, board_width)
    }

    /// Rotated shape; the piece itself is left untouched.
    pub fn rotate(&self) -> Shape {
        self.shape.rotated()
    }

    /// Absolute board coordinates (x, y) of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied()
            .map(move |(r, c)| (self.x + c as i32, self.y + r as i32))
    }
}
