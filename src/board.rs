//! Playfield grid: locked cells, placement test, full-row compaction.

use crate::piece::{Piece, PieceKind, Shape};
use std::collections::VecDeque;

pub const DEFAULT_WIDTH: u16 = 10;
pub const DEFAULT_HEIGHT: u16 = 20;

/// Single cell: empty, or locked with the kind that filled it (for its colour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Grid of cells. y=0 is the top (spawn) row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            width: w,
            height: h,
            rows: (0..h).map(|_| vec![Cell::Empty; w]).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|c| !c.is_filled())
    }

    /// True if `shape` with its top-left at (x, y) stays inside the side walls and
    /// above the floor and overlaps no locked cell. Cells above the top edge
    /// (y < 0) are allowed and skip the collision test.
    pub fn can_place(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape.occupied().all(|(r, c)| {
            let bx = x + c as i32;
            let by = y + r as i32;
            if bx < 0 || bx >= self.width as i32 || by >= self.height as i32 {
                return false;
            }
            by < 0 || !matches!(self.get(bx as usize, by as usize), Some(Cell::Filled(_)))
        })
    }

    /// Write the piece's kind into every cell it covers.
    pub fn lock(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 {
                self.set(x as usize, y as usize, Cell::Filled(piece.kind));
            }
        }
    }

    /// Remove every complete row and push that many empty rows on top; the
    /// other rows keep their relative order. Returns the removed row indices,
    /// top to bottom, as they were before compaction.
    pub fn clear_full_rows(&mut self) -> Vec<usize> {
        let full: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|c| c.is_filled()))
            .map(|(y, _)| y)
            .collect();
        if full.is_empty() {
            return full;
        }
        self.rows.retain(|row| !row.iter().all(|c| c.is_filled()));
        for _ in 0..full.len() {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: usize, kind: PieceKind) {
        for x in 0..board.width() {
            board.set(x, y, Cell::Filled(kind));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::default();
        assert_eq!((board.width(), board.height()), (10, 20));
        assert!(board.is_empty());
        assert_eq!(board.rows().count(), 20);
    }

    #[test]
    fn test_get_set_ignore_out_of_range() {
        let mut board = Board::new(4, 4);
        board.set(9, 9, Cell::Filled(PieceKind::T));
        assert!(board.is_empty());
        assert_eq!(board.get(4, 0), None);
        board.set(3, 3, Cell::Filled(PieceKind::T));
        assert_eq!(board.get(3, 3), Some(Cell::Filled(PieceKind::T)));
    }

    #[test]
    fn test_can_place_walls_and_floor() {
        let board = Board::default();
        let o = PieceKind::O.shape();
        assert!(board.can_place(&o, 0, 0));
        assert!(board.can_place(&o, 8, 18));
        assert!(!board.can_place(&o, -1, 0));
        assert!(!board.can_place(&o, 9, 0));
        assert!(!board.can_place(&o, 0, 19));
    }

    #[test]
    fn test_can_place_above_top_is_allowed() {
        let mut board = Board::default();
        fill_row(&mut board, 0, PieceKind::Z);
        let i = PieceKind::I.shape().rotated();
        // Vertical I with three cells above the board, one in row 0: blocked by row 0.
        assert!(!board.can_place(&i, 2, -3));
        // Entirely above the board: nothing to collide with.
        assert!(board.can_place(&i, 2, -4));
    }

    #[test]
    fn test_can_place_collision() {
        let mut board = Board::default();
        board.set(5, 10, Cell::Filled(PieceKind::S));
        let t = PieceKind::T.shape();
        // T occupies (x..x+3, y) and (x+1, y+1).
        assert!(!board.can_place(&t, 4, 9));
        assert!(board.can_place(&t, 5, 9));
        assert!(!board.can_place(&t, 3, 10));
    }

    #[test]
    fn test_lock_writes_kind() {
        let mut board = Board::default();
        let mut piece = Piece::spawn(PieceKind::J, 10);
        piece.y = 18;
        board.lock(&piece);
        // J spawns at x = 4: row 18 gets 4..=6, row 19 gets 4.
        assert_eq!(board.get(4, 18), Some(Cell::Filled(PieceKind::J)));
        assert_eq!(board.get(6, 18), Some(Cell::Filled(PieceKind::J)));
        assert_eq!(board.get(4, 19), Some(Cell::Filled(PieceKind::J)));
        assert_eq!(board.get(5, 19), Some(Cell::Empty));
    }

    #[test]
    fn test_clear_without_full_rows_changes_nothing() {
        let mut board = Board::default();
        board.set(0, 19, Cell::Filled(PieceKind::O));
        let before = board.clone();
        assert!(board.clear_full_rows().is_empty());
        assert!(board.clear_full_rows().is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_compacts_and_keeps_order() {
        let mut board = Board::new(4, 6);
        board.set(0, 1, Cell::Filled(PieceKind::I));
        fill_row(&mut board, 2, PieceKind::O);
        board.set(1, 3, Cell::Filled(PieceKind::T));
        fill_row(&mut board, 4, PieceKind::O);
        board.set(2, 5, Cell::Filled(PieceKind::L));

        assert_eq!(board.clear_full_rows(), vec![2, 4]);

        assert!(board.rows().take(2).flatten().all(|c| !c.is_filled()));
        assert_eq!(board.get(0, 3), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(board.get(1, 4), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(board.get(2, 5), Some(Cell::Filled(PieceKind::L)));
        assert_eq!(board.rows().count(), 6);
    }
}
