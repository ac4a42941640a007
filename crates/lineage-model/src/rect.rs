use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{A1ParseError, CellCoord};

/// A rectangular region within a worksheet.
///
/// The region is inclusive and always normalized such that:
/// - `start.row <= end.row`
/// - `start.col <= end.col`
///
/// Normalization makes equality structural: two descriptions of the same
/// rectangle (`A1:B2`, `B2:A1`, `A2:B1`) compare and hash identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rect {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl Rect {
    /// Construct a new rectangle, normalizing coordinates if needed.
    pub const fn new(a: CellCoord, b: CellCoord) -> Self {
        let start_row = if a.row <= b.row { a.row } else { b.row };
        let end_row = if a.row <= b.row { b.row } else { a.row };
        let start_col = if a.col <= b.col { a.col } else { b.col };
        let end_col = if a.col <= b.col { b.col } else { a.col };
        Self {
            start: CellCoord::new(start_row, start_col),
            end: CellCoord::new(end_row, end_col),
        }
    }

    /// A one-cell rectangle.
    #[inline]
    pub const fn single(cell: CellCoord) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }

    /// Returns true if `cell` lies within this rectangle.
    #[inline]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Number of columns in the rectangle.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Number of rows in the rectangle.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Total number of member cells.
    ///
    /// `u64` because a full-sheet rectangle overflows `u32`.
    #[inline]
    pub const fn cell_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Returns true if the rectangle is exactly one cell.
    #[inline]
    pub const fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// Iterate over the member cells in row-major order (`A1, B1, A2, B2` for
    /// `A1:B2`).
    ///
    /// The iterator is lazy and restartable: each call starts a fresh pass.
    /// Row-major order carries no semantic weight, but it is deterministic so
    /// callers can assert on it.
    #[inline]
    pub fn cells(&self) -> RectCells {
        RectCells {
            rect: *self,
            next: Some(self.start),
        }
    }

    /// Parse an A1-style rectangle like `A1:B2`, or a single-cell reference
    /// like `C3`.
    pub fn from_a1(a1: &str) -> Result<Self, RectParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(RectParseError::Empty);
        }

        match s.split_once(':') {
            None => {
                let cell = CellCoord::from_a1(s).map_err(RectParseError::Cell)?;
                Ok(Rect::single(cell))
            }
            Some((a, b)) => {
                let start = CellCoord::from_a1(a).map_err(RectParseError::Cell)?;
                let end = CellCoord::from_a1(b).map_err(RectParseError::Cell)?;
                Ok(Rect::new(start, end))
            }
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Errors that can occur when parsing an A1 rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum RectParseError {
    #[error("empty A1 range")]
    Empty,
    #[error("invalid cell reference in range: {0}")]
    Cell(#[source] A1ParseError),
}

/// Row-major iterator over the cells of a [`Rect`]. See [`Rect::cells`].
#[derive(Clone, Debug)]
pub struct RectCells {
    rect: Rect,
    next: Option<CellCoord>,
}

impl Iterator for RectCells {
    type Item = CellCoord;

    fn next(&mut self) -> Option<CellCoord> {
        let cur = self.next?;
        self.next = if cur.col < self.rect.end.col {
            Some(CellCoord::new(cur.row, cur.col + 1))
        } else if cur.row < self.rect.end.row {
            Some(CellCoord::new(cur.row + 1, self.rect.start.col))
        } else {
            None
        };
        Some(cur)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            None => 0,
            Some(cur) => {
                let full_rows = (self.rect.end.row - cur.row) as u64;
                let in_row = (self.rect.end.col - cur.col) as u64 + 1;
                full_rows * self.rect.width() as u64 + in_row
            }
        };
        let lo = usize::try_from(remaining).unwrap_or(usize::MAX);
        (lo, usize::try_from(remaining).ok())
    }
}
