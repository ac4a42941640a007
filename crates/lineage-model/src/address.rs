use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest number of rows a worksheet grid can hold (Excel-compatible).
pub const GRID_MAX_ROWS: u32 = 1_048_576;
/// Largest number of columns a worksheet grid can hold (Excel-compatible).
pub const GRID_MAX_COLS: u32 = 16_384;

/// Coordinates of a single cell within a worksheet.
///
/// Rows and columns are **0-indexed**:
/// - `row = 0` is spreadsheet row `1`
/// - `col = 0` is spreadsheet column `A`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    /// 0-indexed row.
    pub row: u32,
    /// 0-indexed column.
    pub col: u32,
}

impl CellCoord {
    /// Construct a new [`CellCoord`].
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", col_to_name(self.col), self.row + 1)
    }

    /// Parse an A1-style reference (e.g. `A1`, `$B$2`, lowercase accepted).
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        // Absolute-reference `$` markers carry no identity; accept and drop them.
        let bytes = s.as_bytes();
        let mut idx = 0usize;
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(A1ParseError::MissingColumn);
        }
        let col_str = &s[col_start..idx];

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(A1ParseError::MissingRow);
        }
        if idx != bytes.len() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let col = name_to_col(col_str)?;
        if col >= GRID_MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        let row_1_based: u32 = s[row_start..idx]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow)?;
        if row_1_based == 0 || row_1_based > GRID_MAX_ROWS {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self {
            row: row_1_based - 1,
            col,
        })
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Errors that can occur when parsing an A1 cell reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum A1ParseError {
    #[error("empty A1 reference")]
    Empty,
    #[error("missing column in A1 reference")]
    MissingColumn,
    #[error("missing row in A1 reference")]
    MissingRow,
    #[error("invalid column in A1 reference")]
    InvalidColumn,
    #[error("invalid row in A1 reference")]
    InvalidRow,
    #[error("trailing characters in A1 reference")]
    TrailingCharacters,
}

fn col_to_name(col: u32) -> String {
    // Columns are 1-based in A1 notation; we store 0-based internally.
    let mut n = col + 1;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).expect("column letters are always valid UTF-8")
}

fn name_to_col(s: &str) -> Result<u32, A1ParseError> {
    let mut col: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(A1ParseError::InvalidColumn);
        }
        let v = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or(A1ParseError::InvalidColumn)?;
    }
    if col == 0 {
        return Err(A1ParseError::InvalidColumn);
    }
    Ok(col - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_roundtrip() {
        let c = CellCoord::new(0, 0);
        assert_eq!(c.to_a1(), "A1");
        assert_eq!(CellCoord::from_a1("A1").unwrap(), c);
        assert_eq!(CellCoord::from_a1("$A$1").unwrap(), c);

        let c2 = CellCoord::new(31, 54); // BC32
        assert_eq!(c2.to_a1(), "BC32");
        assert_eq!(CellCoord::from_a1("bc32").unwrap(), c2);
    }

    #[test]
    fn a1_rejects_malformed_references() {
        assert_eq!(CellCoord::from_a1(""), Err(A1ParseError::Empty));
        assert_eq!(CellCoord::from_a1("1"), Err(A1ParseError::MissingColumn));
        assert_eq!(CellCoord::from_a1("A"), Err(A1ParseError::MissingRow));
        assert_eq!(CellCoord::from_a1("A0"), Err(A1ParseError::InvalidRow));
        assert_eq!(
            CellCoord::from_a1("A1B"),
            Err(A1ParseError::TrailingCharacters)
        );
    }

    #[test]
    fn a1_bounds_match_the_grid_limits() {
        assert!(CellCoord::from_a1("XFD1048576").is_ok());
        assert!(CellCoord::from_a1("XFE1").is_err()); // col 16,385 is out of bounds
        assert!(CellCoord::from_a1("A1048577").is_err()); // row 1,048,577 is out of bounds
    }

    #[test]
    fn ordering_is_row_major() {
        let a = CellCoord::new(0, 5);
        let b = CellCoord::new(1, 0);
        assert!(a < b);
    }
}
