use core::fmt;

use serde::{Deserialize, Serialize};

use crate::address::CellCoord;
use crate::rect::{Rect, RectCells};
use crate::sheet::{SheetId, SheetRegistry};

/// Identity of a single cell: worksheet plus coordinates.
///
/// Because [`SheetId`]s are interned from full document/sheet identity, two
/// `CellId`s are equal exactly when sheet name, row, column, document name and
/// document path all agree.
///
/// The derived ordering is sheet, then row, then column; queries sort their
/// output by it so results are deterministic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub sheet: SheetId,
    pub coord: CellCoord,
}

impl CellId {
    #[inline]
    pub const fn new(sheet: SheetId, coord: CellCoord) -> Self {
        Self { sheet, coord }
    }

    /// Render as `[book]Sheet!A1` using the registry the id was interned by.
    pub fn qualify(&self, sheets: &SheetRegistry) -> String {
        format!("{}!{}", sheets.ident(self.sheet), self.coord.to_a1())
    }
}

impl fmt::Display for CellId {
    /// Registry-free rendering, `S0!A1`. Use [`CellId::qualify`] for the full
    /// document-qualified form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.coord)
    }
}

/// A rectangular range pinned to a worksheet: the unit a formula references
/// as one "vector" of input cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SheetRange {
    pub sheet: SheetId,
    pub rect: Rect,
}

impl SheetRange {
    #[inline]
    pub const fn new(sheet: SheetId, rect: Rect) -> Self {
        Self { sheet, rect }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        cell.sheet == self.sheet && self.rect.contains(cell.coord)
    }

    /// Number of member cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        self.rect.cell_count()
    }

    /// Iterate over the member cells in row-major order.
    ///
    /// Lazy, finite and restartable; see [`Rect::cells`].
    #[inline]
    pub fn cells(&self) -> SheetRangeCells {
        SheetRangeCells {
            sheet: self.sheet,
            inner: self.rect.cells(),
        }
    }

    /// Render as `[book]Sheet!A1:B2` using the registry the id was interned by.
    pub fn qualify(&self, sheets: &SheetRegistry) -> String {
        format!("{}!{}", sheets.ident(self.sheet), self.rect)
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.rect)
    }
}

/// Iterator over the member [`CellId`]s of a [`SheetRange`].
#[derive(Clone, Debug)]
pub struct SheetRangeCells {
    sheet: SheetId,
    inner: RectCells,
}

impl Iterator for SheetRangeCells {
    type Item = CellId;

    #[inline]
    fn next(&mut self) -> Option<CellId> {
        self.inner.next().map(|coord| CellId::new(self.sheet, coord))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
