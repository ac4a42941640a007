use lineage_model::{CellId, SheetRange, SheetRegistry};

use crate::error::ExtractError;

/// References contained in one formula's text: whole ranges and individual
/// cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedRefs {
    /// Ranges the formula reads as a unit (e.g. the `A1:A10` in `SUM(A1:A10)`).
    pub ranges: Vec<SheetRange>,
    /// Cells the formula reads directly, not through a range (e.g. `=B2*2`).
    pub cells: Vec<CellId>,
}

impl ExtractedRefs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.cells.is_empty()
    }
}

/// External collaborator that parses a formula's text into the set of ranges
/// and single cells it references.
///
/// The extractor, not the engine, is responsible for resolving relative and
/// mixed references against the formula's own location (`origin`). It
/// receives the graph's [`SheetRegistry`] mutably so that cross-sheet or
/// cross-workbook references can intern identities the bulk scan never saw.
///
/// The engine never re-parses formula semantics (arithmetic, function calls);
/// it consumes exactly what this trait returns.
pub trait ReferenceExtractor {
    fn references(
        &self,
        origin: CellId,
        text: &str,
        sheets: &mut SheetRegistry,
    ) -> Result<ExtractedRefs, ExtractError>;
}
