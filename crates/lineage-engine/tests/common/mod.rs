#![allow(dead_code)]

use lineage_engine::{ExtractError, ExtractedRefs, GraphBuilder, ReferenceExtractor};
use lineage_model::{CellCoord, CellId, Rect, SheetId, SheetIdent, SheetRange, SheetRegistry};

pub fn cell(sheet: SheetId, a1: &str) -> CellId {
    CellId::new(sheet, CellCoord::from_a1(a1).unwrap())
}

pub fn range(sheet: SheetId, a1: &str) -> SheetRange {
    SheetRange::new(sheet, Rect::from_a1(a1).unwrap())
}

pub fn book_ident(sheet: &str) -> SheetIdent {
    SheetIdent::new("/tmp", "book.xlsx", sheet)
}

pub fn book_sheet(builder: &mut GraphBuilder, sheet: &str) -> SheetId {
    builder.sheets_mut().intern(book_ident(sheet))
}

/// Test double for the external reference extractor: treats every token of
/// the formula body that parses as an A1 reference as a reference on the
/// formula's own sheet. `SUM(A1:A2)` yields the range `A1:A2`; `B1+B2`
/// yields the cells `B1` and `B2`; function names fail A1 parsing and drop
/// out.
pub struct A1Extractor;

impl ReferenceExtractor for A1Extractor {
    fn references(
        &self,
        origin: CellId,
        text: &str,
        _sheets: &mut SheetRegistry,
    ) -> Result<ExtractedRefs, ExtractError> {
        let body = text.strip_prefix('=').unwrap_or(text);
        let mut refs = ExtractedRefs::default();
        for token in body.split(|c: char| !(c.is_ascii_alphanumeric() || c == ':' || c == '$')) {
            if token.is_empty() {
                continue;
            }
            if token.contains(':') {
                if let Ok(rect) = Rect::from_a1(token) {
                    refs.ranges.push(SheetRange::new(origin.sheet, rect));
                }
            } else if let Ok(coord) = CellCoord::from_a1(token) {
                refs.cells.push(CellId::new(origin.sheet, coord));
            }
        }
        Ok(refs)
    }
}

/// Extractor that rejects formulas containing `BROKEN` and otherwise behaves
/// like [`A1Extractor`].
pub struct BrittleExtractor;

impl ReferenceExtractor for BrittleExtractor {
    fn references(
        &self,
        origin: CellId,
        text: &str,
        sheets: &mut SheetRegistry,
    ) -> Result<ExtractedRefs, ExtractError> {
        if text.contains("BROKEN") {
            return Err(ExtractError::new(origin, "unsupported syntax"));
        }
        A1Extractor.references(origin, text, sheets)
    }
}
