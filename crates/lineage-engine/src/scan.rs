use lineage_model::{CellCoord, SheetIdent};

use crate::error::ScanError;

/// One used cell as reported by the bulk scan: its coordinates and, when the
/// cell computes rather than holds data, its formula text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedCell {
    pub coord: CellCoord,
    /// Raw expression text (leading `=` included) for formula cells, `None`
    /// for data cells.
    pub formula: Option<String>,
}

impl ScannedCell {
    pub fn data(coord: CellCoord) -> Self {
        Self {
            coord,
            formula: None,
        }
    }

    pub fn formula(coord: CellCoord, text: impl Into<String>) -> Self {
        Self {
            coord,
            formula: Some(text.into()),
        }
    }
}

/// The used cells of one worksheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetScan {
    pub ident: SheetIdent,
    pub cells: Vec<ScannedCell>,
}

/// External collaborator that bulk-reads the document: every used cell per
/// worksheet, with formula text where present.
///
/// Implementations are expected to be synchronous; any I/O latency is the
/// host's concern. `Sync` lets [`scan_workbook`] fan scanning out across
/// sheets, which is safe because sheets are disjoint address spaces.
pub trait SheetScanner: Sync {
    /// Every worksheet in the document.
    fn sheets(&self) -> Vec<SheetIdent>;

    /// Used cells of one worksheet.
    fn scan(&self, sheet: &SheetIdent) -> Result<SheetScan, ScanError>;
}

/// Scan every sheet of the document, in parallel where the `parallel`
/// feature and the target allow it.
///
/// Results come back in [`SheetScanner::sheets`] order regardless of
/// scheduling, so downstream registration order is deterministic. The first
/// scan failure aborts the whole pass.
pub fn scan_workbook<S: SheetScanner + ?Sized>(scanner: &S) -> Result<Vec<SheetScan>, ScanError> {
    let sheets = scanner.sheets();

    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        use rayon::prelude::*;

        if let Some(pool) = crate::parallel::rayon_pool() {
            return pool.install(|| {
                sheets
                    .par_iter()
                    .map(|sheet| scanner.scan(sheet))
                    .collect::<Result<Vec<_>, _>>()
            });
        }
    }

    sheets.iter().map(|sheet| scanner.scan(sheet)).collect()
}
