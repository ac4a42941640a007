use lineage_model::CellId;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzeError, GraphError};
use crate::extract::ReferenceExtractor;
use crate::graph::{DependencyGraph, GraphBuilder};
use crate::progress::ProgressSink;
use crate::scan::{scan_workbook, SheetScanner};

/// Construction policy knobs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// When set, a formula whose references cannot be extracted is linked
    /// with no references instead of aborting the analysis. Useful for
    /// documents carrying vendor-specific syntax the extractor does not
    /// understand.
    pub ignore_parse_errors: bool,
}

/// Coarse counts from the bulk scan, for host-side reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub sheets: usize,
    pub used_cells: usize,
    pub formulas: usize,
}

/// The outcome of a successful analysis: the frozen graph plus scan counts.
#[derive(Debug)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub stats: ScanStats,
}

/// Run the whole construction pass: bulk-scan every worksheet, register every
/// formula, resolve and link its references, then freeze the graph.
///
/// `progress` is told the formula total once, then poked after each formula
/// is fully linked. Any scan or extraction failure (unless
/// [`AnalyzeOptions::ignore_parse_errors`] is set) aborts the analysis;
/// partial graphs are never returned.
pub fn analyze<S, E, P>(
    scanner: &S,
    extractor: &E,
    progress: &mut P,
    options: AnalyzeOptions,
) -> Result<Analysis, AnalyzeError>
where
    S: SheetScanner + ?Sized,
    E: ReferenceExtractor + ?Sized,
    P: ProgressSink + ?Sized,
{
    let scans = scan_workbook(scanner)?;

    let mut builder = GraphBuilder::new();
    let mut stats = ScanStats {
        sheets: scans.len(),
        ..ScanStats::default()
    };

    for scan in scans {
        let sheet = builder.sheets_mut().intern(scan.ident);
        for cell in scan.cells {
            stats.used_cells += 1;
            if let Some(text) = cell.formula {
                builder.register_formula(CellId::new(sheet, cell.coord), text)?;
            }
        }
    }

    let formulas = builder.formula_addrs();
    stats.formulas = formulas.len();
    progress.begin(formulas.len());

    for addr in formulas {
        match builder.resolve_and_link(addr, extractor) {
            Ok(()) => {}
            Err(GraphError::Extract(_)) if options.ignore_parse_errors => {}
            Err(err) => return Err(err.into()),
        }
        progress.advance();
    }

    Ok(Analysis {
        graph: builder.finish(),
        stats,
    })
}
