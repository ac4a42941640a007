mod common;

use common::{book_ident, cell, range, A1Extractor, BrittleExtractor};
use lineage_engine::{
    analyze, AnalyzeError, AnalyzeOptions, GraphError, ProgressCounter, ScanError, ScannedCell,
    SheetScan, SheetScanner,
};
use lineage_model::{CellCoord, SheetIdent};
use pretty_assertions::assert_eq;

struct FixtureScanner {
    scans: Vec<SheetScan>,
}

impl SheetScanner for FixtureScanner {
    fn sheets(&self) -> Vec<SheetIdent> {
        self.scans.iter().map(|s| s.ident.clone()).collect()
    }

    fn scan(&self, sheet: &SheetIdent) -> Result<SheetScan, ScanError> {
        self.scans
            .iter()
            .find(|s| &s.ident == sheet)
            .cloned()
            .ok_or_else(|| ScanError::new(sheet.to_string(), "unknown sheet"))
    }
}

fn coord(a1: &str) -> CellCoord {
    CellCoord::from_a1(a1).unwrap()
}

fn sum_workbook() -> FixtureScanner {
    FixtureScanner {
        scans: vec![SheetScan {
            ident: book_ident("Sheet1"),
            cells: vec![
                ScannedCell::data(coord("A1")),
                ScannedCell::data(coord("A2")),
                ScannedCell::formula(coord("A3"), "=SUM(A1:A2)"),
            ],
        }],
    }
}

#[test]
fn end_to_end_sum_workbook() {
    let scanner = sum_workbook();
    let mut progress = ProgressCounter::new();
    let analysis = analyze(
        &scanner,
        &A1Extractor,
        &mut progress,
        AnalyzeOptions::default(),
    )
    .unwrap();

    assert_eq!(analysis.stats.sheets, 1);
    assert_eq!(analysis.stats.used_cells, 3);
    assert_eq!(analysis.stats.formulas, 1);
    assert_eq!(progress.total, 1);
    assert_eq!(progress.done, 1);
    assert_eq!(progress.percent(), 100);

    let graph = analysis.graph;
    let s = graph.sheets().id_of(&book_ident("Sheet1")).unwrap();
    let a3 = cell(s, "A3");
    let r = range(s, "A1:A2");

    assert_eq!(graph.formula_text(a3).unwrap(), "=SUM(A1:A2)");
    assert_eq!(graph.terminal_formulas(false), vec![a3]);
    assert_eq!(graph.terminal_input_ranges(), vec![r]);
    assert_eq!(
        graph.terminal_input_cells(),
        vec![cell(s, "A1"), cell(s, "A2")]
    );
    assert!(graph.is_perturbable(graph.range_id(&r).unwrap()));
    assert!(graph.verify_acyclic().is_ok());
}

#[test]
fn formulas_spread_across_sheets_link_up() {
    let scanner = FixtureScanner {
        scans: vec![
            SheetScan {
                ident: book_ident("Inputs"),
                cells: vec![
                    ScannedCell::data(coord("A1")),
                    ScannedCell::data(coord("A2")),
                ],
            },
            SheetScan {
                ident: book_ident("Report"),
                cells: vec![ScannedCell::formula(coord("B1"), "=SUM(A1:A2)")],
            },
        ],
    };
    let analysis = analyze(
        &scanner,
        &A1Extractor,
        &mut lineage_engine::NoProgress,
        AnalyzeOptions::default(),
    )
    .unwrap();

    assert_eq!(analysis.stats.sheets, 2);
    assert_eq!(analysis.stats.used_cells, 3);
    assert_eq!(analysis.stats.formulas, 1);
    // The fixture extractor resolves relative references against the
    // formula's own sheet.
    let report = analysis
        .graph
        .sheets()
        .id_of(&book_ident("Report"))
        .unwrap();
    assert_eq!(
        analysis.graph.terminal_input_cells(),
        vec![cell(report, "A1"), cell(report, "A2")]
    );
}

#[test]
fn scan_failures_abort_the_analysis() {
    struct NoScan;
    impl SheetScanner for NoScan {
        fn sheets(&self) -> Vec<SheetIdent> {
            vec![book_ident("Sheet1")]
        }
        fn scan(&self, sheet: &SheetIdent) -> Result<SheetScan, ScanError> {
            Err(ScanError::new(sheet.to_string(), "document unreadable"))
        }
    }

    let err = analyze(
        &NoScan,
        &A1Extractor,
        &mut lineage_engine::NoProgress,
        AnalyzeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::Scan(_)));
}

#[test]
fn extractor_failures_abort_unless_ignored() {
    let scanner = FixtureScanner {
        scans: vec![SheetScan {
            ident: book_ident("Sheet1"),
            cells: vec![
                ScannedCell::formula(coord("A1"), "=BROKEN(!!)"),
                ScannedCell::formula(coord("A2"), "=B2*2"),
            ],
        }],
    };

    let err = analyze(
        &scanner,
        &BrittleExtractor,
        &mut lineage_engine::NoProgress,
        AnalyzeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::Graph(GraphError::Extract(_))
    ));

    // With the lenient option the bad formula simply carries no references.
    let analysis = analyze(
        &scanner,
        &BrittleExtractor,
        &mut lineage_engine::NoProgress,
        AnalyzeOptions {
            ignore_parse_errors: true,
        },
    )
    .unwrap();
    let graph = analysis.graph;
    let s = graph.sheets().id_of(&book_ident("Sheet1")).unwrap();
    assert_eq!(graph.formula_count(), 2);
    assert_eq!(graph.input_ranges_of(cell(s, "A1")), vec![]);
    assert_eq!(graph.direct_inputs_of(cell(s, "A1")), vec![]);
    assert_eq!(graph.direct_inputs_of(cell(s, "A2")), vec![cell(s, "B2")]);
}

#[test]
fn duplicate_scanned_formulas_abort_the_analysis() {
    let scanner = FixtureScanner {
        scans: vec![SheetScan {
            ident: book_ident("Sheet1"),
            cells: vec![
                ScannedCell::formula(coord("A1"), "=B1"),
                ScannedCell::formula(coord("A1"), "=C1"),
            ],
        }],
    };

    let err = analyze(
        &scanner,
        &A1Extractor,
        &mut lineage_engine::NoProgress,
        AnalyzeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::Graph(GraphError::DuplicateFormula { .. })
    ));
}

#[test]
fn stats_serialize_for_host_reporting() {
    let scanner = sum_workbook();
    let analysis = analyze(
        &scanner,
        &A1Extractor,
        &mut lineage_engine::NoProgress,
        AnalyzeOptions::default(),
    )
    .unwrap();

    let json = serde_json::to_string(&analysis.stats).unwrap();
    let back: lineage_engine::ScanStats = serde_json::from_str(&json).unwrap();
    assert_eq!(back, analysis.stats);
}
