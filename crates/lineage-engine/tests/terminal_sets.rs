mod common;

use common::{book_sheet, cell, range, A1Extractor};
use lineage_engine::GraphBuilder;
use pretty_assertions::assert_eq;

#[test]
fn consumed_formulas_are_not_terminal() {
    // X at B1 feeds Y at C1 both directly (=B1) and through the range A1:B1.
    let mut builder = GraphBuilder::new();
    let s = book_sheet(&mut builder, "Sheet1");
    let x = cell(s, "B1");
    let y = cell(s, "C1");
    builder.register_formula(x, "=A1*2").unwrap();
    builder.register_formula(y, "=B1+SUM(A1:B1)").unwrap();
    builder.resolve_and_link(x, &A1Extractor).unwrap();
    builder.resolve_and_link(y, &A1Extractor).unwrap();
    let graph = builder.finish();

    assert_eq!(graph.terminal_formulas(false), vec![y]);
    assert_eq!(graph.terminal_formulas(true), vec![x, y]);
}

#[test]
fn range_consumption_alone_disqualifies_a_formula() {
    // X is never referenced directly, only swallowed by Y's range. The
    // exclusion must see through the containing range (two hops).
    let mut builder = GraphBuilder::new();
    let s = book_sheet(&mut builder, "Sheet1");
    let x = cell(s, "A2");
    let y = cell(s, "B1");
    builder.register_formula(x, "=A1+1").unwrap();
    builder.register_formula(y, "=SUM(A1:A3)").unwrap();
    builder.resolve_and_link(x, &A1Extractor).unwrap();
    builder.resolve_and_link(y, &A1Extractor).unwrap();
    let graph = builder.finish();

    assert_eq!(graph.terminal_formulas(false), vec![y]);
}

#[test]
fn terminal_input_ranges_hold_only_raw_data() {
    let mut builder = GraphBuilder::new();
    let s = book_sheet(&mut builder, "Sheet1");
    // B1 is a formula, so A1:B1 is intermediate; A10:A12 is pure data.
    let b1 = cell(s, "B1");
    let f = cell(s, "D1");
    builder.register_formula(b1, "=A1").unwrap();
    builder.register_formula(f, "=SUM(A1:B1)*SUM(A10:A12)").unwrap();
    builder.resolve_and_link(b1, &A1Extractor).unwrap();
    builder.resolve_and_link(f, &A1Extractor).unwrap();
    let graph = builder.finish();

    // The mixed range stays perturbable (not *all* components are formulas)
    // but still must not be offered as a data-input point.
    let mixed = graph.range_id(&range(s, "A1:B1")).unwrap();
    assert!(graph.is_perturbable(mixed));
    assert_eq!(graph.terminal_input_ranges(), vec![range(s, "A10:A12")]);
}

#[test]
fn non_perturbable_ranges_are_excluded() {
    // Both components of B1:B2 are formulas, so the range gets marked and
    // can never be a perturbation input.
    let mut builder = GraphBuilder::new();
    let s = book_sheet(&mut builder, "Sheet1");
    let b1 = cell(s, "B1");
    let b2 = cell(s, "B2");
    let f = cell(s, "C1");
    builder.register_formula(b1, "=A1").unwrap();
    builder.register_formula(b2, "=A2").unwrap();
    builder.register_formula(f, "=SUM(B1:B2)").unwrap();
    builder.resolve_and_link(b1, &A1Extractor).unwrap();
    builder.resolve_and_link(b2, &A1Extractor).unwrap();
    builder.resolve_and_link(f, &A1Extractor).unwrap();
    let graph = builder.finish();

    let derived = graph.range_id(&range(s, "B1:B2")).unwrap();
    assert!(!graph.is_perturbable(derived));
    assert_eq!(graph.terminal_input_ranges(), vec![]);
}

#[test]
fn computation_cells_cover_terminal_input_cells() {
    let mut builder = GraphBuilder::new();
    let s = book_sheet(&mut builder, "Sheet1");
    let mid = cell(s, "B1");
    let out = cell(s, "C1");
    builder.register_formula(mid, "=SUM(A1:A3)").unwrap();
    builder.register_formula(out, "=B1+A9").unwrap();
    builder.resolve_and_link(mid, &A1Extractor).unwrap();
    builder.resolve_and_link(out, &A1Extractor).unwrap();
    let graph = builder.finish();

    let all = graph.all_computation_cells();
    let terminal = graph.terminal_input_cells();
    for c in &terminal {
        assert!(all.contains(c), "{c} missing from all_computation_cells");
    }

    // B1 participates as an input (out reads it) even though it is derived.
    assert_eq!(
        all,
        vec![cell(s, "A1"), mid, cell(s, "A2"), cell(s, "A3"), cell(s, "A9")]
    );
    // The terminal set resolves B1 down to its own raw inputs.
    assert_eq!(
        terminal,
        vec![cell(s, "A1"), cell(s, "A2"), cell(s, "A3"), cell(s, "A9")]
    );
}

#[test]
fn end_to_end_sum_scenario() {
    // A1=5, A2=10, A3=SUM(A1:A2): one formula, one range, the range stays
    // perturbable because neither component is a formula.
    let mut builder = GraphBuilder::new();
    let s = book_sheet(&mut builder, "Sheet1");
    let a3 = cell(s, "A3");
    builder.register_formula(a3, "=SUM(A1:A2)").unwrap();
    builder.resolve_and_link(a3, &A1Extractor).unwrap();
    let graph = builder.finish();

    let r = range(s, "A1:A2");
    let rid = graph.range_id(&r).unwrap();
    assert_eq!(graph.all_formulas(), vec![a3]);
    assert_eq!(graph.all_ranges(), vec![r]);
    assert!(graph.is_perturbable(rid));
    assert_eq!(graph.terminal_formulas(false), vec![a3]);
    assert_eq!(graph.terminal_input_ranges(), vec![r]);
    assert_eq!(
        graph.terminal_input_cells(),
        vec![cell(s, "A1"), cell(s, "A2")]
    );
    assert_eq!(
        graph.all_computation_cells(),
        vec![cell(s, "A1"), cell(s, "A2")]
    );
}
