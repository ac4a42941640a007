//! Terminal-set and closure queries over the frozen graph.
//!
//! These are the read APIs a downstream sensitivity/error-injection pass
//! consumes: which formulas are final outputs, which ranges and cells are
//! independent data-input points, and the transitive data inputs of any
//! formula.

use std::collections::{BTreeSet, HashSet};

use lineage_model::{CellId, SheetRange};

use super::dependency_graph::{DependencyGraph, RangeId};

impl DependencyGraph {
    /// Formula addresses that no other formula consumes, sorted.
    ///
    /// With `include_all` the filter is skipped and every registered formula
    /// is returned.
    ///
    /// Consumption is a two-hop test: a formula is excluded when another
    /// formula references its address directly, *or* when its address sits
    /// inside a range that some formula references. A range no formula reads
    /// does not disqualify its member formulas.
    #[must_use]
    pub fn terminal_formulas(&self, include_all: bool) -> Vec<CellId> {
        if include_all {
            return self.all_formulas();
        }

        let mut out: Vec<CellId> = self
            .formulas
            .keys()
            .copied()
            .filter(|f| {
                self.formula_cells.inverse_len(f) == 0
                    && self
                        .range_components
                        .inverse(f)
                        .all(|range| self.formula_ranges.inverse_len(&range) == 0)
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Ranges suitable as independent data-input points for perturbation,
    /// sorted.
    ///
    /// Filters out ranges marked do-not-perturb and ranges containing any
    /// formula cell; the latter catches intermediate ranges that both feed a
    /// formula and hold derived values.
    #[must_use]
    pub fn terminal_input_ranges(&self) -> Vec<SheetRange> {
        let mut out: Vec<SheetRange> = (0..self.ranges.len())
            .map(|i| RangeId(i as u32))
            .filter(|&id| {
                self.is_perturbable(id)
                    && self
                        .range_components
                        .forward(&id)
                        .all(|cell| !self.formulas.contains_key(&cell))
            })
            .map(|id| self.range(id))
            .collect();
        out.sort_unstable();
        out
    }

    /// The transitive set of raw data cells feeding `addr`, sorted.
    ///
    /// If `addr` is not a formula the result is just `{addr}`. Otherwise the
    /// closure unions, recursively, every component cell of every range the
    /// formula references and every cell it references directly.
    ///
    /// Implemented as an explicit-stack worklist with a visited set: shared
    /// sub-inputs (diamonds) are expanded once, and the traversal terminates
    /// even if the graph violates the documented acyclicity precondition.
    #[must_use]
    pub fn input_closure(&self, addr: CellId) -> Vec<CellId> {
        let mut expanded = HashSet::new();
        let mut out = BTreeSet::new();
        self.closure_into(addr, &mut expanded, &mut out);
        out.into_iter().collect()
    }

    /// Distinct union of [`input_closure`](Self::input_closure) over every
    /// registered formula, sorted: every raw data cell that (transitively)
    /// feeds any output.
    #[must_use]
    pub fn terminal_input_cells(&self) -> Vec<CellId> {
        let mut expanded = HashSet::new();
        let mut out = BTreeSet::new();
        for addr in self.terminal_formulas(true) {
            self.closure_into(addr, &mut expanded, &mut out);
        }
        out.into_iter().collect()
    }

    /// Every address that participates as an input anywhere in the graph,
    /// sorted: the component cells of every referenced range plus every
    /// directly referenced cell, independent of terminality.
    #[must_use]
    pub fn all_computation_cells(&self) -> Vec<CellId> {
        let mut out = BTreeSet::new();
        for formula in self.formulas.keys() {
            for range in self.formula_ranges.forward(formula) {
                out.extend(self.range_components.forward(&range));
            }
            out.extend(self.formula_cells.forward(formula));
        }
        out.into_iter().collect()
    }

    /// Worklist core shared by [`input_closure`](Self::input_closure) and
    /// [`terminal_input_cells`](Self::terminal_input_cells). `expanded`
    /// carries the formulas already visited so callers can amortize one
    /// visited set across many roots.
    fn closure_into(
        &self,
        root: CellId,
        expanded: &mut HashSet<CellId>,
        out: &mut BTreeSet<CellId>,
    ) {
        let mut work = vec![root];
        while let Some(cell) = work.pop() {
            if self.formulas.contains_key(&cell) {
                if !expanded.insert(cell) {
                    continue;
                }
                for range in self.formula_ranges.forward(&cell) {
                    work.extend(self.range_components.forward(&range));
                }
                work.extend(self.formula_cells.forward(&cell));
            } else {
                out.insert(cell);
            }
        }
    }
}
