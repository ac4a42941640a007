use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use lineage_model::{CellId, SheetRange, SheetRegistry};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::extract::ReferenceExtractor;
use crate::incidence::Incidence;

/// Identifier of an interned reference range.
///
/// Only meaningful within the graph that produced it. Ranges are deduplicated
/// by normalized identity, so equal rectangles on the same sheet always share
/// one id no matter how many formulas reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(pub(crate) u32);

impl RangeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the dependence graph, for cycle reporting and auditing UX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphNode {
    Cell(CellId),
    Range(SheetRange),
}

/// Counts useful for asserting the internal representation in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub formula_cells: usize,
    pub range_nodes: usize,
    /// Formula -> referenced-range edges.
    pub formula_range_edges: usize,
    /// Range -> component-cell edges.
    pub component_edges: usize,
    /// Formula -> directly-referenced-cell edges.
    pub direct_input_edges: usize,
}

/// Mutable construction state for a [`DependencyGraph`].
///
/// The builder is the single writer: registration and linking take
/// `&mut self`, and [`finish`](Self::finish) consumes the builder so queries
/// can never observe a half-built graph. All linking operations are
/// idempotent: re-linking an existing (formula, range) or (formula, cell)
/// pair adds no duplicate edge and cannot regress a perturbability decision.
#[derive(Debug)]
pub struct GraphBuilder {
    sheets: SheetRegistry,

    /// Formula text by address. Membership here is what "is a formula" means
    /// everywhere else in the engine.
    formulas: HashMap<CellId, String>,

    /// Interned ranges, dense by [`RangeId`].
    ranges: Vec<SheetRange>,
    range_ids: HashMap<SheetRange, RangeId>,

    /// Indices 1/2: formula <-> ranges it references.
    formula_ranges: Incidence<CellId, RangeId>,
    /// Indices 3/4: range <-> its component cells.
    range_components: Incidence<RangeId, CellId>,
    /// Indices 5/6: formula <-> cells it references directly.
    formula_cells: Incidence<CellId, CellId>,

    /// Ranges proven unfit as perturbation inputs. Insert-only, which is what
    /// makes the marking one-directional.
    do_not_perturb: HashSet<RangeId>,

    started: Instant,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sheets: SheetRegistry::new(),
            formulas: HashMap::new(),
            ranges: Vec::new(),
            range_ids: HashMap::new(),
            formula_ranges: Incidence::new(),
            range_components: Incidence::new(),
            formula_cells: Incidence::new(),
            do_not_perturb: HashSet::new(),
            started: Instant::now(),
        }
    }

    /// The sheet interner this graph keys its addresses by.
    #[must_use]
    pub fn sheets(&self) -> &SheetRegistry {
        &self.sheets
    }

    /// Mutable access for interning sheets discovered during scanning or
    /// reference extraction.
    pub fn sheets_mut(&mut self) -> &mut SheetRegistry {
        &mut self.sheets
    }

    /// Register the formula at `addr` with its raw expression text.
    ///
    /// Initializes the formula's (empty) buckets in the formula->ranges and
    /// formula->cells indices, so lookups are well-defined before any
    /// reference is linked.
    pub fn register_formula(
        &mut self,
        addr: CellId,
        text: impl Into<String>,
    ) -> Result<(), GraphError> {
        match self.formulas.entry(addr) {
            Entry::Occupied(_) => Err(GraphError::DuplicateFormula { addr }),
            Entry::Vacant(slot) => {
                slot.insert(text.into());
                self.formula_ranges.ensure_left(addr);
                self.formula_cells.ensure_left(addr);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn is_formula(&self, addr: CellId) -> bool {
        self.formulas.contains_key(&addr)
    }

    /// All registered formula addresses, sorted.
    #[must_use]
    pub fn formula_addrs(&self) -> Vec<CellId> {
        let mut out: Vec<CellId> = self.formulas.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Resolve the references of the registered formula at `addr` through
    /// `extractor` and link them into the graph.
    ///
    /// For every referenced range: fetch-or-create the range, link
    /// formula<->range, link range<->each component cell, then re-evaluate
    /// the range's perturbability. For every directly referenced cell: link
    /// formula<->cell.
    ///
    /// Extractor failures abort construction; callers that want the
    /// original lenient behavior catch [`GraphError::Extract`] and move on,
    /// leaving the formula with no references.
    pub fn resolve_and_link<E>(&mut self, addr: CellId, extractor: &E) -> Result<(), GraphError>
    where
        E: ReferenceExtractor + ?Sized,
    {
        let text = match self.formulas.get(&addr) {
            Some(text) => text,
            None => return Err(GraphError::NotAFormula { addr }),
        };
        let refs = extractor.references(addr, text, &mut self.sheets)?;

        for range in refs.ranges {
            let id = self.intern_range(range);
            self.formula_ranges.insert(addr, id);
            for cell in range.cells() {
                self.range_components.insert(id, cell);
            }
            self.mark_perturbability(id);
        }
        for cell in refs.cells {
            self.formula_cells.insert(addr, cell);
        }
        Ok(())
    }

    /// Link `formula` to a range it references, creating the range if this is
    /// its first appearance. Does not expand component cells; see
    /// [`resolve_and_link`](Self::resolve_and_link) for the full operation.
    pub fn link_input_range(
        &mut self,
        formula: CellId,
        range: SheetRange,
    ) -> Result<RangeId, GraphError> {
        if !self.formulas.contains_key(&formula) {
            return Err(GraphError::NotAFormula { addr: formula });
        }
        let id = self.intern_range(range);
        self.formula_ranges.insert(formula, id);
        Ok(id)
    }

    /// Record `cell` as a component of `range`.
    pub fn link_component_cell(&mut self, range: RangeId, cell: CellId) {
        self.range_components.insert(range, cell);
    }

    /// Link `formula` to a cell it references directly (not through a range).
    pub fn link_single_input(&mut self, formula: CellId, cell: CellId) -> Result<(), GraphError> {
        if !self.formulas.contains_key(&formula) {
            return Err(GraphError::NotAFormula { addr: formula });
        }
        self.formula_cells.insert(formula, cell);
        Ok(())
    }

    /// Re-evaluate whether `range` may serve as a perturbation input.
    ///
    /// Counts the range's currently linked component cells that are
    /// registered formulas; when every component is a formula the range is
    /// marked do-not-perturb. The check is a re-evaluation of the live
    /// snapshot, so calling it again as links accrue can only move the flag
    /// in one direction; a marked range is never unmarked.
    ///
    /// A range with no linked components yet is left unmarked.
    pub fn mark_perturbability(&mut self, range: RangeId) {
        let total = self.range_components.forward_len(&range);
        if total == 0 {
            return;
        }
        let formula_components = self
            .range_components
            .forward(&range)
            .filter(|cell| self.formulas.contains_key(cell))
            .count();
        if formula_components == total {
            self.do_not_perturb.insert(range);
        }
    }

    /// Whether `range` is still considered a valid perturbation input.
    #[must_use]
    pub fn is_perturbable(&self, range: RangeId) -> bool {
        !self.do_not_perturb.contains(&range)
    }

    /// Id of an already-interned range.
    pub fn range_id(&self, range: &SheetRange) -> Result<RangeId, GraphError> {
        self.range_ids
            .get(range)
            .copied()
            .ok_or(GraphError::UnknownRange { range: *range })
    }

    fn intern_range(&mut self, range: SheetRange) -> RangeId {
        if let Some(&id) = self.range_ids.get(&range) {
            return id;
        }
        let id = RangeId(u32::try_from(self.ranges.len()).expect("range count fits in u32"));
        self.ranges.push(range);
        self.range_ids.insert(range, id);
        // New ranges start perturbable: absence from `do_not_perturb` is the
        // default state.
        id
    }

    /// Freeze the graph. Consuming the builder is what guarantees the
    /// single-writer/many-readers lifecycle: once a [`DependencyGraph`]
    /// exists, no construction state remains reachable.
    #[must_use]
    pub fn finish(self) -> DependencyGraph {
        DependencyGraph {
            sheets: self.sheets,
            formulas: self.formulas,
            ranges: self.ranges,
            range_ids: self.range_ids,
            formula_ranges: self.formula_ranges,
            range_components: self.range_components,
            formula_cells: self.formula_cells,
            do_not_perturb: self.do_not_perturb,
            weights: HashMap::new(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// The frozen dependence graph.
///
/// All queries take `&self`; the type is `Send + Sync`, so terminal-set and
/// closure computations may run concurrently once construction is done.
/// Query results are sorted (sheet, row, column) so they are deterministic.
///
/// Acyclicity is a precondition for meaningful closure results; it is not
/// enforced on every build. [`verify_acyclic`](Self::verify_acyclic) checks
/// it on demand and reports a concrete cycle path.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub(crate) sheets: SheetRegistry,
    pub(crate) formulas: HashMap<CellId, String>,
    pub(crate) ranges: Vec<SheetRange>,
    pub(crate) range_ids: HashMap<SheetRange, RangeId>,
    pub(crate) formula_ranges: Incidence<CellId, RangeId>,
    pub(crate) range_components: Incidence<RangeId, CellId>,
    pub(crate) formula_cells: Incidence<CellId, CellId>,
    pub(crate) do_not_perturb: HashSet<RangeId>,
    weights: HashMap<CellId, i64>,
    elapsed: Duration,
}

impl DependencyGraph {
    /// The sheet interner this graph keys its addresses by.
    #[must_use]
    pub fn sheets(&self) -> &SheetRegistry {
        &self.sheets
    }

    #[must_use]
    pub fn is_formula(&self, addr: CellId) -> bool {
        self.formulas.contains_key(&addr)
    }

    /// Raw expression text of the formula at `addr`.
    pub fn formula_text(&self, addr: CellId) -> Result<&str, GraphError> {
        self.formulas
            .get(&addr)
            .map(String::as_str)
            .ok_or(GraphError::NotAFormula { addr })
    }

    /// All registered formula addresses, sorted.
    #[must_use]
    pub fn all_formulas(&self) -> Vec<CellId> {
        let mut out: Vec<CellId> = self.formulas.keys().copied().collect();
        out.sort_unstable();
        out
    }

    #[must_use]
    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }

    /// Every range any formula references, sorted.
    #[must_use]
    pub fn all_ranges(&self) -> Vec<SheetRange> {
        let mut out = self.ranges.clone();
        out.sort_unstable();
        out
    }

    #[must_use]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Id of an interned range.
    pub fn range_id(&self, range: &SheetRange) -> Result<RangeId, GraphError> {
        self.range_ids
            .get(range)
            .copied()
            .ok_or(GraphError::UnknownRange { range: *range })
    }

    /// The range behind `id`.
    ///
    /// Panics if `id` came from a different graph.
    #[must_use]
    pub fn range(&self, id: RangeId) -> SheetRange {
        self.ranges[id.index()]
    }

    /// Ranges referenced by the formula at `addr` (index 1). Empty, not an
    /// error, for unknown addresses.
    #[must_use]
    pub fn input_ranges_of(&self, addr: CellId) -> Vec<SheetRange> {
        let mut out: Vec<SheetRange> = self
            .formula_ranges
            .forward(&addr)
            .map(|id| self.range(id))
            .collect();
        out.sort_unstable();
        out
    }

    /// Formulas that reference `range` (index 2).
    #[must_use]
    pub fn readers_of_range(&self, range: RangeId) -> Vec<CellId> {
        let mut out: Vec<CellId> = self.formula_ranges.inverse(&range).collect();
        out.sort_unstable();
        out
    }

    /// Component cells of `range` (index 3).
    #[must_use]
    pub fn components_of(&self, range: RangeId) -> Vec<CellId> {
        let mut out: Vec<CellId> = self.range_components.forward(&range).collect();
        out.sort_unstable();
        out
    }

    /// Ranges that contain `cell` as a component (index 4).
    #[must_use]
    pub fn containing_ranges_of(&self, cell: CellId) -> Vec<SheetRange> {
        let mut out: Vec<SheetRange> = self
            .range_components
            .inverse(&cell)
            .map(|id| self.range(id))
            .collect();
        out.sort_unstable();
        out
    }

    /// Cells the formula at `addr` references directly (index 5).
    #[must_use]
    pub fn direct_inputs_of(&self, addr: CellId) -> Vec<CellId> {
        let mut out: Vec<CellId> = self.formula_cells.forward(&addr).collect();
        out.sort_unstable();
        out
    }

    /// Formulas that reference `cell` directly (index 6).
    #[must_use]
    pub fn direct_readers_of(&self, cell: CellId) -> Vec<CellId> {
        let mut out: Vec<CellId> = self.formula_cells.inverse(&cell).collect();
        out.sort_unstable();
        out
    }

    /// Whether `range` is still considered a valid perturbation input.
    #[must_use]
    pub fn is_perturbable(&self, range: RangeId) -> bool {
        !self.do_not_perturb.contains(&range)
    }

    /// Attach an auxiliary weight (e.g. a sensitivity score) to `addr`.
    /// Insert-or-overwrite; weights have no effect on graph algorithms.
    pub fn set_weight(&mut self, addr: CellId, weight: i64) {
        self.weights.insert(addr, weight);
    }

    /// The weight previously attached to `addr`.
    pub fn weight(&self, addr: CellId) -> Result<i64, GraphError> {
        self.weights
            .get(&addr)
            .copied()
            .ok_or(GraphError::UnknownAddress { addr })
    }

    /// Wall-clock time the construction pass took.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            formula_cells: self.formulas.len(),
            range_nodes: self.ranges.len(),
            formula_range_edges: self.formula_ranges.edge_count(),
            component_edges: self.range_components.edge_count(),
            direct_input_edges: self.formula_cells.edge_count(),
        }
    }
}
