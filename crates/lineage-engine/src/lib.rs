#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Dependence-graph engine for spreadsheet sensitivity analysis.
//!
//! Given a document's formulas and the references they contain, the engine
//! builds a tripartite graph over formula cells, referenced ranges and
//! individual input cells, then answers the questions a downstream
//! error-injection or sensitivity pass needs:
//!
//! - which formulas are *terminal* (consumed by no other formula, directly or
//!   through a containing range),
//! - which ranges are safe *perturbation points* (all-data, no derived cells),
//! - the transitive *input closure* of any formula down to raw data cells.
//!
//! The engine owns no I/O. Hosts plug in three collaborators:
//! [`SheetScanner`] (bulk used-cell/formula-text read, keyed by worksheet),
//! [`ReferenceExtractor`] (range/cell references of one formula's text), and
//! [`ProgressSink`] (coarse construction progress). [`analyze`] wires them
//! together; everything it does can also be driven manually through
//! [`GraphBuilder`].
//!
//! ## Lifecycle
//!
//! Construction is single-writer: [`GraphBuilder`] methods take `&mut self`,
//! and [`GraphBuilder::finish`] consumes the builder to produce an immutable
//! [`DependencyGraph`]. Queries take `&self` and may run concurrently; there
//! is no way to interleave them with construction.
//!
//! ## Cycles
//!
//! Reference graphs are expected to be acyclic. The engine does not pay for a
//! cycle check on every build; call [`DependencyGraph::verify_acyclic`] after
//! construction to fail fast with a concrete cycle path. Traversals
//! themselves carry visited sets and terminate even on cyclic input.

mod analyze;
mod error;
mod extract;
mod graph;
mod incidence;
mod parallel;
mod progress;
mod scan;

pub use analyze::{analyze, Analysis, AnalyzeOptions, ScanStats};
pub use error::{AnalyzeError, CyclePath, ExtractError, GraphError, ScanError};
pub use extract::{ExtractedRefs, ReferenceExtractor};
pub use graph::{DependencyGraph, GraphBuilder, GraphNode, GraphStats, RangeId};
pub use incidence::Incidence;
pub use progress::{NoProgress, ProgressCounter, ProgressSink};
pub use scan::{scan_workbook, ScannedCell, SheetScan, SheetScanner};
