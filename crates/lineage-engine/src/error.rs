use core::fmt;

use lineage_model::{CellId, SheetRange};
use thiserror::Error;

use crate::graph::GraphNode;

/// Errors raised by graph construction and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A formula was registered twice at the same address.
    #[error("formula already registered at {addr}")]
    DuplicateFormula { addr: CellId },

    /// A formula-only operation was applied to an address that is not a
    /// registered formula.
    #[error("address {addr} is not a registered formula")]
    NotAFormula { addr: CellId },

    /// Lookup of a range that was never created during construction.
    #[error("range {range} was never referenced by any formula")]
    UnknownRange { range: SheetRange },

    /// Lookup of per-node data (e.g. a weight) on an address that carries
    /// none.
    #[error("address {addr} has no recorded annotation")]
    UnknownAddress { addr: CellId },

    /// The reference graph contains a cycle.
    #[error("cyclic dependency: {path}")]
    CyclicDependency { path: CyclePath },

    /// Reference extraction failed for a formula; construction aborts unless
    /// the caller opted into ignoring parse errors.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// A concrete cycle through the graph, rendered as `a -> b -> ... -> a`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CyclePath(pub Vec<GraphNode>);

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, node) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, " -> ")?;
            }
            match node {
                GraphNode::Cell(cell) => write!(f, "{cell}")?,
                GraphNode::Range(range) => write!(f, "{range}")?,
            }
        }
        Ok(())
    }
}

/// Failure to extract references from one formula's text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to extract references from formula at {origin}: {message}")]
pub struct ExtractError {
    pub origin: CellId,
    pub message: String,
}

impl ExtractError {
    pub fn new(origin: CellId, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
        }
    }
}

/// Failure to bulk-read one worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to scan sheet {sheet}: {message}")]
pub struct ScanError {
    /// Qualified sheet description, e.g. `[book.xlsx]Sheet1`.
    pub sheet: String,
    pub message: String,
}

impl ScanError {
    pub fn new(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            message: message.into(),
        }
    }
}

/// Any failure that aborts a whole analysis. Partial graphs are never
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
