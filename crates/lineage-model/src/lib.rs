#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! `lineage-model` defines the value types a spreadsheet dependence analysis
//! is built from: cell coordinates, rectangular ranges, and sheet/document
//! identity.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the dependence-graph engine (`lineage-engine`)
//! - host-side document scanners and formula-reference extractors
//! - downstream perturbation/simulation tooling via `serde`
//!
//! Identity semantics are strict: a cell is identified by its sheet *and* the
//! document that sheet belongs to, so two cells with equal coordinates in
//! different workbooks never compare equal. Sheets are interned through
//! [`SheetRegistry`] into compact [`SheetId`]s, which keeps the engine's graph
//! keys `Copy` while preserving full structural identity.

mod address;
mod cell;
mod rect;
mod sheet;

pub use address::{A1ParseError, CellCoord, GRID_MAX_COLS, GRID_MAX_ROWS};
pub use cell::{CellId, SheetRange, SheetRangeCells};
pub use rect::{Rect, RectCells, RectParseError};
pub use sheet::{SheetId, SheetIdent, SheetRegistry};
