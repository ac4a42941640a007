use core::fmt;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Full structural identity of a worksheet: the document it lives in (name and
/// path) plus the sheet name.
///
/// Equality and hashing cover all three fields, so sheets with the same name
/// in different workbooks (or the same workbook name opened from different
/// paths) are distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SheetIdent {
    /// Directory the document was opened from. Empty for unsaved documents.
    pub path: String,
    /// Document (workbook) name, e.g. `book.xlsx`.
    pub workbook: String,
    /// Worksheet name within the document.
    pub sheet: String,
}

impl SheetIdent {
    pub fn new(
        path: impl Into<String>,
        workbook: impl Into<String>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            workbook: workbook.into(),
            sheet: sheet.into(),
        }
    }
}

impl fmt::Display for SheetIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.workbook, self.sheet)
    }
}

/// Compact worksheet identifier, valid only within the [`SheetRegistry`] that
/// produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SheetId(u32);

impl SheetId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Interner mapping [`SheetIdent`]s to compact [`SheetId`]s.
///
/// Interning is injective: equal identities always yield the same id and
/// distinct identities never collide, so id equality *is* full five-field
/// address equality for any two [`crate::CellId`]s keyed by the same
/// registry.
#[derive(Clone, Debug, Default)]
pub struct SheetRegistry {
    idents: Vec<SheetIdent>,
    ids: HashMap<SheetIdent, SheetId>,
}

impl SheetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch-or-create the id for `ident`. Idempotent.
    pub fn intern(&mut self, ident: SheetIdent) -> SheetId {
        if let Some(&id) = self.ids.get(&ident) {
            return id;
        }
        let id = SheetId(u32::try_from(self.idents.len()).expect("sheet count fits in u32"));
        self.idents.push(ident.clone());
        self.ids.insert(ident, id);
        id
    }

    /// Look up the id of an already-interned identity.
    #[must_use]
    pub fn id_of(&self, ident: &SheetIdent) -> Option<SheetId> {
        self.ids.get(ident).copied()
    }

    /// The identity behind `id`.
    ///
    /// Panics if `id` came from a different registry.
    #[must_use]
    pub fn ident(&self, id: SheetId) -> &SheetIdent {
        &self.idents[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.idents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    /// All interned sheets in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (SheetId, &SheetIdent)> {
        self.idents
            .iter()
            .enumerate()
            .map(|(i, ident)| (SheetId(i as u32), ident))
    }
}
