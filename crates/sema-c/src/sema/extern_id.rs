//! External identifiers.
//!
//! Objects and functions with external declarations are tracked across
//! the whole translation unit, independent of the scope stack: a
//! block-scope `extern int x;` and a later file-scope `int x[10];`
//! refer to the same entity and must agree. Entries are never removed
//! while the unit is being analyzed.

use std::collections::HashMap;

use crate::ast::TypeExpRef;

/// Declaration status of an external identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtIdStatus {
    /// `extern int x;` or `void f(void);`
    Referenced,
    /// `int x;`
    Tentative,
    /// `int x = 0;` or `void f(void) { ... }`
    Defined,
}

/// One external identifier and its most recent declaration.
#[derive(Debug, Clone, Copy)]
pub struct ExternId {
    pub decl_specs: TypeExpRef,
    pub declarator: TypeExpRef,
    pub status: ExtIdStatus,
}

/// Every external identifier seen so far, keyed by spelling.
#[derive(Debug, Default)]
pub struct ExternTable {
    entries: HashMap<String, ExternId>,
}

impl ExternTable {
    pub fn new() -> ExternTable {
        ExternTable::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&ExternId> {
        self.entries.get(name)
    }

    pub fn status(&self, name: &str) -> Option<ExtIdStatus> {
        self.entries.get(name).map(|e| e.status)
    }

    pub(crate) fn install(&mut self, name: &str, id: ExternId) {
        log::debug!("external id '{}' enters as {:?}", name, id.status);
        self.entries.insert(name.to_string(), id);
    }

    pub(crate) fn set_status(&mut self, name: &str, status: ExtIdStatus) {
        if let Some(entry) = self.entries.get_mut(name) {
            log::debug!("external id '{}' becomes {:?}", name, status);
            entry.status = status;
        }
    }

    /// Iterate all entries with their final statuses, for downstream
    /// passes.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExternId)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
