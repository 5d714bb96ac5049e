//! Attribute store: the last good snapshot of modified values plus a dirty flag.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::Diagnostic;
use crate::fit::{Assembly, EntryId};

/// Attribute values keyed by entry, then by attribute name.
pub type AttributeValues = HashMap<EntryId, BTreeMap<String, f64>>;

/// Immutable result of one successful recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub(crate) revision: u64,
    pub(crate) values: AttributeValues,
    pub(crate) passes: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Snapshot {
    pub fn get(&self, entry: EntryId, name: &str) -> Option<f64> {
        self.values.get(&entry).and_then(|attrs| attrs.get(name)).copied()
    }

    pub fn attributes(&self, entry: EntryId) -> Option<&BTreeMap<String, f64>> {
        self.values.get(&entry)
    }

    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Assembly revision the snapshot was computed from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Keeps the assembly each snapshot was computed from, so readers never pair
/// old values with entries added since.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    committed: Option<(Assembly, Snapshot)>,
    dirty: bool,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self {
            committed: None,
            dirty: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.committed.is_none()
    }

    /// Last good snapshot, possibly stale if the store is dirty.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.committed.as_ref().map(|(_, snapshot)| snapshot)
    }

    /// Assembly as it was when the last good snapshot was computed.
    pub fn computed_assembly(&self) -> Option<&Assembly> {
        self.committed.as_ref().map(|(assembly, _)| assembly)
    }

    /// Replace assembly and snapshot wholesale and clear the dirty flag.
    pub fn commit(&mut self, assembly: Assembly, snapshot: Snapshot) -> &Snapshot {
        self.dirty = false;
        let (_, snapshot) = self.committed.insert((assembly, snapshot));
        snapshot
    }
}
