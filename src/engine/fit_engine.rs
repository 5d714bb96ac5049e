//! One assembly, its attribute store and the catalog it resolves against.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::data::{Catalog, ItemId, Slot};
use crate::engine::recompute::recompute;
use crate::engine::store::{AttributeStore, Snapshot};
use crate::error::EngineError;
use crate::fit::{Assembly, AssemblySpec, Entry, EntryId, ModuleState};
use crate::stats::FitStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FitId(pub Uuid);

impl FitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutations mark the store dirty; nothing recomputes until [FitEngine::recompute].
#[derive(Debug, Clone)]
pub struct FitEngine {
    id: FitId,
    catalog: Arc<Catalog>,
    assembly: Assembly,
    store: AttributeStore,
    config: EngineConfig,
}

impl FitEngine {
    pub fn new(catalog: Arc<Catalog>, hull: ItemId) -> Result<Self, EngineError> {
        let assembly = Assembly::new(&catalog, hull)?;
        Ok(Self::from_assembly(catalog, assembly))
    }

    pub fn from_assembly(catalog: Arc<Catalog>, assembly: Assembly) -> Self {
        Self {
            id: FitId::new(),
            catalog,
            assembly,
            store: AttributeStore::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn from_spec(catalog: Arc<Catalog>, spec: &AssemblySpec) -> Result<Self, EngineError> {
        let assembly = spec.build(&catalog)?;
        Ok(Self::from_assembly(catalog, assembly))
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self.store.mark_dirty();
        self
    }

    pub fn id(&self) -> FitId {
        self.id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Last good snapshot, which may predate pending mutations.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.store.snapshot()
    }

    fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut Assembly, &Catalog) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let result = f(&mut self.assembly, &self.catalog)?;
        self.store.mark_dirty();
        Ok(result)
    }

    pub fn add_module(
        &mut self,
        item: ItemId,
        slot: Option<Slot>,
        state: ModuleState,
    ) -> Result<EntryId, EngineError> {
        self.mutate(|assembly, catalog| assembly.add_module(catalog, item, slot, state))
    }

    pub fn load_charge(&mut self, module: EntryId, item: ItemId) -> Result<EntryId, EngineError> {
        self.mutate(|assembly, catalog| assembly.load_charge(catalog, module, item))
    }

    pub fn unload_charge(&mut self, module: EntryId) -> Result<Option<EntryId>, EngineError> {
        self.mutate(|assembly, _| assembly.unload_charge(module))
    }

    pub fn add_skill(&mut self, item: ItemId, level: u8) -> Result<EntryId, EngineError> {
        self.mutate(|assembly, catalog| assembly.add_skill(catalog, item, level))
    }

    pub fn set_skill_level(&mut self, skill: EntryId, level: u8) -> Result<(), EngineError> {
        self.mutate(|assembly, _| assembly.set_skill_level(skill, level))
    }

    pub fn add_drone(&mut self, item: ItemId, count: u32, active: u32) -> Result<EntryId, EngineError> {
        self.mutate(|assembly, catalog| assembly.add_drone(catalog, item, count, active))
    }

    pub fn set_active_drones(&mut self, drone: EntryId, active: u32) -> Result<(), EngineError> {
        self.mutate(|assembly, _| assembly.set_active_drones(drone, active))
    }

    pub fn set_module_state(&mut self, module: EntryId, state: ModuleState) -> Result<(), EngineError> {
        self.mutate(|assembly, _| assembly.set_module_state(module, state))
    }

    pub fn remove_entry(&mut self, id: EntryId) -> Result<Entry, EngineError> {
        self.mutate(|assembly, _| assembly.remove_entry(id))
    }

    /// Recompute every attribute. On failure the previous snapshot stays
    /// authoritative and the store stays dirty.
    pub fn recompute(&mut self) -> Result<&Snapshot, EngineError> {
        let snapshot = recompute(&self.catalog, &self.assembly, &self.config)?;
        tracing::debug!(
            fit = %self.id,
            revision = snapshot.revision(),
            passes = snapshot.passes(),
            "fit recomputed"
        );
        Ok(self.store.commit(self.assembly.clone(), snapshot))
    }

    /// Modified value from the last good snapshot.
    pub fn modified_attr(&self, entry: EntryId, name: &str) -> Option<f64> {
        self.store.snapshot().and_then(|snapshot| snapshot.get(entry, name))
    }

    /// Stats over the last good snapshot and the assembly it was computed
    /// from; mutations made since are not visible until the next recompute.
    pub fn stats(&self) -> Result<FitStats<'_>, EngineError> {
        let (Some(assembly), Some(snapshot)) =
            (self.store.computed_assembly(), self.store.snapshot())
        else {
            return Err(EngineError::NotComputed);
        };
        Ok(FitStats::new(
            &self.catalog,
            assembly,
            snapshot,
            self.config.capacitor,
        ))
    }
}
