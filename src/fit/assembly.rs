//! The assembly aggregate: one hull plus modules, charges, skills and drones.
//!
//! Every mutation validates against the catalog first and leaves the assembly
//! untouched on error, then bumps [Assembly::revision].

use crate::data::{normalize_lookup, Catalog, Category, ItemDef, ItemId, Slot};
use crate::error::EngineError;
use crate::fit::entry::{Entry, EntryId, EntryKind, ModuleState};

pub const MAX_SKILL_LEVEL: u8 = 5;

#[derive(Debug, Clone)]
pub struct Assembly {
    hull: EntryId,
    entries: Vec<Entry>,
    next_id: u32,
    revision: u64,
}

fn expect_category<'c>(
    catalog: &'c Catalog,
    item: ItemId,
    expected: Category,
) -> Result<&'c ItemDef, EngineError> {
    let def = catalog
        .item(item)
        .ok_or_else(|| EngineError::UnknownItem(item.to_string()))?;
    if def.category != expected {
        return Err(EngineError::WrongCategory {
            name: def.name.clone(),
            expected,
            actual: def.category,
        });
    }
    Ok(def)
}

fn check_level(level: u8) -> Result<(), EngineError> {
    if level > MAX_SKILL_LEVEL {
        return Err(EngineError::InvalidSkillLevel { level });
    }
    Ok(())
}

impl Assembly {
    pub fn new(catalog: &Catalog, hull: ItemId) -> Result<Self, EngineError> {
        expect_category(catalog, hull, Category::Ship)?;
        let hull_id = EntryId(0);
        Ok(Self {
            hull: hull_id,
            entries: vec![Entry {
                id: hull_id,
                item: hull,
                kind: EntryKind::Hull,
            }],
            next_id: 1,
            revision: 0,
        })
    }

    pub fn hull(&self) -> &Entry {
        &self.entries[0]
    }

    pub fn hull_id(&self) -> EntryId {
        self.hull
    }

    /// Entries in insertion order, hull first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn modules(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.is_module())
    }

    pub fn charges(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.is_charge())
    }

    pub fn skills(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.is_skill())
    }

    pub fn drones(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.is_drone())
    }

    /// Trained level of the named skill; untrained skills report 0.
    pub fn skill_level(&self, catalog: &Catalog, skill: &str) -> u8 {
        let wanted = normalize_lookup(skill);
        self.skills()
            .find(|entry| {
                catalog
                    .item(entry.item)
                    .is_some_and(|def| normalize_lookup(&def.name) == wanted)
            })
            .and_then(Entry::skill_level)
            .unwrap_or(0)
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry, EngineError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(EngineError::UnknownEntry(id))
    }

    fn push(&mut self, item: ItemId, kind: EntryKind) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, item, kind });
        self.revision += 1;
        id
    }

    /// Fit a module. `slot` falls back to the item's declared slot.
    pub fn add_module(
        &mut self,
        catalog: &Catalog,
        item: ItemId,
        slot: Option<Slot>,
        state: ModuleState,
    ) -> Result<EntryId, EngineError> {
        let def = expect_category(catalog, item, Category::Module)?;
        let slot = slot
            .or(def.slot)
            .ok_or_else(|| EngineError::MissingSlot(def.name.clone()))?;
        Ok(self.push(
            item,
            EntryKind::Module {
                slot,
                state,
                charge: None,
            },
        ))
    }

    /// Load a charge into a module, replacing any charge already loaded.
    pub fn load_charge(
        &mut self,
        catalog: &Catalog,
        module: EntryId,
        item: ItemId,
    ) -> Result<EntryId, EngineError> {
        expect_category(catalog, item, Category::Charge)?;
        match self.entry(module).map(|entry| entry.kind) {
            None => return Err(EngineError::UnknownEntry(module)),
            Some(EntryKind::Module { .. }) => {}
            Some(_) => return Err(EngineError::NotAModule(module)),
        }
        self.unload_charge(module)?;

        let charge = self.push(item, EntryKind::Charge { container: module });
        if let EntryKind::Module { charge: slot, .. } = &mut self.entry_mut(module)?.kind {
            *slot = Some(charge);
        }
        Ok(charge)
    }

    /// Remove the module's charge, if any. Returns the removed charge entry.
    pub fn unload_charge(&mut self, module: EntryId) -> Result<Option<EntryId>, EngineError> {
        let entry = self.entry_mut(module)?;
        let EntryKind::Module { charge, .. } = &mut entry.kind else {
            return Err(EngineError::NotAModule(module));
        };
        let Some(removed) = charge.take() else {
            return Ok(None);
        };
        self.entries.retain(|entry| entry.id != removed);
        self.revision += 1;
        Ok(Some(removed))
    }

    /// Train a skill. Adding a skill already present updates its level.
    pub fn add_skill(
        &mut self,
        catalog: &Catalog,
        item: ItemId,
        level: u8,
    ) -> Result<EntryId, EngineError> {
        check_level(level)?;
        expect_category(catalog, item, Category::Skill)?;
        let existing = self
            .skills()
            .find(|entry| entry.item == item)
            .map(|entry| entry.id);
        if let Some(existing) = existing {
            self.set_skill_level(existing, level)?;
            return Ok(existing);
        }
        Ok(self.push(item, EntryKind::Skill { level }))
    }

    pub fn set_skill_level(&mut self, skill: EntryId, level: u8) -> Result<(), EngineError> {
        check_level(level)?;
        let entry = self.entry_mut(skill)?;
        let EntryKind::Skill { level: current } = &mut entry.kind else {
            return Err(EngineError::NotASkill(skill));
        };
        *current = level;
        self.revision += 1;
        Ok(())
    }

    pub fn add_drone(
        &mut self,
        catalog: &Catalog,
        item: ItemId,
        count: u32,
        active: u32,
    ) -> Result<EntryId, EngineError> {
        expect_category(catalog, item, Category::Drone)?;
        if active > count {
            return Err(EngineError::TooManyActiveDrones { active, count });
        }
        Ok(self.push(item, EntryKind::Drone { count, active }))
    }

    pub fn set_active_drones(&mut self, drone: EntryId, active: u32) -> Result<(), EngineError> {
        let entry = self.entry_mut(drone)?;
        let EntryKind::Drone {
            count,
            active: current,
        } = &mut entry.kind
        else {
            return Err(EngineError::NotADrone(drone));
        };
        if active > *count {
            return Err(EngineError::TooManyActiveDrones {
                active,
                count: *count,
            });
        }
        *current = active;
        self.revision += 1;
        Ok(())
    }

    pub fn set_module_state(
        &mut self,
        module: EntryId,
        state: ModuleState,
    ) -> Result<(), EngineError> {
        let entry = self.entry_mut(module)?;
        let EntryKind::Module { state: current, .. } = &mut entry.kind else {
            return Err(EngineError::NotAModule(module));
        };
        *current = state;
        self.revision += 1;
        Ok(())
    }

    /// Remove any entry but the hull. Modules take their loaded charge with them;
    /// removing a charge clears its container's link.
    pub fn remove_entry(&mut self, id: EntryId) -> Result<Entry, EngineError> {
        if id == self.hull {
            return Err(EngineError::HullRemoval);
        }
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(EngineError::UnknownEntry(id))?;
        let removed = self.entries.remove(index);
        match removed.kind {
            EntryKind::Module {
                charge: Some(charge),
                ..
            } => self.entries.retain(|entry| entry.id != charge),
            EntryKind::Charge { container } => {
                if let Some(EntryKind::Module { charge, .. }) = self
                    .entries
                    .iter_mut()
                    .find(|entry| entry.id == container)
                    .map(|entry| &mut entry.kind)
                {
                    *charge = None;
                }
            }
            _ => {}
        }
        self.revision += 1;
        Ok(removed)
    }
}
