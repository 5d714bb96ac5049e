//! Entries of an assembly: an item from the catalog placed in context.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{ItemId, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Module state, ordered so that `state >= Active` reads naturally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Offline,
    #[default]
    Online,
    Active,
    Overheated,
}

impl ModuleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
            Self::Active => "active",
            Self::Overheated => "overheated",
        }
    }

    pub fn is_active(&self) -> bool {
        *self >= Self::Active
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Hull,
    Module {
        slot: Slot,
        state: ModuleState,
        charge: Option<EntryId>,
    },
    Charge {
        container: EntryId,
    },
    Skill {
        level: u8,
    },
    Drone {
        count: u32,
        active: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: EntryId,
    pub item: ItemId,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_hull(&self) -> bool {
        matches!(self.kind, EntryKind::Hull)
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, EntryKind::Module { .. })
    }

    pub fn is_charge(&self) -> bool {
        matches!(self.kind, EntryKind::Charge { .. })
    }

    pub fn is_skill(&self) -> bool {
        matches!(self.kind, EntryKind::Skill { .. })
    }

    pub fn is_drone(&self) -> bool {
        matches!(self.kind, EntryKind::Drone { .. })
    }

    /// Module state; `None` for anything that is not a module.
    pub fn state(&self) -> Option<ModuleState> {
        match self.kind {
            EntryKind::Module { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn skill_level(&self) -> Option<u8> {
        match self.kind {
            EntryKind::Skill { level } => Some(level),
            _ => None,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self.kind {
            EntryKind::Module { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// The module's loaded charge, or the charge's container module.
    pub fn secondary(&self) -> Option<EntryId> {
        match self.kind {
            EntryKind::Module { charge, .. } => charge,
            EntryKind::Charge { container } => Some(container),
            _ => None,
        }
    }

    pub fn active_drones(&self) -> u32 {
        match self.kind {
            EntryKind::Drone { active, .. } => active,
            _ => 0,
        }
    }

    /// Modules, charges and drones have their multipliers stacking penalized.
    pub fn is_penalizable(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::Module { .. } | EntryKind::Charge { .. } | EntryKind::Drone { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_state_ordering() {
        assert!(ModuleState::Overheated.is_active());
        assert!(ModuleState::Active.is_active());
        assert!(!ModuleState::Online.is_active());
        assert!(ModuleState::Offline < ModuleState::Online);
    }

    #[test]
    fn secondary_links_module_and_charge() {
        let module = Entry {
            id: EntryId(1),
            item: ItemId(10),
            kind: EntryKind::Module {
                slot: Slot::High,
                state: ModuleState::Active,
                charge: Some(EntryId(2)),
            },
        };
        let charge = Entry {
            id: EntryId(2),
            item: ItemId(11),
            kind: EntryKind::Charge {
                container: EntryId(1),
            },
        };
        assert_eq!(module.secondary(), Some(EntryId(2)));
        assert_eq!(charge.secondary(), Some(EntryId(1)));
        assert!(module.is_penalizable() && charge.is_penalizable());
    }
}
