//! Target selection: composable predicates over items and the selectors that
//! resolve them against an assembly.

use serde::{Deserialize, Serialize};

use crate::data::{normalize_lookup, Catalog, Category, ItemDef, Slot};
use crate::fit::{Assembly, Entry, EntryId};

/// Side-effect-free test over an entry's item (and its slot, for modules).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Any,
    Group(String),
    Category(Category),
    RequiresSkill(String),
    Slot(Slot),
    HasAttribute(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    pub fn requires_skill(name: impl Into<String>) -> Self {
        Self::RequiresSkill(name.into())
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::And(mut all) => {
                all.push(other);
                Self::And(all)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Or(mut any) => {
                any.push(other);
                Self::Or(any)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn matches(&self, item: &ItemDef, slot: Option<Slot>) -> bool {
        match self {
            Self::Any => true,
            Self::Group(group) => normalize_lookup(&item.group) == normalize_lookup(group),
            Self::Category(category) => item.category == *category,
            Self::RequiresSkill(skill) => {
                let wanted = normalize_lookup(skill);
                item.required_skills
                    .iter()
                    .any(|req| normalize_lookup(&req.skill) == wanted)
            }
            Self::Slot(wanted) => slot == Some(*wanted),
            Self::HasAttribute(name) => item.attributes.contains_key(name),
            Self::And(all) => all.iter().all(|p| p.matches(item, slot)),
            Self::Or(any) => any.iter().any(|p| p.matches(item, slot)),
            Self::Not(inner) => !inner.matches(item, slot),
        }
    }
}

/// Which kind of fitted entry a filtered selector ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Modules,
    Charges,
    Drones,
}

impl Domain {
    fn contains(&self, entry: &Entry) -> bool {
        match self {
            Self::Modules => entry.is_module(),
            Self::Charges => entry.is_charge(),
            Self::Drones => entry.is_drone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// The source entry.
    SelfEntry,
    /// The hull.
    Ship,
    /// The source's partner: a module's charge or a charge's module.
    Other,
    Filtered { domain: Domain, predicate: Predicate },
}

impl Selector {
    pub fn all_fitted_modules() -> Self {
        Self::Filtered {
            domain: Domain::Modules,
            predicate: Predicate::Any,
        }
    }

    pub fn modules(predicate: Predicate) -> Self {
        Self::Filtered {
            domain: Domain::Modules,
            predicate,
        }
    }

    /// Concrete targets in assembly insertion order, without duplicates.
    /// Evaluated against the assembly as it is now; never cached.
    pub fn resolve(&self, catalog: &Catalog, assembly: &Assembly, source: EntryId) -> Vec<EntryId> {
        match self {
            Self::SelfEntry => assembly
                .entry(source)
                .map(|entry| vec![entry.id])
                .unwrap_or_default(),
            Self::Ship => vec![assembly.hull_id()],
            Self::Other => assembly
                .entry(source)
                .and_then(Entry::secondary)
                .filter(|other| assembly.entry(*other).is_some())
                .into_iter()
                .collect(),
            Self::Filtered { domain, predicate } => assembly
                .entries()
                .iter()
                .filter(|entry| domain.contains(entry))
                .filter(|entry| {
                    catalog
                        .item(entry.item)
                        .is_some_and(|item| predicate.matches(item, entry.slot()))
                })
                .map(|entry| entry.id)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{from_yaml_str, ItemId};
    use crate::fit::ModuleState;

    fn launcher() -> ItemDef {
        ItemDef::new(10, "Citadel Torpedo Launcher I", "Missile Launcher XL Torpedo", Category::Module)
            .attr("speed", 10000.0)
            .requires("Citadel Torpedoes", 1)
            .in_slot(Slot::High)
    }

    #[test]
    fn predicates_compose() {
        let item = launcher();
        let torp = Predicate::requires_skill("Citadel Torpedoes");
        assert!(torp.matches(&item, Some(Slot::High)));
        assert!(torp.clone().and(Predicate::Slot(Slot::High)).matches(&item, Some(Slot::High)));
        assert!(!torp.clone().and(Predicate::Slot(Slot::Low)).matches(&item, Some(Slot::High)));
        assert!(Predicate::group("ECM Burst").or(torp.clone()).matches(&item, None));
        assert!(!torp.negate().matches(&item, None));
        assert!(Predicate::HasAttribute("speed".into()).matches(&item, None));
        assert!(Predicate::Category(Category::Module).matches(&item, None));
    }

    #[test]
    fn predicate_deserializes_from_yaml() {
        let predicate: Predicate =
            from_yaml_str("and:\n  - group: ECM Burst\n  - not:\n      slot: low\n").unwrap();
        assert_eq!(
            predicate,
            Predicate::And(vec![
                Predicate::group("ECM Burst"),
                Predicate::Slot(Slot::Low).negate(),
            ])
        );
    }

    #[test]
    fn filtered_resolution_keeps_insertion_order() {
        let catalog = Catalog::builder()
            .item(ItemDef::new(1, "Phoenix", "Dreadnought", Category::Ship))
            .item(launcher())
            .item(ItemDef::new(11, "Damage Control I", "Damage Control", Category::Module).in_slot(Slot::Low))
            .build()
            .unwrap();
        let mut fit = Assembly::new(&catalog, ItemId(1)).unwrap();
        let a = fit.add_module(&catalog, ItemId(10), None, ModuleState::Active).unwrap();
        let dc = fit.add_module(&catalog, ItemId(11), None, ModuleState::Active).unwrap();
        let b = fit.add_module(&catalog, ItemId(10), None, ModuleState::Active).unwrap();

        let torps = Selector::modules(Predicate::requires_skill("Citadel Torpedoes"));
        assert_eq!(torps.resolve(&catalog, &fit, fit.hull_id()), vec![a, b]);
        assert_eq!(
            Selector::all_fitted_modules().resolve(&catalog, &fit, fit.hull_id()),
            vec![a, dc, b]
        );
        assert_eq!(Selector::Ship.resolve(&catalog, &fit, dc), vec![fit.hull_id()]);
        assert_eq!(Selector::SelfEntry.resolve(&catalog, &fit, dc), vec![dc]);
        assert!(Selector::Other.resolve(&catalog, &fit, dc).is_empty());
    }
}
