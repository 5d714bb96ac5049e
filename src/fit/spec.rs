//! Declarative assembly description (JSON or YAML) resolved against a catalog.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{read_data_file, Catalog, ItemDef, Slot};
use crate::error::{DataError, EngineError};
use crate::fit::assembly::Assembly;
use crate::fit::entry::ModuleState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Item name or numeric id.
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<Slot>,
    #[serde(default)]
    pub state: ModuleState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneSpec {
    pub item: String,
    #[serde(default = "default_drone_count")]
    pub count: u32,
    /// Defaults to every drone in the stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<u32>,
}

fn default_drone_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblySpec {
    pub ship: String,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    /// Skill name to trained level.
    #[serde(default)]
    pub skills: BTreeMap<String, u8>,
    #[serde(default)]
    pub drones: Vec<DroneSpec>,
}

fn lookup<'c>(catalog: &'c Catalog, name: &str) -> Result<&'c ItemDef, EngineError> {
    catalog
        .resolve_item(name)
        .ok_or_else(|| EngineError::UnknownItem(name.to_string()))
}

impl AssemblySpec {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        read_data_file(path.as_ref())
    }

    pub fn build(&self, catalog: &Catalog) -> Result<Assembly, EngineError> {
        let hull = lookup(catalog, &self.ship)?;
        let mut assembly = Assembly::new(catalog, hull.id)?;

        for (skill, level) in &self.skills {
            let def = lookup(catalog, skill)?;
            assembly.add_skill(catalog, def.id, *level)?;
        }

        for module in &self.modules {
            let def = lookup(catalog, &module.item)?;
            let entry = assembly.add_module(catalog, def.id, module.slot, module.state)?;
            if let Some(charge) = &module.charge {
                let charge = lookup(catalog, charge)?;
                assembly.load_charge(catalog, entry, charge.id)?;
            }
        }

        for drone in &self.drones {
            let def = lookup(catalog, &drone.item)?;
            let active = drone.active.unwrap_or(drone.count);
            assembly.add_drone(catalog, def.id, drone.count, active)?;
        }

        Ok(assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Category;

    fn catalog() -> Catalog {
        Catalog::builder()
            .item(ItemDef::new(1, "Rifter", "Frigate", Category::Ship))
            .item(ItemDef::new(2, "200mm AutoCannon I", "Projectile Weapon", Category::Module).in_slot(Slot::High))
            .item(ItemDef::new(3, "EMP S", "Projectile Ammo", Category::Charge))
            .item(ItemDef::new(4, "Gunnery", "Gunnery", Category::Skill))
            .item(ItemDef::new(5, "Warrior I", "Combat Drone", Category::Drone))
            .build()
            .unwrap()
    }

    #[test]
    fn builds_assembly_from_yaml() {
        let spec: AssemblySpec = crate::data::from_yaml_str(
            "ship: Rifter\nmodules:\n  - item: 200mm AutoCannon I\n    state: active\n    charge: EMP S\nskills:\n  Gunnery: 4\ndrones:\n  - item: Warrior I\n    count: 2\n",
        )
        .unwrap();
        let catalog = catalog();
        let fit = spec.build(&catalog).unwrap();

        assert_eq!(fit.modules().count(), 1);
        assert_eq!(fit.charges().count(), 1);
        assert_eq!(fit.skill_level(&catalog, "Gunnery"), 4);
        assert_eq!(fit.drones().next().map(|d| d.active_drones()), Some(2));
    }

    #[test]
    fn unknown_item_is_reported_by_name() {
        let spec = AssemblySpec {
            ship: "Rifter".into(),
            modules: vec![ModuleSpec {
                item: "Nonexistent".into(),
                slot: None,
                state: ModuleState::Online,
                charge: None,
            }],
            skills: BTreeMap::new(),
            drones: Vec::new(),
        };
        assert_eq!(
            spec.build(&catalog()).unwrap_err(),
            EngineError::UnknownItem("Nonexistent".into())
        );
    }

    #[test]
    fn invalid_skill_level_fails_the_build() {
        let mut skills = BTreeMap::new();
        skills.insert("Gunnery".to_string(), 7);
        let spec = AssemblySpec {
            ship: "Rifter".into(),
            modules: Vec::new(),
            skills,
            drones: Vec::new(),
        };
        assert_eq!(
            spec.build(&catalog()).unwrap_err(),
            EngineError::InvalidSkillLevel { level: 7 }
        );
    }
}
