//! Static item definitions: hulls, modules, charges, skills and drones.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ship,
    Module,
    Charge,
    Skill,
    Drone,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ship => "ship",
            Self::Module => "module",
            Self::Charge => "charge",
            Self::Skill => "skill",
            Self::Drone => "drone",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    High,
    Medium,
    Low,
    Rig,
    Subsystem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill: String,
    #[serde(default = "default_required_level")]
    pub level: u8,
}

fn default_required_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub group: String,
    pub category: Category,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    /// Effect ids, resolved against the built-in table and catalog effects.
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub required_skills: Vec<SkillRequirement>,
    /// Slot a module goes into unless the fit says otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<Slot>,
}

impl ItemDef {
    pub fn new(id: u32, name: impl Into<String>, group: impl Into<String>, category: Category) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            group: group.into(),
            category,
            attributes: BTreeMap::new(),
            effects: Vec::new(),
            required_skills: Vec::new(),
            slot: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn effect(mut self, id: impl Into<String>) -> Self {
        self.effects.push(id.into());
        self
    }

    pub fn requires(mut self, skill: impl Into<String>, level: u8) -> Self {
        self.required_skills.push(SkillRequirement {
            skill: skill.into(),
            level,
        });
        self
    }

    pub fn in_slot(mut self, slot: Slot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn base_attr(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_keeps_the_level_it_is_given() {
        let item = ItemDef::new(7, "Citadel Torpedo Launcher", "Missile Launcher XL Torpedo", Category::Module)
            .requires("Citadel Torpedoes", 1)
            .requires("Ghost Skill", 6);
        let levels: Vec<u8> = item.required_skills.iter().map(|req| req.level).collect();
        assert_eq!(levels, vec![1, 6]);
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let item: ItemDef = serde_json::from_str(
            r#"{"id": 3, "name": "Frequency Modulation", "group": "Electronic Systems", "category": "skill"}"#,
        )
        .unwrap();
        assert_eq!(item.id, ItemId(3));
        assert!(item.attributes.is_empty());
        assert!(item.effects.is_empty());
        assert_eq!(item.slot, None);
    }

    #[test]
    fn requirement_level_defaults_to_one() {
        let req: SkillRequirement = serde_json::from_str(r#"{"skill": "Gunnery"}"#).unwrap();
        assert_eq!(req.level, 1);
    }
}
