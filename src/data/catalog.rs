//! Read-only catalog of attributes, items and effect definitions.
//! Load once at startup and share via `Arc` with every engine and worker.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::attribute::AttributeMeta;
use crate::data::item::{ItemDef, ItemId, SkillRequirement};
use crate::engine::effects::EffectDef;
use crate::engine::registry::builtin_effects;
use crate::error::DataError;

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.yaml";

/// On-disk shape of a catalog file (JSON or YAML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub attributes: Vec<AttributeMeta>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Effect definitions in addition to (or replacing) the built-in table.
    #[serde(default)]
    pub effects: BTreeMap<String, EffectDef>,
}

/// Normalize a name for lookup: lowercase, whitespace and underscores collapsed.
pub(crate) fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Default)]
pub struct Catalog {
    attributes: HashMap<String, AttributeMeta>,
    items: HashMap<ItemId, ItemDef>,
    by_name: HashMap<String, ItemId>,
    effects: BTreeMap<String, EffectDef>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Build a catalog, rejecting duplicate item ids and attribute names.
    pub fn from_file(file: CatalogFile) -> Result<Self, DataError> {
        let mut attributes = HashMap::with_capacity(file.attributes.len());
        for meta in file.attributes {
            if attributes.contains_key(&meta.name) {
                return Err(DataError::DuplicateAttribute(meta.name));
            }
            attributes.insert(meta.name.clone(), meta);
        }

        let mut items = HashMap::with_capacity(file.items.len());
        let mut by_name = HashMap::with_capacity(file.items.len());
        for item in file.items {
            if items.contains_key(&item.id) {
                return Err(DataError::DuplicateItem(item.id));
            }
            by_name
                .entry(normalize_lookup(&item.name))
                .or_insert(item.id);
            items.insert(item.id, item);
        }

        Ok(Self {
            attributes,
            items,
            by_name,
            effects: file.effects,
        })
    }

    /// Load from disk, picking the parser by extension (`.json`, `.yaml`, `.yml`).
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Catalog>, DataError> {
        let path = path.as_ref();
        let file: CatalogFile = read_data_file(path)?;
        let catalog = Self::from_file(file)?;
        tracing::info!(
            path = %path.display(),
            items = catalog.items.len(),
            attributes = catalog.attributes.len(),
            effects = catalog.effects.len(),
            "catalog loaded"
        );
        Ok(Arc::new(catalog))
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(&id)
    }

    pub fn item_by_name(&self, name: &str) -> Option<&ItemDef> {
        self.by_name
            .get(&normalize_lookup(name))
            .and_then(|id| self.items.get(id))
    }

    /// Resolve by numeric id or by (normalized) name.
    pub fn resolve_item(&self, name_or_id: &str) -> Option<&ItemDef> {
        if let Ok(raw) = name_or_id.trim().parse::<u32>() {
            if let Some(item) = self.item(ItemId(raw)) {
                return Some(item);
            }
        }
        self.item_by_name(name_or_id)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeMeta> {
        self.attributes.get(name)
    }

    pub fn skill_requirements(&self, id: ItemId) -> &[SkillRequirement] {
        self.items
            .get(&id)
            .map(|item| item.required_skills.as_slice())
            .unwrap_or(&[])
    }

    /// Catalog-defined effects shadow built-ins with the same id.
    pub fn effect(&self, id: &str) -> Option<&EffectDef> {
        self.effects
            .get(id)
            .or_else(|| builtin_effects().get(id))
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.values()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeMeta> {
        self.attributes.values()
    }

    pub fn custom_effects(&self) -> &BTreeMap<String, EffectDef> {
        &self.effects
    }
}

/// Incremental construction, mostly for tests and embedding callers.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    file: CatalogFile,
}

impl CatalogBuilder {
    pub fn attribute(mut self, meta: AttributeMeta) -> Self {
        self.file.attributes.push(meta);
        self
    }

    pub fn item(mut self, item: ItemDef) -> Self {
        self.file.items.push(item);
        self
    }

    pub fn effect(mut self, id: impl Into<String>, def: EffectDef) -> Self {
        self.file.effects.insert(id.into(), def);
        self
    }

    pub fn build(self) -> Result<Catalog, DataError> {
        Catalog::from_file(self.file)
    }
}

/// Parse YAML, accepting `variant: value` maps for externally tagged enums
/// (`group: X`, `ship_group: Dreadnought`) as well as plain unit variants.
pub fn from_yaml_str<T>(raw: &str) -> Result<T, serde_yaml::Error>
where
    T: for<'de> Deserialize<'de>,
{
    serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(raw))
}

/// Read a serde document, choosing JSON or YAML from the file extension.
pub fn read_data_file<T>(path: &Path) -> Result<T, DataError>
where
    T: for<'de> Deserialize<'de>,
{
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !matches!(extension.as_str(), "json" | "yaml" | "yml") {
        return Err(DataError::UnsupportedFormat(display));
    }

    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: display.clone(),
        source,
    })?;
    if extension == "json" {
        serde_json::from_str(&raw).map_err(|source| DataError::Json {
            path: display,
            source,
        })
    } else {
        from_yaml_str(&raw).map_err(|source| DataError::Yaml {
            path: display,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::attribute::Composition;
    use crate::data::item::Category;

    fn sample() -> Catalog {
        Catalog::builder()
            .attribute(AttributeMeta::new("signatureRadius", Composition::PercentAdditive))
            .item(ItemDef::new(1, "Phoenix", "Dreadnought", Category::Ship).attr("signatureRadius", 2500.0))
            .item(ItemDef::new(2, "Caldari Dreadnought", "Spaceship Command", Category::Skill))
            .build()
            .unwrap()
    }

    #[test]
    fn normalize_lookup_collapses_case_and_separators() {
        assert_eq!(normalize_lookup("  Caldari  Dreadnought "), "caldari_dreadnought");
        assert_eq!(normalize_lookup("caldari_dreadnought"), "caldari_dreadnought");
    }

    #[test]
    fn resolve_item_by_id_or_name() {
        let catalog = sample();
        assert_eq!(catalog.resolve_item("1").map(|i| i.name.as_str()), Some("Phoenix"));
        assert_eq!(catalog.resolve_item("phoenix").map(|i| i.id), Some(ItemId(1)));
        assert_eq!(
            catalog.resolve_item("caldari_dreadnought").map(|i| i.id),
            Some(ItemId(2))
        );
        assert!(catalog.resolve_item("Revelation").is_none());
    }

    #[test]
    fn duplicate_item_id_is_rejected() {
        let result = Catalog::builder()
            .item(ItemDef::new(1, "A", "G", Category::Ship))
            .item(ItemDef::new(1, "B", "G", Category::Ship))
            .build();
        assert!(matches!(result, Err(DataError::DuplicateItem(ItemId(1)))));
    }

    #[test]
    fn builtin_effects_are_visible_through_catalog() {
        let catalog = sample();
        assert!(catalog.effect("shipBonusDreadCitadelTorpRofC1").is_some());
        assert!(catalog.effect("ewSkillEcmBurstFalloffBonus").is_some());
        assert!(catalog.effect("noSuchEffect").is_none());
    }

    #[test]
    fn skill_requirements_default_to_empty() {
        let catalog = sample();
        assert!(catalog.skill_requirements(ItemId(1)).is_empty());
        assert!(catalog.skill_requirements(ItemId(99)).is_empty());
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let err = read_data_file::<CatalogFile>(Path::new("catalog.toml")).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(_)));
    }
}
