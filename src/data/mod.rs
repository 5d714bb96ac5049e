pub mod attribute;
pub mod catalog;
pub mod item;
pub mod validate;

pub use attribute::{names, AttributeMeta, Composition, DamageType, Layer};
pub(crate) use catalog::normalize_lookup;
pub use catalog::{
    from_yaml_str, read_data_file, Catalog, CatalogBuilder, CatalogFile, DEFAULT_CATALOG_PATH,
};
pub use item::{Category, ItemDef, ItemId, SkillRequirement, Slot};
pub use validate::{
    validate_catalog, validate_catalog_file, ValidationDiagnostic, ValidationReport,
    ValidationSeverity,
};
