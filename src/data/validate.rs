use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::data::catalog::{normalize_lookup, read_data_file, CatalogFile};
use crate::data::item::{Category, ItemDef};
use crate::engine::registry::builtin_effects;
use crate::error::DataError;
use crate::fit::MAX_SKILL_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Parse a catalog file and validate it without building a [crate::data::Catalog].
pub fn validate_catalog_file(path: impl AsRef<Path>) -> Result<ValidationReport, DataError> {
    let file: CatalogFile = read_data_file(path.as_ref())?;
    Ok(validate_catalog(&file))
}

pub fn validate_catalog(file: &CatalogFile) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut declared = HashSet::new();
    for (index, meta) in file.attributes.iter().enumerate() {
        let context = format!("attributes[{index}]");
        if meta.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, context, "missing non-empty 'name'");
            continue;
        }
        if !declared.insert(meta.name.as_str()) {
            report.push(
                ValidationSeverity::Error,
                context,
                format!("duplicate attribute '{}'", meta.name),
            );
        }
        if !meta.default_value.is_finite() {
            report.push(
                ValidationSeverity::Error,
                format!("attributes[{index}].default_value"),
                "default value must be finite",
            );
        }
    }

    let skills: HashSet<String> = file
        .items
        .iter()
        .filter(|item| item.category == Category::Skill)
        .map(|item| normalize_lookup(&item.name))
        .collect();

    let mut seen_ids = HashSet::new();
    let mut seen_names: HashMap<String, usize> = HashMap::new();
    for (index, item) in file.items.iter().enumerate() {
        let context = format!("items[{index}] id={}", item.id);
        if !seen_ids.insert(item.id) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate id {}", item.id),
            );
        }
        if item.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "missing non-empty 'name'");
        } else if let Some(first) = seen_names.insert(normalize_lookup(&item.name), index) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                format!("name '{}' also used by items[{first}]; lookups by name pick the first", item.name),
            );
        }

        validate_item_attributes(&mut report, &context, item, &declared);
        validate_item_effects(&mut report, &context, item, file);

        for (req_index, req) in item.required_skills.iter().enumerate() {
            let req_context = format!("{context}.required_skills[{req_index}]");
            if !skills.contains(&normalize_lookup(&req.skill)) {
                report.push(
                    ValidationSeverity::Error,
                    req_context.clone(),
                    format!("required skill '{}' is not a skill in this catalog", req.skill),
                );
            }
            if req.level > MAX_SKILL_LEVEL {
                report.push(
                    ValidationSeverity::Error,
                    req_context,
                    format!("required level {} exceeds {MAX_SKILL_LEVEL}", req.level),
                );
            }
        }

        if item.category == Category::Module && item.slot.is_none() {
            report.push(
                ValidationSeverity::Info,
                context,
                "module declares no default slot; fits must give one",
            );
        }
    }

    for (id, def) in &file.effects {
        if builtin_effects().contains_key(id.as_str()) {
            report.push(
                ValidationSeverity::Info,
                format!("effects.{id}"),
                "overrides the built-in effect with the same id",
            );
        }
        for attribute in def.target_attributes() {
            if !declared.contains(attribute) {
                report.push(
                    ValidationSeverity::Warning,
                    format!("effects.{id}"),
                    format!("modifies undeclared attribute '{attribute}' (modifier will be skipped)"),
                );
            }
        }
    }

    report
}

fn validate_item_attributes(
    report: &mut ValidationReport,
    context: &str,
    item: &ItemDef,
    declared: &HashSet<&str>,
) {
    for (name, value) in &item.attributes {
        let attr_context = format!("{context}.attributes.{name}");
        if !value.is_finite() {
            report.push(ValidationSeverity::Error, attr_context, "value must be finite");
            continue;
        }
        if name.ends_with("DamageResonance") && !(0.0..=1.0).contains(value) {
            report.push(
                ValidationSeverity::Error,
                attr_context.clone(),
                format!("resonance {value} outside [0, 1]"),
            );
        }
        if !declared.contains(name.as_str()) {
            report.push(
                ValidationSeverity::Warning,
                attr_context,
                "attribute has no metadata; it can be read but not modified",
            );
        }
    }
}

fn validate_item_effects(
    report: &mut ValidationReport,
    context: &str,
    item: &ItemDef,
    file: &CatalogFile,
) {
    for (effect_index, effect) in item.effects.iter().enumerate() {
        let known = file.effects.contains_key(effect)
            || builtin_effects().contains_key(effect.as_str());
        if !known {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.effects[{effect_index}]"),
                format!("unknown effect '{effect}'"),
            );
        }
    }
}
