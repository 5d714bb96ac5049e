//! Effect definitions and their evaluation into modifiers.
//!
//! Effects form a closed set of variants ([EffectKind]) that can be declared in
//! the built-in table or in a catalog file. Evaluation is pure: the same context
//! always yields the same modifiers.

use serde::{Deserialize, Serialize};

use crate::data::{names, normalize_lookup, Catalog, Category};
use crate::engine::modifier::{Magnitude, Modifier, Operation};
use crate::engine::selector::{Domain, Predicate, Selector};
use crate::engine::store::AttributeValues;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::fit::{Assembly, Entry, EntryId, EntryKind, ModuleState};

/// Which source states let an effect fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    #[default]
    Passive,
    Online,
    Active,
    Overload,
}

impl EffectCategory {
    pub fn fires_for(&self, entry: &Entry) -> bool {
        match entry.kind {
            EntryKind::Module { state, .. } => match self {
                Self::Passive => true,
                Self::Online => state >= ModuleState::Online,
                Self::Active => state >= ModuleState::Active,
                Self::Overload => state == ModuleState::Overheated,
            },
            EntryKind::Drone { active, .. } => active > 0 && *self != Self::Overload,
            EntryKind::Hull | EntryKind::Skill { .. } | EntryKind::Charge { .. } => {
                matches!(self, Self::Passive | Self::Online)
            }
        }
    }
}

/// How a boost's magnitude scales.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// By the source's level when the source is a skill, otherwise unscaled.
    #[default]
    Auto,
    Flat,
    /// By the assembly's trained level in the named skill.
    Skill(String),
}

/// Precondition checked on the context before any modifier is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    ShipGroup(String),
    Skill {
        name: String,
        #[serde(default = "default_requirement_level")]
        level: u8,
    },
}

fn default_requirement_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub attribute: String,
    pub magnitude: Magnitude,
}

impl Boost {
    pub fn new(attribute: impl Into<String>, magnitude: impl Into<Magnitude>) -> Self {
        Self {
            attribute: attribute.into(),
            magnitude: magnitude.into(),
        }
    }
}

/// Tags a module for the stats aggregator; produces no modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Turret,
    Launcher,
    ShieldBooster,
    ArmorRepairer,
    HullRepairer,
    RemoteShieldRepairer,
    RemoteArmorRepairer,
    RemoteHullRepairer,
    EnergyTransfer,
}

impl Role {
    pub fn is_weapon(&self) -> bool {
        matches!(self, Self::Turret | Self::Launcher)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Related {
    Ship,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    FilteredBoost {
        domain: Domain,
        #[serde(default = "any_predicate")]
        filter: Predicate,
        operation: Operation,
        boosts: Vec<Boost>,
        #[serde(default)]
        scaling: Scaling,
    },
    SelfBoost {
        operation: Operation,
        boosts: Vec<Boost>,
        #[serde(default)]
        scaling: Scaling,
    },
    RelatedBoost {
        target: Related,
        operation: Operation,
        boosts: Vec<Boost>,
        #[serde(default)]
        scaling: Scaling,
    },
    /// Adds the module's mass to the ship and boosts ship velocity by
    /// `speedFactor × speedBoostFactor / shipMass` percent.
    Propulsion {
        #[serde(default)]
        signature_bloom: bool,
    },
    Capability {
        role: Role,
    },
}

fn any_predicate() -> Predicate {
    Predicate::Any
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    #[serde(default)]
    pub category: EffectCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,
    pub kind: EffectKind,
}

/// Read-only view handed to every evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    pub catalog: &'a Catalog,
    pub assembly: &'a Assembly,
    pub source: &'a Entry,
    /// The source's loaded charge or containing module.
    pub secondary: Option<&'a Entry>,
    /// Attribute values from the previous pass.
    pub values: &'a AttributeValues,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        catalog: &'a Catalog,
        assembly: &'a Assembly,
        source: &'a Entry,
        values: &'a AttributeValues,
    ) -> Self {
        let secondary = source.secondary().and_then(|id| assembly.entry(id));
        Self {
            catalog,
            assembly,
            source,
            secondary,
            values,
        }
    }

    /// Previous-pass value of `name` on `entry`, falling back to the
    /// attribute's declared default.
    pub fn value(&self, entry: EntryId, name: &str) -> Option<f64> {
        self.values
            .get(&entry)
            .and_then(|attrs| attrs.get(name))
            .copied()
            .or_else(|| self.catalog.attribute(name).map(|meta| meta.default_value))
    }
}

impl EffectDef {
    pub fn new(category: EffectCategory, kind: EffectKind) -> Self {
        Self {
            category,
            requires: Vec::new(),
            kind,
        }
    }

    pub fn requiring(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn role(&self) -> Option<Role> {
        match self.kind {
            EffectKind::Capability { role } => Some(role),
            _ => None,
        }
    }

    /// Attribute names this effect may modify.
    pub fn target_attributes(&self) -> Vec<&str> {
        match &self.kind {
            EffectKind::FilteredBoost { boosts, .. }
            | EffectKind::SelfBoost { boosts, .. }
            | EffectKind::RelatedBoost { boosts, .. } => {
                boosts.iter().map(|boost| boost.attribute.as_str()).collect()
            }
            EffectKind::Propulsion { signature_bloom } => {
                let mut attrs = vec![names::MASS, names::MAX_VELOCITY];
                if *signature_bloom {
                    attrs.push(names::SIGNATURE_RADIUS);
                }
                attrs
            }
            EffectKind::Capability { .. } => Vec::new(),
        }
    }

    /// Produce the modifiers this effect contributes in `ctx`. Lookup misses are
    /// pushed to `diagnostics` and the affected modifier is skipped.
    pub fn evaluate(
        &self,
        effect_id: &str,
        ctx: &EffectContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Modifier> {
        if !self.category.fires_for(ctx.source) {
            return Vec::new();
        }
        let mut eval = Evaluation {
            effect_id,
            ctx,
            diagnostics,
        };
        if !eval.requirements_met(&self.requires) {
            return Vec::new();
        }

        match &self.kind {
            EffectKind::FilteredBoost {
                domain,
                filter,
                operation,
                boosts,
                scaling,
            } => {
                let selector = Selector::Filtered {
                    domain: *domain,
                    predicate: filter.clone(),
                };
                eval.boosts(selector, *operation, boosts, scaling)
            }
            EffectKind::SelfBoost {
                operation,
                boosts,
                scaling,
            } => eval.boosts(Selector::SelfEntry, *operation, boosts, scaling),
            EffectKind::RelatedBoost {
                target,
                operation,
                boosts,
                scaling,
            } => {
                let selector = match target {
                    Related::Ship => Selector::Ship,
                    Related::Other => Selector::Other,
                };
                eval.boosts(selector, *operation, boosts, scaling)
            }
            EffectKind::Propulsion { signature_bloom } => eval.propulsion(*signature_bloom),
            EffectKind::Capability { .. } => Vec::new(),
        }
    }
}

struct Evaluation<'e, 'a> {
    effect_id: &'e str,
    ctx: &'e EffectContext<'a>,
    diagnostics: &'e mut Vec<Diagnostic>,
}

impl Evaluation<'_, '_> {
    fn miss(&mut self, kind: DiagnosticKind, name: &str) {
        self.diagnostics.push(Diagnostic::new(
            kind,
            self.ctx.source.id,
            self.effect_id,
            name,
        ));
    }

    fn skill_known(&self, name: &str) -> bool {
        self.ctx
            .catalog
            .item_by_name(name)
            .is_some_and(|item| item.category == Category::Skill)
    }

    fn requirements_met(&mut self, requires: &[Requirement]) -> bool {
        for requirement in requires {
            let met = match requirement {
                Requirement::ShipGroup(group) => self
                    .ctx
                    .catalog
                    .item(self.ctx.assembly.hull().item)
                    .is_some_and(|hull| normalize_lookup(&hull.group) == normalize_lookup(group)),
                Requirement::Skill { name, level } => {
                    if !self.skill_known(name) {
                        self.miss(DiagnosticKind::UnknownSkill, name);
                        return false;
                    }
                    self.ctx.assembly.skill_level(self.ctx.catalog, name) >= *level
                }
            };
            if !met {
                return false;
            }
        }
        true
    }

    /// Scale factor for boost magnitudes; `None` when a named skill is unknown.
    fn scale(&mut self, scaling: &Scaling) -> Option<f64> {
        match scaling {
            Scaling::Auto => Some(
                self.ctx
                    .source
                    .skill_level()
                    .map(f64::from)
                    .unwrap_or(1.0),
            ),
            Scaling::Flat => Some(1.0),
            Scaling::Skill(name) => {
                if !self.skill_known(name) {
                    self.miss(DiagnosticKind::UnknownSkill, name);
                    return None;
                }
                Some(f64::from(
                    self.ctx.assembly.skill_level(self.ctx.catalog, name),
                ))
            }
        }
    }

    fn magnitude(&mut self, magnitude: &Magnitude) -> Option<f64> {
        match magnitude {
            Magnitude::Constant(value) => Some(*value),
            Magnitude::SourceAttribute(name) => {
                let value = self.ctx.value(self.ctx.source.id, name);
                if value.is_none() {
                    self.miss(DiagnosticKind::UnknownAttribute, name);
                }
                value
            }
        }
    }

    fn modifier(
        &self,
        selector: Selector,
        attribute: &str,
        operation: Operation,
        magnitude: f64,
        magnitude_is_self: bool,
    ) -> Modifier {
        Modifier {
            source: self.ctx.source.id,
            selector,
            attribute: attribute.to_string(),
            operation,
            magnitude,
            magnitude_is_self,
            penalized: self.ctx.source.is_penalizable(),
        }
    }

    fn boosts(
        &mut self,
        selector: Selector,
        operation: Operation,
        boosts: &[Boost],
        scaling: &Scaling,
    ) -> Vec<Modifier> {
        let Some(scale) = self.scale(scaling) else {
            return Vec::new();
        };
        // Level 0: present but inert.
        if scale == 0.0 {
            return Vec::new();
        }

        let mut modifiers = Vec::with_capacity(boosts.len());
        for boost in boosts {
            let Some(raw) = self.magnitude(&boost.magnitude) else {
                continue;
            };
            let scaled = match operation {
                Operation::Add | Operation::PercentAdd => raw * scale,
                Operation::MultiplyFactor => 1.0 + (raw - 1.0) * scale,
            };
            let from_self = matches!(boost.magnitude, Magnitude::SourceAttribute(_));
            modifiers.push(self.modifier(
                selector.clone(),
                &boost.attribute,
                operation,
                scaled,
                from_self,
            ));
        }
        modifiers
    }

    fn propulsion(&mut self, signature_bloom: bool) -> Vec<Modifier> {
        let source = self.ctx.source.id;
        let hull = self.ctx.assembly.hull_id();
        let mut modifiers = Vec::new();

        let mass_addition = self.ctx.value(source, names::MASS_ADDITION).unwrap_or(0.0);
        if mass_addition != 0.0 {
            modifiers.push(self.modifier(
                Selector::Ship,
                names::MASS,
                Operation::Add,
                mass_addition,
                true,
            ));
        }

        let speed_factor = self.magnitude(&Magnitude::from(names::SPEED_FACTOR));
        let boost_factor = self.magnitude(&Magnitude::from(names::SPEED_BOOST_FACTOR));
        let ship_mass = self.ctx.value(hull, names::MASS).unwrap_or(0.0);
        if let (Some(speed_factor), Some(boost_factor)) = (speed_factor, boost_factor) {
            if ship_mass > 0.0 {
                modifiers.push(self.modifier(
                    Selector::Ship,
                    names::MAX_VELOCITY,
                    Operation::PercentAdd,
                    speed_factor * boost_factor / ship_mass,
                    true,
                ));
            }
        }

        if signature_bloom {
            if let Some(bloom) = self.magnitude(&Magnitude::from(names::SIGNATURE_RADIUS_BONUS)) {
                modifiers.push(self.modifier(
                    Selector::Ship,
                    names::SIGNATURE_RADIUS,
                    Operation::PercentAdd,
                    bloom,
                    true,
                ));
            }
        }
        modifiers
    }
}
