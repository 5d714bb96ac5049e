//! Fixed-point recompute: evaluate every effect against the previous pass's
//! values until nothing moves, or give up after a bounded number of passes.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::data::Catalog;
use crate::engine::effects::EffectContext;
use crate::engine::stacking::{StackContribution, StatStacking};
use crate::engine::store::{AttributeValues, Snapshot};
use crate::error::{Diagnostic, DiagnosticKind, EngineError};
use crate::fit::{Assembly, EntryId};

/// Base attributes of every entry, as found in the catalog.
pub fn seed_values(catalog: &Catalog, assembly: &Assembly) -> AttributeValues {
    assembly
        .entries()
        .iter()
        .map(|entry| {
            let attrs = catalog
                .item(entry.item)
                .map(|item| item.attributes.clone())
                .unwrap_or_default();
            (entry.id, attrs)
        })
        .collect()
}

pub fn recompute(
    catalog: &Catalog,
    assembly: &Assembly,
    config: &EngineConfig,
) -> Result<Snapshot, EngineError> {
    let base = seed_values(catalog, assembly);
    let mut values = base.clone();
    let mut diagnostics = Vec::new();

    for pass in 1..=config.max_passes {
        diagnostics.clear();
        let next = evaluate_pass(catalog, assembly, &base, &values, &mut diagnostics);
        let settled = has_settled(&values, &next, config.epsilon);
        values = next;
        tracing::debug!(pass, settled, revision = assembly.revision(), "recompute pass");

        if settled {
            for diagnostic in &diagnostics {
                tracing::warn!(%diagnostic, "modifier skipped");
            }
            return Ok(Snapshot {
                revision: assembly.revision(),
                values,
                passes: pass,
                diagnostics,
            });
        }
    }

    tracing::warn!(
        passes = config.max_passes,
        revision = assembly.revision(),
        "attribute values did not settle"
    );
    Err(EngineError::CyclicDependency {
        passes: config.max_passes,
    })
}

fn evaluate_pass(
    catalog: &Catalog,
    assembly: &Assembly,
    base: &AttributeValues,
    previous: &AttributeValues,
    diagnostics: &mut Vec<Diagnostic>,
) -> AttributeValues {
    let mut stacking: StatStacking<(EntryId, String)> = StatStacking::new();

    for entry in assembly.entries() {
        let Some(item) = catalog.item(entry.item) else {
            continue;
        };
        let ctx = EffectContext::new(catalog, assembly, entry, previous);
        for effect_id in &item.effects {
            let Some(effect) = catalog.effect(effect_id) else {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnknownEffect,
                    entry.id,
                    effect_id.as_str(),
                    effect_id.as_str(),
                ));
                continue;
            };
            for modifier in effect.evaluate(effect_id, &ctx, diagnostics) {
                if catalog.attribute(&modifier.attribute).is_none() {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnknownAttribute,
                        entry.id,
                        effect_id.as_str(),
                        modifier.attribute.as_str(),
                    ));
                    continue;
                }
                for target in modifier.selector.resolve(catalog, assembly, entry.id) {
                    stacking.add(StackContribution::from_modifier(
                        (target, modifier.attribute.clone()),
                        &modifier,
                    ));
                }
            }
        }
    }

    let mut next = base.clone();
    for ((target, attribute), totals) in stacking.into_totals() {
        let Some(meta) = catalog.attribute(&attribute) else {
            continue;
        };
        let base_value = base
            .get(&target)
            .and_then(|attrs| attrs.get(&attribute))
            .copied()
            .unwrap_or(meta.default_value);
        next.entry(target)
            .or_insert_with(BTreeMap::new)
            .insert(attribute, totals.compose(meta, base_value));
    }
    next
}

/// Every value moved by at most `epsilon` relative to max(1, |previous|), and
/// no attribute appeared or vanished.
fn has_settled(previous: &AttributeValues, next: &AttributeValues, epsilon: f64) -> bool {
    let count = |values: &AttributeValues| values.values().map(BTreeMap::len).sum::<usize>();
    if count(previous) != count(next) {
        return false;
    }
    next.iter().all(|(entry, attrs)| {
        attrs.iter().all(|(name, value)| {
            previous
                .get(entry)
                .and_then(|old| old.get(name))
                .is_some_and(|old| (value - old).abs() <= epsilon * old.abs().max(1.0))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeMeta, Category, Composition, ItemDef, ItemId};

    #[test]
    fn bare_hull_settles_in_one_pass() {
        let catalog = Catalog::builder()
            .attribute(AttributeMeta::new("signatureRadius", Composition::PercentAdditive))
            .item(ItemDef::new(1, "Hull", "Frigate", Category::Ship).attr("signatureRadius", 400.0))
            .build()
            .unwrap();
        let fit = Assembly::new(&catalog, ItemId(1)).unwrap();
        let snapshot = recompute(&catalog, &fit, &EngineConfig::default()).unwrap();
        assert_eq!(snapshot.passes(), 1);
        assert_eq!(snapshot.get(fit.hull_id(), "signatureRadius"), Some(400.0));
    }

    #[test]
    fn unknown_effect_and_target_attribute_are_diagnosed() {
        let catalog = Catalog::builder()
            .item(
                ItemDef::new(1, "Hull", "Frigate", Category::Ship)
                    .attr("signatureRadiusBonus", -5.0)
                    .effect("signatureRadiusBonusPostPercent")
                    .effect("notAnEffect"),
            )
            .build()
            .unwrap();
        let fit = Assembly::new(&catalog, ItemId(1)).unwrap();
        let snapshot = recompute(&catalog, &fit, &EngineConfig::default()).unwrap();
        let kinds: Vec<DiagnosticKind> = snapshot.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::UnknownAttribute, DiagnosticKind::UnknownEffect]
        );
    }

    #[test]
    fn settle_check_rejects_new_attributes() {
        let mut previous = AttributeValues::new();
        previous.insert(EntryId(0), BTreeMap::from([("a".to_string(), 1.0)]));
        let mut next = previous.clone();
        assert!(has_settled(&previous, &next, 1e-9));
        next.entry(EntryId(0))
            .or_default()
            .insert("b".to_string(), 2.0);
        assert!(!has_settled(&previous, &next, 1e-9));
    }
}
