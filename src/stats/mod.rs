//! Derived statistics over a computed snapshot: damage, tank, capacitor,
//! navigation, targeting and fitting resources.
//!
//! Every query is read-only. Attributes an entry lacks fall back to the
//! catalog base value, then to the attribute's declared default.

pub mod damage;
pub mod summary;
pub mod tank;

pub use damage::DamageBreakdown;
pub use summary::{
    CapacitorSummary, DefenseSummary, FittingUsage, MiscSummary, OffenseSummary, StatsSummary,
    TargetingSummary,
};
pub use tank::{LayerResists, LayerValues, RemoteReps, Resistances, TankRates};

use crate::capacitor::{self, CapState, CapacitorConsumer};
use crate::config::CapacitorConfig;
use crate::data::{names, Catalog};
use crate::engine::{Role, Snapshot};
use crate::fit::{Assembly, Entry, EntryId};

#[derive(Debug, Clone, Copy)]
pub struct FitStats<'a> {
    catalog: &'a Catalog,
    assembly: &'a Assembly,
    snapshot: &'a Snapshot,
    capacitor: CapacitorConfig,
}

impl<'a> FitStats<'a> {
    pub fn new(
        catalog: &'a Catalog,
        assembly: &'a Assembly,
        snapshot: &'a Snapshot,
        capacitor: CapacitorConfig,
    ) -> Self {
        Self {
            catalog,
            assembly,
            snapshot,
            capacitor,
        }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn assembly(&self) -> &'a Assembly {
        self.assembly
    }

    /// Modified value, or base value, or declared default.
    pub fn try_attr(&self, entry: EntryId, name: &str) -> Option<f64> {
        self.snapshot
            .get(entry, name)
            .or_else(|| {
                self.assembly
                    .entry(entry)
                    .and_then(|e| self.catalog.item(e.item))
                    .and_then(|item| item.base_attr(name))
            })
            .or_else(|| self.catalog.attribute(name).map(|meta| meta.default_value))
    }

    pub fn modified_attr(&self, entry: EntryId, name: &str) -> f64 {
        self.try_attr(entry, name).unwrap_or(0.0)
    }

    pub fn ship_attr(&self, name: &str) -> f64 {
        self.modified_attr(self.assembly.hull_id(), name)
    }

    pub(crate) fn attr_or(&self, entry: EntryId, name: &str, fallback: f64) -> f64 {
        self.try_attr(entry, name).unwrap_or(fallback)
    }

    pub fn entry_name(&self, entry: &Entry) -> Option<&'a str> {
        self.catalog.item(entry.item).map(|item| item.name.as_str())
    }

    /// Roles granted by the entry's capability effects.
    pub fn roles(&self, entry: &Entry) -> Vec<Role> {
        self.catalog
            .item(entry.item)
            .map(|item| {
                item.effects
                    .iter()
                    .filter_map(|id| self.catalog.effect(id))
                    .filter_map(|effect| effect.role())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_role(&self, entry: &Entry, role: Role) -> bool {
        self.roles(entry).contains(&role)
    }

    pub(crate) fn active_modules(&self) -> impl Iterator<Item = &'a Entry> + 'a {
        self.assembly
            .modules()
            .filter(|entry| entry.state().is_some_and(|state| state.is_active()))
    }

    pub(crate) fn active_with_role(&self, role: Role) -> Vec<&'a Entry> {
        self.active_modules()
            .filter(|entry| self.has_role(entry, role))
            .collect()
    }

    /// Cycle time in seconds from `primary`, else `fallback` (both in ms).
    pub(crate) fn cycle_secs(&self, entry: EntryId, primary: &str, fallback: &str) -> Option<f64> {
        [primary, fallback]
            .iter()
            .filter_map(|name| self.try_attr(entry, name))
            .find(|ms| *ms > 0.0)
            .map(|ms| ms / 1000.0)
    }

    pub fn capacitor_capacity(&self) -> f64 {
        self.ship_attr(names::CAPACITOR_CAPACITY)
    }

    pub fn capacitor_recharge_secs(&self) -> f64 {
        self.ship_attr(names::RECHARGE_RATE) / 1000.0
    }

    /// Active modules drawing capacitor each cycle (`duration`, else `speed`).
    pub fn cap_consumers(&self) -> Vec<CapacitorConsumer> {
        self.active_modules()
            .filter_map(|module| self.cap_consumer(module))
            .collect()
    }

    pub(crate) fn cap_consumer(&self, module: &Entry) -> Option<CapacitorConsumer> {
        let need = self.modified_attr(module.id, names::CAPACITOR_NEED);
        if need <= 0.0 {
            return None;
        }
        let cycle = self.cycle_secs(module.id, names::DURATION, names::SPEED)?;
        Some(CapacitorConsumer::new(need, cycle))
    }

    pub fn peak_cap_recharge(&self) -> f64 {
        capacitor::peak_recharge(self.capacitor_capacity(), self.capacitor_recharge_secs())
    }

    pub fn cap_state(&self) -> CapState {
        capacitor::simulate(
            self.capacitor_capacity(),
            self.ship_attr(names::RECHARGE_RATE),
            &self.cap_consumers(),
            &self.capacitor,
        )
    }

    pub fn max_speed(&self) -> f64 {
        self.ship_attr(names::MAX_VELOCITY)
    }

    pub fn signature_radius(&self) -> f64 {
        self.ship_attr(names::SIGNATURE_RADIUS)
    }

    pub fn max_target_range(&self) -> f64 {
        self.ship_attr(names::MAX_TARGET_RANGE)
    }

    pub fn scan_resolution(&self) -> f64 {
        self.ship_attr(names::SCAN_RESOLUTION)
    }

    /// Strongest of the four sensor strengths.
    pub fn scan_strength(&self) -> f64 {
        names::SCAN_STRENGTHS
            .iter()
            .map(|name| self.ship_attr(name))
            .fold(0.0, f64::max)
    }

    /// AU/s: base warp speed (1 when absent) times the hull multiplier.
    pub fn warp_speed(&self) -> f64 {
        let hull = self.assembly.hull_id();
        self.attr_or(hull, names::BASE_WARP_SPEED, 1.0)
            * self.attr_or(hull, names::WARP_SPEED_MULTIPLIER, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::data::{AttributeMeta, Category, Composition, ItemDef, ItemId, Slot};
    use crate::engine::recompute;
    use crate::fit::ModuleState;

    #[test]
    fn attribute_fallbacks_and_navigation() {
        let catalog = Catalog::builder()
            .attribute(AttributeMeta::new("scanLadarStrength", Composition::MultiplicativeStacking))
            .attribute(AttributeMeta::new("agility", Composition::MultiplicativeStacking).with_default(3.0))
            .item(
                ItemDef::new(1, "Rifter", "Frigate", Category::Ship)
                    .attr("maxVelocity", 365.0)
                    .attr("scanLadarStrength", 8.0)
                    .attr("scanRadarStrength", 2.0)
                    .attr("warpSpeedMultiplier", 5.0),
            )
            .build()
            .unwrap();
        let fit = Assembly::new(&catalog, ItemId(1)).unwrap();
        let snapshot = recompute(&catalog, &fit, &EngineConfig::default()).unwrap();
        let stats = FitStats::new(&catalog, &fit, &snapshot, CapacitorConfig::default());

        assert_eq!(stats.max_speed(), 365.0);
        assert_eq!(stats.scan_strength(), 8.0);
        assert_eq!(stats.warp_speed(), 5.0);
        assert_eq!(stats.ship_attr("agility"), 3.0);
        assert_eq!(stats.ship_attr("nothing"), 0.0);
        assert_eq!(stats.try_attr(fit.hull_id(), "nothing"), None);
    }

    #[test]
    fn only_active_modules_draw_capacitor() {
        let catalog = Catalog::builder()
            .item(
                ItemDef::new(1, "Rifter", "Frigate", Category::Ship)
                    .attr("capacitorCapacity", 1000.0)
                    .attr("rechargeRate", 100_000.0),
            )
            .item(
                ItemDef::new(2, "Stasis Webifier I", "Stasis Web", Category::Module)
                    .attr("capacitorNeed", 5.0)
                    .attr("duration", 5000.0)
                    .in_slot(Slot::Medium),
            )
            .build()
            .unwrap();
        let mut fit = Assembly::new(&catalog, ItemId(1)).unwrap();
        fit.add_module(&catalog, ItemId(2), None, ModuleState::Active).unwrap();
        fit.add_module(&catalog, ItemId(2), None, ModuleState::Online).unwrap();
        let snapshot = recompute(&catalog, &fit, &EngineConfig::default()).unwrap();
        let stats = FitStats::new(&catalog, &fit, &snapshot, CapacitorConfig::default());

        assert_eq!(stats.cap_consumers(), vec![CapacitorConsumer::new(5.0, 5.0)]);
        assert!((stats.peak_cap_recharge() - 25.0).abs() < 1e-9);
        assert!(stats.cap_state().is_stable());
    }
}
