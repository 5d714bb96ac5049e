//! Survivability: resistances, effective hit points, local and remote repair.

use serde::Serialize;

use crate::capacitor::{self, CapacitorConsumer};
use crate::data::{names, DamageType, Layer};
use crate::engine::Role;
use crate::fit::Entry;
use crate::stats::FitStats;

/// Resonances at or below this are treated as this, so EHP stays finite.
const MIN_RESONANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LayerValues {
    pub shield: f64,
    pub armor: f64,
    pub hull: f64,
}

impl LayerValues {
    pub fn from_fn(mut f: impl FnMut(Layer) -> f64) -> Self {
        Self {
            shield: f(Layer::Shield),
            armor: f(Layer::Armor),
            hull: f(Layer::Hull),
        }
    }

    pub fn get(&self, layer: Layer) -> f64 {
        match layer {
            Layer::Shield => self.shield,
            Layer::Armor => self.armor,
            Layer::Hull => self.hull,
        }
    }

    pub fn total(&self) -> f64 {
        self.shield + self.armor + self.hull
    }
}

/// Resistances (1 − resonance) of one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Resistances {
    pub em: f64,
    pub thermal: f64,
    pub kinetic: f64,
    pub explosive: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LayerResists {
    pub shield: Resistances,
    pub armor: Resistances,
    pub hull: Resistances,
}

/// Repair rates in EHP/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TankRates {
    pub shield_repair: f64,
    pub armor_repair: f64,
    pub hull_repair: f64,
    pub passive_shield: f64,
}

impl TankRates {
    pub fn total(&self) -> f64 {
        self.shield_repair + self.armor_repair + self.hull_repair + self.passive_shield
    }
}

/// Outgoing remote repair in HP/s (GJ/s for capacitor).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RemoteReps {
    pub shield: f64,
    pub armor: f64,
    pub hull: f64,
    pub capacitor: f64,
}

/// A local repairer, sized for capacitor allocation.
struct Repairer {
    layer: Layer,
    ehp_per_sec: f64,
    cap: Option<CapacitorConsumer>,
}

const LOCAL_REPAIRS: [(Role, Layer, &str); 3] = [
    (Role::ShieldBooster, Layer::Shield, names::SHIELD_BONUS),
    (Role::ArmorRepairer, Layer::Armor, names::ARMOR_DAMAGE_AMOUNT),
    (Role::HullRepairer, Layer::Hull, names::STRUCTURE_DAMAGE_AMOUNT),
];

const REMOTE_REPAIRS: [(Role, &str); 4] = [
    (Role::RemoteShieldRepairer, names::SHIELD_BONUS),
    (Role::RemoteArmorRepairer, names::ARMOR_DAMAGE_AMOUNT),
    (Role::RemoteHullRepairer, names::STRUCTURE_DAMAGE_AMOUNT),
    (Role::EnergyTransfer, names::POWER_TRANSFER_AMOUNT),
];

fn add_to(rates: &mut TankRates, layer: Layer, value: f64) {
    match layer {
        Layer::Shield => rates.shield_repair += value,
        Layer::Armor => rates.armor_repair += value,
        Layer::Hull => rates.hull_repair += value,
    }
}

impl FitStats<'_> {
    pub fn resonance(&self, layer: Layer, damage: DamageType) -> f64 {
        self.attr_or(
            self.assembly().hull_id(),
            layer.resonance_attribute(damage),
            1.0,
        )
    }

    /// Resonance against a uniform damage pattern.
    pub fn uniform_resonance(&self, layer: Layer) -> f64 {
        let sum: f64 = DamageType::ALL
            .iter()
            .map(|damage| self.resonance(layer, *damage))
            .sum();
        (sum / DamageType::ALL.len() as f64).max(MIN_RESONANCE)
    }

    pub fn resists(&self) -> LayerResists {
        let layer = |layer: Layer| Resistances {
            em: 1.0 - self.resonance(layer, DamageType::Em),
            thermal: 1.0 - self.resonance(layer, DamageType::Thermal),
            kinetic: 1.0 - self.resonance(layer, DamageType::Kinetic),
            explosive: 1.0 - self.resonance(layer, DamageType::Explosive),
        };
        LayerResists {
            shield: layer(Layer::Shield),
            armor: layer(Layer::Armor),
            hull: layer(Layer::Hull),
        }
    }

    pub fn hp(&self) -> LayerValues {
        LayerValues::from_fn(|layer| self.ship_attr(layer.hp_attribute()))
    }

    /// Effective hit points per layer against a uniform damage pattern.
    pub fn ehp(&self) -> LayerValues {
        LayerValues::from_fn(|layer| {
            self.ship_attr(layer.hp_attribute()) / self.uniform_resonance(layer)
        })
    }

    pub fn ehp_against(&self, damage: DamageType) -> LayerValues {
        LayerValues::from_fn(|layer| {
            let resonance = self.resonance(layer, damage).max(MIN_RESONANCE);
            self.ship_attr(layer.hp_attribute()) / resonance
        })
    }

    /// Peak passive shield regeneration in EHP/s (at 25% shield).
    pub fn passive_shield_regen(&self) -> f64 {
        let capacity = self.ship_attr(names::SHIELD_CAPACITY);
        let recharge_secs = self.ship_attr(names::SHIELD_RECHARGE_RATE) / 1000.0;
        capacitor::peak_recharge(capacity, recharge_secs) / self.uniform_resonance(Layer::Shield)
    }

    fn repairers(&self) -> Vec<Repairer> {
        let mut repairers = Vec::new();
        for (role, layer, amount) in LOCAL_REPAIRS {
            for module in self.active_with_role(role) {
                let Some(cycle) = self.cycle_secs(module.id, names::DURATION, names::SPEED) else {
                    continue;
                };
                let hp = self.modified_attr(module.id, amount);
                repairers.push(Repairer {
                    layer,
                    ehp_per_sec: hp / cycle / self.uniform_resonance(layer),
                    cap: self.cap_consumer(module),
                });
            }
        }
        repairers
    }

    fn is_local_repairer(&self, module: &Entry) -> bool {
        LOCAL_REPAIRS
            .iter()
            .any(|(role, _, _)| self.has_role(module, *role))
    }

    /// Repair with every active repairer cycling continuously.
    pub fn effective_tank(&self) -> TankRates {
        let mut rates = TankRates {
            passive_shield: self.passive_shield_regen(),
            ..TankRates::default()
        };
        for repairer in self.repairers() {
            add_to(&mut rates, repairer.layer, repairer.ehp_per_sec);
        }
        rates
    }

    /// Repair the capacitor can keep up indefinitely. When it is not stable,
    /// regeneration left over after non-repair consumers is handed to the
    /// repairers with the most EHP per GJ first.
    pub fn sustainable_tank(&self) -> TankRates {
        if self.cap_state().is_stable() {
            return self.effective_tank();
        }

        let other_drain: f64 = self
            .active_modules()
            .filter(|module| !self.is_local_repairer(module))
            .filter_map(|module| self.cap_consumer(module))
            .map(|consumer| consumer.rate())
            .sum();
        let mut budget = (self.peak_cap_recharge() - other_drain).max(0.0);

        let mut repairers = self.repairers();
        let efficiency = |r: &Repairer| match r.cap {
            Some(cap) if cap.rate() > 0.0 => r.ehp_per_sec / cap.rate(),
            _ => f64::INFINITY,
        };
        repairers.sort_by(|a, b| efficiency(b).total_cmp(&efficiency(a)));

        let mut rates = TankRates {
            passive_shield: self.passive_shield_regen(),
            ..TankRates::default()
        };
        for repairer in repairers {
            let share = match repairer.cap {
                Some(cap) if cap.rate() > 0.0 => {
                    let used = cap.rate().min(budget);
                    budget -= used;
                    used / cap.rate()
                }
                _ => 1.0,
            };
            add_to(&mut rates, repairer.layer, repairer.ehp_per_sec * share);
        }
        rates
    }

    /// Outgoing repair from active remote modules and active drones.
    pub fn remote_reps(&self) -> RemoteReps {
        let mut reps = RemoteReps::default();
        let mut credit = |role: Role, amount: f64| match role {
            Role::RemoteShieldRepairer => reps.shield += amount,
            Role::RemoteArmorRepairer => reps.armor += amount,
            Role::RemoteHullRepairer => reps.hull += amount,
            Role::EnergyTransfer => reps.capacitor += amount,
            _ => {}
        };

        for (role, amount) in REMOTE_REPAIRS {
            for module in self.active_with_role(role) {
                if let Some(cycle) = self.cycle_secs(module.id, names::DURATION, names::SPEED) {
                    credit(role, self.modified_attr(module.id, amount) / cycle);
                }
            }
        }

        for drone in self.assembly().drones() {
            let active = f64::from(drone.active_drones());
            if active == 0.0 {
                continue;
            }
            let Some(cycle) = self.cycle_secs(drone.id, names::DURATION, names::SPEED) else {
                continue;
            };
            for (role, amount) in REMOTE_REPAIRS {
                let per_cycle = self.modified_attr(drone.id, amount);
                if per_cycle > 0.0 {
                    credit(role, per_cycle * active / cycle);
                }
            }
        }
        reps
    }
}
