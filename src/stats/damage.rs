use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::data::{names, DamageType};
use crate::engine::Role;
use crate::fit::Entry;
use crate::stats::FitStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DamageBreakdown {
    pub em: f64,
    pub thermal: f64,
    pub kinetic: f64,
    pub explosive: f64,
}

impl DamageBreakdown {
    pub fn from_fn(mut f: impl FnMut(DamageType) -> f64) -> Self {
        Self {
            em: f(DamageType::Em),
            thermal: f(DamageType::Thermal),
            kinetic: f(DamageType::Kinetic),
            explosive: f(DamageType::Explosive),
        }
    }

    pub fn get(&self, damage: DamageType) -> f64 {
        match damage {
            DamageType::Em => self.em,
            DamageType::Thermal => self.thermal,
            DamageType::Kinetic => self.kinetic,
            DamageType::Explosive => self.explosive,
        }
    }

    pub fn total(&self) -> f64 {
        self.em + self.thermal + self.kinetic + self.explosive
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_fn(|damage| self.get(damage) * factor)
    }
}

impl Add for DamageBreakdown {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::from_fn(|damage| self.get(damage) + other.get(damage))
    }
}

impl AddAssign for DamageBreakdown {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl FitStats<'_> {
    fn weapons(&self) -> Vec<&Entry> {
        self.active_modules()
            .filter(|module| self.roles(module).iter().any(Role::is_weapon))
            .collect()
    }

    /// Damage of one weapon cycle: the loaded charge's damage if any, else the
    /// module's own, times the module's damage multiplier.
    pub fn weapon_cycle_damage(&self, module: &Entry) -> DamageBreakdown {
        let source = module.secondary().unwrap_or(module.id);
        let multiplier = self.attr_or(module.id, names::DAMAGE_MULTIPLIER, 1.0);
        DamageBreakdown::from_fn(|damage| {
            self.modified_attr(source, damage.damage_attribute()) * multiplier
        })
    }

    pub fn weapon_volley(&self) -> DamageBreakdown {
        self.weapons()
            .into_iter()
            .map(|module| self.weapon_cycle_damage(module))
            .fold(DamageBreakdown::default(), |acc, damage| acc + damage)
    }

    pub fn weapon_dps(&self) -> DamageBreakdown {
        let mut dps = DamageBreakdown::default();
        for module in self.weapons() {
            if let Some(cycle) = self.cycle_secs(module.id, names::SPEED, names::DURATION) {
                dps += self.weapon_cycle_damage(module).scaled(1.0 / cycle);
            }
        }
        dps
    }

    fn drone_cycle_damage(&self, drone: &Entry) -> DamageBreakdown {
        let active = f64::from(drone.active_drones());
        let multiplier = self.attr_or(drone.id, names::DAMAGE_MULTIPLIER, 1.0);
        DamageBreakdown::from_fn(|damage| {
            self.modified_attr(drone.id, damage.damage_attribute()) * multiplier * active
        })
    }

    pub fn drone_volley(&self) -> DamageBreakdown {
        self.assembly()
            .drones()
            .map(|drone| self.drone_cycle_damage(drone))
            .fold(DamageBreakdown::default(), |acc, damage| acc + damage)
    }

    pub fn drone_dps(&self) -> DamageBreakdown {
        let mut dps = DamageBreakdown::default();
        for drone in self.assembly().drones() {
            if let Some(cycle) = self.cycle_secs(drone.id, names::SPEED, names::DURATION) {
                dps += self.drone_cycle_damage(drone).scaled(1.0 / cycle);
            }
        }
        dps
    }

    pub fn total_dps(&self) -> DamageBreakdown {
        self.weapon_dps() + self.drone_dps()
    }

    pub fn total_volley(&self) -> DamageBreakdown {
        self.weapon_volley() + self.drone_volley()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_arithmetic() {
        let a = DamageBreakdown {
            em: 1.0,
            thermal: 2.0,
            kinetic: 3.0,
            explosive: 4.0,
        };
        assert_eq!(a.total(), 10.0);
        assert_eq!((a + a).total(), 20.0);
        assert_eq!(a.scaled(0.5).kinetic, 1.5);
        let mut b = DamageBreakdown::default();
        b += a;
        assert_eq!(b, a);
    }
}
