//! Attribute metadata: how modifiers on an attribute compose, its default and
//! whether it may go negative.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared composition rule for percentage and multiplier modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    /// Percentages become plain factors; nothing is ever stacking penalized.
    Additive,
    /// Percentages are summed and applied once as `1 + Σp/100`.
    PercentAdditive,
    /// Percentages become factors; factors from penalizable sources stack
    /// with diminishing returns.
    #[default]
    MultiplicativeStacking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMeta {
    pub name: String,
    #[serde(default)]
    pub composition: Composition,
    /// Value used when an item does not carry the attribute.
    #[serde(default)]
    pub default_value: f64,
    /// Clamp the composed value at zero.
    #[serde(default)]
    pub non_negative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl AttributeMeta {
    pub fn new(name: impl Into<String>, composition: Composition) -> Self {
        Self {
            name: name.into(),
            composition,
            default_value: 0.0,
            non_negative: false,
            unit: None,
        }
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    pub fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Em,
    Thermal,
    Kinetic,
    Explosive,
}

impl DamageType {
    pub const ALL: [DamageType; 4] = [
        DamageType::Em,
        DamageType::Thermal,
        DamageType::Kinetic,
        DamageType::Explosive,
    ];

    pub const fn damage_attribute(self) -> &'static str {
        match self {
            Self::Em => names::EM_DAMAGE,
            Self::Thermal => names::THERMAL_DAMAGE,
            Self::Kinetic => names::KINETIC_DAMAGE,
            Self::Explosive => names::EXPLOSIVE_DAMAGE,
        }
    }

    /// Module attribute holding a resistance bonus (negative percent) for this type.
    pub const fn resistance_bonus_attribute(self) -> &'static str {
        match self {
            Self::Em => "emDamageResistanceBonus",
            Self::Thermal => "thermalDamageResistanceBonus",
            Self::Kinetic => "kineticDamageResistanceBonus",
            Self::Explosive => "explosiveDamageResistanceBonus",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Em => "em",
            Self::Thermal => "thermal",
            Self::Kinetic => "kinetic",
            Self::Explosive => "explosive",
        };
        write!(f, "{label}")
    }
}

/// Defense layer of a hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Shield,
    Armor,
    Hull,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Shield, Layer::Armor, Layer::Hull];

    pub const fn hp_attribute(self) -> &'static str {
        match self {
            Self::Shield => names::SHIELD_CAPACITY,
            Self::Armor => names::ARMOR_HP,
            Self::Hull => names::HULL_HP,
        }
    }

    /// Resonance (1 − resistance) attribute of this layer against `damage`.
    pub const fn resonance_attribute(self, damage: DamageType) -> &'static str {
        match (self, damage) {
            (Self::Shield, DamageType::Em) => "shieldEmDamageResonance",
            (Self::Shield, DamageType::Thermal) => "shieldThermalDamageResonance",
            (Self::Shield, DamageType::Kinetic) => "shieldKineticDamageResonance",
            (Self::Shield, DamageType::Explosive) => "shieldExplosiveDamageResonance",
            (Self::Armor, DamageType::Em) => "armorEmDamageResonance",
            (Self::Armor, DamageType::Thermal) => "armorThermalDamageResonance",
            (Self::Armor, DamageType::Kinetic) => "armorKineticDamageResonance",
            (Self::Armor, DamageType::Explosive) => "armorExplosiveDamageResonance",
            (Self::Hull, DamageType::Em) => "emDamageResonance",
            (Self::Hull, DamageType::Thermal) => "thermalDamageResonance",
            (Self::Hull, DamageType::Kinetic) => "kineticDamageResonance",
            (Self::Hull, DamageType::Explosive) => "explosiveDamageResonance",
        }
    }

    pub fn resonance_attributes(self) -> [&'static str; 4] {
        DamageType::ALL.map(|damage| self.resonance_attribute(damage))
    }
}

/// Well-known attribute names read by effects and the stats aggregator.
pub mod names {
    pub const MASS: &str = "mass";
    pub const MASS_ADDITION: &str = "massAddition";
    pub const MAX_VELOCITY: &str = "maxVelocity";
    pub const SPEED_FACTOR: &str = "speedFactor";
    pub const SPEED_BOOST_FACTOR: &str = "speedBoostFactor";
    pub const SIGNATURE_RADIUS: &str = "signatureRadius";
    pub const SIGNATURE_RADIUS_BONUS: &str = "signatureRadiusBonus";

    pub const CAPACITOR_CAPACITY: &str = "capacitorCapacity";
    pub const RECHARGE_RATE: &str = "rechargeRate";
    pub const CAPACITOR_NEED: &str = "capacitorNeed";
    pub const DURATION: &str = "duration";
    pub const SPEED: &str = "speed";

    pub const DAMAGE_MULTIPLIER: &str = "damageMultiplier";
    pub const EM_DAMAGE: &str = "emDamage";
    pub const THERMAL_DAMAGE: &str = "thermalDamage";
    pub const KINETIC_DAMAGE: &str = "kineticDamage";
    pub const EXPLOSIVE_DAMAGE: &str = "explosiveDamage";

    pub const SHIELD_CAPACITY: &str = "shieldCapacity";
    pub const ARMOR_HP: &str = "armorHP";
    pub const HULL_HP: &str = "hp";
    pub const SHIELD_RECHARGE_RATE: &str = "shieldRechargeRate";
    pub const SHIELD_BONUS: &str = "shieldBonus";
    pub const ARMOR_DAMAGE_AMOUNT: &str = "armorDamageAmount";
    pub const STRUCTURE_DAMAGE_AMOUNT: &str = "structureDamageAmount";
    pub const POWER_TRANSFER_AMOUNT: &str = "powerTransferAmount";

    pub const MAX_TARGET_RANGE: &str = "maxTargetRange";
    pub const SCAN_RESOLUTION: &str = "scanResolution";
    pub const SCAN_RADAR_STRENGTH: &str = "scanRadarStrength";
    pub const SCAN_LADAR_STRENGTH: &str = "scanLadarStrength";
    pub const SCAN_MAGNETOMETRIC_STRENGTH: &str = "scanMagnetometricStrength";
    pub const SCAN_GRAVIMETRIC_STRENGTH: &str = "scanGravimetricStrength";
    pub const BASE_WARP_SPEED: &str = "baseWarpSpeed";
    pub const WARP_SPEED_MULTIPLIER: &str = "warpSpeedMultiplier";

    pub const CPU: &str = "cpu";
    pub const POWER: &str = "power";
    pub const CPU_OUTPUT: &str = "cpuOutput";
    pub const POWER_OUTPUT: &str = "powerOutput";
    pub const UPGRADE_COST: &str = "upgradeCost";
    pub const UPGRADE_CAPACITY: &str = "upgradeCapacity";
    pub const DRONE_BANDWIDTH: &str = "droneBandwidth";
    pub const DRONE_BANDWIDTH_USED: &str = "droneBandwidthUsed";
    pub const DRONE_CAPACITY: &str = "droneCapacity";
    pub const VOLUME: &str = "volume";

    pub const SCAN_STRENGTHS: [&str; 4] = [
        SCAN_RADAR_STRENGTH,
        SCAN_LADAR_STRENGTH,
        SCAN_MAGNETOMETRIC_STRENGTH,
        SCAN_GRAVIMETRIC_STRENGTH,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_defaults_to_stacking() {
        let meta: AttributeMeta = serde_json::from_str(r#"{"name":"falloff"}"#).unwrap();
        assert_eq!(meta.composition, Composition::MultiplicativeStacking);
        assert_eq!(meta.default_value, 0.0);
        assert!(!meta.non_negative);
    }

    #[test]
    fn resonance_names_are_distinct_per_layer() {
        let mut all: Vec<&str> = Layer::ALL
            .iter()
            .flat_map(|layer| layer.resonance_attributes())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 12);
    }
}
