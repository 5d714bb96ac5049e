//! Built-in effect table, keyed by effect id. Built once on first use.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::data::{names, DamageType, Layer};
use crate::engine::effects::{
    Boost, EffectCategory, EffectDef, EffectKind, Related, Role, Scaling,
};
use crate::engine::modifier::Operation;
use crate::engine::selector::{Domain, Predicate};

static BUILTIN_EFFECTS: OnceLock<BTreeMap<&'static str, EffectDef>> = OnceLock::new();

pub fn builtin_effects() -> &'static BTreeMap<&'static str, EffectDef> {
    BUILTIN_EFFECTS.get_or_init(build_table)
}

/// Percentage bonus from the source's `bonus` attribute onto a ship attribute.
fn ship_percent(category: EffectCategory, attribute: &str, bonus: &str) -> EffectDef {
    EffectDef::new(
        category,
        EffectKind::RelatedBoost {
            target: Related::Ship,
            operation: Operation::PercentAdd,
            boosts: vec![Boost::new(attribute, bonus)],
            scaling: Scaling::Auto,
        },
    )
}

fn filtered(
    domain: Domain,
    filter: Predicate,
    operation: Operation,
    boosts: Vec<Boost>,
    scaling: Scaling,
) -> EffectDef {
    EffectDef::new(
        EffectCategory::Passive,
        EffectKind::FilteredBoost {
            domain,
            filter,
            operation,
            boosts,
            scaling,
        },
    )
}

fn self_boost(category: EffectCategory, operation: Operation, boosts: Vec<Boost>) -> EffectDef {
    EffectDef::new(
        category,
        EffectKind::SelfBoost {
            operation,
            boosts,
            scaling: Scaling::Flat,
        },
    )
}

fn ship_boost(category: EffectCategory, operation: Operation, boosts: Vec<Boost>) -> EffectDef {
    EffectDef::new(
        category,
        EffectKind::RelatedBoost {
            target: Related::Ship,
            operation,
            boosts,
            scaling: Scaling::Flat,
        },
    )
}

fn capability(role: Role) -> EffectDef {
    EffectDef::new(EffectCategory::Passive, EffectKind::Capability { role })
}

/// Layer hardener: the module's per-type resistance bonus onto the layer's resonances.
fn hardener(layer: Layer) -> EffectDef {
    let boosts = DamageType::ALL
        .iter()
        .map(|damage| {
            Boost::new(
                layer.resonance_attribute(*damage),
                damage.resistance_bonus_attribute(),
            )
        })
        .collect();
    ship_boost(EffectCategory::Active, Operation::PercentAdd, boosts)
}

fn build_table() -> BTreeMap<&'static str, EffectDef> {
    let mut table = BTreeMap::new();

    // Skill and hull bonuses onto filtered modules.
    table.insert(
        "ewSkillEcmBurstFalloffBonus",
        filtered(
            Domain::Modules,
            Predicate::group("ECM Burst"),
            Operation::PercentAdd,
            vec![Boost::new("falloff", "falloffBonus")],
            Scaling::Auto,
        ),
    );
    table.insert(
        "shipBonusDreadCitadelTorpRofC1",
        filtered(
            Domain::Modules,
            Predicate::requires_skill("Citadel Torpedoes"),
            Operation::PercentAdd,
            vec![Boost::new(names::SPEED, "dreadnoughtShipBonusC1")],
            Scaling::Skill("Caldari Dreadnought".into()),
        ),
    );
    table.insert(
        "surgicalStrikeDamageMultiplierBonus",
        filtered(
            Domain::Modules,
            Predicate::requires_skill("Gunnery"),
            Operation::PercentAdd,
            vec![Boost::new(names::DAMAGE_MULTIPLIER, "damageMultiplierBonus")],
            Scaling::Auto,
        ),
    );
    table.insert(
        "rapidFiringRofBonus",
        filtered(
            Domain::Modules,
            Predicate::requires_skill("Gunnery"),
            Operation::PercentAdd,
            vec![Boost::new(names::SPEED, "rofBonus")],
            Scaling::Auto,
        ),
    );
    table.insert(
        "missileDamageBonus",
        filtered(
            Domain::Charges,
            Predicate::requires_skill("Missile Launcher Operation"),
            Operation::PercentAdd,
            DamageType::ALL
                .iter()
                .map(|damage| Boost::new(damage.damage_attribute(), "damageMultiplierBonus"))
                .collect(),
            Scaling::Auto,
        ),
    );
    table.insert(
        "droneDamageBonus",
        filtered(
            Domain::Drones,
            Predicate::Any,
            Operation::PercentAdd,
            vec![Boost::new(names::DAMAGE_MULTIPLIER, "damageMultiplierBonus")],
            Scaling::Auto,
        ),
    );

    // Percentage bonuses onto the ship. Online so that hulls, skills and
    // online modules all share one id.
    for (id, attribute, bonus) in [
        ("shieldCapacityBonusPostPercent", names::SHIELD_CAPACITY, "shieldCapacityBonus"),
        ("armorHpBonusPostPercent", names::ARMOR_HP, "armorHpBonus"),
        ("hullHpBonusPostPercent", names::HULL_HP, "hullHpBonus"),
        ("velocityBonusPostPercent", names::MAX_VELOCITY, "velocityBonus"),
        ("capacitorCapacityBonusPostPercent", names::CAPACITOR_CAPACITY, "capacitorCapacityBonus"),
        ("capRechargeBonusPostPercent", names::RECHARGE_RATE, "capRechargeBonus"),
        ("shieldRechargeBonusPostPercent", names::SHIELD_RECHARGE_RATE, "shieldRechargeRateBonus"),
        ("maxTargetRangeBonusPostPercent", names::MAX_TARGET_RANGE, "maxTargetRangeBonus"),
        ("scanResolutionBonusPostPercent", names::SCAN_RESOLUTION, "scanResolutionBonus"),
        ("signatureRadiusBonusPostPercent", names::SIGNATURE_RADIUS, names::SIGNATURE_RADIUS_BONUS),
    ] {
        table.insert(id, ship_percent(EffectCategory::Online, attribute, bonus));
    }

    // Flat additions from passive tank modules.
    table.insert(
        "shieldCapacityAddPassive",
        ship_boost(
            EffectCategory::Online,
            Operation::Add,
            vec![Boost::new(names::SHIELD_CAPACITY, "capacityBonus")],
        ),
    );
    table.insert(
        "armorHpAddPassive",
        ship_boost(
            EffectCategory::Online,
            Operation::Add,
            vec![
                Boost::new(names::ARMOR_HP, "armorHPBonusAdd"),
                Boost::new(names::MASS, names::MASS_ADDITION),
            ],
        ),
    );

    // Active modules.
    table.insert(
        "damageControl",
        ship_boost(
            EffectCategory::Active,
            Operation::MultiplyFactor,
            Layer::ALL
                .iter()
                .flat_map(|layer| layer.resonance_attributes())
                .map(|name| Boost::new(name, name))
                .collect(),
        ),
    );
    table.insert("shieldHardenerActive", hardener(Layer::Shield));
    table.insert("armorHardenerActive", hardener(Layer::Armor));
    table.insert(
        "sensorBoosterActive",
        ship_boost(
            EffectCategory::Active,
            Operation::PercentAdd,
            vec![
                Boost::new(names::MAX_TARGET_RANGE, "maxTargetRangeBonus"),
                Boost::new(names::SCAN_RESOLUTION, "scanResolutionBonus"),
            ],
        ),
    );
    table.insert(
        "weaponUpgradeDamageAndRof",
        EffectDef::new(
            EffectCategory::Online,
            EffectKind::FilteredBoost {
                domain: Domain::Modules,
                filter: Predicate::HasAttribute(names::DAMAGE_MULTIPLIER.into())
                    .and(Predicate::HasAttribute(names::SPEED.into())),
                operation: Operation::MultiplyFactor,
                boosts: vec![
                    Boost::new(names::DAMAGE_MULTIPLIER, names::DAMAGE_MULTIPLIER),
                    Boost::new(names::SPEED, "speedMultiplier"),
                ],
                scaling: Scaling::Flat,
            },
        ),
    );
    table.insert(
        "moduleBonusAfterburner",
        EffectDef::new(
            EffectCategory::Active,
            EffectKind::Propulsion {
                signature_bloom: false,
            },
        ),
    );
    table.insert(
        "moduleBonusMicrowarpdrive",
        EffectDef::new(
            EffectCategory::Active,
            EffectKind::Propulsion {
                signature_bloom: true,
            },
        ),
    );

    // Heat.
    table.insert(
        "overloadSelfDurationBonus",
        self_boost(
            EffectCategory::Overload,
            Operation::PercentAdd,
            vec![Boost::new(names::DURATION, "overloadSelfDurationBonus")],
        ),
    );
    table.insert(
        "overloadDamageBonus",
        self_boost(
            EffectCategory::Overload,
            Operation::PercentAdd,
            vec![Boost::new(names::DAMAGE_MULTIPLIER, "overloadDamageModifier")],
        ),
    );

    // Charges onto their launcher or turret.
    table.insert(
        "ammoInfluenceRange",
        EffectDef::new(
            EffectCategory::Passive,
            EffectKind::RelatedBoost {
                target: Related::Other,
                operation: Operation::MultiplyFactor,
                boosts: vec![Boost::new("maxRange", "weaponRangeMultiplier")],
                scaling: Scaling::Flat,
            },
        ),
    );
    table.insert(
        "ammoInfluenceCapNeed",
        EffectDef::new(
            EffectCategory::Passive,
            EffectKind::RelatedBoost {
                target: Related::Other,
                operation: Operation::MultiplyFactor,
                boosts: vec![Boost::new(names::CAPACITOR_NEED, "capNeedBonus")],
                scaling: Scaling::Flat,
            },
        ),
    );

    for (id, role) in [
        ("projectileFired", Role::Turret),
        ("targetAttack", Role::Turret),
        ("useMissiles", Role::Launcher),
        ("shieldBoosting", Role::ShieldBooster),
        ("armorRepair", Role::ArmorRepairer),
        ("structureRepair", Role::HullRepairer),
        ("shieldTransfer", Role::RemoteShieldRepairer),
        ("remoteArmorRepair", Role::RemoteArmorRepairer),
        ("remoteHullRepair", Role::RemoteHullRepairer),
        ("energyTransfer", Role::EnergyTransfer),
    ] {
        table.insert(id, capability(role));
    }

    table
}
