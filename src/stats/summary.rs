//! Fitting resource usage and the serializable all-in-one summary.

use serde::Serialize;

use crate::capacitor::{consumption_rate, CapState};
use crate::data::{names, Slot};
use crate::fit::{EntryKind, ModuleState};
use crate::stats::damage::DamageBreakdown;
use crate::stats::tank::{LayerResists, LayerValues, RemoteReps, TankRates};
use crate::stats::FitStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FittingUsage {
    pub cpu_used: f64,
    pub cpu_output: f64,
    pub power_used: f64,
    pub power_output: f64,
    pub calibration_used: f64,
    pub calibration_output: f64,
    pub drone_bandwidth_used: f64,
    pub drone_bandwidth: f64,
    pub drone_bay_used: f64,
    pub drone_capacity: f64,
    pub active_drones: u32,
}

impl FittingUsage {
    /// True when every resource fits within its output.
    pub fn within_limits(&self) -> bool {
        self.cpu_used <= self.cpu_output
            && self.power_used <= self.power_output
            && self.calibration_used <= self.calibration_output
            && self.drone_bandwidth_used <= self.drone_bandwidth
            && self.drone_bay_used <= self.drone_capacity
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OffenseSummary {
    pub weapon_dps: f64,
    pub drone_dps: f64,
    pub total_dps: f64,
    pub total_volley: f64,
    pub dps_by_type: DamageBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefenseSummary {
    pub hp: LayerValues,
    pub ehp: LayerValues,
    pub total_ehp: f64,
    pub resists: LayerResists,
    pub effective_tank: TankRates,
    pub sustainable_tank: TankRates,
    pub remote_reps: RemoteReps,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacitorSummary {
    pub capacity: f64,
    pub recharge_secs: f64,
    pub peak_recharge: f64,
    pub consumption: f64,
    pub state: CapState,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetingSummary {
    pub max_target_range: f64,
    pub scan_resolution: f64,
    pub scan_strength: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MiscSummary {
    pub max_speed: f64,
    pub signature_radius: f64,
    pub warp_speed: f64,
    pub mass: f64,
}

/// Numbers only; formatting is left to the consumer.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub ship: String,
    pub revision: u64,
    pub passes: usize,
    pub offense: OffenseSummary,
    pub defense: DefenseSummary,
    pub capacitor: CapacitorSummary,
    pub targeting: TargetingSummary,
    pub misc: MiscSummary,
    pub fitting: FittingUsage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl FitStats<'_> {
    pub fn fitting(&self) -> FittingUsage {
        let mut usage = FittingUsage {
            cpu_output: self.ship_attr(names::CPU_OUTPUT),
            power_output: self.ship_attr(names::POWER_OUTPUT),
            calibration_output: self.ship_attr(names::UPGRADE_CAPACITY),
            drone_bandwidth: self.ship_attr(names::DRONE_BANDWIDTH),
            drone_capacity: self.ship_attr(names::DRONE_CAPACITY),
            ..FittingUsage::default()
        };

        for module in self.assembly().modules() {
            if module.slot() == Some(Slot::Rig) {
                usage.calibration_used += self.modified_attr(module.id, names::UPGRADE_COST);
            }
            if module.state().is_some_and(|state| state >= ModuleState::Online) {
                usage.cpu_used += self.modified_attr(module.id, names::CPU);
                usage.power_used += self.modified_attr(module.id, names::POWER);
            }
        }

        for drone in self.assembly().drones() {
            if let EntryKind::Drone { count, active } = drone.kind {
                usage.drone_bay_used += self.modified_attr(drone.id, names::VOLUME) * f64::from(count);
                usage.drone_bandwidth_used +=
                    self.modified_attr(drone.id, names::DRONE_BANDWIDTH_USED) * f64::from(active);
                usage.active_drones += active;
            }
        }
        usage
    }

    pub fn summary(&self) -> StatsSummary {
        let assembly = self.assembly();
        let ship = self.entry_name(assembly.hull()).unwrap_or_default().to_string();
        let ehp = self.ehp();
        let total_dps = self.total_dps();

        StatsSummary {
            ship,
            revision: self.snapshot().revision(),
            passes: self.snapshot().passes(),
            offense: OffenseSummary {
                weapon_dps: self.weapon_dps().total(),
                drone_dps: self.drone_dps().total(),
                total_dps: total_dps.total(),
                total_volley: self.total_volley().total(),
                dps_by_type: total_dps,
            },
            defense: DefenseSummary {
                hp: self.hp(),
                ehp,
                total_ehp: ehp.total(),
                resists: self.resists(),
                effective_tank: self.effective_tank(),
                sustainable_tank: self.sustainable_tank(),
                remote_reps: self.remote_reps(),
            },
            capacitor: CapacitorSummary {
                capacity: self.capacitor_capacity(),
                recharge_secs: self.capacitor_recharge_secs(),
                peak_recharge: self.peak_cap_recharge(),
                consumption: consumption_rate(&self.cap_consumers()),
                state: self.cap_state(),
            },
            targeting: TargetingSummary {
                max_target_range: self.max_target_range(),
                scan_resolution: self.scan_resolution(),
                scan_strength: self.scan_strength(),
            },
            misc: MiscSummary {
                max_speed: self.max_speed(),
                signature_radius: self.signature_radius(),
                warp_speed: self.warp_speed(),
                mass: self.ship_attr(names::MASS),
            },
            fitting: self.fitting(),
            diagnostics: self
                .snapshot()
                .diagnostics()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
