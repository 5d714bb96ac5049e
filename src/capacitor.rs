//! Capacitor stability and depletion.
//!
//! Recharge follows the peak-at-25% curve `10·C/τ·(√x − x)` where `x` is the
//! level as a fraction of capacity and `τ` the recharge time in seconds.

use serde::Serialize;

use crate::config::CapacitorConfig;

/// Consumption of one active module: `amount` GJ every `cycle_secs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacitorConsumer {
    pub amount: f64,
    pub cycle_secs: f64,
}

impl CapacitorConsumer {
    pub fn new(amount: f64, cycle_secs: f64) -> Self {
        Self { amount, cycle_secs }
    }

    /// GJ/s; zero for a degenerate cycle.
    pub fn rate(&self) -> f64 {
        if self.cycle_secs > 0.0 {
            self.amount / self.cycle_secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CapState {
    /// Settles at this percentage of capacity.
    Stable { percent: f64 },
    /// Runs dry after this many seconds.
    Depletes { seconds: f64 },
}

impl CapState {
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable { .. })
    }

    /// Percent when stable, seconds when depleting.
    pub fn value(&self) -> f64 {
        match *self {
            Self::Stable { percent } => percent,
            Self::Depletes { seconds } => seconds,
        }
    }
}

/// Recharge rate (GJ/s) at level fraction `fraction`.
pub fn recharge_at(capacity: f64, tau_secs: f64, fraction: f64) -> f64 {
    if tau_secs <= 0.0 {
        return 0.0;
    }
    let x = fraction.clamp(0.0, 1.0);
    10.0 * capacity / tau_secs * (x.sqrt() - x)
}

/// Highest recharge rate, reached at 25% level.
pub fn peak_recharge(capacity: f64, tau_secs: f64) -> f64 {
    recharge_at(capacity, tau_secs, 0.25)
}

pub fn consumption_rate(consumers: &[CapacitorConsumer]) -> f64 {
    consumers.iter().map(CapacitorConsumer::rate).sum()
}

const BISECTION_STEPS: usize = 100;
/// Slack on the peak-vs-drain comparison so an exactly balanced load counts as stable.
const STABILITY_SLACK: f64 = 1e-9;

pub fn simulate(
    capacity: f64,
    recharge_time_ms: f64,
    consumers: &[CapacitorConsumer],
    config: &CapacitorConfig,
) -> CapState {
    if capacity <= 0.0 {
        return CapState::Depletes { seconds: 0.0 };
    }
    let drain = consumption_rate(consumers);
    if drain <= 0.0 {
        return CapState::Stable { percent: 100.0 };
    }

    let tau = recharge_time_ms / 1000.0;
    let peak = peak_recharge(capacity, tau);
    if peak + STABILITY_SLACK * peak.max(1.0) >= drain {
        let fraction = stable_fraction(capacity, tau, drain);
        return CapState::Stable {
            percent: fraction * 100.0,
        };
    }

    depletion(capacity, tau, drain, config)
}

/// Upper root of `recharge(x) = drain` on [0.25, 1], where recharge falls
/// monotonically from its peak to zero.
fn stable_fraction(capacity: f64, tau: f64, drain: f64) -> f64 {
    let (mut low, mut high) = (0.25_f64, 1.0_f64);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (low + high);
        if recharge_at(capacity, tau, mid) >= drain {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < f64::EPSILON {
            break;
        }
    }
    0.5 * (low + high)
}

fn depletion(capacity: f64, tau: f64, drain: f64, config: &CapacitorConfig) -> CapState {
    let step = if config.time_step_secs > 0.0 {
        config.time_step_secs
    } else {
        1.0
    };
    let mut level = capacity;
    let mut elapsed = 0.0;

    while elapsed < config.horizon_secs {
        let net = recharge_at(capacity, tau, level / capacity) - drain;
        let next = level + net * step;
        if next <= 0.0 {
            // Interpolate inside the last step.
            let seconds = elapsed + step * level / (level - next);
            return CapState::Depletes { seconds };
        }
        level = next.min(capacity);
        elapsed += step;
    }

    tracing::debug!(
        horizon_secs = config.horizon_secs,
        level = level / capacity,
        "capacitor outlasted the simulation horizon"
    );
    CapState::Stable {
        percent: level / capacity * 100.0,
    }
}
