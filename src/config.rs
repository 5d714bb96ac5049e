//! Engine tuning knobs. Defaults match the documented behavior; every field can
//! be overridden from the environment (`DOGMA_*`) or deserialized from a file.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PASSES: usize = 10;
pub const DEFAULT_EPSILON: f64 = 1e-9;
pub const DEFAULT_CAP_TIME_STEP_SECS: f64 = 1.0;
/// Two hours of simulated drain; anything lasting longer counts as stable.
pub const DEFAULT_CAP_HORIZON_SECS: f64 = 7200.0;

pub const ENV_MAX_PASSES: &str = "DOGMA_MAX_PASSES";
pub const ENV_EPSILON: &str = "DOGMA_EPSILON";
pub const ENV_CAP_STEP: &str = "DOGMA_CAP_STEP_SECS";
pub const ENV_CAP_HORIZON: &str = "DOGMA_CAP_HORIZON_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitorConfig {
    /// Integration step for the depletion simulation.
    pub time_step_secs: f64,
    /// Simulated duration after which a draining capacitor is reported stable.
    pub horizon_secs: f64,
}

impl Default for CapacitorConfig {
    fn default() -> Self {
        Self {
            time_step_secs: DEFAULT_CAP_TIME_STEP_SECS,
            horizon_secs: DEFAULT_CAP_HORIZON_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on fixed-point passes before `CyclicDependency` is reported.
    pub max_passes: usize,
    /// Relative change below which an attribute counts as settled.
    pub epsilon: f64,
    pub capacitor: CapacitorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            epsilon: DEFAULT_EPSILON,
            capacitor: CapacitorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any `DOGMA_*` variables that parse.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(passes) = env_parse::<usize>(ENV_MAX_PASSES) {
            config.max_passes = passes.max(1);
        }
        if let Some(epsilon) = env_parse::<f64>(ENV_EPSILON) {
            config.epsilon = epsilon.abs();
        }
        if let Some(step) = env_parse::<f64>(ENV_CAP_STEP) {
            if step > 0.0 {
                config.capacitor.time_step_secs = step;
            }
        }
        if let Some(horizon) = env_parse::<f64>(ENV_CAP_HORIZON) {
            if horizon > 0.0 {
                config.capacitor.horizon_secs = horizon;
            }
        }
        config
    }
}

pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
