use serde::{Deserialize, Serialize};

use crate::engine::selector::Selector;
use crate::fit::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Flat delta added to the base value.
    Add,
    /// Percentage, e.g. `-10.0` for a ten percent reduction.
    PercentAdd,
    /// Multiplier, e.g. `0.9`.
    MultiplyFactor,
}

/// Where a boost's magnitude comes from: a literal, or an attribute of the
/// source entry read from the previous recompute pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Magnitude {
    Constant(f64),
    SourceAttribute(String),
}

impl From<f64> for Magnitude {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<&str> for Magnitude {
    fn from(name: &str) -> Self {
        Self::SourceAttribute(name.to_string())
    }
}

/// One proposed change to one attribute of every entry the selector resolves to.
/// Rebuilt on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub source: EntryId,
    pub selector: Selector,
    pub attribute: String,
    pub operation: Operation,
    pub magnitude: f64,
    /// True when the magnitude was read from the source's own attributes.
    pub magnitude_is_self: bool,
    /// Stacking penalty applies (module, charge or drone source).
    pub penalized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_deserializes_untagged() {
        let constant: Magnitude = serde_json::from_str("-5.0").unwrap();
        let attribute: Magnitude = serde_json::from_str(r#""falloffBonus""#).unwrap();
        assert_eq!(constant, Magnitude::Constant(-5.0));
        assert_eq!(attribute, Magnitude::SourceAttribute("falloffBonus".into()));
    }
}
