//! Composition of every modifier that reaches one (entry, attribute) pair.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::data::{AttributeMeta, Composition};
use crate::engine::modifier::{Modifier, Operation};

pub const STACKING_PENALTY_BASE: f64 = 0.869;

/// Weight of the factor at `position` (0-based) in a penalized chain.
pub fn stacking_penalty(position: usize) -> f64 {
    let n = position as f64;
    STACKING_PENALTY_BASE.powf(n * n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackCategory {
    /// Flat delta
    Add,
    /// Percentage (`-10.0` is ten percent down)
    PercentAdd { penalized: bool },
    /// Multiplier
    Factor { penalized: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackContribution<K> {
    pub key: K,
    pub category: StackCategory,
    pub value: f64,
}

impl<K> StackContribution<K> {
    pub fn add(key: K, value: f64) -> Self {
        Self {
            key,
            category: StackCategory::Add,
            value,
        }
    }

    pub fn percent(key: K, value: f64, penalized: bool) -> Self {
        Self {
            key,
            category: StackCategory::PercentAdd { penalized },
            value,
        }
    }

    pub fn factor(key: K, value: f64, penalized: bool) -> Self {
        Self {
            key,
            category: StackCategory::Factor { penalized },
            value,
        }
    }

    pub fn from_modifier(key: K, modifier: &Modifier) -> Self {
        match modifier.operation {
            Operation::Add => Self::add(key, modifier.magnitude),
            Operation::PercentAdd => Self::percent(key, modifier.magnitude, modifier.penalized),
            Operation::MultiplyFactor => Self::factor(key, modifier.magnitude, modifier.penalized),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    pub add: f64,
    /// (percent, penalized)
    pub percents: Vec<(f64, bool)>,
    /// (factor, penalized)
    pub factors: Vec<(f64, bool)>,
}

impl CategoryTotals {
    pub fn apply(&mut self, category: StackCategory, value: f64) {
        match category {
            StackCategory::Add => self.add += value,
            StackCategory::PercentAdd { penalized } => self.percents.push((value, penalized)),
            StackCategory::Factor { penalized } => self.factors.push((value, penalized)),
        }
    }

    /// `(base + Σadd) × percent term × Πunpenalized × Πpenalized`, clamped at
    /// zero only for non-negative attributes.
    pub fn compose(&self, meta: &AttributeMeta, base: f64) -> f64 {
        let mut value = base + self.add;

        let mut unpenalized = 1.0;
        let mut penalized = Vec::new();
        let mut route = |factor: f64, wants_penalty: bool| {
            if wants_penalty && meta.composition == Composition::MultiplicativeStacking {
                penalized.push(factor);
            } else {
                unpenalized *= factor;
            }
        };

        if meta.composition == Composition::PercentAdditive {
            let sum: f64 = self.percents.iter().map(|(p, _)| p).sum();
            value *= 1.0 + sum / 100.0;
        } else {
            for &(percent, wants_penalty) in &self.percents {
                route(1.0 + percent / 100.0, wants_penalty);
            }
        }
        for &(factor, wants_penalty) in &self.factors {
            route(factor, wants_penalty);
        }

        value *= unpenalized * penalized_product(&penalized);
        if meta.non_negative && value < 0.0 {
            0.0
        } else {
            value
        }
    }
}

/// Product of stacking-penalized factors. Bonuses (> 1) and penalties (< 1)
/// form separate chains; each chain is ordered by strength.
pub fn penalized_product(factors: &[f64]) -> f64 {
    let chain = |mut group: Vec<f64>| -> f64 {
        group.sort_by(|a, b| {
            (b - 1.0)
                .abs()
                .partial_cmp(&(a - 1.0).abs())
                .unwrap_or(Ordering::Equal)
        });
        group
            .iter()
            .enumerate()
            .map(|(position, factor)| 1.0 + (factor - 1.0) * stacking_penalty(position))
            .product()
    };
    let bonuses = factors.iter().copied().filter(|f| *f > 1.0).collect();
    let penalties = factors.iter().copied().filter(|f| *f < 1.0).collect();
    chain(bonuses) * chain(penalties)
}

#[derive(Debug, Clone, Default)]
pub struct StatStacking<K: Ord> {
    totals: BTreeMap<K, CategoryTotals>,
}

impl<K: Ord> StatStacking<K> {
    pub fn new() -> Self {
        Self {
            totals: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, contribution: StackContribution<K>) {
        self.totals
            .entry(contribution.key)
            .or_default()
            .apply(contribution.category, contribution.value);
    }

    pub fn into_totals(self) -> BTreeMap<K, CategoryTotals> {
        self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn meta(composition: Composition) -> AttributeMeta {
        AttributeMeta::new("signatureRadius", composition)
    }

    fn totals(contributions: Vec<StackContribution<&'static str>>) -> CategoryTotals {
        let mut stacking = StatStacking::new();
        for contribution in contributions {
            stacking.add(contribution);
        }
        stacking.into_totals().remove("x").unwrap_or_default()
    }

    #[test]
    fn penalty_weights() {
        assert_eq!(stacking_penalty(0), 1.0);
        assert!((stacking_penalty(1) - 0.869).abs() < TOL);
        assert!((stacking_penalty(2) - 0.869f64.powi(4)).abs() < TOL);
    }

    #[test]
    fn three_equal_bonuses_diminish() {
        let product = penalized_product(&[1.1, 1.1, 1.1]);
        let expected = 1.1 * (1.0 + 0.1 * 0.869) * (1.0 + 0.1 * 0.869f64.powi(4));
        assert!((product - expected).abs() < 1e-12);
        assert!(product < 1.1f64.powi(3));
    }

    #[test]
    fn opposite_polarities_do_not_interact() {
        assert!((penalized_product(&[1.2, 0.8]) - 0.96).abs() < TOL);
    }

    #[test]
    fn strongest_factor_goes_first() {
        let product = penalized_product(&[1.05, 1.3]);
        let expected = 1.3 * (1.0 + 0.05 * 0.869);
        assert!((product - expected).abs() < TOL);
    }

    #[test]
    fn percent_additive_sums_percentages() {
        let t = totals(vec![
            StackContribution::percent("x", -10.0, true),
            StackContribution::percent("x", -10.0, false),
        ]);
        assert!((t.compose(&meta(Composition::PercentAdditive), 400.0) - 320.0).abs() < TOL);
        assert!((t.compose(&meta(Composition::MultiplicativeStacking), 400.0) - 324.0).abs() < TOL);
    }

    #[test]
    fn additive_composition_never_penalizes() {
        let t = totals(vec![
            StackContribution::factor("x", 1.1, true),
            StackContribution::factor("x", 1.1, true),
        ]);
        assert!((t.compose(&meta(Composition::Additive), 100.0) - 121.0).abs() < TOL);
        assert!(t.compose(&meta(Composition::MultiplicativeStacking), 100.0) < 121.0);
    }

    #[test]
    fn add_happens_before_multiplication() {
        let t = totals(vec![
            StackContribution::add("x", 100.0),
            StackContribution::factor("x", 2.0, false),
        ]);
        assert!((t.compose(&meta(Composition::MultiplicativeStacking), 50.0) - 300.0).abs() < TOL);
    }

    #[test]
    fn compose_without_contributions_returns_base() {
        let mut t = CategoryTotals::default();
        assert_eq!(t.compose(&meta(Composition::MultiplicativeStacking), 400.0), 400.0);
        t.apply(StackCategory::PercentAdd { penalized: true }, -10.0);
        assert!((t.compose(&meta(Composition::MultiplicativeStacking), 400.0) - 360.0).abs() < TOL);
    }

    #[test]
    fn clamps_only_non_negative_attributes() {
        let t = totals(vec![StackContribution::add("x", -500.0)]);
        assert_eq!(t.compose(&meta(Composition::Additive), 100.0), -400.0);
        assert_eq!(t.compose(&meta(Composition::Additive).non_negative(), 100.0), 0.0);
    }
}
