pub mod effects;
pub mod fit_engine;
pub mod modifier;
pub mod recompute;
pub mod registry;
pub mod selector;
pub mod stacking;
pub mod store;

pub use effects::{
    Boost, EffectCategory, EffectContext, EffectDef, EffectKind, Related, Requirement, Role,
    Scaling,
};
pub use fit_engine::{FitEngine, FitId};
pub use modifier::{Magnitude, Modifier, Operation};
pub use recompute::{recompute, seed_values};
pub use registry::builtin_effects;
pub use selector::{Domain, Predicate, Selector};
pub use stacking::{penalized_product, stacking_penalty, STACKING_PENALTY_BASE};
pub use store::{AttributeStore, AttributeValues, Snapshot};
