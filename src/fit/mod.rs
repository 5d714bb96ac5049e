pub mod assembly;
pub mod entry;
pub mod spec;

pub use assembly::{Assembly, MAX_SKILL_LEVEL};
pub use entry::{Entry, EntryId, EntryKind, ModuleState};
pub use spec::{AssemblySpec, DroneSpec, ModuleSpec};
