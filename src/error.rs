//! Error types shared by the catalog loader, the assembly mutation API and the
//! recompute loop.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::data::{Category, ItemId};
use crate::fit::EntryId;

/// Failures while reading catalog or assembly description files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse json '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to parse yaml '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unsupported file format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
    #[error("duplicate item id {0}")]
    DuplicateItem(ItemId),
    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),
}

/// Errors returned by the mutation API and by `recompute`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Fixed-point iteration did not settle within the configured pass bound.
    #[error("attribute values did not settle after {passes} passes")]
    CyclicDependency { passes: usize },
    #[error("skill level {level} is outside 0..=5")]
    InvalidSkillLevel { level: u8 },
    #[error("no entry {0} in assembly")]
    UnknownEntry(EntryId),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("item '{name}' is a {actual} but a {expected} was expected")]
    WrongCategory {
        name: String,
        expected: Category,
        actual: Category,
    },
    #[error("entry {0} is not a module")]
    NotAModule(EntryId),
    #[error("entry {0} is not a skill")]
    NotASkill(EntryId),
    #[error("entry {0} is not a drone")]
    NotADrone(EntryId),
    #[error("module '{0}' declares no slot and none was given")]
    MissingSlot(String),
    #[error("the hull entry cannot be removed")]
    HullRemoval,
    #[error("active drones ({active}) exceed drone count ({count})")]
    TooManyActiveDrones { active: u32, count: u32 },
    #[error("no snapshot has been computed yet")]
    NotComputed,
}

/// Kind of a non-fatal lookup miss met while evaluating effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnknownAttribute,
    UnknownSkill,
    UnknownEffect,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownAttribute => "unknown attribute",
            Self::UnknownSkill => "unknown skill",
            Self::UnknownEffect => "unknown effect",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A skipped modifier, kept on the snapshot so callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub source: EntryId,
    pub effect: String,
    pub name: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        source: EntryId,
        effect: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source,
            effect: effect.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' (effect '{}' on entry {})",
            self.kind, self.name, self.effect, self.source
        )
    }
}
