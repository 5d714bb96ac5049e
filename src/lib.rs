//! Attribute-modification engine for ship fittings: effects resolve against a
//! static catalog, stack with diminishing returns and settle into a snapshot
//! that the capacitor simulator and the stats aggregator read from.

pub mod capacitor;
pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod fit;
pub mod parallel;
pub mod stats;
