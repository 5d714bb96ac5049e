use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::data::{validate_catalog_file, Catalog, ValidationSeverity};
use crate::engine::{builtin_effects, FitEngine};
use crate::error::EngineError;
use crate::fit::AssemblySpec;
use crate::parallel::{recompute_all, WorkerPool};
use crate::stats::StatsSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stats,
    Batch,
    Validate,
    Effects,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("stats") => Some(Command::Stats),
        Some("batch") => Some(Command::Batch),
        Some("validate") => Some(Command::Validate),
        Some("effects") => Some(Command::Effects),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Stats) => handle_stats(args),
        Some(Command::Batch) => handle_batch(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Effects) => handle_effects(),
        None => {
            eprintln!("usage: dogma <stats|batch|validate|effects>");
            2
        }
    }
}

fn load_catalog(path: &str) -> Option<Arc<Catalog>> {
    match Catalog::load(path) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            eprintln!("failed to load catalog: {err}");
            None
        }
    }
}

fn build_engine(catalog: &Arc<Catalog>, path: &str) -> Result<FitEngine, String> {
    let spec = AssemblySpec::load(path).map_err(|err| err.to_string())?;
    FitEngine::from_spec(Arc::clone(catalog), &spec)
        .map(|engine| engine.with_config(EngineConfig::from_env()))
        .map_err(|err| format!("{path}: {err}"))
}

fn summarize(engine: &FitEngine) -> Result<StatsSummary, EngineError> {
    engine.stats().map(|stats| stats.summary())
}

fn print_json<T: Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_stats(args: &[String]) -> i32 {
    let (Some(catalog_path), Some(assembly_path)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: dogma stats <catalog> <assembly>");
        return 2;
    };

    let Some(catalog) = load_catalog(catalog_path) else {
        return 1;
    };
    let mut engine = match build_engine(&catalog, assembly_path) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("failed to build assembly: {err}");
            return 1;
        }
    };
    if let Err(err) = engine.recompute() {
        eprintln!("recompute failed: {err}");
        return 1;
    }

    match summarize(&engine) {
        Ok(summary) => print_json(&summary, "stats summary"),
        Err(err) => {
            eprintln!("stats unavailable: {err}");
            1
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchEntry {
    assembly: String,
    fit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn handle_batch(args: &[String]) -> i32 {
    let Some(catalog_path) = args.get(2) else {
        eprintln!("usage: dogma batch <catalog> <assembly>...");
        return 2;
    };
    let paths = &args[3.min(args.len())..];
    if paths.is_empty() {
        eprintln!("usage: dogma batch <catalog> <assembly>...");
        return 2;
    }

    let Some(catalog) = load_catalog(catalog_path) else {
        return 1;
    };

    let mut engines = Vec::with_capacity(paths.len());
    for path in paths {
        match build_engine(&catalog, path) {
            Ok(engine) => engines.push(engine),
            Err(err) => {
                eprintln!("failed to build assembly: {err}");
                return 1;
            }
        }
    }

    let outcomes = recompute_all(&mut engines, &WorkerPool::from_env());

    let mut failed = false;
    let report: Vec<BatchEntry> = paths
        .iter()
        .zip(engines.iter().zip(outcomes))
        .map(|(path, (engine, outcome))| {
            let result = outcome.passes.and_then(|_| summarize(engine));
            failed |= result.is_err();
            let (summary, error) = match result {
                Ok(summary) => (Some(summary), None),
                Err(err) => (None, Some(err.to_string())),
            };
            BatchEntry {
                assembly: path.clone(),
                fit: outcome.fit.to_string(),
                summary,
                error,
            }
        })
        .collect();

    match print_json(&report, "batch report") {
        0 if failed => 1,
        code => code,
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(crate::data::DEFAULT_CATALOG_PATH);

    match validate_catalog_file(path) {
        Ok(report) if !report.has_errors() => {
            println!(
                "validation passed: {path} ({} warning(s))",
                report.count(ValidationSeverity::Warning)
            );
            for diagnostic in &report.diagnostics {
                println!("- {diagnostic}");
            }
            0
        }
        Ok(report) => {
            eprintln!(
                "validation failed: {} issue(s)",
                report.count(ValidationSeverity::Error)
            );
            for diagnostic in &report.diagnostics {
                eprintln!("- {diagnostic}");
            }
            1
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}

fn handle_effects() -> i32 {
    let ids: Vec<&str> = builtin_effects().keys().copied().collect();
    print_json(&ids, "effect list")
}
